//! Reorder-recommendation pipeline.
//!
//! Composes the pure calculators from `replen-core` into a staged
//! candidate pipeline: query hydrators fill in run context, a source
//! computes one candidate per SKU from the inventory and sales providers,
//! hydrators attach vendor sourcing options, filters and scorers shape the
//! set, a selector produces the stable ranked order, and side effects hand
//! the result to the action queue.
//!
//! The pipeline itself owns no state between runs; per-SKU failures are
//! collected into a side list and a deadline cancels the run as a whole
//! rather than letting a partial list masquerade as a complete one.

pub mod candidate_pipeline;
pub mod components;
pub mod error;
pub mod export;
pub mod filter;
pub mod hydrator;
pub mod loaders;
pub mod pipelines;
pub mod projections;
pub mod providers;
pub mod query_hydrator;
pub mod scorer;
pub mod selector;
pub mod side_effect;
pub mod source;
pub mod types;
pub mod util;
