pub mod action_queue_side_effect;
pub mod actionable_only_filter;
pub mod as_of_query_hydrator;
pub mod ranked_selector;
pub mod reorder_analysis_source;
pub mod urgency_magnitude_scorer;
pub mod vendor_options_hydrator;
