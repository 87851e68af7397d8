pub mod reorder_review;
