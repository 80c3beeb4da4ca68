pub mod appraisals;
pub mod reviews;
pub mod workflow;
