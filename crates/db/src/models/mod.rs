//! Row structs for the appraisal tables.
//!
//! Rows carry database-native columns (`status_id`) and convert into the
//! domain types from `appraise_core`.

pub mod appraisal;
pub mod review;
