//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument.

pub mod appraisal_repo;
pub mod review_repo;
pub mod user_repo;

pub use appraisal_repo::AppraisalRepo;
pub use review_repo::ReviewRepo;
pub use user_repo::UserRepo;
