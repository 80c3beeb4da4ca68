//! Domain layer for the appraisal service.
//!
//! Everything here is transport- and storage-agnostic: the lifecycle status
//! machine, the transition authorizer, request payload validation, read
//! visibility rules, and the [`store::AppraisalStore`] seam that the
//! PostgreSQL layer (and the in-memory test store) implement.

pub mod appraisal;
pub mod error;
pub mod lifecycle;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod records;
pub mod review;
pub mod roles;
pub mod status;
pub mod store;
pub mod transition;
pub mod types;
pub mod validation;
pub mod visibility;
