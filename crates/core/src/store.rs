//! Persistence seam for appraisals and reviews.
//!
//! [`AppraisalStore`] is implemented by `appraise_db::PgAppraisalStore` for
//! production and by [`crate::memory::InMemoryStore`] for tests. Lookups
//! return `Ok(None)` for a missing row so that "not found" stays distinct from
//! storage failures, which surface as [`CoreError::Internal`].
//!
//! Status writes are compare-and-set: [`AppraisalStore::transition_status`],
//! [`AppraisalStore::finalize_appraisal`] and the two review submissions only
//! apply when the stored status still equals `expected`, returning `Ok(None)`
//! and writing nothing otherwise. The review submissions write the review and
//! the status as one unit.

use async_trait::async_trait;
use serde::Deserialize;

use crate::appraisal::{Appraisal, AppraisalDetails, NewAppraisal};
use crate::error::CoreError;
use crate::review::{ManagerAssessment, Review, SelfAssessment};
use crate::status::AppraisalStatus;
use crate::types::{DbId, Rating};

/// Default page size for list queries.
pub const DEFAULT_LIMIT: i64 = 50;

/// Upper bound on page size for list queries.
pub const MAX_LIMIT: i64 = 200;

/// Clamp a caller-supplied page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a caller-supplied offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Query parameters for `GET /appraisals`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppraisalListParams {
    pub employee_id: Option<DbId>,
    pub status: Option<String>,
    pub appraisal_cycle: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Resolved list filter handed to the store. Results are ordered by
/// `created_at` descending, then `id` descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppraisalFilter {
    pub employee_id: Option<DbId>,
    pub status: Option<AppraisalStatus>,
    pub appraisal_cycle: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for AppraisalFilter {
    fn default() -> Self {
        Self {
            employee_id: None,
            status: None,
            appraisal_cycle: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Query parameters for `GET /reviews`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewListParams {
    pub employee_id: Option<DbId>,
    pub appraisal_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Resolved review filter, ordered like [`AppraisalFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewFilter {
    pub employee_id: Option<DbId>,
    pub appraisal_id: Option<DbId>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ReviewFilter {
    fn default() -> Self {
        Self {
            employee_id: None,
            appraisal_id: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl From<ReviewListParams> for ReviewFilter {
    fn from(params: ReviewListParams) -> Self {
        Self {
            employee_id: params.employee_id,
            appraisal_id: params.appraisal_id,
            limit: clamp_limit(params.limit),
            offset: clamp_offset(params.offset),
        }
    }
}

impl AppraisalListParams {
    /// Parse the status name and clamp pagination.
    pub fn into_filter(self) -> Result<AppraisalFilter, CoreError> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<AppraisalStatus>)
            .transpose()?;
        Ok(AppraisalFilter {
            employee_id: self.employee_id,
            status,
            appraisal_cycle: self.appraisal_cycle,
            limit: clamp_limit(self.limit),
            offset: clamp_offset(self.offset),
        })
    }
}

#[async_trait]
pub trait AppraisalStore: Send + Sync {
    /// Reachability check used by the health endpoint.
    async fn ping(&self) -> Result<(), CoreError>;

    async fn employee_exists(&self, employee_id: DbId) -> Result<bool, CoreError>;

    /// Insert a new appraisal in `pending`.
    ///
    /// Fails with [`CoreError::Conflict`] if the employee already has an
    /// appraisal for the same cycle.
    async fn create_appraisal(&self, input: &NewAppraisal) -> Result<Appraisal, CoreError>;

    async fn find_appraisal(&self, id: DbId) -> Result<Option<Appraisal>, CoreError>;

    async fn list_appraisals(&self, filter: &AppraisalFilter) -> Result<Vec<Appraisal>, CoreError>;

    /// Overwrite the descriptive fields. Never touches `status`.
    async fn update_appraisal_details(
        &self,
        id: DbId,
        details: &AppraisalDetails,
    ) -> Result<Option<Appraisal>, CoreError>;

    /// Delete an appraisal and, by cascade, its reviews. Returns `true` if a row was removed.
    async fn delete_appraisal(&self, id: DbId) -> Result<bool, CoreError>;

    /// Set `status` to `next` if it currently equals `expected`.
    async fn transition_status(
        &self,
        id: DbId,
        expected: AppraisalStatus,
        next: AppraisalStatus,
    ) -> Result<Option<Appraisal>, CoreError>;

    /// Set `overall_rating` and move to `completed` if status currently equals `expected`.
    async fn finalize_appraisal(
        &self,
        id: DbId,
        expected: AppraisalStatus,
        overall_rating: Rating,
    ) -> Result<Option<Appraisal>, CoreError>;

    async fn find_review(&self, id: DbId) -> Result<Option<Review>, CoreError>;

    async fn find_review_for(
        &self,
        appraisal_id: DbId,
        employee_id: DbId,
    ) -> Result<Option<Review>, CoreError>;

    /// List reviews, newest first.
    async fn list_reviews(&self, filter: &ReviewFilter) -> Result<Vec<Review>, CoreError>;

    /// Insert or overwrite the self-assessment for `(appraisal_id, employee_id)`
    /// and move the appraisal to `self-review`, if its status still equals
    /// `expected`.
    ///
    /// Manager fields on an existing row are left untouched.
    async fn record_self_review(
        &self,
        appraisal_id: DbId,
        employee_id: DbId,
        expected: AppraisalStatus,
        assessment: &SelfAssessment,
    ) -> Result<Option<Review>, CoreError>;

    /// Write the manager fields of review `review_id` and move the appraisal
    /// to `pm-review`, if its status still equals `expected`.
    ///
    /// Fails with [`CoreError::PreconditionFailed`] and writes nothing when
    /// the review no longer exists.
    async fn record_manager_review(
        &self,
        appraisal_id: DbId,
        review_id: DbId,
        expected: AppraisalStatus,
        assessment: &ManagerAssessment,
    ) -> Result<Option<Review>, CoreError>;
}
