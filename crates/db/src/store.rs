use appraise_core::appraisal::{Appraisal, AppraisalDetails, NewAppraisal};
use appraise_core::error::CoreError;
use appraise_core::review::{missing_self_review, ManagerAssessment, Review, SelfAssessment};
use appraise_core::status::AppraisalStatus;
use appraise_core::store::{AppraisalFilter, AppraisalStore, ReviewFilter};
use appraise_core::types::{DbId, Rating};
use async_trait::async_trait;

use crate::repositories::appraisal_repo::AppraisalListQuery;
use crate::repositories::review_repo::{GuardedReviewWrite, ReviewListQuery};
use crate::repositories::{AppraisalRepo, ReviewRepo, UserRepo};
use crate::{health_check, map_db_error, DbPool};

/// [`AppraisalStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgAppraisalStore {
    pool: DbPool,
}

impl PgAppraisalStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppraisalStore for PgAppraisalStore {
    async fn ping(&self) -> Result<(), CoreError> {
        health_check(&self.pool).await.map_err(map_db_error)
    }

    async fn employee_exists(&self, employee_id: DbId) -> Result<bool, CoreError> {
        UserRepo::exists(&self.pool, employee_id)
            .await
            .map_err(map_db_error)
    }

    async fn create_appraisal(&self, input: &NewAppraisal) -> Result<Appraisal, CoreError> {
        AppraisalRepo::create(&self.pool, input)
            .await
            .map_err(map_db_error)?
            .try_into()
    }

    async fn find_appraisal(&self, id: DbId) -> Result<Option<Appraisal>, CoreError> {
        AppraisalRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_error)?
            .map(Appraisal::try_from)
            .transpose()
    }

    async fn list_appraisals(&self, filter: &AppraisalFilter) -> Result<Vec<Appraisal>, CoreError> {
        let query = AppraisalListQuery {
            employee_id: filter.employee_id,
            status_id: filter.status.map(AppraisalStatus::id),
            appraisal_cycle: filter.appraisal_cycle.as_deref(),
            limit: filter.limit,
            offset: filter.offset,
        };
        AppraisalRepo::list(&self.pool, &query)
            .await
            .map_err(map_db_error)?
            .into_iter()
            .map(Appraisal::try_from)
            .collect()
    }

    async fn update_appraisal_details(
        &self,
        id: DbId,
        details: &AppraisalDetails,
    ) -> Result<Option<Appraisal>, CoreError> {
        AppraisalRepo::update_details(&self.pool, id, details)
            .await
            .map_err(map_db_error)?
            .map(Appraisal::try_from)
            .transpose()
    }

    async fn delete_appraisal(&self, id: DbId) -> Result<bool, CoreError> {
        AppraisalRepo::delete(&self.pool, id)
            .await
            .map_err(map_db_error)
    }

    async fn transition_status(
        &self,
        id: DbId,
        expected: AppraisalStatus,
        next: AppraisalStatus,
    ) -> Result<Option<Appraisal>, CoreError> {
        AppraisalRepo::transition_status(&self.pool, id, expected.id(), next.id())
            .await
            .map_err(map_db_error)?
            .map(Appraisal::try_from)
            .transpose()
    }

    async fn finalize_appraisal(
        &self,
        id: DbId,
        expected: AppraisalStatus,
        overall_rating: Rating,
    ) -> Result<Option<Appraisal>, CoreError> {
        AppraisalRepo::finalize(
            &self.pool,
            id,
            expected.id(),
            AppraisalStatus::Completed.id(),
            overall_rating,
        )
        .await
        .map_err(map_db_error)?
        .map(Appraisal::try_from)
        .transpose()
    }

    async fn find_review(&self, id: DbId) -> Result<Option<Review>, CoreError> {
        Ok(ReviewRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_error)?
            .map(Review::from))
    }

    async fn find_review_for(
        &self,
        appraisal_id: DbId,
        employee_id: DbId,
    ) -> Result<Option<Review>, CoreError> {
        Ok(ReviewRepo::find_for(&self.pool, appraisal_id, employee_id)
            .await
            .map_err(map_db_error)?
            .map(Review::from))
    }

    async fn list_reviews(&self, filter: &ReviewFilter) -> Result<Vec<Review>, CoreError> {
        let query = ReviewListQuery {
            employee_id: filter.employee_id,
            appraisal_id: filter.appraisal_id,
            limit: filter.limit,
            offset: filter.offset,
        };
        Ok(ReviewRepo::list(&self.pool, &query)
            .await
            .map_err(map_db_error)?
            .into_iter()
            .map(Review::from)
            .collect())
    }

    async fn record_self_review(
        &self,
        appraisal_id: DbId,
        employee_id: DbId,
        expected: AppraisalStatus,
        assessment: &SelfAssessment,
    ) -> Result<Option<Review>, CoreError> {
        let outcome = ReviewRepo::submit_self_review(
            &self.pool,
            appraisal_id,
            employee_id,
            expected.id(),
            AppraisalStatus::SelfReview.id(),
            assessment,
        )
        .await
        .map_err(map_db_error)?;
        guarded_review(outcome, appraisal_id)
    }

    async fn record_manager_review(
        &self,
        appraisal_id: DbId,
        review_id: DbId,
        expected: AppraisalStatus,
        assessment: &ManagerAssessment,
    ) -> Result<Option<Review>, CoreError> {
        let outcome = ReviewRepo::submit_manager_review(
            &self.pool,
            appraisal_id,
            review_id,
            expected.id(),
            AppraisalStatus::PmReview.id(),
            assessment,
        )
        .await
        .map_err(map_db_error)?;
        guarded_review(outcome, appraisal_id)
    }
}

fn guarded_review(
    outcome: GuardedReviewWrite,
    appraisal_id: DbId,
) -> Result<Option<Review>, CoreError> {
    match outcome {
        GuardedReviewWrite::Written(row) => Ok(Some(Review::from(row))),
        GuardedReviewWrite::StatusChanged => Ok(None),
        GuardedReviewWrite::ReviewMissing => Err(missing_self_review(appraisal_id)),
    }
}
