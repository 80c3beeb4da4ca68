//! Lifecycle engine: the only code path that writes an appraisal's status or
//! review content.
//!
//! Each operation loads the appraisal, checks the caller and the current
//! status, and then writes with a compare-and-set against the status it
//! loaded. Review submissions hand the review and the new status to the store
//! as one guarded write, so a submission that loses a race changes nothing.
//! A lost race surfaces as [`CoreError::Conflict`] instead of silently
//! overwriting the winner.

use std::sync::Arc;

use crate::appraisal::{Appraisal, FinalizeRequest};
use crate::error::CoreError;
use crate::review::{missing_self_review, ManagerReviewRequest, Review, SelfReviewRequest};
use crate::roles::{Caller, Role};
use crate::status::AppraisalStatus;
use crate::store::AppraisalStore;
use crate::transition::{Grant, TransitionAuthorizer, DENY_NOT_OWNER, DENY_UNRECOGNIZED_ROLE};
use crate::types::DbId;
use crate::visibility::ensure_can_view_appraisal;

/// Statuses in which the owner may (re-)submit a self-review.
pub const SELF_REVIEW_WINDOW: &[AppraisalStatus] =
    &[AppraisalStatus::Pending, AppraisalStatus::SelfReview];

/// Statuses in which a manager may (re-)annotate the review.
pub const MANAGER_REVIEW_WINDOW: &[AppraisalStatus] =
    &[AppraisalStatus::SelfReview, AppraisalStatus::PmReview];

/// Statuses from which HR may finalize.
pub const FINALIZE_WINDOW: &[AppraisalStatus] =
    &[AppraisalStatus::PmReview, AppraisalStatus::HrReview];

const MANAGER_REVIEW_ROLES: &[Role] = &[Role::Manager, Role::Admin];
const FINALIZE_ROLES: &[Role] = &[Role::Hr, Role::Admin];

pub struct LifecycleEngine {
    store: Arc<dyn AppraisalStore>,
    authorizer: TransitionAuthorizer,
}

impl LifecycleEngine {
    pub fn new(store: Arc<dyn AppraisalStore>, authorizer: TransitionAuthorizer) -> Self {
        Self { store, authorizer }
    }

    /// Create or revise the caller's self-review and move the appraisal to
    /// `self-review`.
    pub async fn submit_self_review(
        &self,
        appraisal_id: DbId,
        caller: &Caller,
        input: SelfReviewRequest,
    ) -> Result<Review, CoreError> {
        let assessment = input.into_validated()?;
        let appraisal = self.load(appraisal_id).await?;

        if caller.role.is_none() {
            return Err(CoreError::Forbidden(DENY_UNRECOGNIZED_ROLE.to_string()));
        }
        if caller.user_id != appraisal.employee_id {
            return Err(CoreError::Forbidden(DENY_NOT_OWNER.to_string()));
        }
        ensure_window(&appraisal, SELF_REVIEW_WINDOW, "submit a self-review")?;

        let review = match self
            .store
            .record_self_review(appraisal.id, caller.user_id, appraisal.status, &assessment)
            .await?
        {
            Some(review) => review,
            None => return Err(self.lost_race(appraisal.id).await),
        };

        tracing::info!(
            user_id = caller.user_id,
            appraisal_id = appraisal.id,
            review_id = review.id,
            self_rating = review.self_rating,
            "Self-review submitted"
        );

        Ok(review)
    }

    /// Record the manager's annotation on the employee's review and move the
    /// appraisal to `pm-review`.
    pub async fn submit_manager_review(
        &self,
        appraisal_id: DbId,
        caller: &Caller,
        input: ManagerReviewRequest,
    ) -> Result<Review, CoreError> {
        if !caller.has_any_role(MANAGER_REVIEW_ROLES) {
            return Err(CoreError::Forbidden(
                "only a manager or admin may submit a manager review".to_string(),
            ));
        }
        let assessment = input.into_validated(caller.user_id)?;
        let appraisal = self.load(appraisal_id).await?;
        ensure_window(&appraisal, MANAGER_REVIEW_WINDOW, "submit a manager review")?;

        let existing = self
            .store
            .find_review_for(appraisal.id, appraisal.employee_id)
            .await?
            .ok_or_else(|| missing_self_review(appraisal.id))?;

        let review = match self
            .store
            .record_manager_review(appraisal.id, existing.id, appraisal.status, &assessment)
            .await?
        {
            Some(review) => review,
            None => return Err(self.lost_race(appraisal.id).await),
        };

        tracing::info!(
            user_id = caller.user_id,
            appraisal_id = appraisal.id,
            review_id = review.id,
            manager_rating = assessment.manager_rating,
            "Manager review submitted"
        );

        Ok(review)
    }

    /// Set the overall rating and close the appraisal.
    pub async fn finalize_appraisal(
        &self,
        appraisal_id: DbId,
        caller: &Caller,
        input: FinalizeRequest,
    ) -> Result<Appraisal, CoreError> {
        if !caller.has_any_role(FINALIZE_ROLES) {
            return Err(CoreError::Forbidden(
                "only HR or an admin may finalize an appraisal".to_string(),
            ));
        }
        let finalization = input.into_validated()?;
        let appraisal = self.load(appraisal_id).await?;
        ensure_window(&appraisal, FINALIZE_WINDOW, "finalize")?;

        let updated = match self
            .store
            .finalize_appraisal(appraisal.id, appraisal.status, finalization.overall_rating)
            .await?
        {
            Some(updated) => updated,
            None => return Err(self.lost_race(appraisal.id).await),
        };

        tracing::info!(
            user_id = caller.user_id,
            appraisal_id = updated.id,
            overall_rating = finalization.overall_rating,
            comments = ?finalization.comments,
            "Appraisal finalized"
        );

        Ok(updated)
    }

    /// Move the appraisal to an explicitly named status.
    ///
    /// Runs the authorizer's edge check only; no review is written.
    pub async fn update_status(
        &self,
        appraisal_id: DbId,
        caller: &Caller,
        requested: &str,
    ) -> Result<Appraisal, CoreError> {
        let requested: AppraisalStatus = requested.parse()?;
        let appraisal = self.load(appraisal_id).await?;

        let grant = self
            .authorizer
            .decide(appraisal.status, requested, caller, appraisal.employee_id)
            .into_result()?;
        if grant == Grant::AdminOverride {
            tracing::warn!(
                user_id = caller.user_id,
                appraisal_id = appraisal.id,
                from = %appraisal.status,
                to = %requested,
                "Admin override applied to status transition"
            );
        }

        let updated = self.advance(&appraisal, requested).await?;

        tracing::info!(
            user_id = caller.user_id,
            appraisal_id = updated.id,
            from = %appraisal.status,
            to = %updated.status,
            "Appraisal status updated"
        );

        Ok(updated)
    }

    /// Statuses the caller could move this appraisal to right now.
    pub async fn permitted_transitions(
        &self,
        appraisal_id: DbId,
        caller: &Caller,
    ) -> Result<Vec<AppraisalStatus>, CoreError> {
        let appraisal = self.load(appraisal_id).await?;
        ensure_can_view_appraisal(caller, &appraisal)?;
        Ok(self
            .authorizer
            .permitted_targets(appraisal.status, caller, appraisal.employee_id))
    }

    async fn load(&self, appraisal_id: DbId) -> Result<Appraisal, CoreError> {
        self.store
            .find_appraisal(appraisal_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Appraisal",
                id: appraisal_id,
            })
    }

    /// Compare-and-set the status from what was loaded to `next`.
    async fn advance(
        &self,
        appraisal: &Appraisal,
        next: AppraisalStatus,
    ) -> Result<Appraisal, CoreError> {
        match self
            .store
            .transition_status(appraisal.id, appraisal.status, next)
            .await?
        {
            Some(updated) => Ok(updated),
            None => Err(self.lost_race(appraisal.id).await),
        }
    }

    /// Explain a compare-and-set write that matched no row.
    async fn lost_race(&self, appraisal_id: DbId) -> CoreError {
        match self.store.find_appraisal(appraisal_id).await {
            Ok(Some(current)) => {
                tracing::warn!(
                    appraisal_id,
                    status = %current.status,
                    "Status write lost a concurrent update"
                );
                CoreError::Conflict(format!(
                    "appraisal {appraisal_id} changed status concurrently (now '{}')",
                    current.status
                ))
            }
            Ok(None) => CoreError::NotFound {
                entity: "Appraisal",
                id: appraisal_id,
            },
            Err(err) => err,
        }
    }
}

fn ensure_window(
    appraisal: &Appraisal,
    window: &[AppraisalStatus],
    action: &str,
) -> Result<(), CoreError> {
    if window.contains(&appraisal.status) {
        return Ok(());
    }
    let allowed: Vec<&str> = window.iter().map(|s| s.as_str()).collect();
    Err(CoreError::InvalidState(format!(
        "cannot {action} while appraisal is '{}' (allowed in: {})",
        appraisal.status,
        allowed.join(", ")
    )))
}
