//! In-memory [`AppraisalStore`] for tests.
//!
//! Mirrors the PostgreSQL store's observable behaviour: BIGSERIAL-style ids,
//! the `(employee_id, appraisal_cycle)` and `(appraisal_id, employee_id)`
//! uniqueness rules, cascade delete of reviews, and compare-and-set status
//! writes. Every method holds one lock for its whole body, so a review
//! submission's status check and writes are atomic.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::appraisal::{Appraisal, AppraisalDetails, NewAppraisal};
use crate::error::CoreError;
use crate::review::{missing_self_review, ManagerAssessment, Review, SelfAssessment};
use crate::status::AppraisalStatus;
use crate::store::{AppraisalFilter, AppraisalStore, ReviewFilter};
use crate::types::{DbId, Rating};

#[derive(Default)]
struct Tables {
    employees: BTreeSet<DbId>,
    appraisals: BTreeMap<DbId, Appraisal>,
    reviews: BTreeMap<DbId, Review>,
    next_appraisal_id: DbId,
    next_review_id: DbId,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register user ids that appraisals may reference.
    pub async fn add_employees(&self, ids: &[DbId]) {
        self.tables.lock().await.employees.extend(ids.iter().copied());
    }

    /// Force an appraisal into `status`, bypassing the lifecycle. Test seeding only.
    pub async fn force_status(&self, id: DbId, status: AppraisalStatus) {
        if let Some(appraisal) = self.tables.lock().await.appraisals.get_mut(&id) {
            appraisal.status = status;
        }
    }

    /// Drop a review row without touching its appraisal. Test seeding only.
    pub async fn remove_review(&self, id: DbId) -> bool {
        self.tables.lock().await.reviews.remove(&id).is_some()
    }

    pub async fn review_count(&self) -> usize {
        self.tables.lock().await.reviews.len()
    }
}

#[async_trait]
impl AppraisalStore for InMemoryStore {
    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }

    async fn employee_exists(&self, employee_id: DbId) -> Result<bool, CoreError> {
        Ok(self.tables.lock().await.employees.contains(&employee_id))
    }

    async fn create_appraisal(&self, input: &NewAppraisal) -> Result<Appraisal, CoreError> {
        let mut tables = self.tables.lock().await;
        let duplicate = tables.appraisals.values().any(|a| {
            a.employee_id == input.employee_id && a.appraisal_cycle == input.appraisal_cycle
        });
        if duplicate {
            return Err(CoreError::Conflict(
                "Duplicate value violates unique constraint: uq_appraisals_employee_cycle"
                    .to_string(),
            ));
        }

        tables.next_appraisal_id += 1;
        let now = Utc::now();
        let appraisal = Appraisal {
            id: tables.next_appraisal_id,
            employee_id: input.employee_id,
            appraisal_cycle: input.appraisal_cycle.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
            overall_rating: None,
            status: AppraisalStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        tables.appraisals.insert(appraisal.id, appraisal.clone());
        Ok(appraisal)
    }

    async fn find_appraisal(&self, id: DbId) -> Result<Option<Appraisal>, CoreError> {
        Ok(self.tables.lock().await.appraisals.get(&id).cloned())
    }

    async fn list_appraisals(&self, filter: &AppraisalFilter) -> Result<Vec<Appraisal>, CoreError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Appraisal> = tables
            .appraisals
            .values()
            .filter(|a| filter.employee_id.is_none_or(|id| a.employee_id == id))
            .filter(|a| filter.status.is_none_or(|s| a.status == s))
            .filter(|a| {
                filter
                    .appraisal_cycle
                    .as_deref()
                    .is_none_or(|c| a.appraisal_cycle == c)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn update_appraisal_details(
        &self,
        id: DbId,
        details: &AppraisalDetails,
    ) -> Result<Option<Appraisal>, CoreError> {
        let mut tables = self.tables.lock().await;
        let clash = tables.appraisals.values().any(|a| {
            a.id != id
                && tables.appraisals.get(&id).is_some_and(|me| me.employee_id == a.employee_id)
                && a.appraisal_cycle == details.appraisal_cycle
        });
        if clash {
            return Err(CoreError::Conflict(
                "Duplicate value violates unique constraint: uq_appraisals_employee_cycle"
                    .to_string(),
            ));
        }
        Ok(tables.appraisals.get_mut(&id).map(|a| {
            a.appraisal_cycle = details.appraisal_cycle.clone();
            a.start_date = details.start_date;
            a.end_date = details.end_date;
            a.updated_at = Utc::now();
            a.clone()
        }))
    }

    async fn delete_appraisal(&self, id: DbId) -> Result<bool, CoreError> {
        let mut tables = self.tables.lock().await;
        let removed = tables.appraisals.remove(&id).is_some();
        if removed {
            tables.reviews.retain(|_, r| r.appraisal_id != id);
        }
        Ok(removed)
    }

    async fn transition_status(
        &self,
        id: DbId,
        expected: AppraisalStatus,
        next: AppraisalStatus,
    ) -> Result<Option<Appraisal>, CoreError> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .appraisals
            .get_mut(&id)
            .filter(|a| a.status == expected)
            .map(|a| {
                a.status = next;
                a.updated_at = Utc::now();
                a.clone()
            }))
    }

    async fn finalize_appraisal(
        &self,
        id: DbId,
        expected: AppraisalStatus,
        overall_rating: Rating,
    ) -> Result<Option<Appraisal>, CoreError> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .appraisals
            .get_mut(&id)
            .filter(|a| a.status == expected)
            .map(|a| {
                a.overall_rating = Some(overall_rating);
                a.status = AppraisalStatus::Completed;
                a.updated_at = Utc::now();
                a.clone()
            }))
    }

    async fn find_review(&self, id: DbId) -> Result<Option<Review>, CoreError> {
        Ok(self.tables.lock().await.reviews.get(&id).cloned())
    }

    async fn find_review_for(
        &self,
        appraisal_id: DbId,
        employee_id: DbId,
    ) -> Result<Option<Review>, CoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .reviews
            .values()
            .find(|r| r.appraisal_id == appraisal_id && r.employee_id == employee_id)
            .cloned())
    }

    async fn list_reviews(&self, filter: &ReviewFilter) -> Result<Vec<Review>, CoreError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Review> = tables
            .reviews
            .values()
            .filter(|r| filter.employee_id.is_none_or(|id| r.employee_id == id))
            .filter(|r| filter.appraisal_id.is_none_or(|id| r.appraisal_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn record_self_review(
        &self,
        appraisal_id: DbId,
        employee_id: DbId,
        expected: AppraisalStatus,
        assessment: &SelfAssessment,
    ) -> Result<Option<Review>, CoreError> {
        let mut tables = self.tables.lock().await;
        let Some(appraisal) = tables
            .appraisals
            .get_mut(&appraisal_id)
            .filter(|a| a.status == expected)
        else {
            return Ok(None);
        };
        let now = Utc::now();
        appraisal.status = AppraisalStatus::SelfReview;
        appraisal.updated_at = now;

        if let Some(existing) = tables
            .reviews
            .values_mut()
            .find(|r| r.appraisal_id == appraisal_id && r.employee_id == employee_id)
        {
            existing.strengths = assessment.strengths.clone();
            existing.improvements = assessment.improvements.clone();
            existing.achievements = assessment.achievements.clone();
            existing.challenges = assessment.challenges.clone();
            existing.self_rating = assessment.self_rating;
            existing.updated_at = now;
            return Ok(Some(existing.clone()));
        }

        tables.next_review_id += 1;
        let review = Review {
            id: tables.next_review_id,
            appraisal_id,
            employee_id,
            strengths: assessment.strengths.clone(),
            improvements: assessment.improvements.clone(),
            achievements: assessment.achievements.clone(),
            challenges: assessment.challenges.clone(),
            self_rating: assessment.self_rating,
            manager_id: None,
            manager_comments: None,
            manager_rating: None,
            created_at: now,
            updated_at: now,
        };
        tables.reviews.insert(review.id, review.clone());
        Ok(Some(review))
    }

    async fn record_manager_review(
        &self,
        appraisal_id: DbId,
        review_id: DbId,
        expected: AppraisalStatus,
        assessment: &ManagerAssessment,
    ) -> Result<Option<Review>, CoreError> {
        let mut tables = self.tables.lock().await;
        let status_matches = tables
            .appraisals
            .get(&appraisal_id)
            .is_some_and(|a| a.status == expected);
        if !status_matches {
            return Ok(None);
        }
        let review_exists = tables
            .reviews
            .get(&review_id)
            .is_some_and(|r| r.appraisal_id == appraisal_id);
        if !review_exists {
            return Err(missing_self_review(appraisal_id));
        }

        let now = Utc::now();
        if let Some(appraisal) = tables.appraisals.get_mut(&appraisal_id) {
            appraisal.status = AppraisalStatus::PmReview;
            appraisal.updated_at = now;
        }
        Ok(tables.reviews.get_mut(&review_id).map(|r| {
            r.manager_id = Some(assessment.manager_id);
            r.manager_comments = assessment.manager_comments.clone();
            r.manager_rating = Some(assessment.manager_rating);
            r.updated_at = now;
            r.clone()
        }))
    }
}
