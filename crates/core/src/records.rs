//! Appraisal CRUD and read paths outside the lifecycle.
//!
//! Creating, editing and deleting appraisals never touches `status`; the
//! lifecycle engine owns that column. Reads apply [`crate::visibility`].

use std::sync::Arc;

use crate::appraisal::{Appraisal, CreateAppraisal, UpdateAppraisal};
use crate::error::CoreError;
use crate::review::Review;
use crate::roles::{Caller, Role};
use crate::store::{AppraisalListParams, AppraisalStore, ReviewListParams};
use crate::types::DbId;
use crate::visibility::{
    ensure_can_view_appraisal, ensure_can_view_review, scope_filter, scope_review_filter,
};

const CREATE_ROLES: &[Role] = &[Role::Admin, Role::Hr, Role::Manager];
const EDIT_ROLES: &[Role] = &[Role::Admin, Role::Hr];

pub struct AppraisalRecords {
    store: Arc<dyn AppraisalStore>,
}

impl AppraisalRecords {
    pub fn new(store: Arc<dyn AppraisalStore>) -> Self {
        Self { store }
    }

    /// Open a new appraisal in `pending` for an existing employee.
    pub async fn create(
        &self,
        caller: &Caller,
        input: CreateAppraisal,
    ) -> Result<Appraisal, CoreError> {
        if !caller.has_any_role(CREATE_ROLES) {
            return Err(CoreError::Forbidden(
                "only HR, a manager or an admin may create appraisals".to_string(),
            ));
        }
        let input = input.into_validated()?;
        if !self.store.employee_exists(input.employee_id).await? {
            return Err(CoreError::NotFound {
                entity: "User",
                id: input.employee_id,
            });
        }

        let appraisal = self.store.create_appraisal(&input).await?;

        tracing::info!(
            user_id = caller.user_id,
            appraisal_id = appraisal.id,
            employee_id = appraisal.employee_id,
            appraisal_cycle = %appraisal.appraisal_cycle,
            "Appraisal created"
        );

        Ok(appraisal)
    }

    pub async fn get(&self, caller: &Caller, id: DbId) -> Result<Appraisal, CoreError> {
        let appraisal = self.load(id).await?;
        ensure_can_view_appraisal(caller, &appraisal)?;
        Ok(appraisal)
    }

    /// List appraisals, newest first, narrowed to what the caller may see.
    pub async fn list(
        &self,
        caller: &Caller,
        params: AppraisalListParams,
    ) -> Result<Vec<Appraisal>, CoreError> {
        let filter = scope_filter(caller, params.into_filter()?);
        self.store.list_appraisals(&filter).await
    }

    /// Edit the cycle label or dates. HR and admins only.
    pub async fn update_details(
        &self,
        caller: &Caller,
        id: DbId,
        input: UpdateAppraisal,
    ) -> Result<Appraisal, CoreError> {
        if !caller.has_any_role(EDIT_ROLES) {
            return Err(CoreError::Forbidden(
                "only HR or an admin may edit appraisal details".to_string(),
            ));
        }
        let current = self.load(id).await?;
        let details = input.merge_into(&current)?;

        let updated = self
            .store
            .update_appraisal_details(id, &details)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Appraisal",
                id,
            })?;

        tracing::info!(user_id = caller.user_id, appraisal_id = id, "Appraisal details updated");

        Ok(updated)
    }

    /// Delete an appraisal together with its reviews. Admins only.
    pub async fn delete(&self, caller: &Caller, id: DbId) -> Result<(), CoreError> {
        if !caller.is_admin() {
            return Err(CoreError::Forbidden(
                "only an admin may delete appraisals".to_string(),
            ));
        }
        if !self.store.delete_appraisal(id).await? {
            return Err(CoreError::NotFound {
                entity: "Appraisal",
                id,
            });
        }

        tracing::info!(user_id = caller.user_id, appraisal_id = id, "Appraisal deleted");
        Ok(())
    }

    /// The appraised employee's review for an appraisal.
    pub async fn review_for_appraisal(
        &self,
        caller: &Caller,
        appraisal_id: DbId,
    ) -> Result<Review, CoreError> {
        let appraisal = self.get(caller, appraisal_id).await?;
        self.store
            .find_review_for(appraisal.id, appraisal.employee_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Review",
                id: appraisal_id,
            })
    }

    pub async fn get_review(&self, caller: &Caller, review_id: DbId) -> Result<Review, CoreError> {
        let review = self
            .store
            .find_review(review_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Review",
                id: review_id,
            })?;
        ensure_can_view_review(caller, review.employee_id)?;
        Ok(review)
    }

    /// List reviews, newest first. Employees only ever see their own.
    pub async fn list_reviews(
        &self,
        caller: &Caller,
        params: ReviewListParams,
    ) -> Result<Vec<Review>, CoreError> {
        let filter = scope_review_filter(caller, params.into());
        self.store.list_reviews(&filter).await
    }

    async fn load(&self, id: DbId) -> Result<Appraisal, CoreError> {
        self.store.find_appraisal(id).await?.ok_or(CoreError::NotFound {
            entity: "Appraisal",
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::memory::InMemoryStore;
    use crate::review::SelfAssessment;
    use crate::status::AppraisalStatus;
    use crate::types::Date;

    const EMPLOYEE: DbId = 5;
    const PEER: DbId = 6;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_input(employee_id: DbId, cycle: &str) -> CreateAppraisal {
        CreateAppraisal {
            employee_id,
            appraisal_cycle: cycle.into(),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 3, 31),
        }
    }

    async fn records() -> (Arc<InMemoryStore>, AppraisalRecords) {
        let store = Arc::new(InMemoryStore::new());
        store.add_employees(&[EMPLOYEE, PEER]).await;
        (store.clone(), AppraisalRecords::new(store))
    }

    fn hr() -> Caller {
        Caller::with_role(1, Role::Hr)
    }

    async fn seed_review(store: &InMemoryStore, appraisal_id: DbId, employee_id: DbId) -> Review {
        store
            .record_self_review(
                appraisal_id,
                employee_id,
                AppraisalStatus::Pending,
                &SelfAssessment {
                    strengths: "a".into(),
                    improvements: "b".into(),
                    achievements: "c".into(),
                    challenges: "d".into(),
                    self_rating: 3,
                },
            )
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn create_starts_pending() {
        let (_, records) = records().await;
        let created = records
            .create(&hr(), create_input(EMPLOYEE, "2024-Q1"))
            .await
            .unwrap();
        assert_eq!(created.status, AppraisalStatus::Pending);
        assert_eq!(created.overall_rating, None);
    }

    #[tokio::test]
    async fn create_rejects_employees_unknown_users_and_duplicates() {
        let (_, records) = records().await;

        assert_matches!(
            records
                .create(&Caller::with_role(EMPLOYEE, Role::Employee), create_input(EMPLOYEE, "2024-Q1"))
                .await,
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            records.create(&hr(), create_input(404, "2024-Q1")).await,
            Err(CoreError::NotFound { entity: "User", id: 404 })
        );

        records.create(&hr(), create_input(EMPLOYEE, "2024-Q1")).await.unwrap();
        assert_matches!(
            records.create(&hr(), create_input(EMPLOYEE, "2024-Q1")).await,
            Err(CoreError::Conflict(_))
        );
        records.create(&hr(), create_input(PEER, "2024-Q1")).await.unwrap();
    }

    #[tokio::test]
    async fn employees_only_see_their_own_appraisals() {
        let (_, records) = records().await;
        let mine = records.create(&hr(), create_input(EMPLOYEE, "2024-Q1")).await.unwrap();
        let theirs = records.create(&hr(), create_input(PEER, "2024-Q1")).await.unwrap();
        let me = Caller::with_role(EMPLOYEE, Role::Employee);

        assert!(records.get(&me, mine.id).await.is_ok());
        assert_matches!(records.get(&me, theirs.id).await, Err(CoreError::Forbidden(_)));

        let listed = records
            .list(
                &me,
                AppraisalListParams {
                    employee_id: Some(PEER),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(listed.iter().map(|a| a.id).collect::<Vec<_>>(), vec![mine.id]);

        let all = records.list(&hr(), AppraisalListParams::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn update_details_is_restricted_and_keeps_status() {
        let (store, records) = records().await;
        let created = records.create(&hr(), create_input(EMPLOYEE, "2024-Q1")).await.unwrap();
        store.force_status(created.id, AppraisalStatus::PmReview).await;

        let edit = UpdateAppraisal {
            appraisal_cycle: Some("2024-H1".into()),
            end_date: Some(date(2024, 6, 30)),
            ..Default::default()
        };
        assert_matches!(
            records
                .update_details(&Caller::with_role(2, Role::Manager), created.id, edit.clone())
                .await,
            Err(CoreError::Forbidden(_))
        );

        let updated = records.update_details(&hr(), created.id, edit).await.unwrap();
        assert_eq!(updated.appraisal_cycle, "2024-H1");
        assert_eq!(updated.status, AppraisalStatus::PmReview);
    }

    #[tokio::test]
    async fn delete_is_admin_only_and_cascades() {
        let (store, records) = records().await;
        let created = records.create(&hr(), create_input(EMPLOYEE, "2024-Q1")).await.unwrap();
        seed_review(&store, created.id, EMPLOYEE).await;

        assert_matches!(records.delete(&hr(), created.id).await, Err(CoreError::Forbidden(_)));
        let admin = Caller::with_role(1, Role::Admin);
        records.delete(&admin, created.id).await.unwrap();
        assert_eq!(store.review_count().await, 0);
        assert_matches!(
            records.delete(&admin, created.id).await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn reviews_are_visible_to_owner_and_privileged_roles() {
        let (store, records) = records().await;
        let created = records.create(&hr(), create_input(EMPLOYEE, "2024-Q1")).await.unwrap();

        assert_matches!(
            records.review_for_appraisal(&hr(), created.id).await,
            Err(CoreError::NotFound { entity: "Review", .. })
        );

        let review = seed_review(&store, created.id, EMPLOYEE).await;

        let owner = Caller::with_role(EMPLOYEE, Role::Employee);
        assert_eq!(records.get_review(&owner, review.id).await.unwrap().id, review.id);
        assert_eq!(
            records.review_for_appraisal(&Caller::with_role(2, Role::Manager), created.id)
                .await
                .unwrap()
                .id,
            review.id
        );
        assert_matches!(
            records
                .get_review(&Caller::with_role(PEER, Role::Employee), review.id)
                .await,
            Err(CoreError::Forbidden(_))
        );
    }

    #[tokio::test]
    async fn review_listing_is_scoped_to_the_caller() {
        let (store, records) = records().await;
        let mine = records.create(&hr(), create_input(EMPLOYEE, "2024-Q1")).await.unwrap();
        let theirs = records.create(&hr(), create_input(PEER, "2024-Q1")).await.unwrap();
        let my_review = seed_review(&store, mine.id, EMPLOYEE).await;
        let their_review = seed_review(&store, theirs.id, PEER).await;

        let me = Caller::with_role(EMPLOYEE, Role::Employee);
        let listed = records
            .list_reviews(
                &me,
                ReviewListParams {
                    employee_id: Some(PEER),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(listed.iter().map(|r| r.id).collect::<Vec<_>>(), vec![my_review.id]);

        let all = records
            .list_reviews(&Caller::with_role(2, Role::Manager), ReviewListParams::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let one = records
            .list_reviews(
                &hr(),
                ReviewListParams {
                    appraisal_id: Some(theirs.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(one.iter().map(|r| r.id).collect::<Vec<_>>(), vec![their_review.id]);

        let page = records
            .list_reviews(
                &hr(),
                ReviewListParams {
                    limit: Some(1),
                    offset: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
    }
}
