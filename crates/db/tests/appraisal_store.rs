//! Repository and store tests against a real database (`DATABASE_URL`).

use appraise_core::appraisal::{AppraisalDetails, NewAppraisal};
use appraise_core::error::CoreError;
use appraise_core::review::{ManagerAssessment, SelfAssessment};
use appraise_core::status::AppraisalStatus;
use appraise_core::store::{AppraisalFilter, AppraisalStore, ReviewFilter};
use appraise_core::types::{Date, DbId};
use appraise_db::repositories::UserRepo;
use appraise_db::PgAppraisalStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn employee(pool: &PgPool, username: &str) -> DbId {
    UserRepo::create(pool, username, "employee").await.unwrap()
}

fn new_appraisal(employee_id: DbId, cycle: &str) -> NewAppraisal {
    NewAppraisal {
        employee_id,
        appraisal_cycle: cycle.to_string(),
        start_date: Date::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: Date::from_ymd_opt(2024, 3, 31).unwrap(),
    }
}

fn assessment(rating: i16) -> SelfAssessment {
    SelfAssessment {
        strengths: "Mentoring".into(),
        improvements: "Saying no".into(),
        achievements: "Cut build times in half".into(),
        challenges: "Legacy CI".into(),
        self_rating: rating,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lookup_tables_are_seeded(pool: PgPool) {
    appraise_db::health_check(&pool).await.unwrap();

    let statuses: Vec<(i16, String)> =
        sqlx::query_as("SELECT id, name FROM appraisal_statuses ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
    for status in AppraisalStatus::ALL {
        assert!(
            statuses.contains(&(status.id(), status.as_str().to_string())),
            "{status} missing from appraisal_statuses"
        );
    }

    let roles: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM roles")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(roles.0, 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_duplicate_cycle(pool: PgPool) {
    let store = PgAppraisalStore::new(pool.clone());
    let alice = employee(&pool, "alice").await;

    assert!(store.employee_exists(alice).await.unwrap());
    assert!(!store.employee_exists(alice + 1000).await.unwrap());

    let created = store.create_appraisal(&new_appraisal(alice, "2024-Q1")).await.unwrap();
    assert_eq!(created.status, AppraisalStatus::Pending);
    assert_eq!(created.overall_rating, None);

    let dup = store.create_appraisal(&new_appraisal(alice, "2024-Q1")).await;
    assert!(matches!(dup, Err(CoreError::Conflict(msg)) if msg.contains("uq_appraisals_employee_cycle")));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_writes_are_compare_and_set(pool: PgPool) {
    let store = PgAppraisalStore::new(pool.clone());
    let alice = employee(&pool, "alice").await;
    let appraisal = store.create_appraisal(&new_appraisal(alice, "2024-Q1")).await.unwrap();

    let moved = store
        .transition_status(appraisal.id, AppraisalStatus::Pending, AppraisalStatus::SelfReview)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.status, AppraisalStatus::SelfReview);

    // Stale expectation: nothing is written.
    let stale = store
        .transition_status(appraisal.id, AppraisalStatus::Pending, AppraisalStatus::PmReview)
        .await
        .unwrap();
    assert!(stale.is_none());

    store
        .transition_status(appraisal.id, AppraisalStatus::SelfReview, AppraisalStatus::HrReview)
        .await
        .unwrap()
        .unwrap();
    let done = store
        .finalize_appraisal(appraisal.id, AppraisalStatus::HrReview, 4)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.status, AppraisalStatus::Completed);
    assert_eq!(done.overall_rating, Some(4));

    let again = store
        .finalize_appraisal(appraisal.id, AppraisalStatus::HrReview, 2)
        .await
        .unwrap();
    assert!(again.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_upsert_keeps_one_row_and_manager_fields(pool: PgPool) {
    let store = PgAppraisalStore::new(pool.clone());
    let alice = employee(&pool, "alice").await;
    let manager = UserRepo::create(&pool, "morgan", "manager").await.unwrap();
    let appraisal = store.create_appraisal(&new_appraisal(alice, "2024-Q1")).await.unwrap();

    let first = store
        .record_self_review(appraisal.id, alice, AppraisalStatus::Pending, &assessment(3))
        .await
        .unwrap()
        .unwrap();
    let annotated = store
        .record_manager_review(
            appraisal.id,
            first.id,
            AppraisalStatus::SelfReview,
            &ManagerAssessment {
                manager_id: manager,
                manager_comments: Some("Steady".into()),
                manager_rating: 4,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(annotated.manager_rating, Some(4));
    let current = store.find_appraisal(appraisal.id).await.unwrap().unwrap();
    assert_eq!(current.status, AppraisalStatus::PmReview);

    // Re-open so the employee may revise; manager fields survive the upsert.
    store
        .transition_status(appraisal.id, AppraisalStatus::PmReview, AppraisalStatus::SelfReview)
        .await
        .unwrap()
        .unwrap();
    let second = store
        .record_self_review(appraisal.id, alice, AppraisalStatus::SelfReview, &assessment(5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.self_rating, 5);
    assert_eq!(second.manager_rating, Some(4));
    assert_eq!(second.manager_id, Some(manager));

    let found = store.find_review_for(appraisal.id, alice).await.unwrap().unwrap();
    assert_eq!(found.id, first.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_writes_are_guarded_by_status(pool: PgPool) {
    let store = PgAppraisalStore::new(pool.clone());
    let alice = employee(&pool, "alice").await;
    let manager = UserRepo::create(&pool, "morgan", "manager").await.unwrap();
    let appraisal = store.create_appraisal(&new_appraisal(alice, "2024-Q1")).await.unwrap();

    // Stale expectation: neither the review nor the status is written.
    let stale = store
        .record_self_review(appraisal.id, alice, AppraisalStatus::SelfReview, &assessment(3))
        .await
        .unwrap();
    assert!(stale.is_none());
    assert!(store.find_review_for(appraisal.id, alice).await.unwrap().is_none());

    let review = store
        .record_self_review(appraisal.id, alice, AppraisalStatus::Pending, &assessment(2))
        .await
        .unwrap()
        .unwrap();

    let annotation = ManagerAssessment {
        manager_id: manager,
        manager_comments: None,
        manager_rating: 4,
    };
    let stale = store
        .record_manager_review(appraisal.id, review.id, AppraisalStatus::PmReview, &annotation)
        .await
        .unwrap();
    assert!(stale.is_none());
    let unchanged = store.find_review(review.id).await.unwrap().unwrap();
    assert_eq!(unchanged.manager_rating, None);

    // A missing review rolls the status change back.
    let missing = store
        .record_manager_review(appraisal.id, review.id + 1000, AppraisalStatus::SelfReview, &annotation)
        .await;
    assert!(matches!(missing, Err(CoreError::PreconditionFailed(_))));
    let current = store.find_appraisal(appraisal.id).await.unwrap().unwrap();
    assert_eq!(current.status, AppraisalStatus::SelfReview);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_update_and_cascade_delete(pool: PgPool) {
    let store = PgAppraisalStore::new(pool.clone());
    let alice = employee(&pool, "alice").await;
    let bob = employee(&pool, "bob").await;

    let a1 = store.create_appraisal(&new_appraisal(alice, "2024-Q1")).await.unwrap();
    let a2 = store.create_appraisal(&new_appraisal(alice, "2024-Q2")).await.unwrap();
    let b1 = store.create_appraisal(&new_appraisal(bob, "2024-Q1")).await.unwrap();

    let alices = store
        .list_appraisals(&AppraisalFilter {
            employee_id: Some(alice),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(alices.len(), 2);

    let q1 = store
        .list_appraisals(&AppraisalFilter {
            appraisal_cycle: Some("2024-Q1".into()),
            status: Some(AppraisalStatus::Pending),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(q1.len(), 2);

    let updated = store
        .update_appraisal_details(
            a1.id,
            &AppraisalDetails {
                appraisal_cycle: "2024-H1".into(),
                start_date: Date::from_ymd_opt(2024, 1, 1).unwrap(),
                end_date: Date::from_ymd_opt(2024, 6, 30).unwrap(),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.appraisal_cycle, "2024-H1");
    assert_eq!(updated.status, AppraisalStatus::Pending);

    let review = store
        .record_self_review(a1.id, alice, AppraisalStatus::Pending, &assessment(3))
        .await
        .unwrap()
        .unwrap();
    store
        .record_self_review(a2.id, alice, AppraisalStatus::Pending, &assessment(4))
        .await
        .unwrap()
        .unwrap();
    store
        .record_self_review(b1.id, bob, AppraisalStatus::Pending, &assessment(5))
        .await
        .unwrap()
        .unwrap();

    let alices_reviews = store
        .list_reviews(&ReviewFilter {
            employee_id: Some(alice),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(alices_reviews.len(), 2);
    let for_a1 = store
        .list_reviews(&ReviewFilter {
            appraisal_id: Some(a1.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(for_a1.iter().map(|r| r.id).collect::<Vec<_>>(), vec![review.id]);

    assert!(store.delete_appraisal(a1.id).await.unwrap());
    assert!(store.find_review(review.id).await.unwrap().is_none());
    assert!(!store.delete_appraisal(a1.id).await.unwrap());
}
