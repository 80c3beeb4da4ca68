//! Repository for the `reviews` table.

use appraise_core::review::{ManagerAssessment, SelfAssessment};
use appraise_core::status::StatusId;
use appraise_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::review::ReviewRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, appraisal_id, employee_id, strengths, improvements, \
    achievements, challenges, self_rating, manager_id, manager_comments, \
    manager_rating, created_at, updated_at";

/// Filters for [`ReviewRepo::list`]. `None` fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct ReviewListQuery {
    pub employee_id: Option<DbId>,
    pub appraisal_id: Option<DbId>,
    pub limit: i64,
    pub offset: i64,
}

/// Result of a status-guarded review write.
#[derive(Debug)]
pub enum GuardedReviewWrite {
    Written(ReviewRow),
    /// The appraisal was missing or no longer in the expected status.
    StatusChanged,
    /// The review to annotate does not exist for this appraisal.
    ReviewMissing,
}

pub struct ReviewRepo;

impl ReviewRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ReviewRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1");
        sqlx::query_as::<_, ReviewRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_for(
        pool: &PgPool,
        appraisal_id: DbId,
        employee_id: DbId,
    ) -> Result<Option<ReviewRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews WHERE appraisal_id = $1 AND employee_id = $2"
        );
        sqlx::query_as::<_, ReviewRow>(&query)
            .bind(appraisal_id)
            .bind(employee_id)
            .fetch_optional(pool)
            .await
    }

    /// List reviews, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &ReviewListQuery,
    ) -> Result<Vec<ReviewRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews
             WHERE ($1::BIGINT IS NULL OR employee_id = $1)
               AND ($2::BIGINT IS NULL OR appraisal_id = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, ReviewRow>(&query)
            .bind(params.employee_id)
            .bind(params.appraisal_id)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    /// Move the appraisal from `expected` to `next` and upsert the
    /// self-assessment, in one transaction.
    ///
    /// The upsert uses `ON CONFLICT ON CONSTRAINT uq_reviews_appraisal_employee`
    /// so the pair stays unique; manager columns are never touched here.
    pub async fn submit_self_review(
        pool: &PgPool,
        appraisal_id: DbId,
        employee_id: DbId,
        expected: StatusId,
        next: StatusId,
        input: &SelfAssessment,
    ) -> Result<GuardedReviewWrite, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Locks the appraisal row until commit.
        if !guard_status(&mut *tx, appraisal_id, expected, next).await? {
            return Ok(GuardedReviewWrite::StatusChanged);
        }

        let query = format!(
            "INSERT INTO reviews
                (appraisal_id, employee_id, strengths, improvements, achievements, challenges, self_rating)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT ON CONSTRAINT uq_reviews_appraisal_employee
             DO UPDATE SET
                strengths = EXCLUDED.strengths,
                improvements = EXCLUDED.improvements,
                achievements = EXCLUDED.achievements,
                challenges = EXCLUDED.challenges,
                self_rating = EXCLUDED.self_rating
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ReviewRow>(&query)
            .bind(appraisal_id)
            .bind(employee_id)
            .bind(&input.strengths)
            .bind(&input.improvements)
            .bind(&input.achievements)
            .bind(&input.challenges)
            .bind(input.self_rating)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(GuardedReviewWrite::Written(row))
    }

    /// Move the appraisal from `expected` to `next` and write the manager
    /// columns of review `review_id`, in one transaction. Nothing is written
    /// unless both succeed.
    pub async fn submit_manager_review(
        pool: &PgPool,
        appraisal_id: DbId,
        review_id: DbId,
        expected: StatusId,
        next: StatusId,
        input: &ManagerAssessment,
    ) -> Result<GuardedReviewWrite, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !guard_status(&mut *tx, appraisal_id, expected, next).await? {
            return Ok(GuardedReviewWrite::StatusChanged);
        }

        let query = format!(
            "UPDATE reviews
             SET manager_id = $3, manager_comments = $4, manager_rating = $5
             WHERE id = $1 AND appraisal_id = $2
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ReviewRow>(&query)
            .bind(review_id)
            .bind(appraisal_id)
            .bind(input.manager_id)
            .bind(&input.manager_comments)
            .bind(input.manager_rating)
            .fetch_optional(&mut *tx)
            .await?;

        match row {
            Some(row) => {
                tx.commit().await?;
                Ok(GuardedReviewWrite::Written(row))
            }
            // Dropping the transaction rolls back the status change.
            None => Ok(GuardedReviewWrite::ReviewMissing),
        }
    }
}

/// Compare-and-set the appraisal status inside `conn`'s transaction.
async fn guard_status(
    conn: &mut PgConnection,
    appraisal_id: DbId,
    expected: StatusId,
    next: StatusId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE appraisals SET status_id = $3 WHERE id = $1 AND status_id = $2")
        .bind(appraisal_id)
        .bind(expected)
        .bind(next)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
