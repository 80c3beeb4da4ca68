//! Repository for the `appraisals` table.
//!
//! Status writes are compare-and-set on `status_id`: they return `None` when
//! the row is missing or no longer in the expected status.

use appraise_core::appraisal::{AppraisalDetails, NewAppraisal};
use appraise_core::status::StatusId;
use appraise_core::types::{DbId, Rating};
use sqlx::PgPool;

use crate::models::appraisal::AppraisalRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, employee_id, appraisal_cycle, start_date, end_date, \
    overall_rating, status_id, created_at, updated_at";

/// Filters for [`AppraisalRepo::list`]. `None` fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct AppraisalListQuery<'a> {
    pub employee_id: Option<DbId>,
    pub status_id: Option<StatusId>,
    pub appraisal_cycle: Option<&'a str>,
    pub limit: i64,
    pub offset: i64,
}

pub struct AppraisalRepo;

impl AppraisalRepo {
    /// Insert a new appraisal. `status_id` takes the column default (pending).
    pub async fn create(pool: &PgPool, input: &NewAppraisal) -> Result<AppraisalRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO appraisals (employee_id, appraisal_cycle, start_date, end_date)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppraisalRow>(&query)
            .bind(input.employee_id)
            .bind(&input.appraisal_cycle)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AppraisalRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM appraisals WHERE id = $1");
        sqlx::query_as::<_, AppraisalRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List appraisals, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &AppraisalListQuery<'_>,
    ) -> Result<Vec<AppraisalRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appraisals
             WHERE ($1::BIGINT IS NULL OR employee_id = $1)
               AND ($2::SMALLINT IS NULL OR status_id = $2)
               AND ($3::TEXT IS NULL OR appraisal_cycle = $3)
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, AppraisalRow>(&query)
            .bind(params.employee_id)
            .bind(params.status_id)
            .bind(params.appraisal_cycle)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    /// Overwrite the cycle label and period. Leaves `status_id` alone.
    pub async fn update_details(
        pool: &PgPool,
        id: DbId,
        details: &AppraisalDetails,
    ) -> Result<Option<AppraisalRow>, sqlx::Error> {
        let query = format!(
            "UPDATE appraisals
             SET appraisal_cycle = $2, start_date = $3, end_date = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppraisalRow>(&query)
            .bind(id)
            .bind(&details.appraisal_cycle)
            .bind(details.start_date)
            .bind(details.end_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete an appraisal; its reviews go with it via `ON DELETE CASCADE`.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM appraisals WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn transition_status(
        pool: &PgPool,
        id: DbId,
        expected: StatusId,
        next: StatusId,
    ) -> Result<Option<AppraisalRow>, sqlx::Error> {
        let query = format!(
            "UPDATE appraisals SET status_id = $3
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppraisalRow>(&query)
            .bind(id)
            .bind(expected)
            .bind(next)
            .fetch_optional(pool)
            .await
    }

    /// Set `overall_rating` and move to `completed` in a single guarded write.
    pub async fn finalize(
        pool: &PgPool,
        id: DbId,
        expected: StatusId,
        completed: StatusId,
        overall_rating: Rating,
    ) -> Result<Option<AppraisalRow>, sqlx::Error> {
        let query = format!(
            "UPDATE appraisals SET status_id = $3, overall_rating = $4
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppraisalRow>(&query)
            .bind(id)
            .bind(expected)
            .bind(completed)
            .bind(overall_rating)
            .fetch_optional(pool)
            .await
    }
}
