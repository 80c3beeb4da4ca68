use appraise_core::review::Review;
use appraise_core::types::{DbId, Rating, Timestamp};
use sqlx::FromRow;

/// A row from the `reviews` table.
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    pub id: DbId,
    pub appraisal_id: DbId,
    pub employee_id: DbId,
    pub strengths: String,
    pub improvements: String,
    pub achievements: String,
    pub challenges: String,
    pub self_rating: Rating,
    pub manager_id: Option<DbId>,
    pub manager_comments: Option<String>,
    pub manager_rating: Option<Rating>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            appraisal_id: row.appraisal_id,
            employee_id: row.employee_id,
            strengths: row.strengths,
            improvements: row.improvements,
            achievements: row.achievements,
            challenges: row.challenges,
            self_rating: row.self_rating,
            manager_id: row.manager_id,
            manager_comments: row.manager_comments,
            manager_rating: row.manager_rating,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
