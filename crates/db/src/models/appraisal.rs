use appraise_core::appraisal::Appraisal;
use appraise_core::error::CoreError;
use appraise_core::status::{AppraisalStatus, StatusId};
use appraise_core::types::{Date, DbId, Rating, Timestamp};
use sqlx::FromRow;

/// A row from the `appraisals` table.
#[derive(Debug, Clone, FromRow)]
pub struct AppraisalRow {
    pub id: DbId,
    pub employee_id: DbId,
    pub appraisal_cycle: String,
    pub start_date: Date,
    pub end_date: Date,
    pub overall_rating: Option<Rating>,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<AppraisalRow> for Appraisal {
    type Error = CoreError;

    fn try_from(row: AppraisalRow) -> Result<Self, Self::Error> {
        let status = AppraisalStatus::from_id(row.status_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "appraisal {} has unknown status_id {}",
                row.id, row.status_id
            ))
        })?;
        Ok(Appraisal {
            id: row.id,
            employee_id: row.employee_id,
            appraisal_cycle: row.appraisal_cycle,
            start_date: row.start_date,
            end_date: row.end_date,
            overall_rating: row.overall_rating,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
