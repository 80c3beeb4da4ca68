//! Review entity (self-assessment plus manager annotation) and its payloads.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{DbId, Rating, Timestamp};
use crate::validation::{normalize_optional_text, not_blank, validate_payload};

/// The review record for one `(appraisal, employee)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
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

/// Request body for `POST /appraisals/{id}/self-review`.
///
/// Missing text fields deserialize as empty strings so they are reported by
/// validation alongside every other failing field.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SelfReviewRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 10000))]
    pub strengths: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 10000))]
    pub improvements: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 10000))]
    pub achievements: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 10000))]
    pub challenges: String,
    #[validate(required, range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub self_rating: Option<Rating>,
}

/// Validated self-assessment content, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfAssessment {
    pub strengths: String,
    pub improvements: String,
    pub achievements: String,
    pub challenges: String,
    pub self_rating: Rating,
}

impl SelfReviewRequest {
    pub fn into_validated(self) -> Result<SelfAssessment, CoreError> {
        validate_payload(&self)?;
        let self_rating = self
            .self_rating
            .ok_or_else(|| CoreError::Validation("self_rating: required".to_string()))?;
        Ok(SelfAssessment {
            strengths: self.strengths.trim().to_string(),
            improvements: self.improvements.trim().to_string(),
            achievements: self.achievements.trim().to_string(),
            challenges: self.challenges.trim().to_string(),
            self_rating,
        })
    }
}

/// Request body for `POST /appraisals/{id}/manager-review`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ManagerReviewRequest {
    #[validate(length(max = 10000))]
    pub manager_comments: Option<String>,
    #[validate(required, range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub manager_rating: Option<Rating>,
}

/// Validated manager annotation, attributed to the annotating manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerAssessment {
    pub manager_id: DbId,
    pub manager_comments: Option<String>,
    pub manager_rating: Rating,
}

impl ManagerReviewRequest {
    pub fn into_validated(self, manager_id: DbId) -> Result<ManagerAssessment, CoreError> {
        validate_payload(&self)?;
        let manager_rating = self
            .manager_rating
            .ok_or_else(|| CoreError::Validation("manager_rating: required".to_string()))?;
        Ok(ManagerAssessment {
            manager_id,
            manager_comments: normalize_optional_text(self.manager_comments),
            manager_rating,
        })
    }
}

/// Error for annotating an appraisal whose employee has not self-reviewed.
pub fn missing_self_review(appraisal_id: DbId) -> CoreError {
    CoreError::PreconditionFailed(format!(
        "no self-review to annotate for appraisal {appraisal_id}"
    ))
}
