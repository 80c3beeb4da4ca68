//! Appraisal entity and the request payloads that create or edit one.
//!
//! `status` is deliberately absent from every payload here: status changes go
//! through [`crate::lifecycle::LifecycleEngine`] only.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::status::AppraisalStatus;
use crate::types::{Date, DbId, Rating, Timestamp};
use crate::validation::{
    normalize_optional_text, not_blank, validate_payload, validate_period,
};

/// One appraisal of one employee within one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Appraisal {
    pub id: DbId,
    pub employee_id: DbId,
    pub appraisal_cycle: String,
    pub start_date: Date,
    pub end_date: Date,
    pub overall_rating: Option<Rating>,
    pub status: AppraisalStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for creating an appraisal.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAppraisal {
    pub employee_id: DbId,
    #[validate(custom(function = "not_blank"), length(max = 64))]
    pub appraisal_cycle: String,
    pub start_date: Date,
    pub end_date: Date,
}

/// A validated, normalized appraisal ready to be inserted in `pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppraisal {
    pub employee_id: DbId,
    pub appraisal_cycle: String,
    pub start_date: Date,
    pub end_date: Date,
}

impl CreateAppraisal {
    pub fn into_validated(self) -> Result<NewAppraisal, CoreError> {
        validate_payload(&self)?;
        validate_period(self.start_date, self.end_date)?;
        Ok(NewAppraisal {
            employee_id: self.employee_id,
            appraisal_cycle: self.appraisal_cycle.trim().to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

/// Request body for editing an appraisal's descriptive fields.
///
/// Unknown fields (including `status` and `overall_rating`) are rejected at
/// deserialization.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateAppraisal {
    #[validate(length(max = 64))]
    pub appraisal_cycle: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

/// The full set of descriptive fields after an edit has been merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppraisalDetails {
    pub appraisal_cycle: String,
    pub start_date: Date,
    pub end_date: Date,
}

impl UpdateAppraisal {
    /// Merge this edit over `current`, validating the resulting period.
    pub fn merge_into(self, current: &Appraisal) -> Result<AppraisalDetails, CoreError> {
        validate_payload(&self)?;
        if self
            .appraisal_cycle
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            return Err(CoreError::Validation(
                "appraisal_cycle: must not be blank".to_string(),
            ));
        }

        let details = AppraisalDetails {
            appraisal_cycle: normalize_optional_text(self.appraisal_cycle)
                .unwrap_or_else(|| current.appraisal_cycle.clone()),
            start_date: self.start_date.unwrap_or(current.start_date),
            end_date: self.end_date.unwrap_or(current.end_date),
        };
        validate_period(details.start_date, details.end_date)?;
        Ok(details)
    }
}

/// Request body for `PUT /appraisals/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Request body for finalizing an appraisal.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FinalizeRequest {
    #[validate(required, range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub overall_rating: Option<Rating>,
    /// Accepted for compatibility with existing clients; not stored.
    #[validate(length(max = 10000))]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalization {
    pub overall_rating: Rating,
    pub comments: Option<String>,
}

impl FinalizeRequest {
    pub fn into_validated(self) -> Result<Finalization, CoreError> {
        validate_payload(&self)?;
        let overall_rating = self
            .overall_rating
            .ok_or_else(|| CoreError::Validation("overall_rating: required".to_string()))?;
        Ok(Finalization {
            overall_rating,
            comments: normalize_optional_text(self.comments),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn existing() -> Appraisal {
        Appraisal {
            id: 1,
            employee_id: 2,
            appraisal_cycle: "2024-Q1".into(),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 3, 31),
            overall_rating: None,
            status: AppraisalStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_trims_cycle_label() {
        let input = CreateAppraisal {
            employee_id: 5,
            appraisal_cycle: "  2024-Q2 ".into(),
            start_date: date(2024, 4, 1),
            end_date: date(2024, 6, 30),
        };
        let new = input.into_validated().unwrap();
        assert_eq!(new.appraisal_cycle, "2024-Q2");
        assert_eq!(new.employee_id, 5);
    }

    #[test]
    fn create_rejects_blank_cycle_and_inverted_period() {
        let blank = CreateAppraisal {
            employee_id: 5,
            appraisal_cycle: " ".into(),
            start_date: date(2024, 4, 1),
            end_date: date(2024, 6, 30),
        };
        assert_matches!(blank.into_validated(), Err(CoreError::Validation(_)));

        let inverted = CreateAppraisal {
            employee_id: 5,
            appraisal_cycle: "2024-Q2".into(),
            start_date: date(2024, 6, 30),
            end_date: date(2024, 4, 1),
        };
        assert_matches!(
            inverted.into_validated(),
            Err(CoreError::Validation(msg)) if msg.starts_with("end_date")
        );
    }

    #[test]
    fn update_merges_only_supplied_fields() {
        let edit = UpdateAppraisal {
            appraisal_cycle: Some("2024-H1".into()),
            end_date: Some(date(2024, 6, 30)),
            ..Default::default()
        };
        let details = edit.merge_into(&existing()).unwrap();
        assert_eq!(details.appraisal_cycle, "2024-H1");
        assert_eq!(details.start_date, date(2024, 1, 1));
        assert_eq!(details.end_date, date(2024, 6, 30));
    }

    #[test]
    fn update_validates_the_merged_period() {
        let edit = UpdateAppraisal {
            start_date: Some(date(2024, 5, 1)),
            ..Default::default()
        };
        assert_matches!(edit.merge_into(&existing()), Err(CoreError::Validation(_)));
    }

    #[test]
    fn update_refuses_status_field() {
        let parsed: Result<UpdateAppraisal, _> =
            serde_json::from_str(r#"{"status": "completed"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn finalize_rating_bounds() {
        for rating in [1, 5] {
            let req = FinalizeRequest {
                overall_rating: Some(rating),
                comments: None,
            };
            assert_eq!(req.into_validated().unwrap().overall_rating, rating);
        }
        for rating in [0, 6] {
            let req = FinalizeRequest {
                overall_rating: Some(rating),
                comments: None,
            };
            assert_matches!(req.into_validated(), Err(CoreError::Validation(_)));
        }
        let missing = FinalizeRequest {
            overall_rating: None,
            comments: Some("great year".into()),
        };
        assert_matches!(missing.into_validated(), Err(CoreError::Validation(_)));
    }
}
