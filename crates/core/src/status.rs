//! Appraisal lifecycle status.
//!
//! Each variant's discriminant matches the seed order (1-based) of the
//! `appraisal_statuses` lookup table, which is also the order of the
//! lifecycle chain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppraisalStatus {
    Pending = 1,
    SelfReview = 2,
    PmReview = 3,
    HrReview = 4,
    Completed = 5,
}

impl AppraisalStatus {
    /// Every status, in chain order.
    pub const ALL: [AppraisalStatus; 5] = [
        Self::Pending,
        Self::SelfReview,
        Self::PmReview,
        Self::HrReview,
        Self::Completed,
    ];

    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Resolve a database status ID.
    pub fn from_id(id: StatusId) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::SelfReview => "self-review",
            Self::PmReview => "pm-review",
            Self::HrReview => "hr-review",
            Self::Completed => "completed",
        }
    }

    /// The single status that follows this one on the chain.
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::SelfReview),
            Self::SelfReview => Some(Self::PmReview),
            Self::PmReview => Some(Self::HrReview),
            Self::HrReview => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.successor().is_none()
    }
}

impl fmt::Display for AppraisalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppraisalStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::InvalidArgument(format!(
                    "Invalid status '{s}'. Must be one of: {}",
                    Self::ALL.map(AppraisalStatus::as_str).join(", ")
                ))
            })
    }
}

impl From<AppraisalStatus> for StatusId {
    fn from(value: AppraisalStatus) -> Self {
        value.id()
    }
}
