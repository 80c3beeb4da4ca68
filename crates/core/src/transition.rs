//! Transition authorizer for the appraisal lifecycle.
//!
//! [`TransitionAuthorizer::decide`] is a pure function of the current status,
//! the requested status, the caller and the appraisal's owner. Non-admin
//! callers may only walk the linear chain, one edge at a time, and each edge
//! has exactly one kind of caller allowed to take it:
//!
//! ```text
//! pending      -> self-review   the owning employee
//! self-review  -> pm-review     manager
//! pm-review    -> hr-review     hr
//! hr-review    -> completed     hr
//! ```
//!
//! The admin override is a separate capability, checked once before the edge
//! table is consulted. It can be switched off through configuration without
//! touching the table.

use crate::error::CoreError;
use crate::roles::{Caller, Role};
use crate::status::AppraisalStatus;
use crate::types::DbId;

pub const DENY_NOT_OWNER: &str = "only the owning employee may submit self-review";
pub const DENY_NOT_MANAGER: &str = "only a manager may advance to PM review";
pub const DENY_NOT_HR_REVIEW: &str = "only HR may advance to HR review";
pub const DENY_NOT_HR_COMPLETE: &str = "only HR may complete the appraisal";
pub const DENY_TERMINAL: &str = "appraisal is completed; no further transitions are permitted";
pub const DENY_UNRECOGNIZED_ROLE: &str = "caller role is not recognized";

/// Why a transition was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// The transition is an edge of the chain and the caller may take it.
    Edge,
    /// The caller is an admin and the override capability is enabled.
    AdminOverride,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionDecision {
    Allow(Grant),
    Deny(String),
}

impl TransitionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    /// Convert a denial into [`CoreError::Forbidden`] carrying the reason verbatim.
    pub fn into_result(self) -> Result<Grant, CoreError> {
        match self {
            Self::Allow(grant) => Ok(grant),
            Self::Deny(reason) => Err(CoreError::Forbidden(reason)),
        }
    }
}

/// Who may take a given edge.
enum EdgeGate {
    Owner,
    Role(Role, &'static str),
}

/// Look up the gate for `current -> requested`, or `None` if it is not an edge.
fn edge_gate(current: AppraisalStatus, requested: AppraisalStatus) -> Option<EdgeGate> {
    use AppraisalStatus::*;

    match (current, requested) {
        (Pending, SelfReview) => Some(EdgeGate::Owner),
        (SelfReview, PmReview) => Some(EdgeGate::Role(Role::Manager, DENY_NOT_MANAGER)),
        (PmReview, HrReview) => Some(EdgeGate::Role(Role::Hr, DENY_NOT_HR_REVIEW)),
        (HrReview, Completed) => Some(EdgeGate::Role(Role::Hr, DENY_NOT_HR_COMPLETE)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TransitionAuthorizer {
    admin_override: bool,
}

impl Default for TransitionAuthorizer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TransitionAuthorizer {
    pub fn new(admin_override: bool) -> Self {
        Self { admin_override }
    }

    pub fn admin_override_enabled(&self) -> bool {
        self.admin_override
    }

    pub fn decide(
        &self,
        current: AppraisalStatus,
        requested: AppraisalStatus,
        caller: &Caller,
        employee_id: DbId,
    ) -> TransitionDecision {
        if self.admin_override && caller.is_admin() {
            return TransitionDecision::Allow(Grant::AdminOverride);
        }

        if caller.role.is_none() {
            return TransitionDecision::Deny(DENY_UNRECOGNIZED_ROLE.to_string());
        }

        let Some(gate) = edge_gate(current, requested) else {
            if current.is_terminal() {
                return TransitionDecision::Deny(DENY_TERMINAL.to_string());
            }
            return TransitionDecision::Deny(format!(
                "transition from '{current}' to '{requested}' is not permitted"
            ));
        };

        match gate {
            EdgeGate::Owner if caller.user_id == employee_id => {
                TransitionDecision::Allow(Grant::Edge)
            }
            EdgeGate::Owner => TransitionDecision::Deny(DENY_NOT_OWNER.to_string()),
            EdgeGate::Role(role, _) if caller.role == Some(role) => {
                TransitionDecision::Allow(Grant::Edge)
            }
            EdgeGate::Role(_, reason) => TransitionDecision::Deny(reason.to_string()),
        }
    }

    /// Every status other than `current` that `caller` may move the appraisal to.
    pub fn permitted_targets(
        &self,
        current: AppraisalStatus,
        caller: &Caller,
        employee_id: DbId,
    ) -> Vec<AppraisalStatus> {
        AppraisalStatus::ALL
            .into_iter()
            .filter(|&target| target != current)
            .filter(|&target| self.decide(current, target, caller, employee_id).is_allowed())
            .collect()
    }
}
