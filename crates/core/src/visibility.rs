//! Read visibility for appraisals and reviews.
//!
//! Admins, HR and managers may read every appraisal and review. Everyone else,
//! including callers whose role was not recognized, sees only records that
//! belong to them.

use crate::appraisal::Appraisal;
use crate::error::CoreError;
use crate::roles::{Caller, Role};
use crate::store::{AppraisalFilter, ReviewFilter};
use crate::types::DbId;

/// Roles that may read records belonging to other employees.
pub const READ_ANY_ROLES: &[Role] = &[Role::Admin, Role::Hr, Role::Manager];

pub fn can_read_any(caller: &Caller) -> bool {
    caller.has_any_role(READ_ANY_ROLES)
}

/// True when `caller` may read records owned by `owner_id`.
pub fn can_view(caller: &Caller, owner_id: DbId) -> bool {
    can_read_any(caller) || caller.user_id == owner_id
}

pub fn ensure_can_view_appraisal(caller: &Caller, appraisal: &Appraisal) -> Result<(), CoreError> {
    if can_view(caller, appraisal.employee_id) {
        return Ok(());
    }
    Err(CoreError::Forbidden(
        "employees may only view their own appraisals".to_string(),
    ))
}

pub fn ensure_can_view_review(caller: &Caller, review_owner: DbId) -> Result<(), CoreError> {
    if can_view(caller, review_owner) {
        return Ok(());
    }
    Err(CoreError::Forbidden(
        "employees may only view their own reviews".to_string(),
    ))
}

/// Narrow a list filter to what `caller` may see.
///
/// Restricted callers always get their own appraisals, whatever
/// `employee_id` they asked for.
pub fn scope_filter(caller: &Caller, mut filter: AppraisalFilter) -> AppraisalFilter {
    if !can_read_any(caller) {
        filter.employee_id = Some(caller.user_id);
    }
    filter
}

/// Narrow a review filter the same way [`scope_filter`] narrows appraisals.
pub fn scope_review_filter(caller: &Caller, mut filter: ReviewFilter) -> ReviewFilter {
    if !can_read_any(caller) {
        filter.employee_id = Some(caller.user_id);
    }
    filter
}
