//! User directory: maps an external identity to a local user.

use crate::db::UnitOfWork;
use crate::error::AppError;
use crate::models::{ExternalProfile, User};

/// Look up the user for `profile.id`, creating a non-elevated one on first login.
///
/// Two concurrent first logins for the same identity both reach the insert;
/// the unique constraint on `external_id` lets exactly one through and the
/// other re-reads the winner's row. If the insert was skipped but no row has
/// this external id, the email belongs to someone else.
pub async fn find_or_create(
    uow: &mut UnitOfWork,
    profile: &ExternalProfile,
) -> Result<User, AppError> {
    if let Some(user) = uow.find_user_by_external_id(&profile.id).await? {
        return Ok(user);
    }

    if let Some(user) = uow
        .insert_user_if_absent(&profile.id, &profile.name, profile.email.as_deref())
        .await?
    {
        tracing::info!(user_id = user.id, external_id = %user.external_id, "Created user");
        return Ok(user);
    }

    tracing::debug!(external_id = %profile.id, "Insert skipped, re-reading user");
    uow.find_user_by_external_id(&profile.id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(external_id = %profile.id, "Email already registered to another user");
            AppError::Conflict("Email is already registered to another user".to_string())
        })
}
