// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reading and clearing cached permission sets.

use herbridge_db::{AuthStore, PermissionCacheStore};

use crate::error::{ProvisioningError, Result};

/// Which cache entries to drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheScope {
	/// The entry of one user, looked up by username.
	User(String),
	/// Every per-user permission entry.
	AllUsers,
	/// The whole cache, including keys unrelated to users.
	Everything,
}

/// Clear part of the permission cache and return the line to show the
/// operator.
///
/// # Errors
/// Returns `ProvisioningError::UserNotFound` when [`CacheScope::User`]
/// names a user that does not exist.
#[tracing::instrument(skip(auth, cache))]
pub async fn clear_permission_cache<A, C>(
	auth: &A,
	cache: &C,
	scope: &CacheScope,
) -> Result<String>
where
	A: AuthStore + ?Sized,
	C: PermissionCacheStore + ?Sized,
{
	match scope {
		CacheScope::User(username) => {
			let user = auth
				.find_user_by_username(username)
				.await?
				.ok_or_else(|| ProvisioningError::UserNotFound(username.clone()))?;
			cache.delete_user_entry(&user.id).await?;
			Ok(format!("Cleared cache for user: {username}"))
		}
		CacheScope::Everything => {
			let removed = cache.clear().await?;
			tracing::debug!(removed, "cache cleared");
			Ok("Cleared all caches".to_string())
		}
		CacheScope::AllUsers => {
			let removed = cache.delete_all_user_entries().await?;
			tracing::debug!(removed, "user permission caches cleared");
			Ok("Cleared permission caches for all users".to_string())
		}
	}
}

/// How long a computed permission set stays cached.
pub const PERMISSION_CACHE_TTL_SECS: i64 = 300;

/// A user's permission codenames, served from the cache when a live entry
/// exists and otherwise read from the store and cached.
///
/// # Errors
/// Returns `ProvisioningError::UserNotFound` for an unknown username.
#[tracing::instrument(skip(auth, cache))]
pub async fn user_permissions<A, C>(auth: &A, cache: &C, username: &str) -> Result<Vec<String>>
where
	A: AuthStore + ?Sized,
	C: PermissionCacheStore + ?Sized,
{
	let user = auth
		.find_user_by_username(username)
		.await?
		.ok_or_else(|| ProvisioningError::UserNotFound(username.to_string()))?;

	if let Some(cached) = cache.get_user_permissions(&user.id).await? {
		tracing::debug!(count = cached.len(), "permission cache hit");
		return Ok(cached);
	}

	let codenames = auth.list_user_permission_codenames(&user.id).await?;
	cache
		.store_user_permissions(
			&user.id,
			&codenames,
			Some(chrono::Duration::seconds(PERMISSION_CACHE_TTL_SECS)),
		)
		.await?;
	tracing::debug!(count = codenames.len(), "permission cache filled");
	Ok(codenames)
}
