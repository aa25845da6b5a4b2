// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-user permission cache.
//!
//! Entries live in the `user_permission_cache` table, one row per key. Keys
//! for a user's effective permissions have the form `auth.user.{user_id}`;
//! values are JSON arrays of permission codenames.
//!
//! [`PermissionCacheRepository`] runs on pooled connections. [`AuthTransaction`]
//! implements the same trait so invalidation can share a provisioning
//! transaction.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use herbridge_auth::UserId;
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use sqlx::Row;

use crate::auth::AuthTransaction;
use crate::error::DbError;

/// Key prefix shared by every per-user entry.
pub const USER_CACHE_PREFIX: &str = "auth.user.";

/// Cache key holding a user's permissions.
pub fn user_cache_key(user_id: &UserId) -> String {
	format!("{USER_CACHE_PREFIX}{user_id}")
}

#[async_trait]
pub trait PermissionCacheStore: Send + Sync {
	async fn store_user_permissions(
		&self,
		user_id: &UserId,
		codenames: &[String],
		ttl: Option<Duration>,
	) -> Result<(), DbError>;
	async fn get_user_permissions(&self, user_id: &UserId) -> Result<Option<Vec<String>>, DbError>;
	async fn delete_user_entry(&self, user_id: &UserId) -> Result<bool, DbError>;
	async fn delete_all_user_entries(&self) -> Result<u64, DbError>;
	async fn clear(&self) -> Result<u64, DbError>;
}

#[derive(Clone)]
pub struct PermissionCacheRepository {
	pool: SqlitePool,
}

impl PermissionCacheRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Cache a user's permission codenames, replacing any previous entry.
	#[tracing::instrument(skip(self, user_id, codenames), fields(user_id = %user_id, count = codenames.len()))]
	pub async fn store_user_permissions(
		&self,
		user_id: &UserId,
		codenames: &[String],
		ttl: Option<Duration>,
	) -> Result<(), DbError> {
		let mut conn = self.pool.acquire().await?;
		store_entry(&mut *conn, user_id, codenames, ttl).await
	}

	/// Read a user's cached permissions.
	///
	/// # Returns
	/// `None` if there is no entry or the entry has expired.
	#[tracing::instrument(skip(self, user_id), fields(user_id = %user_id))]
	pub async fn get_user_permissions(
		&self,
		user_id: &UserId,
	) -> Result<Option<Vec<String>>, DbError> {
		let mut conn = self.pool.acquire().await?;
		read_entry(&mut *conn, user_id).await
	}

	/// Remove one user's entry. Returns false if there was none.
	#[tracing::instrument(skip(self, user_id), fields(user_id = %user_id))]
	pub async fn delete_user_entry(&self, user_id: &UserId) -> Result<bool, DbError> {
		let mut conn = self.pool.acquire().await?;
		delete_entry(&mut *conn, user_id).await
	}

	/// Remove every per-user entry, leaving unrelated keys in place.
	#[tracing::instrument(skip(self))]
	pub async fn delete_all_user_entries(&self) -> Result<u64, DbError> {
		let mut conn = self.pool.acquire().await?;
		delete_user_prefix(&mut *conn).await
	}

	/// Remove every entry in the cache.
	#[tracing::instrument(skip(self))]
	pub async fn clear(&self) -> Result<u64, DbError> {
		let mut conn = self.pool.acquire().await?;
		delete_everything(&mut *conn).await
	}
}

#[async_trait]
impl PermissionCacheStore for PermissionCacheRepository {
	async fn store_user_permissions(
		&self,
		user_id: &UserId,
		codenames: &[String],
		ttl: Option<Duration>,
	) -> Result<(), DbError> {
		self.store_user_permissions(user_id, codenames, ttl).await
	}

	async fn get_user_permissions(&self, user_id: &UserId) -> Result<Option<Vec<String>>, DbError> {
		self.get_user_permissions(user_id).await
	}

	async fn delete_user_entry(&self, user_id: &UserId) -> Result<bool, DbError> {
		self.delete_user_entry(user_id).await
	}

	async fn delete_all_user_entries(&self) -> Result<u64, DbError> {
		self.delete_all_user_entries().await
	}

	async fn clear(&self) -> Result<u64, DbError> {
		self.clear().await
	}
}

#[async_trait]
impl PermissionCacheStore for AuthTransaction {
	async fn store_user_permissions(
		&self,
		user_id: &UserId,
		codenames: &[String],
		ttl: Option<Duration>,
	) -> Result<(), DbError> {
		let mut tx = self.tx.lock().await;
		store_entry(&mut **tx, user_id, codenames, ttl).await
	}

	async fn get_user_permissions(&self, user_id: &UserId) -> Result<Option<Vec<String>>, DbError> {
		let mut tx = self.tx.lock().await;
		read_entry(&mut **tx, user_id).await
	}

	async fn delete_user_entry(&self, user_id: &UserId) -> Result<bool, DbError> {
		let mut tx = self.tx.lock().await;
		delete_entry(&mut **tx, user_id).await
	}

	async fn delete_all_user_entries(&self) -> Result<u64, DbError> {
		let mut tx = self.tx.lock().await;
		delete_user_prefix(&mut **tx).await
	}

	async fn clear(&self) -> Result<u64, DbError> {
		let mut tx = self.tx.lock().await;
		delete_everything(&mut **tx).await
	}
}

async fn store_entry(
	conn: &mut SqliteConnection,
	user_id: &UserId,
	codenames: &[String],
	ttl: Option<Duration>,
) -> Result<(), DbError> {
	let value = serde_json::to_string(codenames)?;
	let expires = ttl.map(|ttl| (Utc::now() + ttl).to_rfc3339());

	sqlx::query(
		r#"
		INSERT INTO user_permission_cache (cache_key, value, expires)
		VALUES (?, ?, ?)
		ON CONFLICT(cache_key) DO UPDATE SET value = excluded.value, expires = excluded.expires
		"#,
	)
	.bind(user_cache_key(user_id))
	.bind(value)
	.bind(expires)
	.execute(&mut *conn)
	.await?;

	Ok(())
}

async fn read_entry(
	conn: &mut SqliteConnection,
	user_id: &UserId,
) -> Result<Option<Vec<String>>, DbError> {
	let row = sqlx::query("SELECT value, expires FROM user_permission_cache WHERE cache_key = ?")
		.bind(user_cache_key(user_id))
		.fetch_optional(&mut *conn)
		.await?;

	let Some(row) = row else {
		return Ok(None);
	};

	let expires: Option<String> = row.get("expires");
	if let Some(expires) = expires {
		let expires = DateTime::parse_from_rfc3339(&expires)
			.map_err(|e| DbError::Corrupt(format!("invalid cache expiry: {e}")))?
			.with_timezone(&Utc);
		if expires <= Utc::now() {
			tracing::trace!("cache entry expired");
			return Ok(None);
		}
	}

	let value: String = row.get("value");
	Ok(Some(serde_json::from_str(&value)?))
}

async fn delete_entry(conn: &mut SqliteConnection, user_id: &UserId) -> Result<bool, DbError> {
	let result = sqlx::query("DELETE FROM user_permission_cache WHERE cache_key = ?")
		.bind(user_cache_key(user_id))
		.execute(&mut *conn)
		.await?;

	tracing::debug!(user_id = %user_id, deleted = result.rows_affected(), "user cache entry cleared");
	Ok(result.rows_affected() > 0)
}

async fn delete_user_prefix(conn: &mut SqliteConnection) -> Result<u64, DbError> {
	let result = sqlx::query(
		"DELETE FROM user_permission_cache WHERE substr(cache_key, 1, length(?1)) = ?1",
	)
	.bind(USER_CACHE_PREFIX)
	.execute(&mut *conn)
	.await?;

	tracing::debug!(deleted = result.rows_affected(), "user cache entries cleared");
	Ok(result.rows_affected())
}

async fn delete_everything(conn: &mut SqliteConnection) -> Result<u64, DbError> {
	let result = sqlx::query("DELETE FROM user_permission_cache")
		.execute(&mut *conn)
		.await?;

	tracing::debug!(deleted = result.rows_affected(), "cache cleared");
	Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_auth_test_pool;

	async fn make_repo() -> PermissionCacheRepository {
		PermissionCacheRepository::new(create_auth_test_pool().await)
	}

	fn codenames(names: &[&str]) -> Vec<String> {
		names.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn user_key_format() {
		let id = UserId::generate();
		assert_eq!(user_cache_key(&id), format!("auth.user.{id}"));
	}

	#[tokio::test]
	async fn store_and_read_back() {
		let repo = make_repo().await;
		let user = UserId::generate();

		repo.store_user_permissions(&user, &codenames(&["can_edit", "can_view"]), None)
			.await
			.unwrap();

		let cached = repo.get_user_permissions(&user).await.unwrap();
		assert_eq!(cached, Some(codenames(&["can_edit", "can_view"])));
	}

	#[tokio::test]
	async fn store_replaces_previous_value() {
		let repo = make_repo().await;
		let user = UserId::generate();

		repo.store_user_permissions(&user, &codenames(&["a"]), None)
			.await
			.unwrap();
		repo.store_user_permissions(&user, &codenames(&["b"]), None)
			.await
			.unwrap();

		assert_eq!(
			repo.get_user_permissions(&user).await.unwrap(),
			Some(codenames(&["b"]))
		);
	}

	#[tokio::test]
	async fn expired_entry_reads_as_missing() {
		let repo = make_repo().await;
		let user = UserId::generate();

		repo.store_user_permissions(&user, &codenames(&["a"]), Some(Duration::seconds(-1)))
			.await
			.unwrap();

		assert_eq!(repo.get_user_permissions(&user).await.unwrap(), None);
	}

	#[tokio::test]
	async fn delete_single_user_entry() {
		let repo = make_repo().await;
		let alice = UserId::generate();
		let bob = UserId::generate();
		repo.store_user_permissions(&alice, &codenames(&["a"]), None)
			.await
			.unwrap();
		repo.store_user_permissions(&bob, &codenames(&["b"]), None)
			.await
			.unwrap();

		assert!(repo.delete_user_entry(&alice).await.unwrap());
		assert!(!repo.delete_user_entry(&alice).await.unwrap());
		assert_eq!(repo.get_user_permissions(&alice).await.unwrap(), None);
		assert!(repo.get_user_permissions(&bob).await.unwrap().is_some());
	}

	#[tokio::test]
	async fn delete_all_user_entries_keeps_other_keys() {
		let repo = make_repo().await;
		sqlx::query("INSERT INTO user_permission_cache (cache_key, value) VALUES ('tiles.42', '[]')")
			.execute(&repo.pool)
			.await
			.unwrap();
		for _ in 0..3 {
			repo.store_user_permissions(&UserId::generate(), &codenames(&["a"]), None)
				.await
				.unwrap();
		}

		assert_eq!(repo.delete_all_user_entries().await.unwrap(), 3);

		let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_permission_cache")
			.fetch_one(&repo.pool)
			.await
			.unwrap();
		assert_eq!(remaining, 1);
	}

	#[tokio::test]
	async fn transaction_delete_is_undone_by_rollback() {
		let pool = create_auth_test_pool().await;
		let repo = PermissionCacheRepository::new(pool.clone());
		let user = UserId::generate();
		repo.store_user_permissions(&user, &codenames(&["a"]), None)
			.await
			.unwrap();

		let tx = AuthTransaction::begin(&pool).await.unwrap();
		assert!(tx.delete_user_entry(&user).await.unwrap());
		assert_eq!(tx.get_user_permissions(&user).await.unwrap(), None);
		tx.rollback().await.unwrap();

		assert_eq!(
			repo.get_user_permissions(&user).await.unwrap(),
			Some(codenames(&["a"]))
		);
	}

	#[tokio::test]
	async fn clear_removes_everything() {
		let repo = make_repo().await;
		sqlx::query("INSERT INTO user_permission_cache (cache_key, value) VALUES ('tiles.42', '[]')")
			.execute(&repo.pool)
			.await
			.unwrap();
		repo.store_user_permissions(&UserId::generate(), &codenames(&["a"]), None)
			.await
			.unwrap();

		assert_eq!(repo.clear().await.unwrap(), 2);
		assert_eq!(repo.clear().await.unwrap(), 0);
	}
}
