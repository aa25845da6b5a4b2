// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization store: users, groups, permissions and their associations.
//!
//! [`AuthStore`] is the contract batch operations are written against. Two
//! implementations share the same SQL:
//! - [`AuthRepository`] runs each call on a pooled connection, so every
//!   write commits on its own
//! - [`AuthTransaction`] runs every call inside one open transaction that is
//!   committed explicitly and rolled back if dropped

use async_trait::async_trait;
use herbridge_auth::{AdminFlags, Group, GroupId, Permission, PermissionId, User, UserId};
use sqlx::sqlite::SqlitePool;
use sqlx::{Sqlite, Transaction};
use tokio::sync::Mutex;

use crate::error::DbError;
use crate::queries;

const LIST_USERNAMES: &str = "SELECT username FROM users ORDER BY rowid";
const LIST_GROUP_NAMES: &str = "SELECT name FROM groups ORDER BY rowid";
const LIST_PERMISSION_CODENAMES: &str = "SELECT codename FROM permissions ORDER BY rowid";

#[async_trait]
pub trait AuthStore: Send + Sync {
	/// Returns the user with this username, creating it with `flags` if
	/// absent. The boolean is true when a new row was written.
	async fn get_or_create_user(
		&self,
		username: &str,
		flags: AdminFlags,
	) -> Result<(User, bool), DbError>;
	async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError>;
	async fn set_password(&self, user_id: &UserId, password_hash: &str) -> Result<(), DbError>;
	async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, DbError>;
	async fn find_permission_by_codename(
		&self,
		codename: &str,
	) -> Result<Option<Permission>, DbError>;
	/// Returns false if the membership already existed.
	async fn add_group_membership(
		&self,
		user_id: &UserId,
		group_id: &GroupId,
	) -> Result<bool, DbError>;
	/// Returns false if the grant already existed.
	async fn add_permission_grant(
		&self,
		user_id: &UserId,
		permission_id: &PermissionId,
	) -> Result<bool, DbError>;
	async fn create_group(&self, group: &Group) -> Result<bool, DbError>;
	async fn create_permission(&self, permission: &Permission) -> Result<bool, DbError>;
	async fn list_usernames(&self) -> Result<Vec<String>, DbError>;
	async fn list_group_names(&self) -> Result<Vec<String>, DbError>;
	async fn list_permission_codenames(&self) -> Result<Vec<String>, DbError>;
	async fn list_user_group_names(&self, user_id: &UserId) -> Result<Vec<String>, DbError>;
	async fn list_user_permission_codenames(&self, user_id: &UserId)
		-> Result<Vec<String>, DbError>;
}

/// Repository for the authorization store.
///
/// Each method acquires a pooled connection; writes are committed as they
/// happen.
#[derive(Clone)]
pub struct AuthRepository {
	pool: SqlitePool,
}

impl AuthRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	/// Get a user by exact username.
	#[tracing::instrument(skip(self))]
	pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
		let mut conn = self.pool.acquire().await?;
		queries::find_user_by_username(&mut *conn, username).await
	}

	/// Get or create a user.
	///
	/// # Database Constraints
	/// - `username` is unique; a concurrent insert of the same name is
	///   treated as "already exists"
	#[tracing::instrument(skip(self, flags))]
	pub async fn get_or_create_user(
		&self,
		username: &str,
		flags: AdminFlags,
	) -> Result<(User, bool), DbError> {
		let mut conn = self.pool.acquire().await?;
		queries::get_or_create_user(&mut *conn, username, flags).await
	}

	/// Store a password hash on an existing user.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the user does not exist.
	#[tracing::instrument(skip(self, user_id, password_hash), fields(user_id = %user_id))]
	pub async fn set_password(&self, user_id: &UserId, password_hash: &str) -> Result<(), DbError> {
		let mut conn = self.pool.acquire().await?;
		queries::set_password(&mut *conn, user_id, password_hash).await
	}

	#[tracing::instrument(skip(self))]
	pub async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, DbError> {
		let mut conn = self.pool.acquire().await?;
		queries::find_group_by_name(&mut *conn, name).await
	}

	#[tracing::instrument(skip(self))]
	pub async fn find_permission_by_codename(
		&self,
		codename: &str,
	) -> Result<Option<Permission>, DbError> {
		let mut conn = self.pool.acquire().await?;
		queries::find_permission_by_codename(&mut *conn, codename).await
	}

	#[tracing::instrument(skip(self, user_id, group_id), fields(user_id = %user_id, group_id = %group_id))]
	pub async fn add_group_membership(
		&self,
		user_id: &UserId,
		group_id: &GroupId,
	) -> Result<bool, DbError> {
		let mut conn = self.pool.acquire().await?;
		queries::add_group_membership(&mut *conn, user_id, group_id).await
	}

	#[tracing::instrument(
		skip(self, user_id, permission_id),
		fields(user_id = %user_id, permission_id = %permission_id)
	)]
	pub async fn add_permission_grant(
		&self,
		user_id: &UserId,
		permission_id: &PermissionId,
	) -> Result<bool, DbError> {
		let mut conn = self.pool.acquire().await?;
		queries::add_permission_grant(&mut *conn, user_id, permission_id).await
	}

	/// Insert a group unless one with the same name exists.
	#[tracing::instrument(skip(self, group), fields(name = %group.name))]
	pub async fn create_group(&self, group: &Group) -> Result<bool, DbError> {
		let mut conn = self.pool.acquire().await?;
		let created = queries::create_group(&mut *conn, group).await?;
		tracing::debug!(created, "group insert");
		Ok(created)
	}

	/// Insert a permission unless one with the same codename exists.
	#[tracing::instrument(skip(self, permission), fields(codename = %permission.codename))]
	pub async fn create_permission(&self, permission: &Permission) -> Result<bool, DbError> {
		let mut conn = self.pool.acquire().await?;
		let created = queries::create_permission(&mut *conn, permission).await?;
		tracing::debug!(created, "permission insert");
		Ok(created)
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_usernames(&self) -> Result<Vec<String>, DbError> {
		let mut conn = self.pool.acquire().await?;
		queries::list_column(&mut *conn, LIST_USERNAMES).await
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_group_names(&self) -> Result<Vec<String>, DbError> {
		let mut conn = self.pool.acquire().await?;
		queries::list_column(&mut *conn, LIST_GROUP_NAMES).await
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_permission_codenames(&self) -> Result<Vec<String>, DbError> {
		let mut conn = self.pool.acquire().await?;
		queries::list_column(&mut *conn, LIST_PERMISSION_CODENAMES).await
	}

	#[tracing::instrument(skip(self, user_id), fields(user_id = %user_id))]
	pub async fn list_user_group_names(&self, user_id: &UserId) -> Result<Vec<String>, DbError> {
		let mut conn = self.pool.acquire().await?;
		queries::list_user_group_names(&mut *conn, user_id).await
	}

	#[tracing::instrument(skip(self, user_id), fields(user_id = %user_id))]
	pub async fn list_user_permission_codenames(
		&self,
		user_id: &UserId,
	) -> Result<Vec<String>, DbError> {
		let mut conn = self.pool.acquire().await?;
		queries::list_user_permission_codenames(&mut *conn, user_id).await
	}
}

#[async_trait]
impl AuthStore for AuthRepository {
	async fn get_or_create_user(
		&self,
		username: &str,
		flags: AdminFlags,
	) -> Result<(User, bool), DbError> {
		self.get_or_create_user(username, flags).await
	}

	async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
		self.find_user_by_username(username).await
	}

	async fn set_password(&self, user_id: &UserId, password_hash: &str) -> Result<(), DbError> {
		self.set_password(user_id, password_hash).await
	}

	async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, DbError> {
		self.find_group_by_name(name).await
	}

	async fn find_permission_by_codename(
		&self,
		codename: &str,
	) -> Result<Option<Permission>, DbError> {
		self.find_permission_by_codename(codename).await
	}

	async fn add_group_membership(
		&self,
		user_id: &UserId,
		group_id: &GroupId,
	) -> Result<bool, DbError> {
		self.add_group_membership(user_id, group_id).await
	}

	async fn add_permission_grant(
		&self,
		user_id: &UserId,
		permission_id: &PermissionId,
	) -> Result<bool, DbError> {
		self.add_permission_grant(user_id, permission_id).await
	}

	async fn create_group(&self, group: &Group) -> Result<bool, DbError> {
		self.create_group(group).await
	}

	async fn create_permission(&self, permission: &Permission) -> Result<bool, DbError> {
		self.create_permission(permission).await
	}

	async fn list_usernames(&self) -> Result<Vec<String>, DbError> {
		self.list_usernames().await
	}

	async fn list_group_names(&self) -> Result<Vec<String>, DbError> {
		self.list_group_names().await
	}

	async fn list_permission_codenames(&self) -> Result<Vec<String>, DbError> {
		self.list_permission_codenames().await
	}

	async fn list_user_group_names(&self, user_id: &UserId) -> Result<Vec<String>, DbError> {
		self.list_user_group_names(user_id).await
	}

	async fn list_user_permission_codenames(
		&self,
		user_id: &UserId,
	) -> Result<Vec<String>, DbError> {
		self.list_user_permission_codenames(user_id).await
	}
}

/// Authorization store bound to a single open transaction.
///
/// Nothing is visible to other connections until [`AuthTransaction::commit`].
/// Dropping the value without committing rolls everything back.
pub struct AuthTransaction {
	pub(crate) tx: Mutex<Transaction<'static, Sqlite>>,
}

impl AuthTransaction {
	#[tracing::instrument(skip(pool))]
	pub async fn begin(pool: &SqlitePool) -> Result<Self, DbError> {
		let tx = pool.begin().await?;
		tracing::debug!("transaction opened");
		Ok(Self { tx: Mutex::new(tx) })
	}

	#[tracing::instrument(skip(self))]
	pub async fn commit(self) -> Result<(), DbError> {
		self.tx.into_inner().commit().await?;
		tracing::debug!("transaction committed");
		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn rollback(self) -> Result<(), DbError> {
		self.tx.into_inner().rollback().await?;
		tracing::debug!("transaction rolled back");
		Ok(())
	}
}

#[async_trait]
impl AuthStore for AuthTransaction {
	async fn get_or_create_user(
		&self,
		username: &str,
		flags: AdminFlags,
	) -> Result<(User, bool), DbError> {
		let mut tx = self.tx.lock().await;
		queries::get_or_create_user(&mut **tx, username, flags).await
	}

	async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
		let mut tx = self.tx.lock().await;
		queries::find_user_by_username(&mut **tx, username).await
	}

	async fn set_password(&self, user_id: &UserId, password_hash: &str) -> Result<(), DbError> {
		let mut tx = self.tx.lock().await;
		queries::set_password(&mut **tx, user_id, password_hash).await
	}

	async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, DbError> {
		let mut tx = self.tx.lock().await;
		queries::find_group_by_name(&mut **tx, name).await
	}

	async fn find_permission_by_codename(
		&self,
		codename: &str,
	) -> Result<Option<Permission>, DbError> {
		let mut tx = self.tx.lock().await;
		queries::find_permission_by_codename(&mut **tx, codename).await
	}

	async fn add_group_membership(
		&self,
		user_id: &UserId,
		group_id: &GroupId,
	) -> Result<bool, DbError> {
		let mut tx = self.tx.lock().await;
		queries::add_group_membership(&mut **tx, user_id, group_id).await
	}

	async fn add_permission_grant(
		&self,
		user_id: &UserId,
		permission_id: &PermissionId,
	) -> Result<bool, DbError> {
		let mut tx = self.tx.lock().await;
		queries::add_permission_grant(&mut **tx, user_id, permission_id).await
	}

	async fn create_group(&self, group: &Group) -> Result<bool, DbError> {
		let mut tx = self.tx.lock().await;
		queries::create_group(&mut **tx, group).await
	}

	async fn create_permission(&self, permission: &Permission) -> Result<bool, DbError> {
		let mut tx = self.tx.lock().await;
		queries::create_permission(&mut **tx, permission).await
	}

	async fn list_usernames(&self) -> Result<Vec<String>, DbError> {
		let mut tx = self.tx.lock().await;
		queries::list_column(&mut **tx, LIST_USERNAMES).await
	}

	async fn list_group_names(&self) -> Result<Vec<String>, DbError> {
		let mut tx = self.tx.lock().await;
		queries::list_column(&mut **tx, LIST_GROUP_NAMES).await
	}

	async fn list_permission_codenames(&self) -> Result<Vec<String>, DbError> {
		let mut tx = self.tx.lock().await;
		queries::list_column(&mut **tx, LIST_PERMISSION_CODENAMES).await
	}

	async fn list_user_group_names(&self, user_id: &UserId) -> Result<Vec<String>, DbError> {
		let mut tx = self.tx.lock().await;
		queries::list_user_group_names(&mut **tx, user_id).await
	}

	async fn list_user_permission_codenames(
		&self,
		user_id: &UserId,
	) -> Result<Vec<String>, DbError> {
		let mut tx = self.tx.lock().await;
		queries::list_user_permission_codenames(&mut **tx, user_id).await
	}
}
