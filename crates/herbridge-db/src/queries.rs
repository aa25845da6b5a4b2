// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQL shared by the pooled repository and the transactional store.
//!
//! Every function takes a bare connection so the same statements run either
//! on a pooled connection or inside an open transaction.

use chrono::{DateTime, Utc};
use herbridge_auth::{AdminFlags, Group, GroupId, Permission, PermissionId, User, UserId};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;

use crate::error::DbError;

pub(crate) async fn get_or_create_user(
	conn: &mut SqliteConnection,
	username: &str,
	flags: AdminFlags,
) -> Result<(User, bool), DbError> {
	let candidate = User::new(username, flags);

	let result = sqlx::query(
		r#"
		INSERT INTO users (id, username, password_hash, is_staff, is_superuser, created_at, updated_at)
		VALUES (?, ?, NULL, ?, ?, ?, ?)
		ON CONFLICT(username) DO NOTHING
		"#,
	)
	.bind(candidate.id.to_string())
	.bind(&candidate.username)
	.bind(candidate.is_staff as i32)
	.bind(candidate.is_superuser as i32)
	.bind(candidate.created_at.to_rfc3339())
	.bind(candidate.updated_at.to_rfc3339())
	.execute(&mut *conn)
	.await?;

	let created = result.rows_affected() == 1;
	let user = find_user_by_username(conn, username)
		.await?
		.ok_or_else(|| DbError::NotFound(format!("user '{username}' vanished after insert")))?;

	if created {
		tracing::debug!(user_id = %user.id, username = %username, "user created");
	}
	Ok((user, created))
}

pub(crate) async fn find_user_by_username(
	conn: &mut SqliteConnection,
	username: &str,
) -> Result<Option<User>, DbError> {
	let row = sqlx::query(
		r#"
		SELECT id, username, password_hash, is_staff, is_superuser, created_at, updated_at
		FROM users
		WHERE username = ?
		"#,
	)
	.bind(username)
	.fetch_optional(&mut *conn)
	.await?;

	row.map(|r| row_to_user(&r)).transpose()
}

pub(crate) async fn set_password(
	conn: &mut SqliteConnection,
	user_id: &UserId,
	password_hash: &str,
) -> Result<(), DbError> {
	let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
		.bind(password_hash)
		.bind(Utc::now().to_rfc3339())
		.bind(user_id.to_string())
		.execute(&mut *conn)
		.await?;

	if result.rows_affected() == 0 {
		return Err(DbError::NotFound(format!("user {user_id}")));
	}
	tracing::debug!(user_id = %user_id, "password stored");
	Ok(())
}

pub(crate) async fn find_group_by_name(
	conn: &mut SqliteConnection,
	name: &str,
) -> Result<Option<Group>, DbError> {
	let row = sqlx::query("SELECT id, name, created_at FROM groups WHERE name = ?")
		.bind(name)
		.fetch_optional(&mut *conn)
		.await?;

	row.map(|r| row_to_group(&r)).transpose()
}

pub(crate) async fn find_permission_by_codename(
	conn: &mut SqliteConnection,
	codename: &str,
) -> Result<Option<Permission>, DbError> {
	let row =
		sqlx::query("SELECT id, codename, name, created_at FROM permissions WHERE codename = ?")
			.bind(codename)
			.fetch_optional(&mut *conn)
			.await?;

	row.map(|r| row_to_permission(&r)).transpose()
}

pub(crate) async fn add_group_membership(
	conn: &mut SqliteConnection,
	user_id: &UserId,
	group_id: &GroupId,
) -> Result<bool, DbError> {
	let result = sqlx::query(
		"INSERT OR IGNORE INTO user_groups (user_id, group_id, created_at) VALUES (?, ?, ?)",
	)
	.bind(user_id.to_string())
	.bind(group_id.to_string())
	.bind(Utc::now().to_rfc3339())
	.execute(&mut *conn)
	.await?;

	Ok(result.rows_affected() == 1)
}

pub(crate) async fn add_permission_grant(
	conn: &mut SqliteConnection,
	user_id: &UserId,
	permission_id: &PermissionId,
) -> Result<bool, DbError> {
	let result = sqlx::query(
		"INSERT OR IGNORE INTO user_permissions (user_id, permission_id, created_at) VALUES (?, ?, ?)",
	)
	.bind(user_id.to_string())
	.bind(permission_id.to_string())
	.bind(Utc::now().to_rfc3339())
	.execute(&mut *conn)
	.await?;

	Ok(result.rows_affected() == 1)
}

pub(crate) async fn create_group(
	conn: &mut SqliteConnection,
	group: &Group,
) -> Result<bool, DbError> {
	let result = sqlx::query(
		"INSERT INTO groups (id, name, created_at) VALUES (?, ?, ?) ON CONFLICT(name) DO NOTHING",
	)
	.bind(group.id.to_string())
	.bind(&group.name)
	.bind(group.created_at.to_rfc3339())
	.execute(&mut *conn)
	.await?;

	Ok(result.rows_affected() == 1)
}

pub(crate) async fn create_permission(
	conn: &mut SqliteConnection,
	permission: &Permission,
) -> Result<bool, DbError> {
	let result = sqlx::query(
		r#"
		INSERT INTO permissions (id, codename, name, created_at)
		VALUES (?, ?, ?, ?)
		ON CONFLICT(codename) DO NOTHING
		"#,
	)
	.bind(permission.id.to_string())
	.bind(&permission.codename)
	.bind(&permission.name)
	.bind(permission.created_at.to_rfc3339())
	.execute(&mut *conn)
	.await?;

	Ok(result.rows_affected() == 1)
}

/// Fetch a single text column from every row, in insertion order.
pub(crate) async fn list_column(
	conn: &mut SqliteConnection,
	sql: &'static str,
) -> Result<Vec<String>, DbError> {
	let rows = sqlx::query(sql).fetch_all(&mut *conn).await?;
	Ok(rows.iter().map(|r| r.get::<String, _>(0)).collect())
}

pub(crate) async fn list_user_group_names(
	conn: &mut SqliteConnection,
	user_id: &UserId,
) -> Result<Vec<String>, DbError> {
	let rows = sqlx::query(
		r#"
		SELECT g.name
		FROM user_groups ug
		JOIN groups g ON g.id = ug.group_id
		WHERE ug.user_id = ?
		ORDER BY ug.rowid
		"#,
	)
	.bind(user_id.to_string())
	.fetch_all(&mut *conn)
	.await?;

	Ok(rows.iter().map(|r| r.get::<String, _>("name")).collect())
}

pub(crate) async fn list_user_permission_codenames(
	conn: &mut SqliteConnection,
	user_id: &UserId,
) -> Result<Vec<String>, DbError> {
	let rows = sqlx::query(
		r#"
		SELECT p.codename
		FROM user_permissions up
		JOIN permissions p ON p.id = up.permission_id
		WHERE up.user_id = ?
		ORDER BY up.rowid
		"#,
	)
	.bind(user_id.to_string())
	.fetch_all(&mut *conn)
	.await?;

	Ok(rows.iter().map(|r| r.get::<String, _>("codename")).collect())
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Corrupt(format!("invalid {column}: {e}")))
}

fn row_to_user(row: &SqliteRow) -> Result<User, DbError> {
	let id: String = row.get("id");
	let is_staff: i32 = row.get("is_staff");
	let is_superuser: i32 = row.get("is_superuser");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(User {
		id: id
			.parse::<UserId>()
			.map_err(|e| DbError::Corrupt(format!("invalid user ID: {e}")))?,
		username: row.get("username"),
		password_hash: row.get("password_hash"),
		is_staff: is_staff != 0,
		is_superuser: is_superuser != 0,
		created_at: parse_timestamp(&created_at, "created_at")?,
		updated_at: parse_timestamp(&updated_at, "updated_at")?,
	})
}

fn row_to_group(row: &SqliteRow) -> Result<Group, DbError> {
	let id: String = row.get("id");
	let created_at: String = row.get("created_at");

	Ok(Group {
		id: id
			.parse::<GroupId>()
			.map_err(|e| DbError::Corrupt(format!("invalid group ID: {e}")))?,
		name: row.get("name"),
		created_at: parse_timestamp(&created_at, "created_at")?,
	})
}

fn row_to_permission(row: &SqliteRow) -> Result<Permission, DbError> {
	let id: String = row.get("id");
	let created_at: String = row.get("created_at");

	Ok(Permission {
		id: id
			.parse::<PermissionId>()
			.map_err(|e| DbError::Corrupt(format!("invalid permission ID: {e}")))?,
		codename: row.get("codename"),
		name: row.get("name"),
		created_at: parse_timestamp(&created_at, "created_at")?,
	})
}
