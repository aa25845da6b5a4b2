// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Helpers for tests that need a real store.
//!
//! Pools are in-memory and capped at one connection: every `:memory:`
//! connection is its own database, so a second connection would see an
//! empty schema.

use std::str::FromStr;

use herbridge_auth::{Group, Permission};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::auth::AuthRepository;
use crate::schema::run_migrations;

pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.foreign_keys(true);

	SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.expect("Failed to create test pool")
}

/// In-memory pool with the full schema applied.
pub async fn create_auth_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	run_migrations(&pool).await.unwrap();
	pool
}

/// Insert the named groups and permissions.
pub async fn seed(pool: &SqlitePool, groups: &[&str], permissions: &[&str]) {
	let repo = AuthRepository::new(pool.clone());
	for name in groups {
		repo.create_group(&Group::new(*name)).await.unwrap();
	}
	for codename in permissions {
		repo.create_permission(&Permission::new(*codename, None))
			.await
			.unwrap();
	}
}
