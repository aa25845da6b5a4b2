// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite-backed authorization store for HerBridge.
//!
//! - [`AuthStore`]: users, groups, permissions and their associations
//! - [`PermissionCacheStore`]: cached per-user permission sets
//! - [`create_pool`] / [`run_migrations`]: opening and initialising a database

pub mod auth;
pub mod cache;
pub mod error;
pub mod pool;
mod queries;
pub mod schema;
pub mod testing;

pub use auth::{AuthRepository, AuthStore, AuthTransaction};
pub use cache::{user_cache_key, PermissionCacheRepository, PermissionCacheStore, USER_CACHE_PREFIX};
pub use error::{DbError, Result};
pub use pool::create_pool;
pub use schema::run_migrations;
