// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Command handlers. Each returns the text to print on stdout.

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePool;

use herbridge_auth::{Group, Permission};
use herbridge_db::{run_migrations, AuthRepository, PermissionCacheRepository};
use herbridge_provisioning::{
	clear_permission_cache, user_permissions, CacheScope, ProvisioningError, ProvisioningOptions,
	ProvisioningRequest, ProvisioningService,
};

const MIGRATE_HINT: &str = "is the database migrated? run `herbridge-admin migrate`";

/// Only store failures can come from a missing schema.
fn with_migrate_hint(err: ProvisioningError) -> anyhow::Error {
	match err {
		ProvisioningError::Database(_) => anyhow::Error::new(err).context(MIGRATE_HINT),
		other => other.into(),
	}
}

#[derive(Debug, Clone, Copy)]
pub enum Listing {
	Users,
	Groups,
	Permissions,
}

pub async fn make_superusers(
	pool: &SqlitePool,
	options: ProvisioningOptions,
	users: &str,
	groups: &str,
	permissions: Option<&str>,
	json: bool,
) -> Result<String> {
	let request = ProvisioningRequest::parse(users, groups, permissions)?;
	let report = ProvisioningService::new(pool.clone(), options)
		.execute(&request)
		.await
		.map_err(with_migrate_hint)?;

	if json {
		let mut out = serde_json::to_string_pretty(&report)?;
		out.push('\n');
		Ok(out)
	} else {
		Ok(report.to_string())
	}
}

pub async fn list(pool: &SqlitePool, what: Listing, json: bool) -> Result<String> {
	let repo = AuthRepository::new(pool.clone());
	let names = match what {
		Listing::Users => repo.list_usernames().await,
		Listing::Groups => repo.list_group_names().await,
		Listing::Permissions => repo.list_permission_codenames().await,
	}
	.context(MIGRATE_HINT)?;

	if json {
		Ok(format!("{}\n", serde_json::to_string(&names)?))
	} else {
		Ok(format!("{}\n", names.join(",")))
	}
}

pub async fn clear_perm_cache(pool: &SqlitePool, scope: &CacheScope) -> Result<String> {
	let auth = AuthRepository::new(pool.clone());
	let cache = PermissionCacheRepository::new(pool.clone());
	let line = clear_permission_cache(&auth, &cache, scope)
		.await
		.map_err(with_migrate_hint)?;
	Ok(format!("{line}\n"))
}

pub async fn user_perms(pool: &SqlitePool, username: &str, json: bool) -> Result<String> {
	let auth = AuthRepository::new(pool.clone());
	let cache = PermissionCacheRepository::new(pool.clone());
	let codenames = user_permissions(&auth, &cache, username)
		.await
		.map_err(with_migrate_hint)?;

	if json {
		Ok(format!("{}\n", serde_json::to_string(&codenames)?))
	} else {
		Ok(format!("{}\n", codenames.join(",")))
	}
}

pub async fn migrate(pool: &SqlitePool) -> Result<String> {
	run_migrations(pool)
		.await
		.context("failed to apply migrations")?;
	Ok("Migrations applied\n".to_string())
}

pub async fn create_group(pool: &SqlitePool, name: &str) -> Result<String> {
	let repo = AuthRepository::new(pool.clone());
	let created = repo
		.create_group(&Group::new(name))
		.await
		.context(MIGRATE_HINT)?;
	Ok(if created {
		format!("Created group: {name}\n")
	} else {
		format!("Group {name} already exists\n")
	})
}

pub async fn create_permission(
	pool: &SqlitePool,
	codename: &str,
	name: Option<String>,
) -> Result<String> {
	let repo = AuthRepository::new(pool.clone());
	let created = repo
		.create_permission(&Permission::new(codename, name))
		.await
		.context(MIGRATE_HINT)?;
	Ok(if created {
		format!("Created permission: {codename}\n")
	} else {
		format!("Permission {codename} already exists\n")
	})
}
