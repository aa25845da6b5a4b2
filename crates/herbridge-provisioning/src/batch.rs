// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The provisioning batch: resolve groups and permissions, then create or
//! reuse each user and attach them.
//!
//! Order of work is fixed: all groups, then all permissions, then users in
//! input order, each user fully wired before the next one starts.

use herbridge_auth::{hash_password, AdminFlags, Group, Permission};
use herbridge_db::{
	AuthRepository, AuthStore, AuthTransaction, PermissionCacheRepository, PermissionCacheStore,
};
use sqlx::sqlite::SqlitePool;

use crate::error::Result;
use crate::report::{ProvisioningReport, ReportLine, UserOutcome};
use crate::request::{ProvisioningRequest, UserSpec};

/// Knobs for a provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisioningOptions {
	/// Run the whole batch in one transaction. When false every write
	/// commits on its own and a failure leaves earlier writes in place.
	pub atomic: bool,

	/// Give newly created users the staff and superuser flags. Existing
	/// users are never changed.
	pub grant_admin_flags: bool,
}

impl Default for ProvisioningOptions {
	fn default() -> Self {
		Self {
			atomic: true,
			grant_admin_flags: true,
		}
	}
}

impl ProvisioningOptions {
	pub fn admin_flags(&self) -> AdminFlags {
		if self.grant_admin_flags {
			AdminFlags::elevated()
		} else {
			AdminFlags::none()
		}
	}
}

/// Runs provisioning requests against a database.
#[derive(Clone)]
pub struct ProvisioningService {
	pool: SqlitePool,
	options: ProvisioningOptions,
}

impl ProvisioningService {
	pub fn new(pool: SqlitePool, options: ProvisioningOptions) -> Self {
		Self { pool, options }
	}

	pub fn options(&self) -> &ProvisioningOptions {
		&self.options
	}

	/// Execute a parsed request.
	///
	/// In atomic mode nothing is committed unless every step succeeds.
	#[tracing::instrument(
		skip(self, request),
		fields(users = request.users.len(), atomic = self.options.atomic)
	)]
	pub async fn execute(&self, request: &ProvisioningRequest) -> Result<ProvisioningReport> {
		if self.options.atomic {
			let tx = AuthTransaction::begin(&self.pool).await?;
			// On error `tx` is dropped uncommitted, which rolls back.
			let report = run_batch(&tx, &tx, request, &self.options).await?;
			tx.commit().await?;
			Ok(report)
		} else {
			let repo = AuthRepository::new(self.pool.clone());
			let cache = PermissionCacheRepository::new(self.pool.clone());
			run_batch(&repo, &cache, request, &self.options).await
		}
	}
}

/// Apply `request` to `store`.
///
/// Unknown groups and permissions are reported and skipped. Store and
/// hashing failures abort immediately. Each provisioned user's cached
/// permission set is dropped from `cache`.
pub async fn run_batch<S, C>(
	store: &S,
	cache: &C,
	request: &ProvisioningRequest,
	options: &ProvisioningOptions,
) -> Result<ProvisioningReport>
where
	S: AuthStore + ?Sized,
	C: PermissionCacheStore + ?Sized,
{
	let mut report = ProvisioningReport::default();

	let groups = resolve_groups(store, &request.groups, &mut report).await?;
	let permissions = match &request.permissions {
		Some(codenames) => resolve_permissions(store, codenames, &mut report).await?,
		None => Vec::new(),
	};

	let flags = options.admin_flags();

	for spec in &request.users {
		let outcome = provision_user(store, spec, flags, &groups, &permissions, &mut report).await?;
		cache.delete_user_entry(&outcome.user_id).await?;
		report.push(ReportLine::GroupsAdded {
			username: outcome.username.clone(),
			groups: request.groups.clone(),
		});
		report.push(ReportLine::PermissionsAssigned {
			username: outcome.username.clone(),
			count: outcome.permissions,
		});
		report.outcomes.push(outcome);
	}

	tracing::info!(
		users = report.outcomes.len(),
		created = report.created_count(),
		groups = groups.len(),
		permissions = permissions.len(),
		"provisioning batch finished"
	);
	Ok(report)
}

async fn resolve_groups<S>(
	store: &S,
	names: &[String],
	report: &mut ProvisioningReport,
) -> Result<Vec<Group>>
where
	S: AuthStore + ?Sized,
{
	let mut groups: Vec<Group> = Vec::with_capacity(names.len());
	for name in names {
		match store.find_group_by_name(name).await? {
			Some(group) => {
				if !groups.iter().any(|g| g.id == group.id) {
					groups.push(group);
				}
			}
			None => report.push(ReportLine::MissingGroup { name: name.clone() }),
		}
	}
	Ok(groups)
}

async fn resolve_permissions<S>(
	store: &S,
	codenames: &[String],
	report: &mut ProvisioningReport,
) -> Result<Vec<Permission>>
where
	S: AuthStore + ?Sized,
{
	let mut permissions: Vec<Permission> = Vec::with_capacity(codenames.len());
	for codename in codenames {
		match store.find_permission_by_codename(codename).await? {
			Some(permission) => {
				if !permissions.iter().any(|p| p.id == permission.id) {
					permissions.push(permission);
				}
			}
			None => report.push(ReportLine::MissingPermission {
				codename: codename.clone(),
			}),
		}
	}
	Ok(permissions)
}

async fn provision_user<S>(
	store: &S,
	spec: &UserSpec,
	flags: AdminFlags,
	groups: &[Group],
	permissions: &[Permission],
	report: &mut ProvisioningReport,
) -> Result<UserOutcome>
where
	S: AuthStore + ?Sized,
{
	let username = spec.username.clone();
	let (user, created) = store.get_or_create_user(&username, flags).await?;

	if created {
		let hash = hash_password(&spec.password)?;
		store.set_password(&user.id, &hash).await?;
		report.push(ReportLine::UserCreated {
			username: username.clone(),
		});
	} else {
		report.push(ReportLine::UserExists {
			username: username.clone(),
		});
	}

	for group in groups {
		store.add_group_membership(&user.id, &group.id).await?;
	}
	for permission in permissions {
		store.add_permission_grant(&user.id, &permission.id).await?;
	}

	Ok(UserOutcome {
		user_id: user.id,
		username,
		created,
		groups: groups.iter().map(|g| g.name.clone()).collect(),
		permissions: permissions.len(),
	})
}
