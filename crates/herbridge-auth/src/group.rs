// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Group and permission entities.
//!
//! Both are looked up by their unique string key and are never created by
//! provisioning; they must already exist in the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{GroupId, PermissionId};

/// A named collection of users sharing an authorization scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
	pub id: GroupId,

	/// Unique group name.
	pub name: String,

	pub created_at: DateTime<Utc>,
}

impl Group {
	/// Creates a group with a generated ID.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			id: GroupId::generate(),
			name: name.into(),
			created_at: Utc::now(),
		}
	}
}

/// An atomic capability that can be granted directly to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
	pub id: PermissionId,

	/// Unique machine name, e.g. `change_resource`.
	pub codename: String,

	/// Human-readable description.
	pub name: String,

	pub created_at: DateTime<Utc>,
}

impl Permission {
	/// Creates a permission with a generated ID.
	///
	/// The human name defaults to the codename when not given.
	pub fn new(codename: impl Into<String>, name: Option<String>) -> Self {
		let codename = codename.into();
		let name = name.unwrap_or_else(|| codename.clone());
		Self {
			id: PermissionId::generate(),
			codename,
			name,
			created_at: Utc::now(),
		}
	}
}
