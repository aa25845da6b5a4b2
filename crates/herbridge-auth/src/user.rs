// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User entity and the admin flags applied on creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A user account in the authorization store.
///
/// Group memberships and direct permission grants live in association
/// tables and are not loaded onto this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
	/// Unique identifier for this user.
	pub id: UserId,

	/// Unique login name. Lookups are exact and case-sensitive.
	pub username: String,

	/// Argon2 PHC string. `None` until a password has been set.
	#[serde(skip_serializing, default)]
	pub password_hash: Option<String>,

	/// May log into the administration interface.
	pub is_staff: bool,

	/// Holds every permission implicitly.
	pub is_superuser: bool,

	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl User {
	/// Creates a user with a fresh ID and no password.
	pub fn new(username: impl Into<String>, flags: AdminFlags) -> Self {
		let now = Utc::now();
		Self {
			id: UserId::generate(),
			username: username.into(),
			password_hash: None,
			is_staff: flags.is_staff,
			is_superuser: flags.is_superuser,
			created_at: now,
			updated_at: now,
		}
	}

	/// Returns true if a password hash has been stored.
	pub fn has_usable_password(&self) -> bool {
		self.password_hash.is_some()
	}

	pub fn admin_flags(&self) -> AdminFlags {
		AdminFlags {
			is_staff: self.is_staff,
			is_superuser: self.is_superuser,
		}
	}
}

/// Elevated-privilege flags applied when a user is first created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdminFlags {
	pub is_staff: bool,
	pub is_superuser: bool,
}

impl AdminFlags {
	/// Staff and superuser.
	pub fn elevated() -> Self {
		Self {
			is_staff: true,
			is_superuser: true,
		}
	}

	/// Neither flag set.
	pub fn none() -> Self {
		Self::default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_user_takes_flags() {
		let user = User::new("alice", AdminFlags::elevated());
		assert!(user.is_staff);
		assert!(user.is_superuser);
		assert!(!user.has_usable_password());
		assert_eq!(user.admin_flags(), AdminFlags::elevated());
	}

	#[test]
	fn new_user_without_flags() {
		let user = User::new("bob", AdminFlags::none());
		assert!(!user.is_staff);
		assert!(!user.is_superuser);
	}

	#[test]
	fn password_hash_is_never_serialized() {
		let mut user = User::new("carol", AdminFlags::none());
		user.password_hash = Some("$argon2id$v=19$secret".to_string());
		let json = serde_json::to_string(&user).unwrap();
		assert!(!json.contains("argon2"));
		assert!(!json.contains("password_hash"));
	}
}
