// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parsing of the compact textual provisioning input.
//!
//! Input format:
//! - users: `alice:pw1,bob:pw2` (each entry trimmed, exactly one `:`)
//! - groups: `editors,reviewers` (names trimmed, blanks dropped)
//! - permissions: same as groups; absent means "leave permissions alone"
//!
//! Parsing is all-or-nothing: a single bad user entry rejects the request.

use herbridge_common_secret::SecretString;

use crate::error::{ProvisioningError, Result};

/// One `username:password` pair.
#[derive(Debug, Clone)]
pub struct UserSpec {
	pub username: String,
	pub password: SecretString,
}

/// A fully parsed provisioning request.
#[derive(Debug, Clone)]
pub struct ProvisioningRequest {
	/// Users in input order. Duplicates are kept and processed twice.
	pub users: Vec<UserSpec>,

	/// Requested group names, first occurrence order, no duplicates.
	pub groups: Vec<String>,

	/// Requested permission codenames. `None` when the permissions argument
	/// was not supplied at all.
	pub permissions: Option<Vec<String>>,
}

impl ProvisioningRequest {
	/// Parse the three textual arguments.
	///
	/// # Errors
	/// Returns `ProvisioningError::MalformedInput` if any user entry does not
	/// contain exactly one `:` or has an empty username.
	pub fn parse(users: &str, groups: &str, permissions: Option<&str>) -> Result<Self> {
		let users = parse_users(users)?;
		let groups = parse_names(groups);
		let permissions = permissions.map(parse_names);

		tracing::debug!(
			users = users.len(),
			groups = groups.len(),
			permissions = permissions.as_ref().map(Vec::len),
			"parsed provisioning request"
		);

		Ok(Self {
			users,
			groups,
			permissions,
		})
	}

	pub fn usernames(&self) -> impl Iterator<Item = &str> {
		self.users.iter().map(|u| u.username.as_str())
	}
}

fn parse_users(input: &str) -> Result<Vec<UserSpec>> {
	input.split(',').map(parse_user_entry).collect()
}

fn parse_user_entry(raw: &str) -> Result<UserSpec> {
	let entry = raw.trim();
	let malformed = |reason: &str| ProvisioningError::MalformedInput {
		entry: entry.to_string(),
		reason: reason.to_string(),
	};

	let fields: Vec<&str> = entry.split(':').collect();
	let (username, password) = match fields.as_slice() {
		[username, password] => (*username, *password),
		[_] => return Err(malformed("expected username:password")),
		_ => return Err(malformed("more than one ':' separator")),
	};

	if username.is_empty() {
		return Err(malformed("empty username"));
	}

	Ok(UserSpec {
		username: username.to_string(),
		password: SecretString::from(password),
	})
}

/// Split a comma-separated name list, trimming each name, dropping blanks
/// and collapsing duplicates while keeping first-occurrence order.
fn parse_names(input: &str) -> Vec<String> {
	let mut names: Vec<String> = Vec::new();
	for name in input.split(',').map(str::trim).filter(|n| !n.is_empty()) {
		if !names.iter().any(|existing| existing == name) {
			names.push(name.to_string());
		}
	}
	names
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn names(req: &ProvisioningRequest) -> Vec<&str> {
		req.usernames().collect()
	}

	#[test]
	fn parses_users_in_order() {
		let req = ProvisioningRequest::parse("alice:pw1,bob:pw2", "editors", None).unwrap();
		assert_eq!(names(&req), vec!["alice", "bob"]);
		assert_eq!(req.users[0].password.expose(), "pw1");
		assert_eq!(req.users[1].password.expose(), "pw2");
	}

	#[test]
	fn trims_whitespace_around_entries() {
		let req = ProvisioningRequest::parse(
			" alice:pw1 , bob:pw2",
			" editors , reviewers ",
			Some(" can_edit "),
		)
		.unwrap();
		assert_eq!(names(&req), vec!["alice", "bob"]);
		assert_eq!(req.groups, vec!["editors", "reviewers"]);
		assert_eq!(req.permissions, Some(vec!["can_edit".to_string()]));
	}

	#[test]
	fn entry_without_colon_is_malformed() {
		let err = ProvisioningRequest::parse("alice:pw1,bob", "", None).unwrap_err();
		match err {
			ProvisioningError::MalformedInput { entry, .. } => assert_eq!(entry, "bob"),
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn entry_with_two_colons_is_malformed() {
		let err = ProvisioningRequest::parse("alice:pw:extra", "", None).unwrap_err();
		assert!(matches!(err, ProvisioningError::MalformedInput { .. }));
		assert!(err.to_string().contains("more than one"));
	}

	#[test]
	fn trailing_comma_is_malformed() {
		let result = ProvisioningRequest::parse("alice:pw1,", "", None);
		assert!(matches!(result, Err(ProvisioningError::MalformedInput { .. })));
	}

	#[test]
	fn empty_username_is_malformed() {
		let result = ProvisioningRequest::parse(":pw1", "", None);
		assert!(matches!(result, Err(ProvisioningError::MalformedInput { .. })));
	}

	#[test]
	fn any_non_empty_username_is_accepted() {
		let long = "x".repeat(200);
		let input = format!("bob smith:pw,o'neil:pw2,{long}:pw3");
		let req = ProvisioningRequest::parse(&input, "", None).unwrap();
		assert_eq!(names(&req), vec!["bob smith", "o'neil", long.as_str()]);
	}

	#[test]
	fn empty_password_is_allowed() {
		let req = ProvisioningRequest::parse("alice:", "", None).unwrap();
		assert_eq!(req.users[0].password.expose(), "");
	}

	#[test]
	fn empty_groups_is_empty_list() {
		let req = ProvisioningRequest::parse("alice:pw1", "", None).unwrap();
		assert!(req.groups.is_empty());
	}

	#[test]
	fn absent_and_empty_permissions_differ() {
		let absent = ProvisioningRequest::parse("alice:pw1", "", None).unwrap();
		let empty = ProvisioningRequest::parse("alice:pw1", "", Some("")).unwrap();
		assert_eq!(absent.permissions, None);
		assert_eq!(empty.permissions, Some(vec![]));
	}

	#[test]
	fn duplicate_group_names_collapse() {
		let req = ProvisioningRequest::parse("alice:pw1", "editors,reviewers,editors", None).unwrap();
		assert_eq!(req.groups, vec!["editors", "reviewers"]);
	}

	#[test]
	fn passwords_do_not_leak_through_debug() {
		let req = ProvisioningRequest::parse("alice:topsecret", "", None).unwrap();
		assert!(!format!("{req:?}").contains("topsecret"));
	}

	proptest! {
		#[test]
		fn well_formed_users_round_trip_in_order(
			users in prop::collection::vec(("[a-z][a-z0-9_]{0,11}", "[A-Za-z0-9!#%]{0,12}"), 1..8)
		) {
			let input = users
				.iter()
				.map(|(u, p)| format!("{u}:{p}"))
				.collect::<Vec<_>>()
				.join(",");
			let req = ProvisioningRequest::parse(&input, "", None).unwrap();
			let parsed: Vec<(&str, &str)> = req
				.users
				.iter()
				.map(|u| (u.username.as_str(), u.password.expose().as_str()))
				.collect();
			let expected: Vec<(&str, &str)> =
				users.iter().map(|(u, p)| (u.as_str(), p.as_str())).collect();
			prop_assert_eq!(parsed, expected);
		}

		#[test]
		fn extra_colon_anywhere_is_rejected(
			good in "[a-z]{1,8}:[a-z]{1,8}",
			bad in "[a-z]{1,8}:[a-z]{0,8}:[a-z]{0,8}",
			bad_first in any::<bool>()
		) {
			let input = if bad_first { format!("{bad},{good}") } else { format!("{good},{bad}") };
			let is_malformed = matches!(
				ProvisioningRequest::parse(&input, "", None),
				Err(ProvisioningError::MalformedInput { .. })
			);
			prop_assert!(is_malformed);
		}
	}
}
