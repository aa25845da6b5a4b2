// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Human-readable provisioning report.

use std::fmt;

use herbridge_auth::UserId;
use serde::Serialize;

/// One line of the report, in the order it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReportLine {
	MissingGroup { name: String },
	MissingPermission { codename: String },
	UserCreated { username: String },
	UserExists { username: String },
	GroupsAdded { username: String, groups: Vec<String> },
	PermissionsAssigned { username: String, count: usize },
}

impl ReportLine {
	pub fn is_warning(&self) -> bool {
		matches!(self, Self::MissingGroup { .. } | Self::MissingPermission { .. })
	}
}

impl fmt::Display for ReportLine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::MissingGroup { name } => write!(f, "Warning: Group '{name}' does not exist"),
			Self::MissingPermission { codename } => {
				write!(f, "Warning: Permission '{codename}' does not exist")
			}
			Self::UserCreated { username } => write!(f, "Created user: {username}"),
			Self::UserExists { username } => write!(f, "User {username} already exists"),
			Self::GroupsAdded { username, groups } => {
				write!(f, "Added {username} to groups: {}", groups.join(", "))
			}
			Self::PermissionsAssigned { username, count } => {
				write!(f, "Assigned {username} {count} user permissions")
			}
		}
	}
}

/// What happened to a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserOutcome {
	pub user_id: UserId,
	pub username: String,
	pub created: bool,
	/// Resolved groups the user was attached to.
	pub groups: Vec<String>,
	/// Number of resolved permissions granted directly.
	pub permissions: usize,
}

/// Result of a provisioning run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisioningReport {
	pub lines: Vec<ReportLine>,
	pub outcomes: Vec<UserOutcome>,
}

impl ProvisioningReport {
	pub(crate) fn push(&mut self, line: ReportLine) {
		if line.is_warning() {
			tracing::warn!("{line}");
		} else {
			tracing::info!("{line}");
		}
		self.lines.push(line);
	}

	pub fn warnings(&self) -> impl Iterator<Item = &ReportLine> {
		self.lines.iter().filter(|l| l.is_warning())
	}

	/// Usernames in processing order.
	pub fn usernames(&self) -> Vec<&str> {
		self.outcomes.iter().map(|o| o.username.as_str()).collect()
	}

	pub fn created_count(&self) -> usize {
		self.outcomes.iter().filter(|o| o.created).count()
	}
}

impl fmt::Display for ProvisioningReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for line in &self.lines {
			writeln!(f, "{line}")?;
		}
		Ok(())
	}
}
