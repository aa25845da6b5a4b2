// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The mergeable, all-optional form of [`crate::AdminConfig`].

use serde::Deserialize;

use crate::sections::{DatabaseConfigLayer, LoggingConfigLayer, ProvisioningConfigLayer};

/// One source's view of the configuration. Mirrors the TOML file layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfigLayer {
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub provisioning: Option<ProvisioningConfigLayer>,
}

impl AdminConfigLayer {
	/// Overlay `other` on top of `self`. Values set in `other` win.
	pub fn merge(&mut self, other: AdminConfigLayer) {
		merge_section(&mut self.database, other.database, DatabaseConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		merge_section(
			&mut self.provisioning,
			other.provisioning,
			ProvisioningConfigLayer::merge,
		);
	}
}

fn merge_section<T>(current: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	match (current.as_mut(), other) {
		(Some(existing), Some(other)) => merge(existing, other),
		(None, Some(other)) => *current = Some(other),
		(_, None) => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_full_file() {
		let layer: AdminConfigLayer = toml::from_str(
			r#"
			[database]
			url = "sqlite:/srv/herbridge.db"

			[logging]
			level = "debug"

			[provisioning]
			atomic = false
			grant_admin_flags = false
			"#,
		)
		.unwrap();

		assert_eq!(
			layer.database.unwrap().url.as_deref(),
			Some("sqlite:/srv/herbridge.db")
		);
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("debug"));
		let provisioning = layer.provisioning.unwrap();
		assert_eq!(provisioning.atomic, Some(false));
		assert_eq!(provisioning.grant_admin_flags, Some(false));
	}

	#[test]
	fn rejects_unknown_keys() {
		let result: Result<AdminConfigLayer, _> = toml::from_str("[database]\nuri = \"x\"\n");
		assert!(result.is_err());
	}

	#[test]
	fn merge_fills_missing_sections_and_overrides_fields() {
		let mut base: AdminConfigLayer =
			toml::from_str("[logging]\nlevel = \"info\"\n[provisioning]\natomic = false\n").unwrap();
		let over: AdminConfigLayer =
			toml::from_str("[database]\nurl = \"sqlite::memory:\"\n[provisioning]\ngrant_admin_flags = false\n")
				.unwrap();

		base.merge(over);

		assert_eq!(base.database.unwrap().url.as_deref(), Some("sqlite::memory:"));
		assert_eq!(base.logging.unwrap().level.as_deref(), Some("info"));
		let provisioning = base.provisioning.unwrap();
		assert_eq!(provisioning.atomic, Some(false));
		assert_eq!(provisioning.grant_admin_flags, Some(false));
	}
}
