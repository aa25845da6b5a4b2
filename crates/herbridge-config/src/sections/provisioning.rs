// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Defaults for `make-superusers`.

use serde::Deserialize;

/// Provisioning configuration (runtime, fully resolved).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisioningConfig {
	/// Run each batch inside a single transaction.
	pub atomic: bool,
	/// Mark newly created users as staff and superuser.
	pub grant_admin_flags: bool,
}

impl Default for ProvisioningConfig {
	fn default() -> Self {
		Self {
			atomic: true,
			grant_admin_flags: true,
		}
	}
}

/// Provisioning configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvisioningConfigLayer {
	#[serde(default)]
	pub atomic: Option<bool>,
	#[serde(default)]
	pub grant_admin_flags: Option<bool>,
}

impl ProvisioningConfigLayer {
	pub fn merge(&mut self, other: ProvisioningConfigLayer) {
		if other.atomic.is_some() {
			self.atomic = other.atomic;
		}
		if other.grant_admin_flags.is_some() {
			self.grant_admin_flags = other.grant_admin_flags;
		}
	}

	pub fn finalize(self) -> ProvisioningConfig {
		let defaults = ProvisioningConfig::default();
		ProvisioningConfig {
			atomic: self.atomic.unwrap_or(defaults.atomic),
			grant_admin_flags: self.grant_admin_flags.unwrap_or(defaults.grant_admin_flags),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn atomic_and_elevated_by_default() {
		let config = ProvisioningConfigLayer::default().finalize();
		assert!(config.atomic);
		assert!(config.grant_admin_flags);
	}

	proptest! {
		#[test]
		fn merge_keeps_fields_the_other_layer_leaves_unset(
			base_atomic in proptest::option::of(any::<bool>()),
			base_flags in proptest::option::of(any::<bool>()),
			over_atomic in proptest::option::of(any::<bool>()),
			over_flags in proptest::option::of(any::<bool>()),
		) {
			let mut layer = ProvisioningConfigLayer {
				atomic: base_atomic,
				grant_admin_flags: base_flags,
			};
			layer.merge(ProvisioningConfigLayer {
				atomic: over_atomic,
				grant_admin_flags: over_flags,
			});
			prop_assert_eq!(layer.atomic, over_atomic.or(base_atomic));
			prop_assert_eq!(layer.grant_admin_flags, over_flags.or(base_flags));
		}
	}
}
