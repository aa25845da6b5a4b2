// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret wrapper for passwords and other sensitive values.
//!
//! [`Secret<T>`] never prints its contents through `Debug` or `Display` and
//! zeroizes the inner value when dropped. Use [`Secret::expose`] at the single
//! point where the raw value is actually needed (e.g. hashing).

use std::fmt;

use zeroize::Zeroize;

/// Placeholder printed instead of a secret value.
pub const REDACTED: &str = "[REDACTED]";

/// A value that must not leak into logs or reports.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret<T: Zeroize> {
	inner: T,
}

/// A secret string, the common case for passwords.
pub type SecretString = Secret<String>;

impl<T: Zeroize> Secret<T> {
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Borrow the raw value.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

impl<T: Zeroize> Drop for Secret<T> {
	fn drop(&mut self) {
		self.inner.zeroize();
	}
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T: Zeroize> fmt::Display for Secret<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for Secret<T>
where
	T: Zeroize + serde::Deserialize<'de>,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		T::deserialize(deserializer).map(Secret::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_and_display_are_redacted() {
		let secret = SecretString::from("hunter2");
		assert_eq!(format!("{secret:?}"), REDACTED);
		assert_eq!(format!("{secret}"), REDACTED);
	}

	#[test]
	fn expose_returns_inner_value() {
		let secret = SecretString::new("pw1".to_string());
		assert_eq!(secret.expose(), "pw1");
	}

	#[test]
	fn deserializes_from_plain_string() {
		let secret: SecretString = serde_json::from_str("\"s3cret\"").unwrap();
		assert_eq!(secret.expose(), "s3cret");
	}

	proptest! {
		#[test]
		fn debug_never_contains_value(value in "[a-zA-Z0-9]{4,32}") {
			prop_assume!(!REDACTED.contains(&value));
			let secret = SecretString::new(value.clone());
			let debug_output = format!("{secret:?}");
			prop_assert!(!debug_output.contains(&value));
		}
	}
}
