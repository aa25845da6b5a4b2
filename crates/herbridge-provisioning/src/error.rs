// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

use herbridge_auth::AuthError;
use herbridge_db::DbError;

/// Errors that can occur during provisioning.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
	/// A `username:password` entry could not be parsed. Raised before any
	/// write.
	#[error("malformed user entry '{entry}': {reason}")]
	MalformedInput { entry: String, reason: String },

	#[error("database error: {0}")]
	Database(#[from] DbError),

	#[error("password hashing failed: {0}")]
	PasswordHash(String),

	#[error("user not found: {0}")]
	UserNotFound(String),
}

impl From<AuthError> for ProvisioningError {
	fn from(err: AuthError) -> Self {
		match err {
			AuthError::PasswordHash(message) => Self::PasswordHash(message),
		}
	}
}

pub type Result<T> = std::result::Result<T, ProvisioningError>;
