// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Errors raised by authorization domain helpers.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
	#[error("password hashing failed: {0}")]
	PasswordHash(String),
}
