// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Errors surfaced by the authorization store and permission cache.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("invalid database URL '{url}': {message}")]
	InvalidUrl { url: String, message: String },

	#[error("not found: {0}")]
	NotFound(String),

	/// A stored row could not be decoded into a domain type.
	#[error("corrupt row: {0}")]
	Corrupt(String),

	#[error("cache value encoding error: {0}")]
	Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;
