// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization domain types for HerBridge.
//!
//! This crate provides:
//! - [`User`], [`Group`] and [`Permission`] entities keyed by unique strings
//! - ID newtypes ([`UserId`], [`GroupId`], [`PermissionId`])
//! - Argon2 password hashing ([`hash_password`], [`verify_password`])

mod argon2_config;
pub mod error;
pub mod group;
pub mod password;
pub mod types;
pub mod user;

pub use error::AuthError;
pub use group::{Group, Permission};
pub use password::{hash_password, verify_password};
pub use types::{GroupId, PermissionId, UserId};
pub use user::{AdminFlags, User};
