// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod database;
mod logging;
mod provisioning;

pub use database::{DatabaseConfig, DatabaseConfigLayer, DEFAULT_DATABASE_URL};
pub use logging::{LoggingConfig, LoggingConfigLayer, DEFAULT_LOG_LEVEL};
pub use provisioning::{ProvisioningConfig, ProvisioningConfigLayer};
