// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bulk provisioning of administrative users.
//!
//! A request names users (`alice:pw1,bob:pw2`), groups and, optionally,
//! permissions. Each user is created if missing, then attached to every
//! group and permission that exists. Names that do not resolve are reported
//! as warnings and skipped.
//!
//! ```ignore
//! let request = ProvisioningRequest::parse("alice:pw1", "editors", Some("can_edit"))?;
//! let report = ProvisioningService::new(pool, ProvisioningOptions::default())
//!     .execute(&request)
//!     .await?;
//! print!("{report}");
//! ```

mod batch;
mod cache;
mod error;
mod report;
mod request;

pub use batch::{run_batch, ProvisioningOptions, ProvisioningService};
pub use cache::{clear_permission_cache, user_permissions, CacheScope, PERMISSION_CACHE_TTL_SECS};
pub use error::{ProvisioningError, Result};
pub use report::{ProvisioningReport, ReportLine, UserOutcome};
pub use request::{ProvisioningRequest, UserSpec};
