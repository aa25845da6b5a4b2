// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! herbridge-admin - administrative commands for the HerBridge
//! authorization store.
//!
//! The command report goes to stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use herbridge_config::{load_config, load_config_with_file, AdminConfig};
use herbridge_provisioning::{CacheScope, ProvisioningOptions};

mod commands;

/// HerBridge admin tool
#[derive(Parser, Debug)]
#[command(name = "herbridge-admin", version, about, long_about = None)]
struct Args {
	/// Path to a configuration file (default: /etc/herbridge/admin.toml)
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Database URL (overrides config)
	#[arg(long)]
	database_url: Option<String>,

	/// Log level or filter directive (overrides config)
	#[arg(short, long)]
	log_level: Option<String>,

	/// Output logs as JSON
	#[arg(long)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Create users and attach them to groups and permissions
	MakeSuperusers {
		/// Comma-separated username:password pairs
		users: String,
		/// Comma-separated group names
		groups: String,
		/// Comma-separated permission codenames; omit to leave permissions alone
		permissions: Option<String>,
		/// Commit each write on its own instead of in one transaction
		#[arg(long)]
		non_atomic: bool,
		/// Do not mark new users as staff and superuser
		#[arg(long)]
		no_admin_flags: bool,
		/// Print the report as JSON
		#[arg(long)]
		json: bool,
	},
	/// List all usernames
	ListUsers {
		#[arg(long)]
		json: bool,
	},
	/// List all group names
	ListGroups {
		#[arg(long)]
		json: bool,
	},
	/// List all permission codenames
	ListPermissions {
		#[arg(long)]
		json: bool,
	},
	/// Show a user's permission codenames, caching them for later lookups
	UserPerms {
		username: String,
		#[arg(long)]
		json: bool,
	},
	/// Clear cached permission sets
	ClearPermCache {
		/// Clear only this user's entry
		#[arg(long, conflicts_with = "all")]
		user: Option<String>,
		/// Clear the entire cache
		#[arg(long)]
		all: bool,
	},
	/// Create the database tables
	Migrate,
	/// Create a group if it does not exist
	CreateGroup { name: String },
	/// Create a permission if it does not exist
	CreatePermission {
		codename: String,
		/// Human-readable name (defaults to the codename)
		#[arg(long)]
		name: Option<String>,
	},
}

impl Command {
	fn name(&self) -> &'static str {
		match self {
			Self::MakeSuperusers { .. } => "make-superusers",
			Self::ListUsers { .. } => "list-users",
			Self::ListGroups { .. } => "list-groups",
			Self::ListPermissions { .. } => "list-permissions",
			Self::UserPerms { .. } => "user-perms",
			Self::ClearPermCache { .. } => "clear-perm-cache",
			Self::Migrate => "migrate",
			Self::CreateGroup { .. } => "create-group",
			Self::CreatePermission { .. } => "create-permission",
		}
	}
}

fn load_admin_config(args: &Args) -> Result<AdminConfig> {
	let mut config = match &args.config {
		Some(path) => load_config_with_file(path),
		None => load_config(),
	}
	.context("failed to load configuration")?;

	if let Some(url) = &args.database_url {
		config.database.url = url.clone();
	}
	if let Some(level) = &args.log_level {
		config.logging.level = level.clone();
	}
	Ok(config)
}

fn init_tracing(level: &str, json: bool) -> Result<()> {
	let filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => EnvFilter::try_new(level)
			.with_context(|| format!("invalid log level '{level}'"))?,
	};

	if json {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().with_writer(std::io::stderr))
			.init();
	}
	Ok(())
}

fn provisioning_options(
	config: &AdminConfig,
	non_atomic: bool,
	no_admin_flags: bool,
) -> ProvisioningOptions {
	ProvisioningOptions {
		atomic: config.provisioning.atomic && !non_atomic,
		grant_admin_flags: config.provisioning.grant_admin_flags && !no_admin_flags,
	}
}

fn cache_scope(user: Option<String>, all: bool) -> CacheScope {
	match (user, all) {
		(Some(name), _) => CacheScope::User(name),
		(None, true) => CacheScope::Everything,
		(None, false) => CacheScope::AllUsers,
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	// Tracing is not up yet, so configuration is loaded silently.
	let config = load_admin_config(&args)?;
	init_tracing(&config.logging.level, args.json_logs)?;

	info!(command = args.command.name(), database = %config.database.url, "starting");

	let pool = herbridge_db::create_pool(&config.database.url)
		.await
		.with_context(|| format!("failed to open database {}", config.database.url))?;

	let output = match args.command {
		Command::MakeSuperusers {
			users,
			groups,
			permissions,
			non_atomic,
			no_admin_flags,
			json,
		} => {
			let options = provisioning_options(&config, non_atomic, no_admin_flags);
			commands::make_superusers(
				&pool,
				options,
				&users,
				&groups,
				permissions.as_deref(),
				json,
			)
			.await?
		}
		Command::ListUsers { json } => commands::list(&pool, commands::Listing::Users, json).await?,
		Command::ListGroups { json } => commands::list(&pool, commands::Listing::Groups, json).await?,
		Command::ListPermissions { json } => {
			commands::list(&pool, commands::Listing::Permissions, json).await?
		}
		Command::UserPerms { username, json } => {
			commands::user_perms(&pool, &username, json).await?
		}
		Command::ClearPermCache { user, all } => {
			commands::clear_perm_cache(&pool, &cache_scope(user, all)).await?
		}
		Command::Migrate => commands::migrate(&pool).await?,
		Command::CreateGroup { name } => commands::create_group(&pool, &name).await?,
		Command::CreatePermission { codename, name } => {
			commands::create_permission(&pool, &codename, name).await?
		}
	};

	print!("{output}");
	pool.close().await;
	debug!("done");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(argv: &[&str]) -> Args {
		Args::try_parse_from(std::iter::once("herbridge-admin").chain(argv.iter().copied()))
			.unwrap()
	}

	#[test]
	fn make_superusers_without_permissions() {
		let args = parse(&["make-superusers", "alice:pw1,bob:pw2", "editors"]);
		match args.command {
			Command::MakeSuperusers {
				users,
				groups,
				permissions,
				non_atomic,
				no_admin_flags,
				json,
			} => {
				assert_eq!(users, "alice:pw1,bob:pw2");
				assert_eq!(groups, "editors");
				assert_eq!(permissions, None);
				assert!(!non_atomic);
				assert!(!no_admin_flags);
				assert!(!json);
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn empty_permissions_argument_is_kept() {
		let args = parse(&["make-superusers", "alice:pw1", "", ""]);
		match args.command {
			Command::MakeSuperusers { permissions, .. } => {
				assert_eq!(permissions.as_deref(), Some(""))
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn global_flags() {
		let args = parse(&[
			"--config",
			"/tmp/admin.toml",
			"--database-url",
			"sqlite::memory:",
			"--log-level",
			"debug",
			"migrate",
		]);
		assert_eq!(args.config, Some(PathBuf::from("/tmp/admin.toml")));
		assert_eq!(args.database_url.as_deref(), Some("sqlite::memory:"));
		assert_eq!(args.log_level.as_deref(), Some("debug"));
		assert!(matches!(args.command, Command::Migrate));
	}

	#[test]
	fn user_and_all_conflict() {
		let result = Args::try_parse_from([
			"herbridge-admin",
			"clear-perm-cache",
			"--user",
			"alice",
			"--all",
		]);
		assert!(result.is_err());
	}

	#[test]
	fn cache_scope_selection() {
		assert_eq!(
			cache_scope(Some("alice".into()), false),
			CacheScope::User("alice".into())
		);
		assert_eq!(cache_scope(None, true), CacheScope::Everything);
		assert_eq!(cache_scope(None, false), CacheScope::AllUsers);
	}

	#[test]
	fn cli_flags_only_narrow_config() {
		let config = AdminConfig::default();
		assert_eq!(
			provisioning_options(&config, false, false),
			ProvisioningOptions::default()
		);

		let options = provisioning_options(&config, true, true);
		assert!(!options.atomic);
		assert!(!options.grant_admin_flags);

		let mut config = AdminConfig::default();
		config.provisioning.atomic = false;
		assert!(!provisioning_options(&config, false, false).atomic);
	}

	#[test]
	fn create_permission_with_name() {
		let args = parse(&["create-permission", "can_edit", "--name", "Can edit"]);
		match args.command {
			Command::CreatePermission { codename, name } => {
				assert_eq!(codename, "can_edit");
				assert_eq!(name.as_deref(), Some("Can edit"));
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn user_perms_takes_a_username() {
		let args = parse(&["user-perms", "bob smith", "--json"]);
		assert_eq!(args.command.name(), "user-perms");
		match args.command {
			Command::UserPerms { username, json } => {
				assert_eq!(username, "bob smith");
				assert!(json);
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}
}
