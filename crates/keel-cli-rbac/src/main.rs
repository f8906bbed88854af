// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `keel-rbac`: evaluate registry permission checks from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keel_rbac_core::{Action, Resource};
use keel_server_config::{LogFormat, LoggingConfig, ServerConfig};
use keel_server_rbac::{roles, Evaluator};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod fixture;

use fixture::Fixture;

/// Keel registry permission checker.
#[derive(Parser, Debug)]
#[command(name = "keel-rbac", about = "Evaluate Keel registry permissions", version)]
struct Args {
	/// Server config file (defaults to /etc/keel/server.toml)
	#[arg(long, global = true, env = "KEEL_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Check one resource against one or more actions
	Check {
		/// TOML fixture with the principal and projects
		#[arg(long)]
		fixture: PathBuf,

		/// Resource path, e.g. /project/1/repository
		resource: String,

		/// Actions to check, e.g. pull push
		#[arg(required = true)]
		actions: Vec<String>,
	},
	/// Print the project role table
	Roles {
		/// Emit JSON instead of text
		#[arg(long)]
		json: bool,
	},
}

#[derive(Debug, Serialize)]
struct RoleEntry {
	id: i32,
	name: &'static str,
	policies: Vec<String>,
}

fn main() -> Result<()> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => keel_server_config::load_config_with_file(path.clone())
			.with_context(|| format!("failed to load config {}", path.display()))?,
		None => keel_server_config::load_config().context("failed to load config")?,
	};
	init_tracing(&config.logging);

	match args.command {
		Command::Check {
			fixture,
			resource,
			actions,
		} => {
			for line in check(&config, &fixture, &resource, &actions)? {
				println!("{line}");
			}
		}
		Command::Roles { json } => {
			if json {
				println!("{}", serde_json::to_string_pretty(&role_entries())?);
			} else {
				for entry in role_entries() {
					println!("{} {} ({} policies)", entry.id, entry.name, entry.policies.len());
					for policy in &entry.policies {
						println!("  {policy}");
					}
				}
			}
		}
	}

	Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);

	match logging.format {
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.init(),
		LogFormat::Pretty => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init(),
	}
}

/// One `<action> <allow|deny>` line per requested action.
fn check(
	config: &ServerConfig,
	fixture: &std::path::Path,
	resource: &str,
	actions: &[String],
) -> Result<Vec<String>> {
	let fixture = Fixture::load(fixture)?;
	let evaluator = fixture.evaluator(&config.rbac)?;
	let resource = Resource::from(resource);

	tracing::info!(
		principal = %fixture.principal.username,
		robot = fixture.is_robot(),
		resource = %resource,
		"checking permissions"
	);

	Ok(actions
		.iter()
		.map(|action| {
			let allowed = evaluator.has_permission(&resource, &Action::from(action.as_str()));
			format!("{action} {}", if allowed { "allow" } else { "deny" })
		})
		.collect())
}

fn role_entries() -> Vec<RoleEntry> {
	roles::ROLES
		.iter()
		.map(|&(id, name)| RoleEntry {
			id,
			name,
			policies: roles::role_policies(name)
				.iter()
				.map(ToString::to_string)
				.collect(),
		})
		.collect()
}
