// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! TOML fixtures describing a caller and the projects it can see.
//!
//! ```toml
//! [principal]
//! username = "alice"
//! sys_admin = false
//!
//! [principal.roles]
//! "2" = [2]
//!
//! [[projects]]
//! id = 2
//! name = "internal"
//! public = false
//! ```
//!
//! A principal with `grants` is treated as a project robot: the grants are
//! relative to each project and checked against the project catalog.
//!
//! A principal with `permissions` is a system robot. Each entry names a
//! `kind` (`system` or `project`), an optional project `namespace` (absent
//! means every project) and its `access` list:
//!
//! ```toml
//! [[principal.permissions]]
//! kind = "project"
//! access = [{ resource = "repository", action = "pull" }]
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use keel_rbac_core::{Namespace, Policy, User};
use keel_server_config::RbacConfig;
use keel_server_rbac::{
	local, project_robot, system, Evaluator, InMemoryProjectManager, LocalContext, Project,
	ProjectRobot, RobotFactory, RobotPermission, SystemRobot,
};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
	#[serde(default)]
	pub principal: Principal,
	#[serde(default)]
	pub projects: Vec<FixtureProject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Principal {
	#[serde(default)]
	pub username: String,
	#[serde(default)]
	pub sys_admin: bool,
	/// Project id (as a string key) to role ids.
	#[serde(default)]
	pub roles: HashMap<String, Vec<i32>>,
	#[serde(default)]
	pub grants: Vec<Policy>,
	#[serde(default)]
	pub permissions: Vec<RobotPermission>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureProject {
	pub id: i64,
	pub name: String,
	#[serde(default)]
	pub public: bool,
}

impl Fixture {
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("failed to read fixture {}", path.display()))?;
		Self::parse(&content).with_context(|| format!("invalid fixture {}", path.display()))
	}

	pub fn parse(content: &str) -> Result<Self> {
		Ok(toml::from_str(content)?)
	}

	pub fn context(&self) -> Result<LocalContext> {
		let mut ctx = LocalContext::new(self.principal.username.as_str())
			.with_sys_admin(self.principal.sys_admin);
		for (project_id, role_ids) in &self.principal.roles {
			let project_id: i64 = project_id
				.parse()
				.with_context(|| format!("role key {project_id:?} is not a project id"))?;
			ctx = ctx.with_project_roles(project_id, role_ids.iter().copied());
		}
		Ok(ctx)
	}

	pub fn project_manager(&self) -> InMemoryProjectManager {
		self
			.projects
			.iter()
			.map(|project| Project::new(project.id, project.name.as_str()).with_public(project.public))
			.collect()
	}

	pub fn is_robot(&self) -> bool {
		!self.principal.grants.is_empty() || !self.principal.permissions.is_empty()
	}

	/// The evaluator for the fixture's principal.
	pub fn evaluator(&self, config: &RbacConfig) -> Result<Arc<dyn Evaluator>> {
		if !self.principal.permissions.is_empty() {
			if !self.principal.grants.is_empty() {
				bail!("principal sets both grants and permissions");
			}
			let robot = SystemRobot::with_permissions(
				self.principal.username.as_str(),
				self.principal.permissions.iter().cloned(),
			);
			return Ok(system::robot_evaluator(robot));
		}

		let ctx = Arc::new(self.context()?);
		let projects = Arc::new(self.project_manager());

		if self.is_robot() {
			let name = self.principal.username.clone();
			let grants = self.principal.grants.clone();
			let factory: RobotFactory = Arc::new(move |namespace: &dyn Namespace| {
				Arc::new(ProjectRobot::new(name.as_str(), namespace, grants.iter().cloned())) as Arc<dyn User>
			});
			return Ok(Arc::new(project_robot::evaluator(ctx, projects, factory, config)));
		}

		Ok(local::evaluator(ctx, projects, config))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use keel_rbac_core::{Action, Resource};

	const MEMBER_FIXTURE: &str = r#"
[principal]
username = "alice"

[principal.roles]
"2" = [2]

[[projects]]
id = 1
name = "library"
public = true

[[projects]]
id = 2
name = "internal"
"#;

	fn check(evaluator: &dyn Evaluator, resource: &str, action: Action) -> bool {
		evaluator.has_permission(&Resource::from(resource), &action)
	}

	#[test]
	fn parses_member_fixture() {
		let fixture = Fixture::parse(MEMBER_FIXTURE).unwrap();
		assert_eq!(fixture.principal.username, "alice");
		assert_eq!(fixture.projects.len(), 2);
		assert!(fixture.projects[0].public);
		assert!(!fixture.is_robot());
	}

	#[test]
	fn member_fixture_evaluates() {
		let fixture = Fixture::parse(MEMBER_FIXTURE).unwrap();
		let eval = fixture.evaluator(&RbacConfig::default()).unwrap();
		assert!(check(eval.as_ref(), "/project/2/repository", Action::PUSH));
		assert!(!check(eval.as_ref(), "/project/1/repository", Action::PUSH));
	}

	#[test]
	fn robot_fixture_evaluates() {
		let fixture = Fixture::parse(
			r#"
[principal]
username = "robot$ci"
grants = [
	{ resource = "repository", action = "pull" },
	{ resource = "repository", action = "push", effect = "deny" },
]

[[projects]]
id = 7
name = "apps"
"#,
		)
		.unwrap();
		assert!(fixture.is_robot());
		let eval = fixture.evaluator(&RbacConfig::default()).unwrap();
		assert!(check(eval.as_ref(), "/project/7/repository", Action::PULL));
		assert!(!check(eval.as_ref(), "/project/7/repository", Action::PUSH));
	}

	#[test]
	fn system_robot_fixture_evaluates() {
		let fixture = Fixture::parse(
			r#"
[principal]
username = "robot$mirror"

[[principal.permissions]]
kind = "system"
access = [{ resource = "registry", action = "list" }]

[[principal.permissions]]
kind = "project"
access = [{ resource = "repository", action = "pull" }]

[[principal.permissions]]
kind = "project"
namespace = 2
access = [{ resource = "repository", action = "push" }]
"#,
		)
		.unwrap();
		assert!(fixture.is_robot());
		let eval = fixture.evaluator(&RbacConfig::default()).unwrap();
		assert!(check(eval.as_ref(), "/system/registry", Action::LIST));
		assert!(check(eval.as_ref(), "/project/1/repository", Action::PULL));
		assert!(check(eval.as_ref(), "/project/2/repository", Action::PUSH));
		assert!(!check(eval.as_ref(), "/project/1/repository", Action::PUSH));
	}

	#[test]
	fn grants_and_permissions_are_exclusive() {
		let fixture = Fixture::parse(
			r#"
[principal]
username = "robot$both"
grants = [{ resource = "repository", action = "pull" }]

[[principal.permissions]]
kind = "system"
access = [{ resource = "catalog", action = "read" }]
"#,
		)
		.unwrap();
		assert!(fixture.evaluator(&RbacConfig::default()).is_err());
	}

	#[test]
	fn bad_role_key_is_rejected() {
		let fixture = Fixture::parse("[principal]\nusername = \"a\"\n[principal.roles]\nlibrary = [1]\n").unwrap();
		assert!(fixture.context().is_err());
	}

	#[test]
	fn empty_fixture_is_anonymous() {
		let fixture = Fixture::parse("").unwrap();
		let eval = fixture.evaluator(&RbacConfig::default()).unwrap();
		assert!(!check(eval.as_ref(), "/project/1/repository", Action::PULL));
	}

	#[test]
	fn load_reports_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let err = Fixture::load(&dir.path().join("missing.toml")).unwrap_err();
		assert!(err.to_string().contains("failed to read fixture"));
	}
}
