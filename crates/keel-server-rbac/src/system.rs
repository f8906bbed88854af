// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! System-level robot accounts.
//!
//! A system robot carries a list of [`RobotPermission`]s. Each permission
//! names a scope and a set of relative grants:
//!
//! | kind      | namespace  | grants re-based under |
//! |-----------|------------|-----------------------|
//! | `system`  | none       | `/system`             |
//! | `project` | none       | `/project/:id` (every project) |
//! | `project` | `Some(id)` | `/project/{id}`       |
//!
//! Grants outside the scope's catalog are dropped.

use std::sync::Arc;

use keel_rbac_core::{Action, Effect, Enforcer, Namespace, Policy, Resource, SystemNamespace, User};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::evaluator::Evaluator;
use crate::scope::{self, Scope};

const ALL_PROJECTS: &str = "/project/:id";

/// Grants of one robot within one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotPermission {
	pub kind: Scope,
	/// Project id for project permissions; `None` covers every project.
	#[serde(default)]
	pub namespace: Option<i64>,
	pub access: Vec<Policy>,
}

impl RobotPermission {
	pub fn system(access: impl IntoIterator<Item = Policy>) -> Self {
		Self {
			kind: Scope::System,
			namespace: None,
			access: access.into_iter().collect(),
		}
	}

	pub fn all_projects(access: impl IntoIterator<Item = Policy>) -> Self {
		Self {
			kind: Scope::Project,
			namespace: None,
			access: access.into_iter().collect(),
		}
	}

	pub fn project(project_id: i64, access: impl IntoIterator<Item = Policy>) -> Self {
		Self {
			kind: Scope::Project,
			namespace: Some(project_id),
			access: access.into_iter().collect(),
		}
	}

	/// The resource grants are re-based under, or `None` for a system
	/// permission bound to a project.
	fn base(&self) -> Option<Resource> {
		match (self.kind, self.namespace) {
			(Scope::System, None) => Some(SystemNamespace.resource(&[])),
			(Scope::System, Some(_)) => None,
			(Scope::Project, None) => Some(Resource::from_static(ALL_PROJECTS)),
			(Scope::Project, Some(project_id)) => Some(Resource::new(format!("/project/{project_id}"))),
		}
	}
}

/// A robot account whose grants may span the system and many projects.
#[derive(Debug, Clone)]
pub struct SystemRobot {
	name: Option<String>,
	policies: Vec<Policy>,
}

impl SystemRobot {
	/// A robot holding only system-scope grants.
	pub fn new(name: impl Into<String>, grants: impl IntoIterator<Item = Policy>) -> Self {
		Self::with_permissions(name, [RobotPermission::system(grants)])
	}

	/// Builds a robot from `(resource, action, effect)` triples on the system scope.
	pub fn from_grants<I>(name: impl Into<String>, grants: I) -> Self
	where
		I: IntoIterator<Item = (Resource, Action, Effect)>,
	{
		Self::new(
			name,
			grants
				.into_iter()
				.map(|(resource, action, effect)| Policy::new(resource, action).with_effect(effect)),
		)
	}

	pub fn with_permissions(
		name: impl Into<String>,
		permissions: impl IntoIterator<Item = RobotPermission>,
	) -> Self {
		let name = name.into();
		let mut policies = Vec::new();

		for permission in permissions {
			let Some(base) = permission.base() else {
				warn!(robot = %name, namespace = ?permission.namespace, "system permission bound to a project, dropping");
				continue;
			};
			for grant in permission.access {
				if !scope::is_grantable(permission.kind, &grant.resource, &grant.action) {
					warn!(robot = %name, kind = %permission.kind, grant = %grant, "dropping grant outside scope catalog");
					continue;
				}
				policies.push(Policy {
					resource: base.subresource([&grant.resource]),
					..grant
				});
			}
		}

		Self {
			name: (!name.is_empty()).then_some(name),
			policies,
		}
	}
}

impl User for SystemRobot {
	fn username(&self) -> Option<&str> {
		self.name.as_deref()
	}

	fn policies(&self) -> Vec<Policy> {
		self.policies.clone()
	}
}

/// Enforcer over `robot`'s grants.
pub fn robot_evaluator(robot: SystemRobot) -> Arc<dyn Evaluator> {
	Arc::new(Enforcer::from_user(robot))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn check(evaluator: &dyn Evaluator, resource: &str, action: Action) -> bool {
		evaluator.has_permission(&Resource::from(resource), &action)
	}

	mod system_scope {
		use super::*;

		#[test]
		fn grants_are_rebased_under_system() {
			let robot = SystemRobot::new("robot$gc", [Policy::new(Resource::GARBAGE_COLLECTION, Action::CREATE)]);
			assert_eq!(
				robot.policies(),
				vec![Policy::new("/system/garbage-collection", Action::CREATE)]
			);
		}

		#[test]
		fn robot_evaluator_checks_system_resources() {
			let robot = SystemRobot::from_grants(
				"robot$ops",
				[
					(Resource::REGISTRY, Action::LIST, Effect::Allow),
					(Resource::REGISTRY, Action::DELETE, Effect::Deny),
					(Resource::MEMBER, Action::CREATE, Effect::Allow),
				],
			);
			let evaluator = robot_evaluator(robot);

			assert!(check(evaluator.as_ref(), "/system/registry", Action::LIST));
			assert!(!check(evaluator.as_ref(), "/system/registry", Action::DELETE));
			assert!(!check(evaluator.as_ref(), "/system/member", Action::CREATE));
			assert!(!check(evaluator.as_ref(), "/project/1/registry", Action::LIST));
		}

		#[test]
		fn nameless_robot_is_denied() {
			let evaluator = robot_evaluator(SystemRobot::new("", [Policy::new(Resource::CATALOG, Action::READ)]));
			assert!(!check(evaluator.as_ref(), "/system/catalog", Action::READ));
		}

		#[test]
		fn system_permission_with_project_is_dropped() {
			let permission = RobotPermission {
				kind: Scope::System,
				namespace: Some(3),
				access: vec![Policy::new(Resource::REGISTRY, Action::LIST)],
			};
			let robot = SystemRobot::with_permissions("robot$ops", [permission]);
			assert!(robot.policies().is_empty());
		}
	}

	mod project_scope {
		use super::*;

		#[test]
		fn all_projects_covers_every_project() {
			let robot = SystemRobot::with_permissions(
				"robot$mirror",
				[RobotPermission::all_projects([Policy::new(Resource::REPOSITORY, Action::PULL)])],
			);
			let evaluator = robot_evaluator(robot);

			assert!(check(evaluator.as_ref(), "/project/1/repository", Action::PULL));
			assert!(check(evaluator.as_ref(), "/project/2/repository", Action::PULL));
			assert!(!check(evaluator.as_ref(), "/project/1/repository", Action::PUSH));
			assert!(!check(evaluator.as_ref(), "/project/1/repository/extra", Action::PULL));
		}

		#[test]
		fn listed_projects_only() {
			let robot = SystemRobot::with_permissions(
				"robot$ci",
				[
					RobotPermission::project(1, [Policy::new(Resource::REPOSITORY, Action::PUSH)]),
					RobotPermission::project(3, [Policy::new(Resource::REPOSITORY, Action::PUSH)]),
				],
			);
			let evaluator = robot_evaluator(robot);

			assert!(check(evaluator.as_ref(), "/project/1/repository", Action::PUSH));
			assert!(check(evaluator.as_ref(), "/project/3/repository", Action::PUSH));
			assert!(!check(evaluator.as_ref(), "/project/2/repository", Action::PUSH));
		}

		#[test]
		fn mixed_scopes_validate_against_their_own_catalog() {
			let robot = SystemRobot::with_permissions(
				"robot$ops",
				[
					RobotPermission::system([
						Policy::new(Resource::SCAN_ALL, Action::CREATE),
						Policy::new(Resource::REPOSITORY, Action::PULL),
					]),
					RobotPermission::all_projects([
						Policy::new(Resource::REPOSITORY, Action::PULL),
						Policy::new(Resource::REGISTRY, Action::CREATE),
					]),
				],
			);
			assert_eq!(
				robot.policies(),
				vec![
					Policy::new("/system/scan-all", Action::CREATE),
					Policy::new("/project/:id/repository", Action::PULL),
				]
			);
		}

		#[test]
		fn self_grant_targets_the_project_root() {
			let robot = SystemRobot::with_permissions(
				"robot$reader",
				[RobotPermission::project(4, [Policy::new(Resource::SELF, Action::READ)])],
			);
			assert_eq!(robot.policies(), vec![Policy::new("/project/4", Action::READ)]);
		}

		#[test]
		fn permissions_deserialize() {
			let permission: RobotPermission = serde_json::from_str(
				r#"{"kind":"project","access":[{"resource":"repository","action":"pull"}]}"#,
			)
			.unwrap();
			assert_eq!(permission, RobotPermission::all_projects([Policy::new(Resource::REPOSITORY, Action::PULL)]));
		}
	}
}
