// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Project-scope evaluator for robot accounts.
//!
//! A robot's permissions come from an injected factory rather than role
//! bindings. On a public project the public policy set is tried after the
//! robot's own grants, so a robot can always pull what an anonymous
//! visitor can.

use std::sync::Arc;

use keel_rbac_core::namespace::PROJECT_KIND;
use keel_rbac_core::{Enforcer, Namespace, Policy, User};
use keel_server_config::RbacConfig;
use tracing::{debug, instrument, warn};

use crate::evaluator::{Evaluator, EvaluatorList, NamespaceEvaluator};
use crate::project::{Project, ProjectManager};
use crate::project_rbac::public_enforcer;
use crate::scope::{self, Scope};
use crate::security::SecurityContext;

/// Produces the robot principal for one project namespace.
pub type RobotFactory = Arc<dyn Fn(&dyn Namespace) -> Arc<dyn User> + Send + Sync>;

/// Builds the project-scope evaluator for a robot session.
pub fn evaluator(
	ctx: Arc<dyn SecurityContext>,
	projects: Arc<dyn ProjectManager>,
	robot_factory: RobotFactory,
	config: &RbacConfig,
) -> NamespaceEvaluator {
	let anonymous_username = config.anonymous_username.clone();
	let evaluator = NamespaceEvaluator::new(PROJECT_KIND, move |namespace: &dyn Namespace| {
		let Some(project) = projects.get(namespace.identity())? else {
			debug!(project_id = namespace.identity(), "project not found");
			return Ok(None);
		};
		Ok(robot_evaluator(
			ctx.as_ref(),
			&project,
			&robot_factory,
			&anonymous_username,
		))
	});

	match config.namespace_cache_capacity {
		Some(capacity) => evaluator.with_capacity(capacity),
		None => evaluator,
	}
}

#[instrument(
	level = "debug",
	skip(ctx, project, robot_factory, anonymous_username),
	fields(context = ctx.name(), project_id = project.project_id, public = project.is_public())
)]
fn robot_evaluator(
	ctx: &dyn SecurityContext,
	project: &Project,
	robot_factory: &RobotFactory,
	anonymous_username: &str,
) -> Option<Arc<dyn Evaluator>> {
	if ctx.is_authenticated() {
		let namespace: &dyn Namespace = &project.namespace();
		let robot = robot_factory(namespace);
		let mut list = EvaluatorList::new().with(Enforcer::new(robot));
		if project.is_public() {
			list.push(public_enforcer(project, anonymous_username));
		}
		return Some(Arc::new(list));
	}

	if project.is_public() {
		return Some(public_enforcer(project, anonymous_username));
	}

	None
}

/// A robot account limited to one project.
///
/// Grants are relative to the project. Grants outside the project catalog
/// are dropped with a warning.
#[derive(Debug, Clone)]
pub struct ProjectRobot {
	name: Option<String>,
	policies: Vec<Policy>,
}

impl ProjectRobot {
	pub fn new(
		name: impl Into<String>,
		namespace: &dyn Namespace,
		grants: impl IntoIterator<Item = Policy>,
	) -> Self {
		let name = name.into();
		let policies = grants
			.into_iter()
			.filter(|grant| {
				let grantable = scope::is_grantable(Scope::Project, &grant.resource, &grant.action);
				if !grantable {
					warn!(robot = %name, grant = %grant, "dropping grant outside project scope");
				}
				grantable
			})
			.map(|grant| grant.in_namespace(namespace))
			.collect();

		Self {
			name: (!name.is_empty()).then_some(name),
			policies,
		}
	}
}

impl User for ProjectRobot {
	fn username(&self) -> Option<&str> {
		self.name.as_deref()
	}

	fn policies(&self) -> Vec<Policy> {
		self.policies.clone()
	}
}
