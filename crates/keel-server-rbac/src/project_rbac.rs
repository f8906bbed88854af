// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Project-scope evaluator for members and anonymous visitors.
//!
//! For each project a request touches, the evaluator loads the project and
//! builds one enforcer:
//!
//! - an authenticated caller is evaluated through the roles it holds in
//!   the project,
//! - an anonymous caller on a public project gets the public policy set,
//! - anything else, including a missing project, is denied.

use std::sync::Arc;

use keel_rbac_core::namespace::PROJECT_KIND;
use keel_rbac_core::{Enforcer, Namespace, Role, SimpleUser};
use keel_server_config::RbacConfig;
use tracing::{debug, instrument};

use crate::evaluator::{Evaluator, NamespaceEvaluator};
use crate::project::{Project, ProjectManager};
use crate::roles::{self, ProjectRole};
use crate::security::SecurityContext;

/// Builds the project-scope evaluator for `ctx`.
pub fn evaluator(
	ctx: Arc<dyn SecurityContext>,
	projects: Arc<dyn ProjectManager>,
	config: &RbacConfig,
) -> NamespaceEvaluator {
	let anonymous_username = config.anonymous_username.clone();
	let evaluator = NamespaceEvaluator::new(PROJECT_KIND, move |namespace: &dyn Namespace| {
		let Some(project) = projects.get(namespace.identity())? else {
			debug!(project_id = namespace.identity(), "project not found");
			return Ok(None);
		};
		Ok(project_evaluator(ctx.as_ref(), &project, &anonymous_username))
	});

	match config.namespace_cache_capacity {
		Some(capacity) => evaluator.with_capacity(capacity),
		None => evaluator,
	}
}

#[instrument(
	level = "debug",
	skip(ctx, project, anonymous_username),
	fields(context = ctx.name(), project_id = project.project_id, public = project.is_public())
)]
fn project_evaluator(
	ctx: &dyn SecurityContext,
	project: &Project,
	anonymous_username: &str,
) -> Option<Arc<dyn Evaluator>> {
	if ctx.is_authenticated() {
		let user = member_user(ctx, project);
		return Some(Arc::new(Enforcer::from_user(user)));
	}

	if project.is_public() {
		return Some(public_enforcer(project, anonymous_username));
	}

	debug!("anonymous caller on private project");
	None
}

/// The caller as seen inside `project`: no direct policies, one role per
/// role id it holds there.
pub fn member_user(ctx: &dyn SecurityContext, project: &Project) -> SimpleUser {
	let role_ids = ctx.project_roles(project.project_id);
	let roles = role_ids
		.into_iter()
		.map(|role_id| Arc::new(ProjectRole::new(project.project_id, role_id)) as Arc<dyn Role>);
	SimpleUser::new(ctx.username().unwrap_or_default()).with_roles(roles)
}

/// Enforcer holding the public policy set re-based under `project`.
pub fn public_enforcer(project: &Project, anonymous_username: &str) -> Arc<dyn Evaluator> {
	let namespace = project.namespace();
	let policies = roles::public_policies()
		.iter()
		.map(|policy| policy.in_namespace(&namespace));
	let user = SimpleUser::new(anonymous_username).with_policies(policies);
	Arc::new(Enforcer::from_user(user))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::project::InMemoryProjectManager;
	use crate::security::LocalContext;
	use keel_rbac_core::{Action, Resource, User};

	fn projects() -> Arc<dyn ProjectManager> {
		Arc::new(
			[
				Project::new(1, "library").with_public(true),
				Project::new(2, "private"),
			]
			.into_iter()
			.collect::<InMemoryProjectManager>(),
		)
	}

	fn check(evaluator: &dyn Evaluator, resource: &str, action: Action) -> bool {
		evaluator.has_permission(&Resource::from(resource), &action)
	}

	#[test]
	fn member_user_maps_role_ids() {
		let ctx = LocalContext::new("alice").with_project_roles(2, [roles::DEVELOPER, 99]);
		let user = member_user(&ctx, &Project::new(2, "private"));
		assert_eq!(user.username(), Some("alice"));
		assert!(user.policies().is_empty());
		let names: Vec<_> = user
			.roles()
			.iter()
			.map(|role| role.role_name().map(str::to_string))
			.collect();
		assert_eq!(names, vec![Some("developer".to_string()), None]);
	}

	#[test]
	fn developer_can_push_guest_cannot() {
		let config = RbacConfig::default();
		let developer = LocalContext::new("dev").with_project_roles(2, [roles::DEVELOPER]);
		let guest = LocalContext::new("guest").with_project_roles(2, [roles::GUEST]);

		let dev_eval = evaluator(Arc::new(developer), projects(), &config);
		let guest_eval = evaluator(Arc::new(guest), projects(), &config);

		assert!(check(&dev_eval, "/project/2/repository", Action::PUSH));
		assert!(check(&guest_eval, "/project/2/repository", Action::PULL));
		assert!(!check(&guest_eval, "/project/2/repository", Action::PUSH));
	}

	#[test]
	fn roles_do_not_leak_across_projects() {
		let ctx = LocalContext::new("admin1").with_project_roles(2, [roles::PROJECT_ADMIN]);
		let eval = evaluator(Arc::new(ctx), projects(), &RbacConfig::default());

		assert!(check(&eval, "/project/2/member", Action::CREATE));
		assert!(!check(&eval, "/project/1/member", Action::CREATE));
	}

	#[test]
	fn non_member_is_denied_on_private_project() {
		let ctx = LocalContext::new("stranger");
		let eval = evaluator(Arc::new(ctx), projects(), &RbacConfig::default());
		assert!(!check(&eval, "/project/2/repository", Action::PULL));
	}

	#[test]
	fn missing_project_is_denied() {
		let ctx = LocalContext::new("alice").with_project_roles(3, [roles::PROJECT_ADMIN]);
		let eval = evaluator(Arc::new(ctx), projects(), &RbacConfig::default());
		assert!(!check(&eval, "/project/3/repository", Action::PULL));
	}

	#[test]
	fn cache_capacity_comes_from_config() {
		let config = RbacConfig {
			namespace_cache_capacity: Some(1),
			..Default::default()
		};
		let eval = evaluator(Arc::new(LocalContext::anonymous()), projects(), &config);
		assert!(check(&eval, "/project/1/repository", Action::PULL));
		assert!(!check(&eval, "/project/2/repository", Action::PULL));
		assert_eq!(eval.cached_len(), 1);
	}

	#[test]
	fn public_enforcer_is_scoped_to_project() {
		let project = Project::new(1, "library").with_public(true);
		let enforcer = public_enforcer(&project, "anonymous");
		assert!(check(enforcer.as_ref(), "/project/1/repository", Action::PULL));
		assert!(check(enforcer.as_ref(), "/project/1", Action::READ));
		assert!(!check(enforcer.as_ref(), "/project/2/repository", Action::PULL));
		assert!(!check(enforcer.as_ref(), "/project/1/member", Action::LIST));
	}
}
