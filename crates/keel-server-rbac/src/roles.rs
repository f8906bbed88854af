// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Project roles and the policy tables behind them.
//!
//! Role policies are written relative to a project and re-based under
//! `/project/{id}` by [`ProjectRole`]. Unknown role ids have no name and
//! grant nothing.

use std::collections::HashMap;
use std::sync::LazyLock;

use keel_rbac_core::{Action, Policy, ProjectNamespace, Resource, Role};

pub const PROJECT_ADMIN: i32 = 1;
pub const DEVELOPER: i32 = 2;
pub const GUEST: i32 = 3;
pub const MAINTAINER: i32 = 4;
pub const LIMITED_GUEST: i32 = 5;

/// Every known role, by id.
pub const ROLES: [(i32, &str); 5] = [
	(PROJECT_ADMIN, "projectAdmin"),
	(MAINTAINER, "maintainer"),
	(DEVELOPER, "developer"),
	(GUEST, "guest"),
	(LIMITED_GUEST, "limitedGuest"),
];

pub fn role_name(role_id: i32) -> Option<&'static str> {
	ROLES
		.iter()
		.find(|(id, _)| *id == role_id)
		.map(|(_, name)| *name)
}

/// Relative policies granted by the role called `name`.
pub fn role_policies(name: &str) -> &'static [Policy] {
	ROLE_POLICIES.get(name).map(Vec::as_slice).unwrap_or(&[])
}

/// Relative policies granted to anonymous callers on a public project.
pub fn public_policies() -> &'static [Policy] {
	&PUBLIC_POLICIES
}

fn grants(pairs: &[(Resource, Action)]) -> Vec<Policy> {
	pairs
		.iter()
		.map(|(resource, action)| Policy::new(resource.clone(), action.clone()))
		.collect()
}

static PUBLIC_POLICIES: LazyLock<Vec<Policy>> = LazyLock::new(|| {
	use Action as A;
	use Resource as R;

	grants(&[
		(R::SELF, A::READ),
		(R::LABEL, A::READ),
		(R::LABEL, A::LIST),
		(R::REPOSITORY, A::READ),
		(R::REPOSITORY, A::LIST),
		(R::REPOSITORY, A::PULL),
		(R::HELM_CHART, A::READ),
		(R::HELM_CHART, A::LIST),
		(R::HELM_CHART_VERSION, A::READ),
		(R::HELM_CHART_VERSION, A::LIST),
		(R::SCAN, A::READ),
		(R::SCANNER, A::READ),
		(R::TAG, A::LIST),
		(R::ACCESSORY, A::LIST),
		(R::ARTIFACT, A::READ),
		(R::ARTIFACT, A::LIST),
		(R::ARTIFACT_ADDITION, A::READ),
	])
});

static ROLE_POLICIES: LazyLock<HashMap<&'static str, Vec<Policy>>> = LazyLock::new(|| {
	use Action as A;
	use Resource as R;

	let project_admin = grants(&[
		(R::SELF, A::READ),
		(R::SELF, A::UPDATE),
		(R::SELF, A::DELETE),
		(R::MEMBER, A::CREATE),
		(R::MEMBER, A::READ),
		(R::MEMBER, A::UPDATE),
		(R::MEMBER, A::DELETE),
		(R::MEMBER, A::LIST),
		(R::METADATA, A::CREATE),
		(R::METADATA, A::READ),
		(R::METADATA, A::UPDATE),
		(R::METADATA, A::DELETE),
		(R::LOG, A::LIST),
		(R::LABEL, A::CREATE),
		(R::LABEL, A::READ),
		(R::LABEL, A::UPDATE),
		(R::LABEL, A::DELETE),
		(R::LABEL, A::LIST),
		(R::QUOTA, A::READ),
		(R::REPOSITORY, A::CREATE),
		(R::REPOSITORY, A::READ),
		(R::REPOSITORY, A::UPDATE),
		(R::REPOSITORY, A::DELETE),
		(R::REPOSITORY, A::LIST),
		(R::REPOSITORY, A::PULL),
		(R::REPOSITORY, A::PUSH),
		(R::TAG_RETENTION, A::CREATE),
		(R::TAG_RETENTION, A::READ),
		(R::TAG_RETENTION, A::UPDATE),
		(R::TAG_RETENTION, A::DELETE),
		(R::TAG_RETENTION, A::LIST),
		(R::TAG_RETENTION, A::OPERATE),
		(R::IMMUTABLE_TAG, A::CREATE),
		(R::IMMUTABLE_TAG, A::UPDATE),
		(R::IMMUTABLE_TAG, A::DELETE),
		(R::IMMUTABLE_TAG, A::LIST),
		(R::HELM_CHART, A::CREATE),
		(R::HELM_CHART, A::READ),
		(R::HELM_CHART, A::DELETE),
		(R::HELM_CHART, A::LIST),
		(R::HELM_CHART_VERSION, A::CREATE),
		(R::HELM_CHART_VERSION, A::READ),
		(R::HELM_CHART_VERSION, A::DELETE),
		(R::HELM_CHART_VERSION, A::LIST),
		(R::HELM_CHART_VERSION_LABEL, A::CREATE),
		(R::HELM_CHART_VERSION_LABEL, A::DELETE),
		(R::CONFIGURATION, A::READ),
		(R::CONFIGURATION, A::UPDATE),
		(R::ROBOT, A::CREATE),
		(R::ROBOT, A::READ),
		(R::ROBOT, A::UPDATE),
		(R::ROBOT, A::DELETE),
		(R::ROBOT, A::LIST),
		(R::NOTIFICATION_POLICY, A::CREATE),
		(R::NOTIFICATION_POLICY, A::UPDATE),
		(R::NOTIFICATION_POLICY, A::DELETE),
		(R::NOTIFICATION_POLICY, A::LIST),
		(R::NOTIFICATION_POLICY, A::READ),
		(R::SCAN, A::CREATE),
		(R::SCAN, A::READ),
		(R::SCAN, A::STOP),
		(R::SCANNER, A::READ),
		(R::SCANNER, A::CREATE),
		(R::ARTIFACT, A::CREATE),
		(R::ARTIFACT, A::READ),
		(R::ARTIFACT, A::DELETE),
		(R::ARTIFACT, A::LIST),
		(R::ARTIFACT_ADDITION, A::READ),
		(R::TAG, A::LIST),
		(R::TAG, A::CREATE),
		(R::TAG, A::DELETE),
		(R::ACCESSORY, A::LIST),
		(R::ARTIFACT_LABEL, A::CREATE),
		(R::ARTIFACT_LABEL, A::DELETE),
		(R::PREHEAT_POLICY, A::CREATE),
		(R::PREHEAT_POLICY, A::READ),
		(R::PREHEAT_POLICY, A::UPDATE),
		(R::PREHEAT_POLICY, A::DELETE),
		(R::PREHEAT_POLICY, A::LIST),
	]);

	let maintainer = grants(&[
		(R::SELF, A::READ),
		(R::MEMBER, A::READ),
		(R::MEMBER, A::LIST),
		(R::METADATA, A::CREATE),
		(R::METADATA, A::READ),
		(R::METADATA, A::UPDATE),
		(R::METADATA, A::DELETE),
		(R::LOG, A::LIST),
		(R::QUOTA, A::READ),
		(R::LABEL, A::CREATE),
		(R::LABEL, A::READ),
		(R::LABEL, A::UPDATE),
		(R::LABEL, A::DELETE),
		(R::LABEL, A::LIST),
		(R::REPOSITORY, A::CREATE),
		(R::REPOSITORY, A::READ),
		(R::REPOSITORY, A::UPDATE),
		(R::REPOSITORY, A::DELETE),
		(R::REPOSITORY, A::LIST),
		(R::REPOSITORY, A::PUSH),
		(R::REPOSITORY, A::PULL),
		(R::TAG_RETENTION, A::CREATE),
		(R::TAG_RETENTION, A::READ),
		(R::TAG_RETENTION, A::UPDATE),
		(R::TAG_RETENTION, A::DELETE),
		(R::TAG_RETENTION, A::LIST),
		(R::TAG_RETENTION, A::OPERATE),
		(R::ACCESSORY, A::LIST),
		(R::IMMUTABLE_TAG, A::CREATE),
		(R::IMMUTABLE_TAG, A::UPDATE),
		(R::IMMUTABLE_TAG, A::DELETE),
		(R::IMMUTABLE_TAG, A::LIST),
		(R::HELM_CHART, A::CREATE),
		(R::HELM_CHART, A::READ),
		(R::HELM_CHART, A::DELETE),
		(R::HELM_CHART, A::LIST),
		(R::HELM_CHART_VERSION, A::CREATE),
		(R::HELM_CHART_VERSION, A::READ),
		(R::HELM_CHART_VERSION, A::DELETE),
		(R::HELM_CHART_VERSION, A::LIST),
		(R::HELM_CHART_VERSION_LABEL, A::CREATE),
		(R::HELM_CHART_VERSION_LABEL, A::DELETE),
		(R::CONFIGURATION, A::READ),
		(R::ROBOT, A::READ),
		(R::ROBOT, A::LIST),
		(R::NOTIFICATION_POLICY, A::LIST),
		(R::SCAN, A::CREATE),
		(R::SCAN, A::READ),
		(R::SCAN, A::STOP),
		(R::SCANNER, A::READ),
		(R::ARTIFACT, A::CREATE),
		(R::ARTIFACT, A::READ),
		(R::ARTIFACT, A::DELETE),
		(R::ARTIFACT, A::LIST),
		(R::ARTIFACT_ADDITION, A::READ),
		(R::TAG, A::LIST),
		(R::TAG, A::CREATE),
		(R::TAG, A::DELETE),
		(R::ARTIFACT_LABEL, A::CREATE),
		(R::ARTIFACT_LABEL, A::DELETE),
	]);

	let developer = grants(&[
		(R::SELF, A::READ),
		(R::MEMBER, A::READ),
		(R::MEMBER, A::LIST),
		(R::LOG, A::LIST),
		(R::LABEL, A::READ),
		(R::LABEL, A::LIST),
		(R::QUOTA, A::READ),
		(R::REPOSITORY, A::CREATE),
		(R::REPOSITORY, A::READ),
		(R::REPOSITORY, A::UPDATE),
		(R::REPOSITORY, A::LIST),
		(R::REPOSITORY, A::PUSH),
		(R::REPOSITORY, A::PULL),
		(R::HELM_CHART, A::CREATE),
		(R::HELM_CHART, A::READ),
		(R::HELM_CHART, A::LIST),
		(R::HELM_CHART_VERSION, A::CREATE),
		(R::HELM_CHART_VERSION, A::READ),
		(R::HELM_CHART_VERSION, A::LIST),
		(R::HELM_CHART_VERSION_LABEL, A::CREATE),
		(R::HELM_CHART_VERSION_LABEL, A::DELETE),
		(R::CONFIGURATION, A::READ),
		(R::ROBOT, A::READ),
		(R::ROBOT, A::LIST),
		(R::SCAN, A::READ),
		(R::SCANNER, A::READ),
		(R::ARTIFACT, A::CREATE),
		(R::ARTIFACT, A::READ),
		(R::ARTIFACT, A::LIST),
		(R::ARTIFACT_ADDITION, A::READ),
		(R::TAG, A::LIST),
		(R::TAG, A::CREATE),
		(R::ACCESSORY, A::LIST),
		(R::ARTIFACT_LABEL, A::CREATE),
		(R::ARTIFACT_LABEL, A::DELETE),
	]);

	let guest = grants(&[
		(R::SELF, A::READ),
		(R::MEMBER, A::READ),
		(R::MEMBER, A::LIST),
		(R::LOG, A::LIST),
		(R::LABEL, A::READ),
		(R::LABEL, A::LIST),
		(R::QUOTA, A::READ),
		(R::REPOSITORY, A::READ),
		(R::REPOSITORY, A::LIST),
		(R::REPOSITORY, A::PULL),
		(R::HELM_CHART, A::READ),
		(R::HELM_CHART, A::LIST),
		(R::HELM_CHART_VERSION, A::READ),
		(R::HELM_CHART_VERSION, A::LIST),
		(R::CONFIGURATION, A::READ),
		(R::ROBOT, A::READ),
		(R::ROBOT, A::LIST),
		(R::SCAN, A::READ),
		(R::SCANNER, A::READ),
		(R::TAG, A::LIST),
		(R::ACCESSORY, A::LIST),
		(R::ARTIFACT, A::READ),
		(R::ARTIFACT, A::LIST),
		(R::ARTIFACT_ADDITION, A::READ),
	]);

	let limited_guest = grants(&[
		(R::SELF, A::READ),
		(R::QUOTA, A::READ),
		(R::REPOSITORY, A::LIST),
		(R::REPOSITORY, A::PULL),
		(R::HELM_CHART, A::READ),
		(R::HELM_CHART, A::LIST),
		(R::HELM_CHART_VERSION, A::READ),
		(R::HELM_CHART_VERSION, A::LIST),
		(R::CONFIGURATION, A::READ),
		(R::SCAN, A::READ),
		(R::SCANNER, A::READ),
		(R::TAG, A::LIST),
		(R::ACCESSORY, A::LIST),
		(R::ARTIFACT, A::READ),
		(R::ARTIFACT, A::LIST),
		(R::ARTIFACT_ADDITION, A::READ),
	]);

	HashMap::from([
		("projectAdmin", project_admin),
		("maintainer", maintainer),
		("developer", developer),
		("guest", guest),
		("limitedGuest", limited_guest),
	])
});

/// A role id held in one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectRole {
	namespace: ProjectNamespace,
	role_id: i32,
}

impl ProjectRole {
	pub fn new(project_id: i64, role_id: i32) -> Self {
		Self {
			namespace: ProjectNamespace::new(project_id),
			role_id,
		}
	}

	pub fn role_id(&self) -> i32 {
		self.role_id
	}
}

impl Role for ProjectRole {
	fn role_name(&self) -> Option<&str> {
		role_name(self.role_id)
	}

	fn policies(&self) -> Vec<Policy> {
		let Some(name) = role_name(self.role_id) else {
			return Vec::new();
		};
		role_policies(name)
			.iter()
			.map(|policy| policy.in_namespace(&self.namespace))
			.collect()
	}
}
