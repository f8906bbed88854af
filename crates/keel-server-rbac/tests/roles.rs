// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Checks over the canned policy tables.

use std::collections::HashSet;

use keel_rbac_core::matcher::compile_pattern;
use keel_rbac_core::{Action, Policy, ProjectNamespace, Resource, Role, SystemNamespace};
use keel_server_rbac::roles::{self, ProjectRole, ROLES};
use keel_server_rbac::scope::{self, Scope};

fn canned_tables() -> Vec<(String, Vec<Policy>)> {
	let project = ProjectNamespace::new(42);
	let mut tables: Vec<(String, Vec<Policy>)> = ROLES
		.iter()
		.map(|(id, name)| (name.to_string(), ProjectRole::new(42, *id).policies()))
		.collect();
	tables.push((
		"public".to_string(),
		roles::public_policies()
			.iter()
			.map(|policy| policy.in_namespace(&project))
			.collect(),
	));
	tables.push((
		"system catalog".to_string(),
		scope::policies(Scope::System)
			.iter()
			.map(|policy| policy.in_namespace(&SystemNamespace))
			.collect(),
	));
	tables.push((
		"project catalog".to_string(),
		scope::policies(Scope::Project)
			.iter()
			.map(|policy| policy.in_namespace(&project))
			.collect(),
	));
	tables
}

fn grants(role_id: i32, resource: Resource, action: Action) -> bool {
	let wanted = Policy::new(resource, action).in_namespace(&ProjectNamespace::new(42));
	ProjectRole::new(42, role_id).policies().contains(&wanted)
}

#[test]
fn every_canned_pattern_compiles() {
	for (table, policies) in canned_tables() {
		for policy in policies {
			assert!(
				compile_pattern(policy.resource.as_str()).is_ok(),
				"{table}: pattern {} does not compile",
				policy.resource
			);
		}
	}
}

#[test]
fn canned_tables_have_no_duplicate_lines() {
	for (table, policies) in canned_tables() {
		let mut seen = HashSet::new();
		for policy in &policies {
			assert!(seen.insert(policy.to_string()), "{table}: duplicate line {policy}");
		}
	}
}

#[test]
fn role_hierarchy_on_pull_push() {
	let hierarchy = [
		roles::PROJECT_ADMIN,
		roles::MAINTAINER,
		roles::DEVELOPER,
		roles::GUEST,
		roles::LIMITED_GUEST,
	];
	for action in [Action::PULL, Action::PUSH] {
		for pair in hierarchy.windows(2) {
			let (higher, lower) = (pair[0], pair[1]);
			if grants(lower, Resource::REPOSITORY, action.clone()) {
				assert!(
					grants(higher, Resource::REPOSITORY, action.clone()),
					"role {higher} lacks {action} that role {lower} has"
				);
			}
		}
	}

	assert!(grants(roles::DEVELOPER, Resource::REPOSITORY, Action::PUSH));
	assert!(!grants(roles::GUEST, Resource::REPOSITORY, Action::PUSH));
	assert!(grants(roles::LIMITED_GUEST, Resource::REPOSITORY, Action::PULL));
}

#[test]
fn limited_guest_sees_no_member_label_or_log() {
	for resource in [Resource::MEMBER, Resource::LABEL, Resource::LOG] {
		for action in [Action::READ, Action::LIST] {
			assert!(
				!grants(roles::LIMITED_GUEST, resource.clone(), action.clone()),
				"limitedGuest can {action} {resource}"
			);
		}
	}
}

#[test]
fn only_project_admin_manages_members() {
	for (id, name) in ROLES {
		let manages = grants(id, Resource::MEMBER, Action::CREATE);
		assert_eq!(manages, id == roles::PROJECT_ADMIN, "{name}");
	}
}

#[test]
fn role_policies_stay_inside_their_project() {
	for (id, name) in ROLES {
		for policy in ProjectRole::new(42, id).policies() {
			assert!(
				policy.resource.as_str() == "/project/42"
					|| policy.resource.as_str().starts_with("/project/42/"),
				"{name}: {policy} escapes the project"
			);
		}
	}
}

#[test]
fn public_set_is_read_only() {
	let writes = [Action::CREATE, Action::UPDATE, Action::DELETE, Action::PUSH];
	for policy in roles::public_policies() {
		assert!(!writes.contains(&policy.action), "public grants {policy}");
	}
}
