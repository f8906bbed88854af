// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission catalogs per scope.
//!
//! A catalog is the fixed set of `(resource, action)` pairs that may be
//! granted in a scope, for example to a robot account. Resources are
//! relative; callers re-base them under the scope's namespace.

use std::fmt;
use std::sync::LazyLock;

use keel_rbac_core::{Action, Policy, Resource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
	System,
	Project,
}

impl Scope {
	pub fn as_str(&self) -> &'static str {
		match self {
			Scope::System => "system",
			Scope::Project => "project",
		}
	}
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The grantable `(resource, action)` pairs of `scope`, as allow policies.
pub fn policies(scope: Scope) -> &'static [Policy] {
	match scope {
		Scope::System => &SYSTEM_POLICIES,
		Scope::Project => &PROJECT_POLICIES,
	}
}

/// Whether `action` on the relative `resource` may be granted in `scope`.
pub fn is_grantable(scope: Scope, resource: &Resource, action: &Action) -> bool {
	policies(scope)
		.iter()
		.any(|policy| &policy.resource == resource && &policy.action == action)
}

fn catalog(entries: &[(Resource, &[Action])]) -> Vec<Policy> {
	entries
		.iter()
		.flat_map(|(resource, actions)| {
			actions
				.iter()
				.map(move |action| Policy::new(resource.clone(), action.clone()))
		})
		.collect()
}

static SYSTEM_POLICIES: LazyLock<Vec<Policy>> = LazyLock::new(|| {
	use Action as A;
	use Resource as R;

	catalog(&[
		(R::AUDIT_LOG, &[A::LIST]),
		(R::PROJECT, &[A::LIST, A::CREATE]),
		(
			R::REPLICATION_POLICY,
			&[A::READ, A::CREATE, A::DELETE, A::LIST, A::UPDATE],
		),
		(R::REPLICATION, &[A::READ, A::CREATE, A::LIST]),
		(R::REGISTRY, &[A::READ, A::CREATE, A::DELETE, A::LIST, A::UPDATE]),
		(R::SCAN_ALL, &[A::READ, A::UPDATE, A::STOP, A::CREATE]),
		(R::SYSTEM_VOLUMES, &[A::READ]),
		(
			R::GARBAGE_COLLECTION,
			&[A::READ, A::CREATE, A::LIST, A::UPDATE, A::STOP],
		),
		(R::PURGE_AUDIT, &[A::READ, A::CREATE, A::LIST, A::UPDATE, A::STOP]),
		(R::JOBSERVICE_MONITOR, &[A::LIST, A::STOP]),
		(R::SCANNER, &[A::READ, A::CREATE, A::DELETE, A::UPDATE, A::LIST]),
		(R::LABEL, &[A::READ, A::CREATE, A::DELETE, A::UPDATE]),
		(R::EXPORT_CVE, &[A::READ, A::CREATE]),
		(R::SECURITY_HUB, &[A::READ, A::LIST]),
		(R::CATALOG, &[A::READ]),
		(R::QUOTA, &[A::READ, A::UPDATE, A::LIST]),
		(R::USER, &[A::READ, A::CREATE, A::DELETE, A::UPDATE, A::LIST]),
		(R::USER_GROUP, &[A::READ, A::CREATE, A::DELETE, A::UPDATE, A::LIST]),
		(R::LDAP_USER, &[A::CREATE, A::LIST]),
	])
});

static PROJECT_POLICIES: LazyLock<Vec<Policy>> = LazyLock::new(|| {
	use Action as A;
	use Resource as R;

	catalog(&[
		(R::LOG, &[A::LIST]),
		(R::SELF, &[A::READ, A::DELETE]),
		(R::METADATA, &[A::READ, A::LIST, A::CREATE, A::UPDATE, A::DELETE]),
		(
			R::REPOSITORY,
			&[A::LIST, A::PULL, A::PUSH, A::DELETE, A::READ, A::UPDATE],
		),
		(R::ARTIFACT, &[A::READ, A::LIST, A::DELETE, A::CREATE]),
		(R::SCAN, &[A::CREATE, A::STOP, A::READ]),
		(R::TAG, &[A::CREATE, A::DELETE, A::LIST]),
		(R::ACCESSORY, &[A::LIST]),
		(R::ARTIFACT_ADDITION, &[A::READ]),
		(R::ARTIFACT_LABEL, &[A::CREATE, A::DELETE]),
		(R::SCANNER, &[A::CREATE, A::READ]),
		(
			R::PREHEAT_POLICY,
			&[A::READ, A::LIST, A::CREATE, A::UPDATE, A::DELETE],
		),
		(R::IMMUTABLE_TAG, &[A::LIST, A::CREATE, A::UPDATE, A::DELETE]),
		(
			R::NOTIFICATION_POLICY,
			&[A::READ, A::LIST, A::CREATE, A::UPDATE, A::DELETE],
		),
		(
			R::TAG_RETENTION,
			&[A::READ, A::LIST, A::CREATE, A::UPDATE, A::DELETE, A::OPERATE],
		),
		(R::QUOTA, &[A::READ]),
		(R::LABEL, &[A::READ, A::LIST, A::CREATE, A::UPDATE, A::DELETE]),
		(R::MEMBER, &[A::READ, A::LIST, A::CREATE, A::UPDATE, A::DELETE]),
	])
});
