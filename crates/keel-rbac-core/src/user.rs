// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Principal and role contracts consumed by the enforcer.
//!
//! A principal without a name is unauthenticated and contributes no facts:
//! its direct policies, role bindings and role policies are all ignored. A
//! role without a name is likewise dropped.

use std::sync::Arc;

use crate::policy::Policy;

pub trait Role: Send + Sync {
	fn role_name(&self) -> Option<&str>;

	fn policies(&self) -> Vec<Policy>;
}

/// The facts an enforcer compiles for one principal.
///
/// Every method defaults to "nothing", so implementors only supply what
/// they have.
pub trait User: Send + Sync {
	fn username(&self) -> Option<&str> {
		None
	}

	fn policies(&self) -> Vec<Policy> {
		Vec::new()
	}

	fn roles(&self) -> Vec<Arc<dyn Role>> {
		Vec::new()
	}
}

/// A principal with no name, policies or roles.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseUser;

impl User for BaseUser {}

/// Treats `Some("")` the same as `None`.
pub(crate) fn non_empty(name: Option<&str>) -> Option<&str> {
	name.filter(|name| !name.is_empty())
}

fn name_from(name: impl Into<String>) -> Option<String> {
	Some(name.into()).filter(|name| !name.is_empty())
}

/// A role backed by a fixed policy list.
#[derive(Debug, Clone, Default)]
pub struct SimpleRole {
	name: Option<String>,
	policies: Vec<Policy>,
}

impl SimpleRole {
	pub fn new(name: impl Into<String>, policies: Vec<Policy>) -> Self {
		Self {
			name: name_from(name),
			policies,
		}
	}
}

impl Role for SimpleRole {
	fn role_name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	fn policies(&self) -> Vec<Policy> {
		self.policies.clone()
	}
}

/// A principal assembled from known facts.
#[derive(Clone, Default)]
pub struct SimpleUser {
	name: Option<String>,
	policies: Vec<Policy>,
	roles: Vec<Arc<dyn Role>>,
}

impl SimpleUser {
	/// An empty `name` yields an unauthenticated user.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name_from(name),
			policies: Vec::new(),
			roles: Vec::new(),
		}
	}

	pub fn anonymous() -> Self {
		Self::default()
	}

	pub fn with_policies(mut self, policies: impl IntoIterator<Item = Policy>) -> Self {
		self.policies.extend(policies);
		self
	}

	pub fn with_role(mut self, role: impl Role + 'static) -> Self {
		self.roles.push(Arc::new(role));
		self
	}

	pub fn with_roles(mut self, roles: impl IntoIterator<Item = Arc<dyn Role>>) -> Self {
		self.roles.extend(roles);
		self
	}
}

impl std::fmt::Debug for SimpleUser {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SimpleUser")
			.field("name", &self.name)
			.field("policies", &self.policies.len())
			.field("roles", &self.roles.len())
			.finish()
	}
}

impl User for SimpleUser {
	fn username(&self) -> Option<&str> {
		self.name.as_deref()
	}

	fn policies(&self) -> Vec<Policy> {
		self.policies.clone()
	}

	fn roles(&self) -> Vec<Arc<dyn Role>> {
		self.roles.clone()
	}
}
