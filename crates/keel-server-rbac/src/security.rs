// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The principal facts evaluators read from an authenticated session.

use std::collections::HashMap;

/// What the session layer knows about the caller.
///
/// Authentication itself happens upstream; evaluators only read the result.
pub trait SecurityContext: Send + Sync {
	/// Short name of the context kind, for logs.
	fn name(&self) -> &'static str;

	fn is_authenticated(&self) -> bool;

	/// `None` for anonymous callers.
	fn username(&self) -> Option<&str>;

	fn is_sys_admin(&self) -> bool;

	/// Role ids the caller holds in `project_id`; empty when not a member.
	fn project_roles(&self, project_id: i64) -> Vec<i32>;
}

/// A session backed by a local user account, or an anonymous visitor.
#[derive(Debug, Clone, Default)]
pub struct LocalContext {
	username: Option<String>,
	sys_admin: bool,
	memberships: HashMap<i64, Vec<i32>>,
}

impl LocalContext {
	/// An empty `username` yields an anonymous context.
	pub fn new(username: impl Into<String>) -> Self {
		let username = username.into();
		Self {
			username: (!username.is_empty()).then_some(username),
			..Default::default()
		}
	}

	pub fn anonymous() -> Self {
		Self::default()
	}

	pub fn with_sys_admin(mut self, sys_admin: bool) -> Self {
		self.sys_admin = sys_admin;
		self
	}

	pub fn with_project_roles(mut self, project_id: i64, roles: impl IntoIterator<Item = i32>) -> Self {
		self.memberships.entry(project_id).or_default().extend(roles);
		self
	}
}

impl SecurityContext for LocalContext {
	fn name(&self) -> &'static str {
		"local"
	}

	fn is_authenticated(&self) -> bool {
		self.username.is_some()
	}

	fn username(&self) -> Option<&str> {
		self.username.as_deref()
	}

	fn is_sys_admin(&self) -> bool {
		self.is_authenticated() && self.sys_admin
	}

	fn project_roles(&self, project_id: i64) -> Vec<i32> {
		if !self.is_authenticated() {
			return Vec::new();
		}
		self.memberships.get(&project_id).cloned().unwrap_or_default()
	}
}
