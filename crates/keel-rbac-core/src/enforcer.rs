// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-principal enforcer.
//!
//! An [`Enforcer`] compiles one principal's facts into policy lines the
//! first time it is asked a question, then answers from the compiled set.
//! Compilation happens at most once per instance even when many threads
//! call [`Enforcer::has_permission`] concurrently; later calls take no lock.
//!
//! # Compilation
//!
//! - Each direct policy becomes a line whose subject is the username.
//! - Each role with a name contributes its policies under the role name, and
//!   an edge `username -> role` so the user is evaluated as that role too.
//! - Lines are deduplicated on `(subject, policy)`.
//! - Each distinct resource pattern is compiled to a regex once.
//!
//! A principal with no username compiles to nothing and is denied everything.
//!
//! # Combination
//!
//! A request is allowed when at least one matching line allows it and no
//! matching line denies it.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{debug, error, trace};

use crate::action::{Action, Effect};
use crate::matcher::{self, PolicyLine, Request};
use crate::policy::Policy;
use crate::resource::Resource;
use crate::user::{non_empty, User};

pub struct Enforcer {
	user: Arc<dyn User>,
	compiled: OnceLock<CompiledPolicies>,
}

impl Enforcer {
	pub fn new(user: Arc<dyn User>) -> Self {
		Self {
			user,
			compiled: OnceLock::new(),
		}
	}

	pub fn from_user(user: impl User + 'static) -> Self {
		Self::new(Arc::new(user))
	}

	/// Whether the principal may perform `action` on `resource`.
	pub fn has_permission(&self, resource: &Resource, action: &Action) -> bool {
		let compiled = self
			.compiled
			.get_or_init(|| CompiledPolicies::compile(self.user.as_ref()));
		let allowed = compiled.allows(resource, action);
		trace!(
			username = compiled.username.as_deref().unwrap_or(""),
			resource = %resource,
			action = %action,
			allowed,
			"enforcer decision"
		);
		allowed
	}

	/// Whether the principal's facts have been compiled yet.
	pub fn is_compiled(&self) -> bool {
		self.compiled.get().is_some()
	}

	/// Number of compiled policy lines, compiling first if needed.
	pub fn line_count(&self) -> usize {
		self.compiled
			.get_or_init(|| CompiledPolicies::compile(self.user.as_ref()))
			.lines
			.len()
	}
}

impl fmt::Debug for Enforcer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Enforcer")
			.field("username", &self.user.username())
			.field("compiled", &self.is_compiled())
			.finish()
	}
}

struct CompiledPolicies {
	username: Option<String>,
	/// Roles reachable from the username through a grouping edge.
	roles: Vec<String>,
	lines: Vec<PolicyLine>,
	patterns: HashMap<String, Regex>,
}

impl CompiledPolicies {
	fn deny_all() -> Self {
		Self {
			username: None,
			roles: Vec::new(),
			lines: Vec::new(),
			patterns: HashMap::new(),
		}
	}

	fn compile(user: &dyn User) -> Self {
		let Some(username) = non_empty(user.username()) else {
			debug!("principal has no username, enforcer denies all requests");
			return Self::deny_all();
		};

		let mut seen = HashSet::new();
		let mut lines = Vec::new();
		let mut push_line = |subject: &str, policy: Policy| {
			if seen.insert(format!("{subject}|{policy}")) {
				lines.push(PolicyLine::new(subject, policy));
			}
		};

		for policy in user.policies() {
			push_line(username, policy);
		}

		let mut roles: Vec<String> = Vec::new();
		for role in user.roles() {
			let Some(role_name) = non_empty(role.role_name()) else {
				continue;
			};
			for policy in role.policies() {
				push_line(role_name, policy);
			}
			if role_name != username && !roles.iter().any(|known| known == role_name) {
				roles.push(role_name.to_string());
			}
		}

		let mut patterns = HashMap::new();
		for line in &lines {
			let pattern = line.resource.as_str();
			if patterns.contains_key(pattern) {
				continue;
			}
			match matcher::compile_pattern(pattern) {
				Ok(regex) => {
					patterns.insert(pattern.to_string(), regex);
				}
				Err(e) => {
					error!(
						username,
						pattern,
						error = %e,
						"policy pattern failed to compile, enforcer denies all requests"
					);
					return Self::deny_all();
				}
			}
		}

		debug!(
			username,
			lines = lines.len(),
			roles = roles.len(),
			patterns = patterns.len(),
			"compiled enforcer"
		);

		Self {
			username: Some(username.to_string()),
			roles,
			lines,
			patterns,
		}
	}

	fn allows(&self, resource: &Resource, action: &Action) -> bool {
		let Some(username) = self.username.as_deref() else {
			return false;
		};

		let subjects = std::iter::once(username).chain(self.roles.iter().map(String::as_str));
		let mut allowed = false;

		for subject in subjects {
			let request = Request::new(subject, resource, action);
			for line in self.lines.iter().filter(|line| line.subject == subject) {
				let Some(object) = self.patterns.get(line.resource.as_str()) else {
					continue;
				};
				if !matcher::matches(&request, line, object) {
					continue;
				}
				match line.effect {
					Effect::Deny => return false,
					Effect::Allow => allowed = true,
				}
			}
		}

		allowed
	}
}
