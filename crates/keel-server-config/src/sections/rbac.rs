// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization evaluator configuration section.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_anonymous_username() -> String {
	"anonymous".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RbacConfigLayer {
	pub namespace_cache_capacity: Option<usize>,
	pub anonymous_username: Option<String>,
	pub log_decisions: Option<bool>,
}

impl RbacConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.namespace_cache_capacity.is_some() {
			self.namespace_cache_capacity = other.namespace_cache_capacity;
		}
		if other.anonymous_username.is_some() {
			self.anonymous_username = other.anonymous_username;
		}
		if other.log_decisions.is_some() {
			self.log_decisions = other.log_decisions;
		}
	}

	pub fn finalize(self) -> RbacConfig {
		RbacConfig {
			namespace_cache_capacity: self.namespace_cache_capacity,
			anonymous_username: self
				.anonymous_username
				.unwrap_or_else(default_anonymous_username),
			log_decisions: self.log_decisions.unwrap_or(false),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RbacConfig {
	/// Upper bound on cached per-project evaluators. `None` keeps every entry.
	pub namespace_cache_capacity: Option<usize>,
	/// Username given to unauthenticated visitors of public projects.
	pub anonymous_username: String,
	/// Emit a debug event for every permission decision.
	pub log_decisions: bool,
}

impl Default for RbacConfig {
	fn default() -> Self {
		Self {
			namespace_cache_capacity: None,
			anonymous_username: default_anonymous_username(),
			log_decisions: false,
		}
	}
}

impl RbacConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.namespace_cache_capacity == Some(0) {
			return Err(ConfigError::Validation(
				"rbac.namespace_cache_capacity must be greater than zero; omit it for an unbounded cache"
					.to_string(),
			));
		}
		if self.anonymous_username.trim().is_empty() {
			return Err(ConfigError::Validation(
				"rbac.anonymous_username must not be empty; anonymous access to public projects would be denied"
					.to_string(),
			));
		}
		Ok(())
	}
}
