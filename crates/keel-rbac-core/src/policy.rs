// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The `(resource, action, effect)` policy triple.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::{Action, Effect};
use crate::namespace::Namespace;
use crate::resource::Resource;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Policy {
	pub resource: Resource,
	pub action: Action,
	#[serde(default)]
	pub effect: Effect,
}

impl Policy {
	/// Creates an `allow` policy.
	pub fn new(resource: impl Into<Resource>, action: impl Into<Action>) -> Self {
		Self {
			resource: resource.into(),
			action: action.into(),
			effect: Effect::Allow,
		}
	}

	/// Creates a `deny` policy.
	pub fn deny(resource: impl Into<Resource>, action: impl Into<Action>) -> Self {
		Self::new(resource, action).with_effect(Effect::Deny)
	}

	pub fn with_effect(mut self, effect: Effect) -> Self {
		self.effect = effect;
		self
	}

	/// Re-bases the resource under `namespace`, keeping action and effect.
	///
	/// `repository` in project 7 becomes `/project/7/repository`; the empty
	/// resource becomes the namespace root.
	pub fn in_namespace(&self, namespace: &dyn Namespace) -> Policy {
		Policy {
			resource: namespace.resource(std::slice::from_ref(&self.resource)),
			action: self.action.clone(),
			effect: self.effect,
		}
	}
}

/// `<resource>:<action>:<effect>`, used for deduplication only.
impl fmt::Display for Policy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.resource, self.action, self.effect)
	}
}
