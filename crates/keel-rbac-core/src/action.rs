// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Actions and policy effects.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RbacError;

/// An operation requested on a resource.
///
/// Actions are free-form symbols. The associated constants are the
/// vocabulary shared with the rest of the registry and must be spelled
/// exactly as given. [`Action::ALL`] in a policy matches every action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(Cow<'static, str>);

impl Action {
	pub const ALL: Action = Action::from_static("*");

	pub const PULL: Action = Action::from_static("pull");
	pub const PUSH: Action = Action::from_static("push");
	pub const CREATE: Action = Action::from_static("create");
	pub const READ: Action = Action::from_static("read");
	pub const UPDATE: Action = Action::from_static("update");
	pub const DELETE: Action = Action::from_static("delete");
	pub const LIST: Action = Action::from_static("list");
	pub const OPERATE: Action = Action::from_static("operate");
	pub const SCANNER_PULL: Action = Action::from_static("scanner-pull");
	pub const STOP: Action = Action::from_static("stop");

	pub const fn from_static(name: &'static str) -> Self {
		Self(Cow::Borrowed(name))
	}

	pub fn new(name: impl Into<String>) -> Self {
		Self(Cow::Owned(name.into()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_wildcard(&self) -> bool {
		self.0 == "*"
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for Action {
	fn from(name: &str) -> Self {
		Action::new(name)
	}
}

impl From<String> for Action {
	fn from(name: String) -> Self {
		Action::new(name)
	}
}

/// Whether a matching policy grants or refuses the request.
///
/// Any matching `Deny` overrides every matching `Allow`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
	#[default]
	Allow,
	Deny,
}

impl Effect {
	pub fn as_str(&self) -> &'static str {
		match self {
			Effect::Allow => "allow",
			Effect::Deny => "deny",
		}
	}
}

impl fmt::Display for Effect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Effect {
	type Err = RbacError;

	/// An empty effect reads as `allow`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"" | "allow" => Ok(Effect::Allow),
			"deny" => Ok(Effect::Deny),
			other => Err(RbacError::InvalidEffect(other.to_string())),
		}
	}
}

impl<'de> Deserialize<'de> for Effect {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		raw.parse().map_err(serde::de::Error::custom)
	}
}
