// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request/policy-line matching.
//!
//! Resource patterns use the keyMatch2 form:
//!
//! - `/*` matches the rest of the path, slashes included.
//! - `/:name` matches exactly one non-empty segment.
//! - Everything else is literal.
//!
//! Patterns are anchored at both ends. A pattern never covers descendants
//! implicitly: `/project/1` does not match `/project/1/robot`.

use regex::Regex;

use crate::action::{Action, Effect};
use crate::policy::Policy;
use crate::resource::Resource;

/// A policy bound to the subject it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolicyLine {
	pub subject: String,
	pub resource: Resource,
	pub action: Action,
	pub effect: Effect,
}

impl PolicyLine {
	pub fn new(subject: impl Into<String>, policy: Policy) -> Self {
		Self {
			subject: subject.into(),
			resource: policy.resource,
			action: policy.action,
			effect: policy.effect,
		}
	}
}

#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
	pub subject: &'a str,
	pub resource: &'a Resource,
	pub action: &'a Action,
}

impl<'a> Request<'a> {
	pub fn new(subject: &'a str, resource: &'a Resource, action: &'a Action) -> Self {
		Self {
			subject,
			resource,
			action,
		}
	}
}

/// Expands a keyMatch2 pattern into an anchored regular expression.
pub fn pattern_to_regex(pattern: &str) -> String {
	let mut regex = String::with_capacity(pattern.len() + 8);
	regex.push('^');

	let mut rest = pattern;
	while !rest.is_empty() {
		if let Some(tail) = rest.strip_prefix("/*") {
			regex.push_str("/.*");
			rest = tail;
		} else if let Some(tail) = rest.strip_prefix("/:") {
			regex.push_str("/[^/]+");
			rest = tail.find('/').map_or("", |idx| &tail[idx..]);
		} else {
			let first = rest.chars().next().map_or(1, char::len_utf8);
			let end = rest[first..].find('/').map_or(rest.len(), |idx| idx + first);
			regex.push_str(&regex::escape(&rest[..end]));
			rest = &rest[end..];
		}
	}

	regex.push('$');
	regex
}

pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
	Regex::new(&pattern_to_regex(pattern))
}

/// One-off keyMatch2 test of `path` against `pattern`.
///
/// Compiles the pattern on every call; the enforcer caches compiled
/// patterns instead.
pub fn key_match2(path: &str, pattern: &str) -> bool {
	compile_pattern(pattern)
		.map(|regex| regex.is_match(path))
		.unwrap_or(false)
}

/// `*` in a policy matches any requested action.
pub fn action_matches(requested: &Action, granted: &Action) -> bool {
	granted.is_wildcard() || requested == granted
}

/// Whether `request` is covered by `line`, whose resource pattern was
/// compiled to `object`.
///
/// The subject must equal the line's subject exactly. Role membership is
/// resolved by the caller, which retries with the role name as subject.
pub fn matches(request: &Request<'_>, line: &PolicyLine, object: &Regex) -> bool {
	request.subject == line.subject
		&& object.is_match(request.resource.as_str())
		&& action_matches(request.action, &line.action)
}
