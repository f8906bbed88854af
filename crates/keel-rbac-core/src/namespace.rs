// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Namespaces and the process-wide parser registry.
//!
//! A namespace is a parsed scope instance such as `project#7`. Parsers are
//! registered per kind and tried in kind order; the first one that
//! recognizes a resource wins. The built-in `project` parser is registered
//! on first use. `system` is a policy-side namespace only and has no parser.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use regex::Regex;
use tracing::debug;

use crate::error::RbacError;
use crate::resource::Resource;

pub const PROJECT_KIND: &str = "project";
pub const SYSTEM_KIND: &str = "system";

/// Identity of a namespace within its kind.
pub type NamespaceId = i64;

pub trait Namespace: fmt::Debug + Send + Sync {
	fn kind(&self) -> &str;

	fn identity(&self) -> NamespaceId;

	fn is_public(&self) -> bool {
		false
	}

	/// Builds a resource path inside this namespace.
	fn resource(&self, subresources: &[Resource]) -> Resource;
}

/// Recognizes a namespace in a resource path.
///
/// A parser returns `None` on any parse failure, never a partial namespace.
pub type NamespaceParser = fn(&Resource) -> Option<Arc<dyn Namespace>>;

static PARSERS: LazyLock<RwLock<BTreeMap<&'static str, NamespaceParser>>> = LazyLock::new(|| {
	let mut parsers: BTreeMap<&'static str, NamespaceParser> = BTreeMap::new();
	parsers.insert(PROJECT_KIND, ProjectNamespace::parse);
	RwLock::new(parsers)
});

/// Registers `parser` for `kind`, replacing any previous parser.
///
/// Meant to run during startup, before permission checks are served.
pub fn register_parser(kind: &'static str, parser: NamespaceParser) {
	debug!(kind, "registering namespace parser");
	PARSERS.write().insert(kind, parser);
}

/// Kinds that currently have a parser.
pub fn registered_kinds() -> Vec<&'static str> {
	PARSERS.read().keys().copied().collect()
}

pub fn parse(resource: &Resource) -> Result<Arc<dyn Namespace>, RbacError> {
	let parsers = PARSERS.read();
	parsers
		.values()
		.find_map(|parser| parser(resource))
		.ok_or_else(|| RbacError::NotApplicable {
			resource: resource.to_string(),
		})
}

static PROJECT_PREFIX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^/project/([^/]*)/?").unwrap());

/// The `project` namespace, anchored at `/project/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectNamespace {
	project_id: i64,
	is_public: bool,
}

impl ProjectNamespace {
	pub fn new(project_id: i64) -> Self {
		Self {
			project_id,
			is_public: false,
		}
	}

	pub fn with_public(mut self, is_public: bool) -> Self {
		self.is_public = is_public;
		self
	}

	pub fn project_id(&self) -> i64 {
		self.project_id
	}

	fn parse(resource: &Resource) -> Option<Arc<dyn Namespace>> {
		let captures = PROJECT_PREFIX.captures(resource.as_str())?;
		let project_id = captures.get(1)?.as_str().parse::<i64>().ok()?;
		Some(Arc::new(ProjectNamespace::new(project_id)))
	}
}

impl Namespace for ProjectNamespace {
	fn kind(&self) -> &str {
		PROJECT_KIND
	}

	fn identity(&self) -> NamespaceId {
		self.project_id
	}

	fn is_public(&self) -> bool {
		self.is_public
	}

	fn resource(&self, subresources: &[Resource]) -> Resource {
		Resource::new(format!("/project/{}", self.project_id)).subresource(subresources)
	}
}

/// The `system` namespace, rooted at `/system`. It has a single instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemNamespace;

impl Namespace for SystemNamespace {
	fn kind(&self) -> &str {
		SYSTEM_KIND
	}

	fn identity(&self) -> NamespaceId {
		0
	}

	fn resource(&self, subresources: &[Resource]) -> Resource {
		Resource::from_static("/system").subresource(subresources)
	}
}
