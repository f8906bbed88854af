// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Hierarchical resource paths.
//!
//! A [`Resource`] is a slash separated path such as `/project/7/repository`.
//! The empty resource ([`Resource::SELF`]) denotes the context itself and is
//! used by role tables to grant actions on the namespace root.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RbacError;
use crate::namespace::{self, Namespace};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Resource(Cow<'static, str>);

impl Resource {
	pub const SELF: Resource = Resource::from_static("");

	// Project scope.
	pub const ACCESSORY: Resource = Resource::from_static("accessory");
	pub const ARTIFACT: Resource = Resource::from_static("artifact");
	pub const ARTIFACT_ADDITION: Resource = Resource::from_static("artifact-addition");
	pub const ARTIFACT_LABEL: Resource = Resource::from_static("artifact-label");
	pub const CONFIGURATION: Resource = Resource::from_static("configuration");
	pub const HELM_CHART: Resource = Resource::from_static("helm-chart");
	pub const HELM_CHART_VERSION: Resource = Resource::from_static("helm-chart-version");
	pub const HELM_CHART_VERSION_LABEL: Resource = Resource::from_static("helm-chart-version-label");
	pub const IMMUTABLE_TAG: Resource = Resource::from_static("immutable-tag");
	pub const LABEL: Resource = Resource::from_static("label");
	pub const LOG: Resource = Resource::from_static("log");
	pub const MEMBER: Resource = Resource::from_static("member");
	pub const METADATA: Resource = Resource::from_static("metadata");
	pub const NOTIFICATION_POLICY: Resource = Resource::from_static("notification-policy");
	pub const PREHEAT_POLICY: Resource = Resource::from_static("preheat-policy");
	pub const QUOTA: Resource = Resource::from_static("quota");
	pub const REPOSITORY: Resource = Resource::from_static("repository");
	pub const ROBOT: Resource = Resource::from_static("robot");
	pub const SCAN: Resource = Resource::from_static("scan");
	pub const SCANNER: Resource = Resource::from_static("scanner");
	pub const TAG: Resource = Resource::from_static("tag");
	pub const TAG_RETENTION: Resource = Resource::from_static("tag-retention");

	// System scope.
	pub const AUDIT_LOG: Resource = Resource::from_static("audit-log");
	pub const CATALOG: Resource = Resource::from_static("catalog");
	pub const EXPORT_CVE: Resource = Resource::from_static("export-cve");
	pub const GARBAGE_COLLECTION: Resource = Resource::from_static("garbage-collection");
	pub const JOBSERVICE_MONITOR: Resource = Resource::from_static("jobservice-monitor");
	pub const LDAP_USER: Resource = Resource::from_static("ldap-user");
	pub const PROJECT: Resource = Resource::from_static("project");
	pub const PURGE_AUDIT: Resource = Resource::from_static("purge-audit");
	pub const REGISTRY: Resource = Resource::from_static("registry");
	pub const REPLICATION: Resource = Resource::from_static("replication");
	pub const REPLICATION_POLICY: Resource = Resource::from_static("replication-policy");
	pub const SCAN_ALL: Resource = Resource::from_static("scan-all");
	pub const SECURITY_HUB: Resource = Resource::from_static("security-hub");
	pub const SYSTEM_VOLUMES: Resource = Resource::from_static("system-volumes");
	pub const USER: Resource = Resource::from_static("user");
	pub const USER_GROUP: Resource = Resource::from_static("user-group");

	pub const fn from_static(path: &'static str) -> Self {
		Self(Cow::Borrowed(path))
	}

	/// Builds a resource from `path`, collapsing runs of `/` and dropping a
	/// trailing `/`. The root `/` and the empty resource are kept as is.
	pub fn new(path: impl Into<String>) -> Self {
		let path = path.into();
		if is_normalized(&path) {
			Self(Cow::Owned(path))
		} else {
			Self(Cow::Owned(normalize(&path)))
		}
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns true for the empty, context-relative resource.
	pub fn is_self(&self) -> bool {
		self.0.is_empty()
	}

	/// Appends `segments` to this resource.
	///
	/// Empty segments are skipped and runs of `/` collapse to one. A trailing
	/// `/` is removed unless the result is the root.
	pub fn subresource<I, S>(&self, segments: I) -> Resource
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut joined = String::from(self.as_str());
		for segment in segments {
			let segment = segment.as_ref();
			if segment.is_empty() {
				continue;
			}
			if !joined.is_empty() {
				joined.push('/');
			}
			joined.push_str(segment);
		}
		Resource::new(normalize(&joined))
	}

	/// Strips `base` from the front of this resource.
	///
	/// Returns `.` when both are equal.
	pub fn relative_to(&self, base: &Resource) -> Result<Resource, RbacError> {
		let (path, prefix) = (self.as_str(), base.as_str());
		if path == prefix {
			return Ok(Resource::from_static("."));
		}

		let rest = path.strip_prefix(prefix).and_then(|rest| {
			if prefix.ends_with('/') {
				Some(rest)
			} else {
				rest.strip_prefix('/')
			}
		});

		match rest {
			Some(rest) if !rest.is_empty() => Ok(Resource::new(rest)),
			_ => Err(RbacError::RelativizeMismatch {
				resource: path.to_string(),
				base: prefix.to_string(),
			}),
		}
	}

	/// Classifies this resource with the namespace parser registry.
	pub fn namespace(&self) -> Result<Arc<dyn Namespace>, RbacError> {
		namespace::parse(self)
	}
}

fn is_normalized(path: &str) -> bool {
	path == "/" || !(path.contains("//") || path.ends_with('/'))
}

fn normalize(path: &str) -> String {
	let absolute = path.starts_with('/');
	let mut out = path
		.split('/')
		.filter(|part| !part.is_empty())
		.collect::<Vec<_>>()
		.join("/");
	if absolute {
		out.insert(0, '/');
	}
	out
}

impl<'de> Deserialize<'de> for Resource {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		String::deserialize(deserializer).map(Resource::new)
	}
}

impl fmt::Display for Resource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for Resource {
	fn from(path: &str) -> Self {
		Resource::new(path)
	}
}

impl From<String> for Resource {
	fn from(path: String) -> Self {
		Resource::new(path)
	}
}

impl AsRef<str> for Resource {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}
