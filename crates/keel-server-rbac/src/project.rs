// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Projects as seen by the evaluators, and the lookup seam to whatever
//! stores them.

use std::collections::HashMap;

use keel_rbac_core::ProjectNamespace;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metadata key marking a project readable by anonymous callers.
pub const PUBLIC_METADATA_KEY: &str = "public";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
	pub project_id: i64,
	pub name: String,
	#[serde(default)]
	pub metadata: HashMap<String, String>,
}

impl Project {
	pub fn new(project_id: i64, name: impl Into<String>) -> Self {
		Self {
			project_id,
			name: name.into(),
			metadata: HashMap::new(),
		}
	}

	pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.metadata.insert(key.into(), value.into());
		self
	}

	pub fn with_public(self, public: bool) -> Self {
		self.with_metadata(PUBLIC_METADATA_KEY, public.to_string())
	}

	pub fn metadata(&self, key: &str) -> Option<&str> {
		self.metadata.get(key).map(String::as_str)
	}

	/// `public` metadata of `true` or `1`, case-insensitive.
	pub fn is_public(&self) -> bool {
		self.metadata(PUBLIC_METADATA_KEY)
			.is_some_and(|value| value.eq_ignore_ascii_case("true") || value == "1")
	}

	pub fn namespace(&self) -> ProjectNamespace {
		ProjectNamespace::new(self.project_id).with_public(self.is_public())
	}
}

/// Project lookup.
///
/// A missing project is `Ok(None)`; `Err` is reserved for a backend that
/// could not answer.
pub trait ProjectManager: Send + Sync {
	fn get(&self, project_id: i64) -> Result<Option<Project>>;
}

/// Process-local project store.
#[derive(Debug, Default)]
pub struct InMemoryProjectManager {
	projects: RwLock<HashMap<i64, Project>>,
}

impl InMemoryProjectManager {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or replaces a project, returning the previous one.
	pub fn insert(&self, project: Project) -> Option<Project> {
		self.projects.write().insert(project.project_id, project)
	}

	pub fn remove(&self, project_id: i64) -> Option<Project> {
		self.projects.write().remove(&project_id)
	}

	pub fn len(&self) -> usize {
		self.projects.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.projects.read().is_empty()
	}
}

impl FromIterator<Project> for InMemoryProjectManager {
	fn from_iter<I: IntoIterator<Item = Project>>(iter: I) -> Self {
		Self {
			projects: RwLock::new(
				iter.into_iter()
					.map(|project| (project.project_id, project))
					.collect(),
			),
		}
	}
}

impl ProjectManager for InMemoryProjectManager {
	fn get(&self, project_id: i64) -> Result<Option<Project>> {
		Ok(self.projects.read().get(&project_id).cloned())
	}
}
