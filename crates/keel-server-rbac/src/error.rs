// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for project lookups.
//!
//! A missing project is not an error: [`ProjectManager::get`] returns
//! `Ok(None)` and evaluators deny. These variants describe a backend that
//! could not answer at all.
//!
//! [`ProjectManager::get`]: crate::project::ProjectManager::get

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectError {
	/// The project backend failed while answering.
	#[error("project backend error: {0}")]
	Upstream(String),

	/// The project backend could not be reached.
	#[error("project backend unavailable: {0}")]
	Unavailable(String),
}

impl ProjectError {
	/// Whether the failure is on the server side rather than in the request.
	pub fn is_internal(&self) -> bool {
		match self {
			ProjectError::Upstream(_) | ProjectError::Unavailable(_) => true,
		}
	}

	pub fn is_retryable(&self) -> bool {
		matches!(self, ProjectError::Unavailable(_))
	}
}

/// Result type alias for project lookups.
pub type Result<T> = std::result::Result<T, ProjectError>;
