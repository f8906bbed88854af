// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the policy core.
//!
//! None of these surface from a permission check. Composition code turns
//! them into a deny.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RbacError {
	/// No registered namespace parser recognizes the resource.
	#[error("no namespace recognizes resource '{resource}'")]
	NotApplicable { resource: String },

	/// `relative_to` was called with a base that is not a prefix of the resource.
	#[error("resource '{resource}' is not relative to '{base}'")]
	RelativizeMismatch { resource: String, base: String },

	/// An effect string other than `allow`, `deny` or empty.
	#[error("invalid policy effect '{0}'")]
	InvalidEffect(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_name_the_resource() {
		let err = RbacError::NotApplicable {
			resource: "/unknown/1".to_string(),
		};
		assert!(err.to_string().contains("/unknown/1"));

		let err = RbacError::RelativizeMismatch {
			resource: "/project/1".to_string(),
			base: "/project/2".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"resource '/project/1' is not relative to '/project/2'"
		);
	}
}
