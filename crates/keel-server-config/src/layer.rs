// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{LoggingConfigLayer, RbacConfigLayer};

/// Server configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub rbac: Option<RbacConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl ServerConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_option(&mut self.rbac, other.rbac, RbacConfigLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_merge_empty_layers() {
		let mut base = ServerConfigLayer::default();
		base.merge(ServerConfigLayer::default());
		assert!(base.rbac.is_none());
		assert!(base.logging.is_none());
	}

	#[test]
	fn test_merge_other_overwrites() {
		let mut base = ServerConfigLayer {
			rbac: Some(RbacConfigLayer {
				namespace_cache_capacity: Some(64),
				anonymous_username: Some("visitor".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		let other = ServerConfigLayer {
			rbac: Some(RbacConfigLayer {
				namespace_cache_capacity: Some(256),
				..Default::default()
			}),
			..Default::default()
		};
		base.merge(other);
		let rbac = base.rbac.as_ref().unwrap();
		assert_eq!(rbac.namespace_cache_capacity, Some(256));
		assert_eq!(rbac.anonymous_username, Some("visitor".to_string()));
	}

	#[test]
	fn test_merge_adds_missing_sections() {
		let mut base = ServerConfigLayer::default();
		base.merge(ServerConfigLayer {
			logging: Some(LoggingConfigLayer {
				level: Some("debug".to_string()),
				..Default::default()
			}),
			..Default::default()
		});
		assert_eq!(
			base.logging.as_ref().unwrap().level,
			Some("debug".to_string())
		);
		assert!(base.rbac.is_none());
	}

	proptest! {
		#[test]
		fn merging_an_empty_layer_changes_nothing(
			capacity in proptest::option::of(1usize..10_000),
			log_decisions in proptest::option::of(any::<bool>()),
		) {
			let rbac = RbacConfigLayer {
				namespace_cache_capacity: capacity,
				anonymous_username: None,
				log_decisions,
			};
			let mut base = ServerConfigLayer {
				rbac: Some(rbac.clone()),
				..Default::default()
			};
			base.merge(ServerConfigLayer::default());
			prop_assert_eq!(base.rbac, Some(rbac));
		}
	}
}
