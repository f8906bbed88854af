// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission evaluators and their combinators.
//!
//! Everything the registry asks goes through [`Evaluator::has_permission`].
//! Concrete evaluators are:
//!
//! - [`Enforcer`], one compiled principal
//! - [`EvaluatorList`], first `true` wins
//! - [`NamespaceEvaluator`], builds and caches an evaluator per namespace
//! - [`AdminEvaluator`], allows everything for a named principal
//! - [`LazyEvaluator`], builds its inner evaluator on first use
//! - [`LoggedEvaluator`], records each decision at debug level

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use keel_rbac_core::namespace::{Namespace, NamespaceId};
use keel_rbac_core::{Action, Enforcer, Resource};
use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::error::ProjectError;

pub trait Evaluator: Send + Sync {
	fn has_permission(&self, resource: &Resource, action: &Action) -> bool;
}

impl<E: Evaluator + ?Sized> Evaluator for Arc<E> {
	fn has_permission(&self, resource: &Resource, action: &Action) -> bool {
		(**self).has_permission(resource, action)
	}
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
	fn has_permission(&self, resource: &Resource, action: &Action) -> bool {
		(**self).has_permission(resource, action)
	}
}

impl Evaluator for Enforcer {
	fn has_permission(&self, resource: &Resource, action: &Action) -> bool {
		Enforcer::has_permission(self, resource, action)
	}
}

/// Tries each evaluator in order and allows on the first that allows.
#[derive(Default, Clone)]
pub struct EvaluatorList {
	evaluators: Vec<Arc<dyn Evaluator>>,
}

impl EvaluatorList {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, evaluator: impl Evaluator + 'static) -> Self {
		self.push(Arc::new(evaluator));
		self
	}

	pub fn push(&mut self, evaluator: Arc<dyn Evaluator>) {
		self.evaluators.push(evaluator);
	}

	pub fn len(&self) -> usize {
		self.evaluators.len()
	}

	pub fn is_empty(&self) -> bool {
		self.evaluators.is_empty()
	}
}

impl FromIterator<Arc<dyn Evaluator>> for EvaluatorList {
	fn from_iter<I: IntoIterator<Item = Arc<dyn Evaluator>>>(iter: I) -> Self {
		Self {
			evaluators: iter.into_iter().collect(),
		}
	}
}

impl Evaluator for EvaluatorList {
	fn has_permission(&self, resource: &Resource, action: &Action) -> bool {
		self
			.evaluators
			.iter()
			.any(|evaluator| evaluator.has_permission(resource, action))
	}
}

impl fmt::Debug for EvaluatorList {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EvaluatorList")
			.field("len", &self.evaluators.len())
			.finish()
	}
}

/// Builds the evaluator for one namespace.
///
/// `Ok(None)` means nothing applies there and is cached as a deny. `Err` is
/// logged, denied and not cached.
pub type EvaluatorFactory =
	Box<dyn Fn(&dyn Namespace) -> Result<Option<Arc<dyn Evaluator>>, ProjectError> + Send + Sync>;

/// Dispatches to a per-namespace evaluator built on first use.
///
/// Resources outside any known namespace, or in a namespace of another
/// kind, are denied. Built evaluators are cached by namespace identity;
/// concurrent misses may build twice, and the first stored value wins.
pub struct NamespaceEvaluator {
	kind: String,
	factory: EvaluatorFactory,
	cache: RwLock<HashMap<NamespaceId, Option<Arc<dyn Evaluator>>>>,
	capacity: Option<usize>,
}

impl NamespaceEvaluator {
	pub fn new<F>(kind: impl Into<String>, factory: F) -> Self
	where
		F: Fn(&dyn Namespace) -> Result<Option<Arc<dyn Evaluator>>, ProjectError>
			+ Send
			+ Sync
			+ 'static,
	{
		Self {
			kind: kind.into(),
			factory: Box::new(factory),
			cache: RwLock::new(HashMap::new()),
			capacity: None,
		}
	}

	/// Bounds the cache. At capacity an arbitrary entry is evicted before a
	/// new one is stored; zero is treated as one.
	pub fn with_capacity(mut self, capacity: usize) -> Self {
		self.capacity = Some(capacity.max(1));
		self
	}

	pub fn kind(&self) -> &str {
		&self.kind
	}

	/// Number of namespaces with a cached outcome, deny included.
	pub fn cached_len(&self) -> usize {
		self.cache.read().len()
	}

	fn resolve(&self, namespace: &dyn Namespace) -> Option<Arc<dyn Evaluator>> {
		let id = namespace.identity();

		let cached = self.cache.read().get(&id).cloned();
		if let Some(entry) = cached {
			return entry;
		}

		let built = match (self.factory)(namespace) {
			Ok(built) => built,
			Err(e) => {
				warn!(
					kind = %self.kind,
					namespace = id,
					error = %e,
					internal = e.is_internal(),
					retryable = e.is_retryable(),
					"failed to build namespace evaluator, denying"
				);
				return None;
			}
		};

		let mut cache = self.cache.write();
		if let Some(existing) = cache.get(&id) {
			return existing.clone();
		}
		if let Some(capacity) = self.capacity {
			if cache.len() >= capacity {
				if let Some(evicted) = cache.keys().next().copied() {
					cache.remove(&evicted);
					trace!(kind = %self.kind, namespace = evicted, "evicted cached evaluator");
				}
			}
		}
		debug!(
			kind = %self.kind,
			namespace = id,
			applicable = built.is_some(),
			"cached namespace evaluator"
		);
		cache.insert(id, built.clone());
		built
	}
}

impl Evaluator for NamespaceEvaluator {
	fn has_permission(&self, resource: &Resource, action: &Action) -> bool {
		let namespace = match resource.namespace() {
			Ok(namespace) => namespace,
			Err(e) => {
				trace!(resource = %resource, error = %e, "resource has no namespace");
				return false;
			}
		};

		if namespace.kind() != self.kind {
			trace!(
				resource = %resource,
				expected = %self.kind,
				actual = namespace.kind(),
				"namespace kind mismatch"
			);
			return false;
		}

		match self.resolve(namespace.as_ref()) {
			Some(evaluator) => evaluator.has_permission(resource, action),
			None => false,
		}
	}
}

impl fmt::Debug for NamespaceEvaluator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NamespaceEvaluator")
			.field("kind", &self.kind)
			.field("cached", &self.cached_len())
			.field("capacity", &self.capacity)
			.finish()
	}
}

/// Allows every request for a named principal.
#[derive(Debug, Clone)]
pub struct AdminEvaluator {
	username: Option<String>,
}

impl AdminEvaluator {
	/// An empty `username` produces an evaluator that denies everything.
	pub fn new(username: impl Into<String>) -> Self {
		let username = username.into();
		Self {
			username: (!username.is_empty()).then_some(username),
		}
	}
}

impl Evaluator for AdminEvaluator {
	fn has_permission(&self, _resource: &Resource, _action: &Action) -> bool {
		self.username.is_some()
	}
}

type EvaluatorBuilder = Box<dyn Fn() -> Arc<dyn Evaluator> + Send + Sync>;

/// Builds its inner evaluator on the first permission check.
pub struct LazyEvaluator {
	builder: EvaluatorBuilder,
	inner: OnceLock<Arc<dyn Evaluator>>,
}

impl LazyEvaluator {
	pub fn new<F>(builder: F) -> Self
	where
		F: Fn() -> Arc<dyn Evaluator> + Send + Sync + 'static,
	{
		Self {
			builder: Box::new(builder),
			inner: OnceLock::new(),
		}
	}

	pub fn is_built(&self) -> bool {
		self.inner.get().is_some()
	}
}

impl Evaluator for LazyEvaluator {
	fn has_permission(&self, resource: &Resource, action: &Action) -> bool {
		self
			.inner
			.get_or_init(|| (self.builder)())
			.has_permission(resource, action)
	}
}

impl fmt::Debug for LazyEvaluator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LazyEvaluator")
			.field("built", &self.is_built())
			.finish()
	}
}

/// Emits one debug event per decision of the wrapped evaluator.
pub struct LoggedEvaluator<E> {
	principal: String,
	inner: E,
}

impl<E: Evaluator> LoggedEvaluator<E> {
	pub fn new(principal: impl Into<String>, inner: E) -> Self {
		Self {
			principal: principal.into(),
			inner,
		}
	}
}

impl<E: Evaluator> Evaluator for LoggedEvaluator<E> {
	fn has_permission(&self, resource: &Resource, action: &Action) -> bool {
		let allowed = self.inner.has_permission(resource, action);
		debug!(
			principal = %self.principal,
			resource = %resource,
			action = %action,
			allowed,
			"permission decision"
		);
		allowed
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use keel_rbac_core::{Policy, ProjectNamespace, SimpleUser};
	use std::sync::atomic::{AtomicUsize, Ordering};

	struct Fixed(bool);

	impl Evaluator for Fixed {
		fn has_permission(&self, _: &Resource, _: &Action) -> bool {
			self.0
		}
	}

	fn project_resource(id: i64, sub: &str) -> Resource {
		ProjectNamespace::new(id).resource(&[Resource::from(sub)])
	}

	mod list {
		use super::*;

		#[test]
		fn empty_list_denies() {
			let list = EvaluatorList::new();
			assert!(list.is_empty());
			assert!(!list.has_permission(&Resource::from("/project/1"), &Action::READ));
		}

		#[test]
		fn first_allow_wins() {
			let list = EvaluatorList::new().with(Fixed(false)).with(Fixed(true));
			assert_eq!(list.len(), 2);
			assert!(list.has_permission(&Resource::from("/project/1"), &Action::READ));
		}

		#[test]
		fn all_deny() {
			let list: EvaluatorList = vec![
				Arc::new(Fixed(false)) as Arc<dyn Evaluator>,
				Arc::new(Fixed(false)),
			]
			.into_iter()
			.collect();
			assert!(!list.has_permission(&Resource::from("/project/1"), &Action::READ));
		}
	}

	mod namespace {
		use super::*;

		fn counting(calls: Arc<AtomicUsize>) -> NamespaceEvaluator {
			NamespaceEvaluator::new("project", move |ns: &dyn Namespace| {
				calls.fetch_add(1, Ordering::SeqCst);
				if ns.identity() == 404 {
					return Ok(None);
				}
				let user = SimpleUser::new("u1").with_policies([Policy::new(
					ns.resource(&[Resource::from("*")]),
					Action::ALL,
				)]);
				Ok(Some(Arc::new(Enforcer::from_user(user)) as Arc<dyn Evaluator>))
			})
		}

		#[test]
		fn delegates_to_namespace_evaluator() {
			let calls = Arc::new(AtomicUsize::new(0));
			let evaluator = counting(Arc::clone(&calls));
			assert!(evaluator.has_permission(&project_resource(1, "repository"), &Action::PUSH));
			assert!(evaluator.has_permission(&project_resource(1, "member"), &Action::READ));
			assert_eq!(calls.load(Ordering::SeqCst), 1);
		}

		#[test]
		fn absent_evaluator_is_cached_as_deny() {
			let calls = Arc::new(AtomicUsize::new(0));
			let evaluator = counting(Arc::clone(&calls));
			let resource = project_resource(404, "repository");
			assert!(!evaluator.has_permission(&resource, &Action::PULL));
			assert!(!evaluator.has_permission(&resource, &Action::PULL));
			assert_eq!(calls.load(Ordering::SeqCst), 1);
			assert_eq!(evaluator.cached_len(), 1);
		}

		#[test]
		fn unknown_namespace_is_denied() {
			let calls = Arc::new(AtomicUsize::new(0));
			let evaluator = counting(Arc::clone(&calls));
			assert!(!evaluator.has_permission(&Resource::from("/system/registry"), &Action::READ));
			assert!(!evaluator.has_permission(&Resource::from("/project/abc"), &Action::READ));
			assert_eq!(calls.load(Ordering::SeqCst), 0);
		}

		#[test]
		fn other_kind_is_denied() {
			let evaluator = NamespaceEvaluator::new("tenant", |_: &dyn Namespace| {
				Ok(Some(Arc::new(Fixed(true)) as Arc<dyn Evaluator>))
			});
			assert!(!evaluator.has_permission(&project_resource(1, "repository"), &Action::PULL));
		}

		#[test]
		fn factory_errors_are_not_cached() {
			let calls = Arc::new(AtomicUsize::new(0));
			let counter = Arc::clone(&calls);
			let evaluator = NamespaceEvaluator::new("project", move |_: &dyn Namespace| {
				if counter.fetch_add(1, Ordering::SeqCst) == 0 {
					Err(ProjectError::Unavailable("db".to_string()))
				} else {
					Ok(Some(Arc::new(Fixed(true)) as Arc<dyn Evaluator>))
				}
			});
			let resource = project_resource(1, "repository");
			assert!(!evaluator.has_permission(&resource, &Action::PULL));
			assert_eq!(evaluator.cached_len(), 0);
			assert!(evaluator.has_permission(&resource, &Action::PULL));
			assert_eq!(calls.load(Ordering::SeqCst), 2);
		}

		#[test]
		fn every_backend_error_kind_denies_uncached() {
			for error in [
				ProjectError::Upstream("reset".to_string()),
				ProjectError::Unavailable("refused".to_string()),
			] {
				let evaluator = NamespaceEvaluator::new("project", move |_: &dyn Namespace| Err(error.clone()));
				assert!(!evaluator.has_permission(&project_resource(1, "repository"), &Action::PULL));
				assert_eq!(evaluator.cached_len(), 0);
			}
		}

		#[test]
		fn bounded_cache_evicts() {
			let calls = Arc::new(AtomicUsize::new(0));
			let evaluator = counting(Arc::clone(&calls)).with_capacity(2);
			for id in 1..=5 {
				assert!(evaluator.has_permission(&project_resource(id, "repository"), &Action::PULL));
				assert!(evaluator.cached_len() <= 2);
			}
			assert_eq!(calls.load(Ordering::SeqCst), 5);
		}

		#[test]
		fn concurrent_lookups_store_one_entry() {
			let calls = Arc::new(AtomicUsize::new(0));
			let evaluator = counting(Arc::clone(&calls));
			let resource = project_resource(9, "repository");

			std::thread::scope(|scope| {
				for _ in 0..8 {
					scope.spawn(|| {
						for _ in 0..16 {
							assert!(evaluator.has_permission(&resource, &Action::PULL));
						}
					});
				}
			});

			assert_eq!(evaluator.cached_len(), 1);
			assert!(calls.load(Ordering::SeqCst) >= 1);
		}
	}

	#[test]
	fn admin_allows_everything() {
		let admin = AdminEvaluator::new("admin");
		assert!(admin.has_permission(&Resource::from("/system/registry"), &Action::DELETE));
		assert!(admin.has_permission(&project_resource(3, "member"), &Action::CREATE));
	}

	#[test]
	fn nameless_admin_denies() {
		let admin = AdminEvaluator::new("");
		assert!(!admin.has_permission(&Resource::from("/system/registry"), &Action::READ));
	}

	#[test]
	fn lazy_builds_once() {
		let builds = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&builds);
		let lazy = LazyEvaluator::new(move || {
			counter.fetch_add(1, Ordering::SeqCst);
			Arc::new(Fixed(true)) as Arc<dyn Evaluator>
		});
		assert!(!lazy.is_built());

		std::thread::scope(|scope| {
			for _ in 0..8 {
				scope.spawn(|| assert!(lazy.has_permission(&Resource::from("/project/1"), &Action::READ)));
			}
		});

		assert!(lazy.is_built());
		assert_eq!(builds.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn logged_evaluator_passes_decisions_through() {
		let logged = LoggedEvaluator::new("u1", Fixed(false));
		assert!(!logged.has_permission(&Resource::from("/project/1"), &Action::READ));
		let logged = LoggedEvaluator::new("u1", Fixed(true));
		assert!(logged.has_permission(&Resource::from("/project/1"), &Action::READ));
	}
}
