// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy core for Keel registry authorization.
//!
//! This crate holds the pieces that do not depend on any server state:
//!
//! - [`Resource`] paths and their algebra (join, relativize, namespace lookup)
//! - the [`namespace`] parser registry with the built-in `project` kind
//! - [`Policy`] triples and the [`User`]/[`Role`] contracts
//! - the keyMatch2 [`matcher`]
//! - the per-principal [`Enforcer`]
//!
//! Scope-aware composition (projects, robots, anonymous access) lives in
//! `keel-server-rbac`.
//!
//! # Example
//!
//! ```
//! use keel_rbac_core::{Action, Enforcer, Policy, Resource, SimpleUser};
//!
//! let user = SimpleUser::new("u1").with_policies([
//!     Policy::new("/project/1/*", Action::ALL),
//!     Policy::deny("/project/1/member", Action::CREATE),
//! ]);
//! let enforcer = Enforcer::from_user(user);
//!
//! assert!(enforcer.has_permission(&Resource::from("/project/1/repository"), &Action::PUSH));
//! assert!(!enforcer.has_permission(&Resource::from("/project/1/member"), &Action::CREATE));
//! ```

pub mod action;
pub mod enforcer;
pub mod error;
pub mod matcher;
pub mod namespace;
pub mod policy;
pub mod resource;
pub mod user;

pub use action::{Action, Effect};
pub use enforcer::Enforcer;
pub use error::RbacError;
pub use namespace::{Namespace, NamespaceId, ProjectNamespace, SystemNamespace};
pub use policy::Policy;
pub use resource::Resource;
pub use user::{BaseUser, Role, SimpleRole, SimpleUser, User};
