// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scoped permission evaluation for Keel registry.
//!
//! Builds on the per-principal enforcer in `keel-rbac-core` and adds the
//! server-side pieces:
//!
//! - the [`Evaluator`] trait and its combinators
//! - project role tables ([`roles`]) and grantable scope catalogs ([`scope`])
//! - evaluators for project members ([`project_rbac`]), project robots
//!   ([`project_robot`]) and system robots ([`system`])
//! - [`local::evaluator`], the entry point for a local user session
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use keel_rbac_core::{Action, Resource};
//! use keel_server_config::RbacConfig;
//! use keel_server_rbac::{local, roles, Evaluator, InMemoryProjectManager, LocalContext, Project};
//!
//! let projects: InMemoryProjectManager = [Project::new(1, "library")].into_iter().collect();
//! let ctx = LocalContext::new("alice").with_project_roles(1, [roles::DEVELOPER]);
//!
//! let evaluator = local::evaluator(Arc::new(ctx), Arc::new(projects), &RbacConfig::default());
//! assert!(evaluator.has_permission(&Resource::from("/project/1/repository"), &Action::PUSH));
//! assert!(!evaluator.has_permission(&Resource::from("/project/1/member"), &Action::CREATE));
//! ```

pub mod error;
pub mod evaluator;
pub mod local;
pub mod project;
pub mod project_rbac;
pub mod project_robot;
pub mod roles;
pub mod scope;
pub mod security;
pub mod system;

pub use error::ProjectError;
pub use evaluator::{
	AdminEvaluator, Evaluator, EvaluatorFactory, EvaluatorList, LazyEvaluator, LoggedEvaluator,
	NamespaceEvaluator,
};
pub use project::{InMemoryProjectManager, Project, ProjectManager};
pub use project_robot::{ProjectRobot, RobotFactory};
pub use roles::ProjectRole;
pub use scope::Scope;
pub use security::{LocalContext, SecurityContext};
pub use system::{RobotPermission, SystemRobot};
