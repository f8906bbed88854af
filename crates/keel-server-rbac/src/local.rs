// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Top-level evaluator for a local user session.

use std::sync::Arc;

use keel_server_config::RbacConfig;
use tracing::debug;

use crate::evaluator::{AdminEvaluator, Evaluator, LazyEvaluator, LoggedEvaluator};
use crate::project::ProjectManager;
use crate::project_rbac;
use crate::security::SecurityContext;

/// Builds the evaluator for `ctx`.
///
/// System administrators are allowed everything. Every other caller goes
/// through project RBAC. The choice is made on the first permission check.
pub fn evaluator(
	ctx: Arc<dyn SecurityContext>,
	projects: Arc<dyn ProjectManager>,
	config: &RbacConfig,
) -> Arc<dyn Evaluator> {
	let principal = ctx
		.username()
		.unwrap_or(config.anonymous_username.as_str())
		.to_string();
	let log_decisions = config.log_decisions;

	let config = config.clone();
	let lazy = LazyEvaluator::new(move || {
		if ctx.is_sys_admin() {
			debug!(context = ctx.name(), "system administrator session");
			let username = ctx.username().unwrap_or_default();
			return Arc::new(AdminEvaluator::new(username)) as Arc<dyn Evaluator>;
		}
		Arc::new(project_rbac::evaluator(
			Arc::clone(&ctx),
			Arc::clone(&projects),
			&config,
		))
	});

	if log_decisions {
		Arc::new(LoggedEvaluator::new(principal, lazy))
	} else {
		Arc::new(lazy)
	}
}
