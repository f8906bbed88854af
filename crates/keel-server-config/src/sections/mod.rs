// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for the Keel authorization service.

pub mod logging;
pub mod rbac;

pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use rbac::{RbacConfig, RbacConfigLayer};
