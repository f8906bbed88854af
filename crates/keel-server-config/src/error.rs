// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Errors raised while loading or validating server configuration.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// An environment variable or field could not be parsed.
	#[error("invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("config file {path} is not valid TOML: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("cannot read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid configuration: {0}")]
	Validation(String),
}
