// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Tracing goes to a file; the terminal belongs to the UI.

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Honors `RUST_LOG`, defaulting to `info`.
pub fn init(log_path: &Path) -> Result<()> {
    let directory = log_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(directory)
        .with_context(|| format!("create log directory {}", directory.display()))?;

    let file_name = log_path
        .file_name()
        .ok_or_else(|| anyhow!("log path {} has no file name", log_path.display()))?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(file_appender)
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow!("initialize logging: {error}"))
}
