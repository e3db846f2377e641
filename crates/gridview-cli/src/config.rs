// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use gridview_app::{FilterAttribute, ViewBehavior};
use gridview_source::{DEFAULT_SOURCE_URL, parse_source_url};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "gridview";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "10s";
const CONFIG_PATH_ENV: &str = "GRIDVIEW_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub view: View,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            source: Source::default(),
            view: View::default(),
            logging: Logging::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    pub url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Source {
    fn default() -> Self {
        Self {
            url: Some(DEFAULT_SOURCE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct View {
    pub compose_search_and_filter: Option<bool>,
    pub numeric_id_sort: Option<bool>,
    pub reset_page_on_change: Option<bool>,
    pub filter_attribute: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Logging {
    pub path: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version; add `version = 1` and put settings under [source], [view], and [logging]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(url) = &self.source.url {
            parse_source_url(url)
                .with_context(|| format!("invalid source.url in {}", path.display()))?;
        }

        if let Some(timeout) = &self.source.timeout {
            let parsed = parse_duration(timeout)
                .with_context(|| format!("invalid source.timeout in {}", path.display()))?;
            if parsed <= Duration::ZERO {
                bail!(
                    "source.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(log_path) = &self.logging.path
            && log_path.trim().is_empty()
        {
            bail!(
                "logging.path in {} must not be empty; remove the key to use the default",
                path.display()
            );
        }

        Ok(())
    }

    pub fn source_url(&self) -> &str {
        self.source.url.as_deref().unwrap_or(DEFAULT_SOURCE_URL)
    }

    pub fn source_timeout(&self) -> Result<Duration> {
        parse_duration(self.source.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn view_behavior(&self) -> ViewBehavior {
        ViewBehavior {
            compose_search_and_filter: self.view.compose_search_and_filter.unwrap_or(false),
            numeric_id_sort: self.view.numeric_id_sort.unwrap_or(false),
            reset_page_on_change: self.view.reset_page_on_change.unwrap_or(false),
        }
    }

    /// Unrecognized names select no attribute rather than failing the load.
    pub fn filter_attribute(&self) -> FilterAttribute {
        self.view
            .filter_attribute
            .as_deref()
            .map(FilterAttribute::parse)
            .unwrap_or_default()
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.logging.path {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [logging].path in the config file")
        })?;
        Ok(data_root.join(APP_NAME).join(format!("{APP_NAME}.log")))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# gridview config\n# Place this file at: {}\n\nversion = 1\n\n[source]\nurl = \"{}\"\ntimeout = \"{}\"\n\n[view]\n# AND search with the filter instead of letting the most recent one win.\ncompose_search_and_filter = false\n# Sort ids numerically instead of as text (1, 2, 10 rather than 1, 10, 2).\nnumeric_id_sort = false\n# Jump back to page 1 whenever search, filter, or sort changes the rows.\nreset_page_on_change = false\n# Attribute the filter selector starts on: none, id, title, or body.\nfilter_attribute = \"none\"\n\n[logging]\n# Optional. Default is the platform data dir (for example ~/.local/share/gridview/gridview.log)\n# path = \"/absolute/path/to/gridview.log\"\n",
            path.display(),
            DEFAULT_SOURCE_URL,
            DEFAULT_TIMEOUT,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
