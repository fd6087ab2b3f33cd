// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use gridpad_app::{Alignment, DEFAULT_FONT_SIZE, MAX_FONT_SIZE, MIN_FONT_SIZE, Toolbar};
use log::LevelFilter;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "gridpad";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub toolbar: ToolbarSection,
    #[serde(default)]
    pub log: LogSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            toolbar: ToolbarSection::default(),
            log: LogSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolbarSection {
    pub alignment: Option<String>,
    pub font_size: Option<i64>,
    pub numeric: Option<bool>,
}

impl Default for ToolbarSection {
    fn default() -> Self {
        Self {
            alignment: Some(Alignment::Left.as_str().to_owned()),
            font_size: Some(i64::from(DEFAULT_FONT_SIZE)),
            numeric: Some(false),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSection {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("GRIDPAD_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set GRIDPAD_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
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
                    "config file {} has no version; add `version = 1` above the [toolbar] and [log] sections",
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
        if let Some(alignment) = &self.toolbar.alignment
            && Alignment::parse(alignment).is_none()
        {
            bail!(
                "toolbar.alignment in {} must be one of left, center, right; got {:?}",
                path.display(),
                alignment
            );
        }

        if let Some(font_size) = self.toolbar.font_size
            && (font_size < i64::from(MIN_FONT_SIZE) || font_size > i64::from(MAX_FONT_SIZE))
        {
            bail!(
                "toolbar.font_size in {} must be positive and at most {}, got {}",
                path.display(),
                MAX_FONT_SIZE,
                font_size
            );
        }

        if let Some(level) = &self.log.level {
            parse_level(level)
                .with_context(|| format!("invalid log.level in {}", path.display()))?;
        }

        if let Some(file) = &self.log.file
            && file.trim().is_empty()
        {
            bail!("log.file in {} must not be empty", path.display());
        }

        Ok(())
    }

    pub fn toolbar(&self) -> Toolbar {
        let defaults = Toolbar::default();
        let mut toolbar = Toolbar {
            alignment: self
                .toolbar
                .alignment
                .as_deref()
                .and_then(Alignment::parse)
                .unwrap_or(defaults.alignment),
            numeric: self.toolbar.numeric.unwrap_or(defaults.numeric),
            ..defaults
        };
        if let Some(font_size) = self.toolbar.font_size {
            toolbar.set_font_size(font_size);
        }
        toolbar
    }

    pub fn log_level(&self) -> Result<LevelFilter> {
        parse_level(self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file in the config")
        })?;
        Ok(data_root.join(APP_NAME).join("gridpad.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# gridpad config\n# Place this file at: {}\n\nversion = 1\n\n[toolbar]\n# Format applied to new cells and to a cell when it is focused.\nalignment = \"left\"\nfont_size = {}\nnumeric = false\n\n[log]\n# off, error, warn, info, debug or trace. GRIDPAD_LOG overrides this.\nlevel = \"{}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/gridpad/gridpad.log)\n# file = \"/absolute/path/to/gridpad.log\"\n",
            path.display(),
            DEFAULT_FONT_SIZE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

pub fn parse_level(raw: &str) -> Result<LevelFilter> {
    raw.trim().parse::<LevelFilter>().map_err(|_| {
        anyhow!("invalid log level {raw:?}; use one of: off, error, warn, info, debug, trace")
    })
}
