// This file is part of yoctoproxy, an application to expose Yoctopuce device functions as typed proxies and over DBus.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// yoctoproxy is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// yoctoproxy is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! Daemon configuration.
//!
//! Settings are read from a TOML file with a single `[defaults]` section:
//!
//! ```toml
//! [defaults]
//! hub_root = "/var/lib/yoctoproxy/hub"
//! poll_interval_ms = 250
//! ```
//!
//! Any missing key falls back to the hardcoded value. A missing or unparsable file falls
//! back entirely, with a warning.

use crate::error::ProxyError;
use crate::system_io::fs_read;
use log::{trace, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Location of the user configuration file.
pub static CONFIG_FILE: &str = "/etc/yoctoproxy/config.toml";

/// Default root of the [`DirectoryHub`](crate::native::directory_hub::DirectoryHub) tree.
pub static HUB_ROOT: &str = "/var/lib/yoctoproxy/hub";

/// Default interval between two hotplug/event pumps.
pub const POLL_INTERVAL_MS: u64 = 250;

/// DBus well-known name of the daemon.
pub static DBUS_SERVICE_NAME: &str = "com.canonical.yoctoproxy";

/// DBus object path of the read-only interface.
pub static DBUS_STATUS_PATH: &str = "/com/canonical/yoctoproxy/status";

/// DBus object path of the write interface.
pub static DBUS_CONTROL_PATH: &str = "/com/canonical/yoctoproxy/control";

#[derive(Debug, Clone, PartialEq)]
pub struct DaemonConfig {
    pub hub_root: PathBuf,
    pub poll_interval: Duration,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        DaemonConfig {
            hub_root: PathBuf::from(HUB_ROOT),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
        }
    }
}

/// This is the top level struct which holds all sections
#[derive(Debug, Deserialize)]
struct TomlConfig {
    defaults: Option<DefaultsToml>,
}

/// This is the "defaults" struct
#[derive(Debug, Deserialize)]
struct DefaultsToml {
    hub_root: Option<String>,
    poll_interval_ms: Option<u64>,
}

impl From<DefaultsToml> for DaemonConfig {
    fn from(value: DefaultsToml) -> Self {
        trace!("User provided config: {value:?}");
        DaemonConfig {
            hub_root: value.hub_root.map(PathBuf::from).unwrap_or_else(|| {
                trace!("No hub_root provided. Using hardcoded value.");
                PathBuf::from(HUB_ROOT)
            }),
            poll_interval: Duration::from_millis(match value.poll_interval_ms {
                Some(0) => {
                    warn!("poll_interval_ms must be positive. Using hardcoded value.");
                    POLL_INTERVAL_MS
                }
                Some(ms) => ms,
                None => {
                    trace!("No poll_interval_ms provided. Using hardcoded value.");
                    POLL_INTERVAL_MS
                }
            }),
        }
    }
}

/// Parse a configuration document.
///
/// # Returns: `Result<DaemonConfig, ProxyError>`
/// * `Ok(DaemonConfig)` - Parsed config, missing keys filled with defaults
/// * `Err(ProxyError::TomlDe)` - The document is not valid TOML for this schema
/// * `Err(ProxyError::Internal)` - The document has no `[defaults]` section
pub fn parse_config(toml_string: &str, origin: &Path) -> Result<DaemonConfig, ProxyError> {
    let config: TomlConfig = toml::from_str(toml_string).map_err(|e| ProxyError::TomlDe {
        file: origin.to_path_buf(),
        e,
    })?;
    match config.defaults {
        Some(defaults_toml) => Ok(defaults_toml.into()),
        None => Err(ProxyError::Internal(
            "config file did not contain a `[defaults]` section.".to_string(),
        )),
    }
}

fn config_from_file(config_path: &Path) -> Result<DaemonConfig, ProxyError> {
    if !config_path.is_file() {
        return Err(ProxyError::Internal(format!(
            "Config file not found in {config_path:?}."
        )));
    }
    let toml_string = fs_read(config_path)?;
    parse_config(&toml_string, config_path)
}

/// Load the daemon configuration, falling back to hardcoded defaults on any failure.
pub fn load_config(config_path: &Path) -> DaemonConfig {
    match config_from_file(config_path) {
        Ok(config) => {
            trace!("Successfully loaded config: {config:?}");
            config
        }
        Err(e) => {
            warn!("Using hardcoded defaults because loading config failed: {e}");
            DaemonConfig::default()
        }
    }
}
