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

//! Yoctopuce proxy daemon (yoctoproxyd) - System service exposing device functions over DBus.
//!
//! The daemon opens the native device library, keeps a [`ProxyManager`] of typed proxies
//! attached across hotplug, and serves them on the system bus:
//! - **Service Name**: `com.canonical.yoctoproxy`
//! - **Status Interface**: `/com/canonical/yoctoproxy/status` - Read-only operations
//! - **Control Interface**: `/com/canonical/yoctoproxy/control` - Write operations
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (`trace`, `debug`, `info`, `warn`, `error`
//!   or `off`). Defaults to `info`
//!
//! # Configuration
//!
//! Read from `/etc/yoctoproxy/config.toml`, see [`yoctoproxy::config`]. A missing file is not
//! an error, the hardcoded defaults apply.

use log::{debug, info};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use yoctoproxy::comm::dbus::{
    control_interface::ControlInterface, status_interface::StatusInterface,
};
use yoctoproxy::config::{
    self, CONFIG_FILE, DBUS_CONTROL_PATH, DBUS_SERVICE_NAME, DBUS_STATUS_PATH,
};
use yoctoproxy::native::DeviceLibrary;
use yoctoproxy::proxy::ProxyManager;
use zbus::connection;

/// Open the native library the daemon serves.
#[cfg(feature = "directory-hub")]
fn open_library(
    config: &config::DaemonConfig,
) -> Result<Arc<dyn DeviceLibrary>, Box<dyn Error>> {
    use yoctoproxy::native::directory_hub::DirectoryHub;
    info!("Mirroring modules from {:?}", config.hub_root);
    Ok(Arc::new(DirectoryHub::open(&config.hub_root)?))
}

/// Open the native library the daemon serves.
#[cfg(not(feature = "directory-hub"))]
fn open_library(
    _config: &config::DaemonConfig,
) -> Result<Arc<dyn DeviceLibrary>, Box<dyn Error>> {
    use yoctoproxy::native::memory_hub::MemoryHub;
    info!("No device library enabled, serving an empty simulated hub");
    Ok(Arc::new(MemoryHub::new()))
}

/// Pump native events into the registry forever.
async fn pump_events(manager: Arc<ProxyManager>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let handled = manager.handle_events();
        if handled > 0 {
            debug!("Handled {handled} device events");
        }
    }
}

/// Main entry point for the yoctoproxyd daemon.
///
/// Initializes the daemon by:
/// 1. Setting up logging via `env_logger` (defaults to "info" level)
/// 2. Loading the configuration
/// 3. Opening the native library and the proxy registry
/// 4. Starting the event pump
/// 5. Connecting to the system DBus and advertising the service
///
/// # Returns: `Result<(), Box<dyn Error>>`
/// * `Ok(())` - Never returns under normal operation (runs until terminated)
/// * `Err(Box<dyn Error>)` - Initialization error (library could not be opened, DBus
///   connection failed, etc.)
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = config::load_config(Path::new(CONFIG_FILE));

    let manager = Arc::new(ProxyManager::new(open_library(&config)?));
    let pump = tokio::spawn(pump_events(manager.clone(), config.poll_interval));

    let status_interface = StatusInterface::new(manager.clone());
    let control_interface = ControlInterface::new(manager.clone());

    let _conn = connection::Builder::system()?
        .name(DBUS_SERVICE_NAME)?
        .serve_at(DBUS_STATUS_PATH, status_interface)?
        .serve_at(DBUS_CONTROL_PATH, control_interface)?
        .build()
        .await?;

    info!("Started {DBUS_SERVICE_NAME} dbus service");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down");
    pump.abort();
    manager.shutdown();
    Ok(())
}
