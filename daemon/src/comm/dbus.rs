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

//! DBus surface of the proxy layer.
//!
//! The interfaces address a function by class name and any name it answers to, and its
//! properties by attribute name. Each DBus method is a thin wrapper over one of the plain
//! functions below, which only need a [`ProxyManager`].

pub mod control_interface;
pub mod status_interface;

use crate::error::ProxyError;
use crate::functions::{self, find_core};
use crate::native::INVALID_STRING;
use crate::proxy::{ProxyCore, ProxyManager};
use log::trace;
use std::sync::Arc;

/// Helper function to check that a class or property name is usable before resolving it.
pub(crate) fn validate_identifier(kind: &str, value: &str) -> Result<(), ProxyError> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ProxyError::Argument(format!(
            "{value:?} is not a valid {kind} name."
        )));
    }
    Ok(())
}

fn resolve(manager: &ProxyManager, class: &str, name: &str) -> Result<Arc<ProxyCore>, ProxyError> {
    validate_identifier("class", class)?;
    trace!("Resolving {class} {name:?}");
    find_core(manager, class, name)
}

/// Names of every proxied class, one per line.
pub fn get_classes() -> String {
    functions::CLASSES
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Online functions of `class`, one `<hardwareId>:<logicalName>` per line.
pub fn get_functions(manager: &ProxyManager, class: &str) -> Result<String, ProxyError> {
    validate_identifier("class", class)?;
    let class = functions::class(class)?;
    let lines: Vec<String> = manager
        .library()
        .functions(class.name)
        .iter()
        .map(|func| {
            let logical_name = func
                .get_attribute("logicalName")
                .filter(|n| n != INVALID_STRING)
                .unwrap_or_default();
            format!("{}:{logical_name}", func.hardware_id())
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Properties of `class`, one `<name> <ro|rw>[ cached]` per line, base classes first.
pub fn get_properties(class: &str) -> Result<String, ProxyError> {
    validate_identifier("class", class)?;
    let lines: Vec<String> = functions::class(class)?
        .properties()
        .map(|p| {
            format!(
                "{} {}{}",
                p.name,
                if p.writable { "rw" } else { "ro" },
                if p.cached { " cached" } else { "" }
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Whether a function of `class` answering to `name` is reachable. An unknown name is offline.
pub fn is_online(manager: &ProxyManager, class: &str, name: &str) -> Result<bool, ProxyError> {
    match resolve(manager, class, name) {
        Ok(core) => Ok(core.is_online()),
        Err(ProxyError::NotConnected(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Read `property` from the device, in textual form.
pub fn read_property(
    manager: &ProxyManager,
    class: &str,
    name: &str,
    property: &str,
) -> Result<String, ProxyError> {
    validate_identifier("property", property)?;
    resolve(manager, class, name)?.read_property(property)
}

/// Last known value of `property`, the sentinel while offline.
pub fn read_cached_property(
    manager: &ProxyManager,
    class: &str,
    name: &str,
    property: &str,
) -> Result<String, ProxyError> {
    validate_identifier("property", property)?;
    resolve(manager, class, name)?.cached_property(property)
}

/// Write `property` to the device.
///
/// # Returns: `Result<i32, ProxyError>`
/// * `Ok(i32)` - Native status code of the write
/// * `Err(ProxyError)` - Unknown class or property, read-only property, unparsable value or
///   unattached function
pub fn write_property(
    manager: &ProxyManager,
    class: &str,
    name: &str,
    property: &str,
    value: &str,
) -> Result<i32, ProxyError> {
    validate_identifier("property", property)?;
    resolve(manager, class, name)?.write_property(property, value)
}

/// Write-through of a live property. Silently skipped while offline or when unchanged.
pub fn write_cached_property(
    manager: &ProxyManager,
    class: &str,
    name: &str,
    property: &str,
    value: &str,
) -> Result<(), ProxyError> {
    validate_identifier("property", property)?;
    resolve(manager, class, name)?.write_cached_property(property, value)
}
