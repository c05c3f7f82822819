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

use crate::listing;
use crate::proxies::status_proxy;
use log::warn;
use std::collections::BTreeMap;
use zbus::Connection;

/// Names of every class the daemon proxies.
pub async fn call_get_classes() -> Result<Vec<String>, zbus::Error> {
    let connection = Connection::system().await?;
    let proxy = status_proxy::StatusProxy::new(&connection).await?;
    Ok(listing(&proxy.get_classes().await?))
}

/// Online functions of `class`, as a map of hardware id to logical name.
pub async fn call_get_functions(class: &str) -> Result<BTreeMap<String, String>, zbus::Error> {
    let connection = Connection::system().await?;
    let proxy = status_proxy::StatusProxy::new(&connection).await?;
    let list_str = proxy.get_functions(class).await?;
    let ret_map = list_str
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(2, ':');
            match (parts.next(), parts.next()) {
                (Some(hwid), Some(name)) if !hwid.is_empty() => {
                    Some((hwid.to_string(), name.to_string()))
                }
                _ => {
                    warn!("Ignoring malformed function line {line:?}");
                    None
                }
            }
        })
        .collect();
    Ok(ret_map)
}

pub async fn call_get_properties(class: &str) -> Result<Vec<String>, zbus::Error> {
    let connection = Connection::system().await?;
    let proxy = status_proxy::StatusProxy::new(&connection).await?;
    Ok(listing(&proxy.get_properties(class).await?))
}

pub async fn call_is_online(class: &str, name: &str) -> Result<bool, zbus::Error> {
    let connection = Connection::system().await?;
    let proxy = status_proxy::StatusProxy::new(&connection).await?;
    proxy.is_online(class, name).await
}

pub async fn call_read_property(
    class: &str,
    name: &str,
    property: &str,
) -> Result<String, zbus::Error> {
    let connection = Connection::system().await?;
    let proxy = status_proxy::StatusProxy::new(&connection).await?;
    proxy.read_property(class, name, property).await
}

pub async fn call_read_cached_property(
    class: &str,
    name: &str,
    property: &str,
) -> Result<String, zbus::Error> {
    let connection = Connection::system().await?;
    let proxy = status_proxy::StatusProxy::new(&connection).await?;
    proxy.read_cached_property(class, name, property).await
}
