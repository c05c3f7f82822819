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

use crate::comm::dbus;
use crate::proxy::ProxyManager;
use log::info;
use std::sync::Arc;
use zbus::{fdo, interface};

/// Read-only DBus interface.
pub struct StatusInterface {
    manager: Arc<ProxyManager>,
}

impl StatusInterface {
    pub fn new(manager: Arc<ProxyManager>) -> Self {
        StatusInterface { manager }
    }
}

#[interface(name = "com.canonical.yoctoproxy.status")]
impl StatusInterface {
    async fn get_classes(&self) -> Result<String, fdo::Error> {
        info!("get_classes called");
        Ok(dbus::get_classes())
    }

    async fn get_functions(&self, class: &str) -> Result<String, fdo::Error> {
        info!("get_functions called with class: {class}");
        Ok(dbus::get_functions(&self.manager, class)?)
    }

    async fn get_properties(&self, class: &str) -> Result<String, fdo::Error> {
        info!("get_properties called with class: {class}");
        Ok(dbus::get_properties(class)?)
    }

    async fn is_online(&self, class: &str, name: &str) -> Result<bool, fdo::Error> {
        info!("is_online called with class: {class} and name: {name}");
        Ok(dbus::is_online(&self.manager, class, name)?)
    }

    async fn read_property(
        &self,
        class: &str,
        name: &str,
        property: &str,
    ) -> Result<String, fdo::Error> {
        info!("read_property called with class: {class}, name: {name} and property: {property}");
        Ok(dbus::read_property(&self.manager, class, name, property)?)
    }

    /// Last known value, without a round trip to the device.
    async fn read_cached_property(
        &self,
        class: &str,
        name: &str,
        property: &str,
    ) -> Result<String, fdo::Error> {
        info!(
            "read_cached_property called with class: {class}, name: {name} and property: {property}"
        );
        Ok(dbus::read_cached_property(
            &self.manager,
            class,
            name,
            property,
        )?)
    }
}
