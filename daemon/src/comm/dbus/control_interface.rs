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
use log::{info, trace};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, OnceCell};
use zbus::{fdo, interface};

static WRITE_LOCK: OnceCell<Arc<Mutex<()>>> = OnceCell::const_new();

async fn get_write_lock_guard() -> MutexGuard<'static, ()> {
    let lock = WRITE_LOCK
        .get_or_init(|| async { Arc::new(Mutex::new(())) })
        .await;
    lock.lock().await
}

/// DBus interface for writes. Writes are serialized across callers.
pub struct ControlInterface {
    manager: Arc<ProxyManager>,
}

impl ControlInterface {
    pub fn new(manager: Arc<ProxyManager>) -> Self {
        ControlInterface { manager }
    }
}

#[interface(name = "com.canonical.yoctoproxy.control")]
impl ControlInterface {
    /// Write a property to the device and return the native status code.
    async fn write_property(
        &self,
        class: &str,
        name: &str,
        property: &str,
        value: &str,
    ) -> Result<i32, fdo::Error> {
        info!(
            "write_property called with class: {class}, name: {name}, property: {property} and \
             value: {value}"
        );
        let _guard = get_write_lock_guard().await;
        trace!("Got write lock.");
        Ok(dbus::write_property(
            &self.manager,
            class,
            name,
            property,
            value,
        )?)
    }

    async fn write_cached_property(
        &self,
        class: &str,
        name: &str,
        property: &str,
        value: &str,
    ) -> Result<String, fdo::Error> {
        info!(
            "write_cached_property called with class: {class}, name: {name}, property: \
             {property} and value: {value}"
        );
        let _guard = get_write_lock_guard().await;
        trace!("Got write lock.");
        dbus::write_cached_property(&self.manager, class, name, property, value)?;
        Ok(format!("{class} {name:?} {property} set to {value}"))
    }
}
