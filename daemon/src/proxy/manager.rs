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

//! Registry of live proxies.
//!
//! The [`ProxyManager`] memoizes proxies by type and name so that every lookup of the same
//! function returns the same proxy, and keeps them attached across hotplug: each call to
//! [`ProxyManager::handle_events`] drains the native event queue and re-links, marks
//! offline or reloads the matching proxies.
//!
//! The registry is an explicit object owned by whoever drives the native library (the
//! daemon's main task, a test). Dropping it releases every proxy from the native layer.

use crate::native::{DeviceEvent, DeviceLibrary, NativeFunction};
use crate::proxy::core::ProxyCore;
use crate::proxy::function::FunctionProxy;
use log::{debug, info};
use std::any::{Any, TypeId};
use std::sync::{Arc, Mutex, MutexGuard};

struct Entry {
    type_id: TypeId,
    core: Arc<ProxyCore>,
    proxy: Arc<dyn Any + Send + Sync>,
}

pub struct ProxyManager {
    library: Arc<dyn DeviceLibrary>,
    entries: Mutex<Vec<Entry>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn of_type<P: 'static>(entries: &[Entry]) -> impl Iterator<Item = &Entry> {
    let type_id = TypeId::of::<P>();
    entries.iter().filter(move |e| e.type_id == type_id)
}

fn downcast<P: FunctionProxy>(entry: &Entry) -> Option<Arc<P>> {
    entry.proxy.clone().downcast::<P>().ok()
}

fn same_function(core: &ProxyCore, hardware_id: &str) -> bool {
    core.attached()
        .is_some_and(|func| func.hardware_id() == hardware_id)
}

impl ProxyManager {
    pub fn new(library: Arc<dyn DeviceLibrary>) -> Self {
        ProxyManager {
            library,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// The native library proxies are resolved against.
    pub fn library(&self) -> &Arc<dyn DeviceLibrary> {
        &self.library
    }

    /// Look up, or create, the proxy of type `P` answering to `name`.
    ///
    /// With an empty `name`: an unattached proxy of type `P` if one exists, else an attached
    /// one, else a new proxy over the first native function of the class, else a new empty
    /// proxy. With a non-empty `name`: the proxy answering to it, else a new proxy over the
    /// native function the library resolves, attached only if that function is online.
    ///
    /// An unmatched name is not an error. The returned proxy is simply unattached, and a
    /// later lookup of its function under another name links and returns it.
    pub fn find<P: FunctionProxy>(&self, name: &str) -> Arc<P> {
        let class = P::CLASS.name;
        let mut entries = lock(&self.entries);

        let existing = if name.is_empty() {
            of_type::<P>(&entries)
                .find(|e| !e.core.is_attached())
                .or_else(|| of_type::<P>(&entries).find(|e| e.core.is_attached()))
        } else {
            of_type::<P>(&entries).find(|e| e.core.answers_to(name))
        };
        if let Some(proxy) = existing.and_then(downcast::<P>) {
            return proxy;
        }

        let native = self.resolve_target(class, name);
        if let Some(func) = &native {
            let hardware_id = func.hardware_id();
            let bound = of_type::<P>(&entries).find(|e| same_function(&e.core, &hardware_id));
            if let Some(proxy) = bound.and_then(downcast::<P>) {
                return proxy;
            }
            // Registered under another name while the function was away.
            let stale = of_type::<P>(&entries).find(|e| {
                !e.core.is_attached()
                    && self
                        .resolve_target(class, e.core.target())
                        .is_some_and(|f| f.hardware_id() == hardware_id)
            });
            if let Some(entry) = stale {
                if func.is_online() {
                    entry.core.link_to_hardware(func.clone());
                }
                if let Some(proxy) = downcast::<P>(entry) {
                    return proxy;
                }
            }
        }

        let core = Arc::new(ProxyCore::new(P::CLASS, name));
        match native {
            Some(func) if func.is_online() => core.link_to_hardware(func),
            Some(func) => debug!(
                "{} is offline, {class} {name:?} stays unattached",
                func.hardware_id()
            ),
            None => debug!("No {class} answers to {name:?} yet"),
        }
        let proxy = Arc::new(P::from_core(core.clone()));
        entries.push(Entry {
            type_id: TypeId::of::<P>(),
            core,
            proxy: proxy.clone(),
        });
        proxy
    }

    /// Like [`ProxyManager::find`], for names that come from outside the process.
    ///
    /// An empty `name` selects the first function of the class, whatever proxies exist. A
    /// name no proxy answers to and the library cannot resolve registers nothing.
    ///
    /// # Returns: `Option<Arc<P>>`
    /// * `Some(Arc<P>)` - The proxy, attached unless its function is offline
    /// * `None` - No function of the class answers to `name`
    pub fn lookup<P: FunctionProxy>(&self, name: &str) -> Option<Arc<P>> {
        if name.is_empty() {
            return self.first::<P>();
        }
        let known = of_type::<P>(&lock(&self.entries))
            .find(|e| e.core.answers_to(name))
            .and_then(downcast::<P>);
        if known.is_some() {
            return known;
        }
        self.library.find_function(P::CLASS.name, name)?;
        Some(self.find::<P>(name))
    }

    /// Proxy over the first function of the class (`FirstX`).
    pub fn first<P: FunctionProxy>(&self) -> Option<Arc<P>> {
        let func = self.library.first_function(P::CLASS.name)?;
        Some(self.find::<P>(&func.hardware_id()))
    }

    /// Proxy over the function enumerated after `proxy`'s (`nextX`).
    pub fn next<P: FunctionProxy>(&self, proxy: &P) -> Option<Arc<P>> {
        let current = proxy.core().attached()?.hardware_id();
        let func = self.library.next_function(P::CLASS.name, &current)?;
        Some(self.find::<P>(&func.hardware_id()))
    }

    /// Cores of every registered proxy, in registration order.
    pub fn proxies(&self) -> Vec<Arc<ProxyCore>> {
        lock(&self.entries)
            .iter()
            .map(|e| e.core.clone())
            .collect()
    }

    /// Drain the native event queue and apply each event to the registered proxies.
    ///
    /// # Returns: `usize`
    /// * Number of events handled
    pub fn handle_events(&self) -> usize {
        let events = self.library.handle_events();
        if events.is_empty() {
            return 0;
        }
        let cores = self.proxies();
        for event in &events {
            debug!("Handling {event:?}");
            for core in &cores {
                self.apply(core, event, &cores);
            }
        }
        events.len()
    }

    fn apply(&self, core: &Arc<ProxyCore>, event: &DeviceEvent, cores: &[Arc<ProxyCore>]) {
        let class = core.class().name;
        let on_module = |func: &Arc<dyn NativeFunction>| func.serial_number() == event.serial();
        match (event, core.attached()) {
            (DeviceEvent::Arrival { .. }, Some(func)) if on_module(&func) => {
                // The library may hand out a new object for a replugged module.
                let fresh = self
                    .library
                    .find_function(class, &func.hardware_id())
                    .unwrap_or(func);
                core.link_to_hardware(fresh);
            }
            (DeviceEvent::Arrival { .. }, None) => {
                let resolved = self.resolve_target(class, core.target());
                let Some(func) = resolved.filter(|f| f.is_online() && on_module(f)) else {
                    return;
                };
                let hardware_id = func.hardware_id();
                if cores
                    .iter()
                    .any(|other| other.class().name == class && same_function(other, &hardware_id))
                {
                    return;
                }
                core.link_to_hardware(func);
            }
            (DeviceEvent::Removal { .. }, Some(func)) if on_module(&func) => {
                core.set_online(false);
            }
            (DeviceEvent::ConfigChange { .. }, Some(func)) if on_module(&func) => {
                core.module_config_has_changed();
            }
            _ => {}
        }
    }

    fn resolve_target(&self, class: &str, target: &str) -> Option<Arc<dyn NativeFunction>> {
        if target.is_empty() {
            self.library.first_function(class)
        } else {
            self.library.find_function(class, target)
        }
    }

    /// Release every proxy from the native layer and empty the registry.
    pub fn shutdown(&self) {
        let entries: Vec<Entry> = lock(&self.entries).drain(..).collect();
        if entries.is_empty() {
            return;
        }
        info!("Releasing {} proxies", entries.len());
        for entry in entries {
            entry.core.release();
        }
    }
}

impl Drop for ProxyManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
