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

//! Attachment and caching machinery shared by every proxy type.
//!
//! A [`ProxyCore`] is the state behind one proxy: the class it belongs to, an optional
//! reference to the native function, an `online` flag and a cache of last known values.
//! It has two states:
//!
//! - **Unattached** - no native reference. Every call-through accessor fails with
//!   [`ProxyError::NotConnected`].
//! - **Attached** - native reference set and value callback registered, entered through
//!   [`ProxyCore::link_to_hardware`]. Linking again replaces the reference and the callback.
//!
//! There is no way back from Attached to Unattached while the proxy is in use: a removed
//! device only clears the `online` flag, the reference is kept across reconnects.
//!
//! Fields are described by typed [`Field`] constants for the typed API (`get`, `set`,
//! `live`, `write`) and by [`Property`] entries of a [`FunctionClass`] for the dynamic API
//! used over DBus (`read_property`, `write_property`, ...). Both paths end in the same
//! generic code.

use crate::error::ProxyError;
use crate::native::{NativeFunction, NativeReply, ValueCallback, answers_to, status};
use crate::proxy::value::ProxyValue;
use log::{debug, trace, warn};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// One cached value, of the concrete [`ProxyValue`] type of its field.
pub type CacheSlot = Box<dyn Any + Send + Sync>;

/// Access marker of a [`Field`].
pub trait Access {
    const WRITABLE: bool;
}

/// Field that can only be read.
#[derive(Debug, Clone, Copy)]
pub struct ReadOnly;

/// Field that can be read and written.
#[derive(Debug, Clone, Copy)]
pub struct ReadWrite;

impl Access for ReadOnly {
    const WRITABLE: bool = false;
}

impl Access for ReadWrite {
    const WRITABLE: bool = true;
}

/// Typed handle on one native attribute.
pub struct Field<T, A = ReadWrite> {
    pub attr: &'static str,
    marker: PhantomData<fn() -> (T, A)>,
}

impl<T, A> Field<T, A> {
    pub const fn new(attr: &'static str) -> Self {
        Field {
            attr,
            marker: PhantomData,
        }
    }
}

impl<T, A> Clone for Field<T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, A> Copy for Field<T, A> {}

impl<T, A> fmt::Debug for Field<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({})", self.attr)
    }
}

/// Untyped description of one property, used by the dynamic API.
#[derive(Clone, Copy)]
pub struct Property {
    pub name: &'static str,
    pub writable: bool,
    /// Reloaded by [`ProxyCore::module_config_has_changed`].
    pub cached: bool,
    get: fn(&ProxyCore, &'static str) -> Result<String, ProxyError>,
    set: fn(&ProxyCore, &'static str, &str) -> Result<i32, ProxyError>,
    live: fn(&ProxyCore, &'static str) -> String,
    write: fn(&ProxyCore, &'static str, &str) -> Result<(), ProxyError>,
    load: fn(&dyn NativeFunction, &str) -> CacheSlot,
    advertised: fn(&str) -> CacheSlot,
}

impl Property {
    pub const fn new<T: ProxyValue>(name: &'static str, writable: bool, cached: bool) -> Self {
        Property {
            name,
            writable,
            cached,
            get: get_text::<T>,
            set: set_text::<T>,
            live: live_text::<T>,
            write: write_text::<T>,
            load: load_slot::<T>,
            advertised: advertised_slot::<T>,
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("writable", &self.writable)
            .field("cached", &self.cached)
            .finish()
    }
}

fn parse_or_reject<T: ProxyValue>(attr: &str, text: &str) -> Result<T, ProxyError> {
    T::parse_text(text).ok_or_else(|| ProxyError::InvalidValue {
        property: attr.to_string(),
        value: text.to_string(),
    })
}

fn get_text<T: ProxyValue>(core: &ProxyCore, attr: &'static str) -> Result<String, ProxyError> {
    core.get(Field::<T, ReadOnly>::new(attr))
        .map(|value| value.to_text())
}

fn set_text<T: ProxyValue>(
    core: &ProxyCore,
    attr: &'static str,
    text: &str,
) -> Result<i32, ProxyError> {
    core.require_attached()?;
    core.set(Field::<T, ReadWrite>::new(attr), parse_or_reject(attr, text)?)
}

fn live_text<T: ProxyValue>(core: &ProxyCore, attr: &'static str) -> String {
    core.live(Field::<T, ReadOnly>::new(attr)).to_text()
}

fn write_text<T: ProxyValue>(
    core: &ProxyCore,
    attr: &'static str,
    text: &str,
) -> Result<(), ProxyError> {
    core.write(Field::<T, ReadWrite>::new(attr), parse_or_reject(attr, text)?);
    Ok(())
}

fn load_slot<T: ProxyValue>(func: &dyn NativeFunction, attr: &str) -> CacheSlot {
    Box::new(T::read_native(func, attr))
}

fn advertised_slot<T: ProxyValue>(value: &str) -> CacheSlot {
    Box::new(T::from_advertised(value))
}

/// Static description of a function class.
#[derive(Debug)]
pub struct FunctionClass {
    /// Native class name, also the suffix of the "not connected" message.
    pub name: &'static str,
    /// Property the advertised value is parsed into, if any.
    pub advertised: Option<&'static str>,
    /// Property groups, base classes first.
    pub groups: &'static [&'static [Property]],
}

impl FunctionClass {
    pub fn properties(&self) -> impl Iterator<Item = &'static Property> + use<> {
        let groups = self.groups;
        groups.iter().flat_map(|group| group.iter())
    }

    pub fn property(&self, name: &str) -> Option<&'static Property> {
        self.properties().find(|p| p.name == name)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Shared state of one proxy.
pub struct ProxyCore {
    class: &'static FunctionClass,
    target: String,
    func: RwLock<Option<Arc<dyn NativeFunction>>>,
    online: AtomicBool,
    cache: Mutex<HashMap<&'static str, CacheSlot>>,
}

impl fmt::Debug for ProxyCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyCore")
            .field("class", &self.class.name)
            .field("target", &self.target)
            .field("attached", &self.is_attached())
            .field("online", &self.is_online())
            .finish()
    }
}

impl ProxyCore {
    /// A new, unattached proxy of `class`, looked up as `target` (possibly empty).
    pub fn new(class: &'static FunctionClass, target: &str) -> Self {
        ProxyCore {
            class,
            target: target.to_string(),
            func: RwLock::new(None),
            online: AtomicBool::new(false),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn class(&self) -> &'static FunctionClass {
        self.class
    }

    /// Name the proxy was requested with.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The native reference, if attached.
    pub fn attached(&self) -> Option<Arc<dyn NativeFunction>> {
        match self.func.read() {
            Ok(func) => func.clone(),
            Err(e) => e.into_inner().clone(),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached().is_some()
    }

    /// The native reference or the "not connected" error of the class.
    ///
    /// # Returns: `Result<Arc<dyn NativeFunction>, ProxyError>`
    /// * `Ok(Arc<dyn NativeFunction>)` - The attached native function
    /// * `Err(ProxyError::NotConnected)` - The proxy is unattached
    pub fn require_attached(&self) -> Result<Arc<dyn NativeFunction>, ProxyError> {
        self.attached()
            .ok_or(ProxyError::NotConnected(self.class.name))
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub fn set_online(&self, online: bool) {
        debug!(
            "{} {:?} is now {}",
            self.class.name,
            self.target,
            if online { "online" } else { "offline" }
        );
        self.online.store(online, Ordering::SeqCst);
    }

    /// Whether this proxy answers to `name`, either as requested or through its native
    /// function.
    pub fn answers_to(&self, name: &str) -> bool {
        if !self.target.is_empty() && self.target == name {
            return true;
        }
        self.attached()
            .is_some_and(|func| answers_to(func.as_ref(), name))
    }

    /// Attach to `func`: replace the native reference, register the value callback and
    /// reload the cache.
    ///
    /// The callback only holds a weak reference to the proxy.
    pub fn link_to_hardware(self: &Arc<Self>, func: Arc<dyn NativeFunction>) {
        debug!(
            "Linking {} {:?} to {}",
            self.class.name,
            self.target,
            func.hardware_id()
        );
        let weak = Arc::downgrade(self);
        let callback: ValueCallback = Arc::new(move |_: &dyn NativeFunction, value: &str| {
            if let Some(core) = weak.upgrade() {
                core.value_change_callback(value);
            }
        });
        let code = func.register_value_callback(Some(callback));
        if code != status::SUCCESS {
            warn!(
                "Registering value callback on {} failed with status {code}",
                func.hardware_id()
            );
        }
        let online = func.is_online();
        match self.func.write() {
            Ok(mut slot) => *slot = Some(func),
            Err(e) => *e.into_inner() = Some(func),
        }
        self.set_online(online);
        self.module_config_has_changed();
    }

    /// Unregister the value callback and drop the native reference.
    ///
    /// Only used when the owning registry shuts down.
    pub(crate) fn release(&self) {
        let func = match self.func.write() {
            Ok(mut slot) => slot.take(),
            Err(e) => e.into_inner().take(),
        };
        if let Some(func) = func {
            func.register_value_callback(None);
        }
        self.online.store(false, Ordering::SeqCst);
        lock(&self.cache).clear();
    }

    /// Re-read every cached property from the native function.
    pub fn module_config_has_changed(&self) {
        let Some(func) = self.attached() else {
            return;
        };
        let fresh: Vec<(&'static str, CacheSlot)> = self
            .class
            .properties()
            .filter(|p| p.cached)
            .map(|p| (p.name, (p.load)(func.as_ref(), p.name)))
            .collect();
        trace!(
            "Reloaded {} cached properties of {}",
            fresh.len(),
            func.hardware_id()
        );
        lock(&self.cache).extend(fresh);
    }

    /// Cache a newly advertised value and its parsed form.
    pub fn value_change_callback(&self, value: &str) {
        trace!("{} {:?} advertised {value:?}", self.class.name, self.target);
        let parsed = self
            .class
            .advertised
            .and_then(|name| self.class.property(name))
            .map(|p| (p.name, (p.advertised)(value)));
        let mut cache = lock(&self.cache);
        cache.insert("advertisedValue", Box::new(value.to_string()));
        if let Some((name, slot)) = parsed {
            cache.insert(name, slot);
        }
    }

    /// Read `field` from the native function.
    pub fn get<T: ProxyValue, A>(&self, field: Field<T, A>) -> Result<T, ProxyError> {
        let func = self.require_attached()?;
        Ok(T::read_native(func.as_ref(), field.attr))
    }

    /// Write `field` to the native function.
    ///
    /// # Returns: `Result<i32, ProxyError>`
    /// * `Ok(status::SUCCESS)` - `value` is the sentinel, nothing was written
    /// * `Ok(i32)` - Native status code of the write
    /// * `Err(ProxyError::NotConnected)` - The proxy is unattached
    pub fn set<T: ProxyValue>(
        &self,
        field: Field<T, ReadWrite>,
        value: T,
    ) -> Result<i32, ProxyError> {
        let func = self.require_attached()?;
        if value.is_invalid() {
            return Ok(status::SUCCESS);
        }
        Ok(func.set_attribute(field.attr, &value.to_native()))
    }

    /// Last known value of `field`, or the sentinel while offline.
    pub fn live<T: ProxyValue, A>(&self, field: Field<T, A>) -> T {
        if !self.is_online() {
            return T::invalid();
        }
        lock(&self.cache)
            .get(field.attr)
            .and_then(|slot| slot.downcast_ref::<T>())
            .cloned()
            .unwrap_or_else(T::invalid)
    }

    /// Write-through of a live property.
    ///
    /// Silently does nothing when unattached, offline, given the sentinel or given the value
    /// already cached.
    pub fn write<T: ProxyValue>(&self, field: Field<T, ReadWrite>, value: T) {
        if value.is_invalid() || !self.is_online() {
            return;
        }
        let Some(func) = self.attached() else {
            return;
        };
        let unchanged = lock(&self.cache)
            .get(field.attr)
            .and_then(|slot| slot.downcast_ref::<T>())
            .is_some_and(|cached| *cached == value);
        if unchanged {
            return;
        }
        // The native layer may publish a value while writing, the cache must not be held.
        let code = func.set_attribute(field.attr, &value.to_native());
        if code != status::SUCCESS {
            // Not cached, so the next write of the same value reaches the device again.
            warn!(
                "Writing {}.{} failed with status {code}",
                func.hardware_id(),
                field.attr
            );
            return;
        }
        lock(&self.cache).insert(field.attr, Box::new(value));
    }

    /// Invoke a native command.
    pub fn call(&self, method: &str, args: &[&str]) -> Result<NativeReply, ProxyError> {
        let func = self.require_attached()?;
        Ok(func.call(method, args))
    }

    /// Invoke a native command that only reports a status code.
    pub fn call_status(&self, method: &str, args: &[&str]) -> Result<i32, ProxyError> {
        self.call(method, args).map(|reply| reply.status())
    }

    fn lookup(&self, name: &str) -> Result<&'static Property, ProxyError> {
        self.class
            .property(name)
            .ok_or_else(|| ProxyError::UnknownProperty {
                class: self.class.name,
                property: name.to_string(),
            })
    }

    fn lookup_writable(&self, name: &str) -> Result<&'static Property, ProxyError> {
        let property = self.lookup(name)?;
        if !property.writable {
            return Err(ProxyError::ReadOnly {
                class: self.class.name,
                property: name.to_string(),
            });
        }
        Ok(property)
    }

    /// Names of every property of the class, base classes first.
    pub fn properties(&self) -> Vec<&'static str> {
        self.class.properties().map(|p| p.name).collect()
    }

    /// Dynamic [`get`](Self::get), in textual form.
    pub fn read_property(&self, name: &str) -> Result<String, ProxyError> {
        let property = self.lookup(name)?;
        (property.get)(self, property.name)
    }

    /// Dynamic [`set`](Self::set) from textual form.
    pub fn write_property(&self, name: &str, value: &str) -> Result<i32, ProxyError> {
        let property = self.lookup_writable(name)?;
        (property.set)(self, property.name, value)
    }

    /// Dynamic [`live`](Self::live), in textual form.
    pub fn cached_property(&self, name: &str) -> Result<String, ProxyError> {
        let property = self.lookup(name)?;
        Ok((property.live)(self, property.name))
    }

    /// Dynamic [`write`](Self::write) from textual form.
    pub fn write_cached_property(&self, name: &str, value: &str) -> Result<(), ProxyError> {
        let property = self.lookup_writable(name)?;
        (property.write)(self, property.name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::memory_hub::MemoryHub;
    use crate::native::{INVALID_STRING, NativeFunctionExt};
    use googletest::prelude::*;

    const NAME: Field<String> = Field::new("logicalName");
    const LEVEL: Field<f64> = Field::new("level");
    const COUNT: Field<i32, ReadOnly> = Field::new("count");

    static TANK: FunctionClass = FunctionClass {
        name: "Tank",
        advertised: Some("level"),
        groups: &[&[
            Property::new::<String>("logicalName", true, true),
            Property::new::<String>("advertisedValue", false, true),
            Property::new::<f64>("level", true, true),
            Property::new::<i32>("count", false, false),
        ]],
    };

    fn attached() -> (MemoryHub, Arc<ProxyCore>) {
        let hub = MemoryHub::new();
        let func = hub.add_function(
            "Tank",
            "TANK0001-1.tank",
            &[("logicalName", "water"), ("level", "3.5"), ("count", "4")],
        );
        let core = Arc::new(ProxyCore::new(&TANK, "water"));
        core.link_to_hardware(func);
        (hub, core)
    }

    #[gtest]
    fn unattached_accessors_fail_with_class_message() {
        let core = ProxyCore::new(&TANK, "water");
        expect_that!(
            core.get(COUNT),
            err(displays_as(eq("No Tank connected")))
        );
        expect_that!(
            core.set(LEVEL, 1.0),
            err(displays_as(eq("No Tank connected")))
        );
        expect_that!(
            core.set(LEVEL, f64::NAN),
            err(displays_as(eq("No Tank connected")))
        );
        expect_that!(
            core.read_property("count"),
            err(displays_as(eq("No Tank connected")))
        );
        expect_that!(core.live(LEVEL).is_nan(), eq(true));
    }

    #[gtest]
    fn linking_registers_callback_and_loads_cache() {
        let (hub, core) = attached();
        let func = hub.function("TANK0001-1.tank").expect("tank");
        expect_that!(func.has_callback(), eq(true));
        expect_that!(core.is_online(), eq(true));
        expect_that!(core.live(NAME), eq("water"));
        expect_that!(core.live(LEVEL), eq(3.5));
        // Not cached.
        expect_that!(core.live(COUNT), eq(-1));
    }

    #[gtest]
    fn sentinel_set_does_not_call_through() {
        let (hub, core) = attached();
        let func = hub.function("TANK0001-1.tank").expect("tank");
        expect_that!(core.set(LEVEL, f64::NAN), ok(eq(&status::SUCCESS)));
        expect_that!(core.set(NAME, INVALID_STRING.to_string()), ok(eq(&status::SUCCESS)));
        expect_that!(func.writes(), is_empty());
        expect_that!(core.set(LEVEL, 2.0), ok(eq(&status::SUCCESS)));
        expect_that!(func.writes(), elements_are![eq(&("level".to_string(), "2".to_string()))]);
    }

    #[gtest]
    fn set_passes_native_status_through() {
        let (hub, core) = attached();
        hub.unplug("TANK0001-1");
        expect_that!(core.set(LEVEL, 2.0), ok(eq(&status::DEVICE_NOT_FOUND)));
    }

    #[gtest]
    fn live_reads_sentinel_while_offline() {
        let (_hub, core) = attached();
        core.set_online(false);
        expect_that!(core.live(LEVEL).is_nan(), eq(true));
        expect_that!(core.live(NAME), eq(INVALID_STRING));
        core.set_online(true);
        expect_that!(core.live(LEVEL), eq(3.5));
    }

    #[gtest]
    fn write_skips_equal_value_and_writes_through_otherwise() {
        let (hub, core) = attached();
        let func = hub.function("TANK0001-1.tank").expect("tank");
        core.write(LEVEL, 3.5);
        expect_that!(func.writes(), is_empty());
        core.write(LEVEL, f64::NAN);
        expect_that!(func.writes(), is_empty());
        core.write(LEVEL, 4.25);
        expect_that!(func.get_double("level"), eq(4.25));
        expect_that!(core.live(LEVEL), eq(4.25));
    }

    #[gtest]
    fn failed_write_is_retried() {
        let (hub, core) = attached();
        let func = hub.function("TANK0001-1.tank").expect("tank");
        func.fail_writes(status::DEVICE_BUSY);
        core.write(LEVEL, 7.5);
        expect_that!(core.live(LEVEL), eq(3.5));
        expect_that!(func.attribute("level"), some(eq("3.5")));
        func.fail_writes(status::SUCCESS);
        core.write(LEVEL, 7.5);
        expect_that!(func.writes().len(), eq(2));
        expect_that!(func.get_double("level"), eq(7.5));
        expect_that!(core.live(LEVEL), eq(7.5));
    }

    #[gtest]
    fn write_is_silent_when_offline() {
        let (hub, core) = attached();
        let func = hub.function("TANK0001-1.tank").expect("tank");
        core.set_online(false);
        core.write(LEVEL, 9.0);
        expect_that!(func.writes(), is_empty());
    }

    #[gtest]
    fn advertised_value_updates_cache() {
        let (hub, core) = attached();
        let func = hub.function("TANK0001-1.tank").expect("tank");
        func.push_value("7.75");
        expect_that!(core.live(LEVEL), eq(7.75));
        expect_that!(
            core.cached_property("advertisedValue"),
            ok(eq("7.75"))
        );
        func.push_value("garbage");
        expect_that!(core.live(LEVEL).is_nan(), eq(true));
    }

    #[gtest]
    fn config_change_reloads_cached_values() {
        let (hub, core) = attached();
        let func = hub.function("TANK0001-1.tank").expect("tank");
        func.set_raw("logicalName", "drain");
        expect_that!(core.live(NAME), eq("water"));
        core.module_config_has_changed();
        expect_that!(core.live(NAME), eq("drain"));
    }

    #[gtest]
    fn dropped_proxy_is_not_kept_alive_by_callback() {
        let (hub, core) = attached();
        let func = hub.function("TANK0001-1.tank").expect("tank");
        let weak = Arc::downgrade(&core);
        drop(core);
        expect_that!(weak.upgrade().is_none(), eq(true));
        func.push_value("1.0");
    }

    #[gtest]
    fn dynamic_access_checks_names_and_access() {
        let (_hub, core) = attached();
        expect_that!(core.read_property("level"), ok(eq("3.5")));
        expect_that!(
            core.read_property("depth"),
            err(displays_as(contains_substring("UnknownProperty")))
        );
        expect_that!(
            core.write_property("count", "3"),
            err(displays_as(contains_substring("ReadOnly")))
        );
        expect_that!(
            core.write_property("level", "deep"),
            err(displays_as(contains_substring("InvalidValue")))
        );
        expect_that!(core.write_property("level", "5"), ok(eq(&status::SUCCESS)));
        expect_that!(core.write_cached_property("level", "6"), ok(eq(&())));
        expect_that!(core.cached_property("level"), ok(eq("6")));
        expect_that!(
            core.properties(),
            elements_are![
                eq(&"logicalName"),
                eq(&"advertisedValue"),
                eq(&"level"),
                eq(&"count")
            ]
        );
    }

    #[gtest]
    fn answers_to_requested_and_native_names() {
        let (_hub, core) = attached();
        expect_that!(core.answers_to("water"), eq(true));
        expect_that!(core.answers_to("TANK0001-1.tank"), eq(true));
        expect_that!(core.answers_to("tank"), eq(true));
        expect_that!(core.answers_to("TANK0001-1.water"), eq(true));
        expect_that!(core.answers_to("fuel"), eq(false));
    }

    #[gtest]
    fn release_unregisters_callback() {
        let (hub, core) = attached();
        let func = hub.function("TANK0001-1.tank").expect("tank");
        core.release();
        expect_that!(func.has_callback(), eq(false));
        expect_that!(core.is_attached(), eq(false));
    }
}
