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

//! Boundary to the native device-access library.
//!
//! Everything below this module (device enumeration, transport, command framing,
//! firmware flashing, datalogger) belongs to the native library and is treated as a
//! black box. The proxy layer only ever talks to it through the traits defined here:
//!
//! - [`DeviceLibrary`] - resolution and enumeration of functions, hotplug events and the
//!   factories for firmware updaters and consolidated datasets
//! - [`NativeFunction`] - one function of one module, addressed by hardware id
//!   (`<serial>.<functionId>`), exposing string attributes, commands and file transfers
//! - [`NativeFirmwareUpdate`] and [`NativeConsolidatedDataSet`] - long-running native objects
//!
//! The native library reports failures in two ways, which the proxy layer passes through
//! untouched: a typed sentinel ([`INVALID_INT`], [`INVALID_DOUBLE`], ...) for reads, and a
//! negative status code (see [`status`]) for operations.
//!
//! Two implementations are bundled: [`memory_hub::MemoryHub`], an in-process simulation, and
//! [`directory_hub::DirectoryHub`], which mirrors modules from a directory tree.

#[cfg(feature = "directory-hub")]
pub mod directory_hub;
pub mod memory_hub;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Native sentinel returned by integer getters when the value is unavailable.
pub const INVALID_INT: i32 = i32::MIN;
/// Native sentinel returned by 64-bit getters when the value is unavailable.
pub const INVALID_LONG: i64 = i64::MIN + 1;
/// Native sentinel returned by floating point getters when the value is unavailable.
pub const INVALID_DOUBLE: f64 = -f64::MAX;
/// Native sentinel returned by string getters when the value is unavailable.
pub const INVALID_STRING: &str = "!INVALID!";

/// Status codes returned by native operations. Zero is success, everything else is negative.
pub mod status {
    pub const SUCCESS: i32 = 0;
    pub const NOT_INITIALIZED: i32 = -1;
    pub const INVALID_ARGUMENT: i32 = -2;
    pub const NOT_SUPPORTED: i32 = -3;
    pub const DEVICE_NOT_FOUND: i32 = -4;
    pub const VERSION_MISMATCH: i32 = -5;
    pub const DEVICE_BUSY: i32 = -6;
    pub const TIMEOUT: i32 = -7;
    pub const IO_ERROR: i32 = -8;
    pub const NO_MORE_DATA: i32 = -9;
    pub const EXHAUSTED: i32 = -10;
    pub const DOUBLE_ACCES: i32 = -11;
    pub const UNAUTHORIZED: i32 = -12;
    pub const RTC_NOT_READY: i32 = -13;
    pub const FILE_NOT_FOUND: i32 = -14;
}

/// Callback invoked by the native layer each time a function publishes a new advertised value.
///
/// The native layer may call it from its own event thread.
pub type ValueCallback = Arc<dyn Fn(&dyn NativeFunction, &str) + Send + Sync>;

/// Immutable snapshot of a record produced by the native layer (file entry, scanned cell,
/// RFID tag description, ...). Fields are kept in their native textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeRecord {
    fields: BTreeMap<String, String>,
}

impl NativeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion.
    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for NativeRecord {
    fn from(value: [(&str, &str); N]) -> Self {
        value
            .into_iter()
            .fold(NativeRecord::new(), |rec, (k, v)| rec.with(k, v))
    }
}

/// Outcome of a native command.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeReply {
    /// Plain status code, `status::SUCCESS` or a negative error.
    Status(i32),
    /// Text result (AT command answer, hex dump, ...).
    Text(String),
    /// List of record snapshots (file listing, WLAN scan, ...).
    Records(Vec<NativeRecord>),
}

impl NativeReply {
    /// Status code carried by the reply. Data-carrying replies count as success.
    pub fn status(&self) -> i32 {
        match self {
            NativeReply::Status(code) => *code,
            _ => status::SUCCESS,
        }
    }
}

/// Hotplug and configuration events raised by the native device-discovery layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Arrival { serial: String },
    Removal { serial: String },
    ConfigChange { serial: String },
}

impl DeviceEvent {
    pub fn serial(&self) -> &str {
        match self {
            DeviceEvent::Arrival { serial }
            | DeviceEvent::Removal { serial }
            | DeviceEvent::ConfigChange { serial } => serial,
        }
    }
}

/// One function of one module, as owned by the native library.
pub trait NativeFunction: Send + Sync {
    /// Function class, e.g. `"Accelerometer"`.
    fn class_name(&self) -> &str;

    /// Stable identifier `<serial>.<functionId>`.
    fn hardware_id(&self) -> String;

    /// Whether the hosting module is currently reachable.
    fn is_online(&self) -> bool;

    /// Raw attribute read. `None` when the attribute is unavailable.
    fn get_attribute(&self, attr: &str) -> Option<String>;

    /// Raw attribute write.
    ///
    /// # Returns: `i32`
    /// * `status::SUCCESS` or a negative error code
    fn set_attribute(&self, attr: &str, value: &str) -> i32;

    /// Invoke a function-specific command (e.g. `pulse`, `get_list`, `joinNetwork`).
    fn call(&self, method: &str, args: &[&str]) -> NativeReply;

    /// Download a file from the function's embedded filesystem or web interface.
    fn download(&self, path: &str) -> Result<Vec<u8>, i32>;

    /// Upload a file to the function's embedded filesystem.
    fn upload(&self, path: &str, content: &[u8]) -> i32;

    /// Install (or with `None`, remove) the advertised value callback.
    fn register_value_callback(&self, callback: Option<ValueCallback>) -> i32;

    /// Opaque per-function user data, kept by the native layer.
    fn user_data(&self) -> Option<String>;

    fn set_user_data(&self, data: Option<String>);

    /// Module serial number, the part of the hardware id before the dot.
    fn serial_number(&self) -> String {
        let hwid = self.hardware_id();
        match hwid.split_once('.') {
            Some((serial, _)) => serial.to_string(),
            None => hwid,
        }
    }

    /// Function identifier, the part of the hardware id after the dot.
    fn function_id(&self) -> String {
        let hwid = self.hardware_id();
        match hwid.split_once('.') {
            Some((_, function_id)) => function_id.to_string(),
            None => String::new(),
        }
    }
}

impl fmt::Debug for dyn NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("class", &self.class_name())
            .field("hardware_id", &self.hardware_id())
            .finish()
    }
}

/// Typed getters returning the native sentinels, layered over [`NativeFunction::get_attribute`].
pub trait NativeFunctionExt: NativeFunction {
    fn get_int(&self, attr: &str) -> i32 {
        self.get_attribute(attr)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(INVALID_INT)
    }

    fn get_long(&self, attr: &str) -> i64 {
        self.get_attribute(attr)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(INVALID_LONG)
    }

    fn get_double(&self, attr: &str) -> f64 {
        self.get_attribute(attr)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(INVALID_DOUBLE)
    }

    fn get_string(&self, attr: &str) -> String {
        self.get_attribute(attr)
            .unwrap_or_else(|| INVALID_STRING.to_string())
    }
}

impl<T: NativeFunction + ?Sized> NativeFunctionExt for T {}

/// Whether `func` answers to `name`.
///
/// Accepted forms, in the order the native library resolves them: full hardware id,
/// `<serial>.<logicalName>`, `<logicalName>`, `<functionId>` and, for modules, the serial
/// number alone.
pub fn answers_to(func: &dyn NativeFunction, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let hwid = func.hardware_id();
    if hwid == name {
        return true;
    }
    let serial = func.serial_number();
    let function_id = func.function_id();
    let logical_name = func
        .get_attribute("logicalName")
        .filter(|n| !n.is_empty() && n != INVALID_STRING);
    if let Some((prefix, suffix)) = name.split_once('.') {
        return prefix == serial
            && (suffix == function_id || logical_name.as_deref() == Some(suffix));
    }
    logical_name.as_deref() == Some(name)
        || function_id == name
        || (func.class_name() == "Module" && serial == name)
}

/// Match `name` against a file pattern where `*` matches any run and `?` a single character.
/// An empty pattern matches everything.
pub(crate) fn wildcard_match(pattern: &str, name: &str) -> bool {
    fn matches(p: &[char], n: &[char]) -> bool {
        match (p.first(), n.first()) {
            (None, None) => true,
            (Some('*'), _) => matches(&p[1..], n) || (!n.is_empty() && matches(p, &n[1..])),
            (Some('?'), Some(_)) => matches(&p[1..], &n[1..]),
            (Some(a), Some(b)) if a == b => matches(&p[1..], &n[1..]),
            _ => false,
        }
    }
    if pattern.is_empty() {
        return true;
    }
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    matches(&p, &n)
}

/// Directory entry snapshot as produced by the `get_list` command of `Files` functions.
pub(crate) fn file_record(name: &str, content: &[u8]) -> NativeRecord {
    // FNV-1a, folded to 31 bits so the value stays positive in an i32.
    let crc = content.iter().fold(0x811c_9dc5_u32, |acc, b| {
        (acc ^ u32::from(*b)).wrapping_mul(0x0100_0193)
    }) & 0x7fff_ffff;
    NativeRecord::new()
        .with("name", name)
        .with("size", content.len())
        .with("crc", crc)
}

/// Long-running native firmware flashing operation.
pub trait NativeFirmwareUpdate: Send + Sync {
    /// Start flashing in the background.
    ///
    /// # Returns: `i32`
    /// * Current progress (0..=100), or a negative error code
    fn start_update(&self) -> i32;

    /// Progress in percent, `100` when done, negative on failure.
    fn progress(&self) -> i32;

    fn progress_message(&self) -> String;
}

/// Native iterator merging the timelines of several sensors.
pub trait NativeConsolidatedDataSet: Send + Sync {
    /// Fill `row` with `[timestamp, value of sensor 1, ...]` for the next instant.
    ///
    /// # Returns: `i32`
    /// * Progress in percent (`100` once the last row was delivered), or a negative error code
    fn next_record(&self, row: &mut Vec<f64>) -> i32;
}

/// The native device-access library.
pub trait DeviceLibrary: Send + Sync {
    /// Resolve a function of `class` by any name form accepted by [`answers_to`].
    ///
    /// Returns `None` when no known module hosts a matching function.
    fn find_function(&self, class: &str, name: &str) -> Option<Arc<dyn NativeFunction>>;

    /// All functions of `class` currently known to the library, in enumeration order.
    fn functions(&self, class: &str) -> Vec<Arc<dyn NativeFunction>>;

    /// Drain pending hotplug and configuration events.
    ///
    /// Implementations that poll their transport do it here.
    fn handle_events(&self) -> Vec<DeviceEvent>;

    /// Prepare a firmware update for module `serial`.
    fn firmware_update(
        &self,
        serial: &str,
        path: &str,
        settings: &[u8],
        force: bool,
    ) -> Option<Arc<dyn NativeFirmwareUpdate>>;

    /// Path of the newest firmware in `path` suitable for `serial`, newer than `min_release`.
    ///
    /// Returns an empty string when none qualifies.
    fn check_firmware(&self, serial: &str, path: &str, min_release: i32) -> String;

    /// Serial numbers of the modules currently in bootloader mode.
    fn all_bootloaders(&self) -> Vec<String>;

    /// Prepare a consolidated read of the datalogger contents of `sensors` (hardware ids).
    fn consolidated_data_set(
        &self,
        start: f64,
        end: f64,
        sensors: &[String],
    ) -> Option<Arc<dyn NativeConsolidatedDataSet>>;

    /// First function of `class`, if any (`FirstX`).
    fn first_function(&self, class: &str) -> Option<Arc<dyn NativeFunction>> {
        self.functions(class).into_iter().next()
    }

    /// Function of `class` enumerated after `hardware_id` (`nextX`).
    fn next_function(&self, class: &str, hardware_id: &str) -> Option<Arc<dyn NativeFunction>> {
        self.functions(class)
            .into_iter()
            .skip_while(|f| f.hardware_id() != hardware_id)
            .nth(1)
    }
}

#[cfg(test)]
mod tests {
    use super::memory_hub::MemoryHub;
    use super::*;
    use googletest::prelude::*;
    use rstest::*;

    fn hub() -> MemoryHub {
        let hub = MemoryHub::new();
        hub.add_function(
            "Relay",
            "RELAYLO1-27EAB.relay1",
            &[("logicalName", "pump"), ("state", "0")],
        );
        hub.add_function("Relay", "RELAYLO1-27EAB.relay2", &[("logicalName", "")]);
        hub
    }

    #[gtest]
    #[rstest]
    #[case::hardware_id("RELAYLO1-27EAB.relay1", true)]
    #[case::serial_and_logical("RELAYLO1-27EAB.pump", true)]
    #[case::logical("pump", true)]
    #[case::function_id("relay1", true)]
    #[case::other_serial("RELAYLO1-00000.relay1", false)]
    #[case::other_function("relay2", false)]
    #[case::empty("", false)]
    fn name_resolution(#[case] name: &str, #[case] expected: bool) {
        let hub = hub();
        let func = hub
            .function("RELAYLO1-27EAB.relay1")
            .expect("function should exist");
        expect_that!(answers_to(&*func, name), eq(expected));
    }

    #[gtest]
    fn typed_getters_return_native_sentinels() {
        let hub = hub();
        let func = hub
            .function("RELAYLO1-27EAB.relay1")
            .expect("function should exist");
        expect_that!(func.get_int("state"), eq(0));
        expect_that!(func.get_int("missing"), eq(INVALID_INT));
        expect_that!(func.get_long("missing"), eq(INVALID_LONG));
        expect_that!(func.get_double("missing"), eq(INVALID_DOUBLE));
        expect_that!(func.get_string("missing"), eq(INVALID_STRING));
    }

    #[gtest]
    fn first_and_next_enumerate_in_order() {
        let hub = hub();
        let first = hub.first_function("Relay").expect("first relay");
        expect_that!(first.hardware_id(), eq("RELAYLO1-27EAB.relay1"));
        let next = hub
            .next_function("Relay", &first.hardware_id())
            .expect("second relay");
        expect_that!(next.hardware_id(), eq("RELAYLO1-27EAB.relay2"));
        expect_that!(hub.next_function("Relay", &next.hardware_id()).is_none(), eq(true));
    }

    #[gtest]
    #[rstest]
    #[case::star("*.js", "startup.js", true)]
    #[case::star_no_match("*.js", "startup.json", false)]
    #[case::question("log?.txt", "log1.txt", true)]
    #[case::empty_pattern("", "anything", true)]
    #[case::literal("index.html", "index.htm", false)]
    fn wildcard_patterns(#[case] pattern: &str, #[case] name: &str, #[case] expected: bool) {
        expect_that!(wildcard_match(pattern, name), eq(expected));
    }

    #[gtest]
    fn record_from_pairs() {
        let rec = NativeRecord::from([("name", "startup.js"), ("size", "120")]);
        expect_that!(rec.field("size"), some(eq("120")));
        expect_that!(rec.field("crc"), none());
    }
}
