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

//! In-process simulation of the native device library.
//!
//! A [`MemoryHub`] holds a list of [`MemoryFunction`]s, each with a plain attribute map, an
//! embedded filesystem and a table of scripted command replies. Everything written through
//! the [`NativeFunction`] interface is appended to a write log so callers can check whether
//! a proxy actually called through.
//!
//! Hotplug is driven explicitly with [`MemoryHub::unplug`], [`MemoryHub::plug`] and
//! [`MemoryHub::reconfigure`]; the resulting events are queued until the next
//! [`DeviceLibrary::handle_events`]. Advertised values are pushed with
//! [`MemoryFunction::push_value`], which invokes the registered value callback synchronously.

use crate::native::{
    DeviceEvent, DeviceLibrary, NativeConsolidatedDataSet, NativeFirmwareUpdate, NativeFunction,
    NativeReply, ValueCallback, answers_to, file_record, status, wildcard_match,
};
use log::{debug, trace};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// Progress added by every poll of a simulated firmware update.
const FIRMWARE_STEP: i32 = 25;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A poisoned simulation is still a usable simulation.
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// One simulated function.
pub struct MemoryFunction {
    class: String,
    hardware_id: String,
    online: AtomicBool,
    attributes: Mutex<BTreeMap<String, String>>,
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    replies: Mutex<HashMap<String, NativeReply>>,
    writes: Mutex<Vec<(String, String)>>,
    write_status: AtomicI32,
    calls: Mutex<Vec<(String, Vec<String>)>>,
    callback: Mutex<Option<ValueCallback>>,
    user_data: Mutex<Option<String>>,
}

impl MemoryFunction {
    fn new(class: &str, hardware_id: &str, attributes: &[(&str, &str)]) -> Self {
        MemoryFunction {
            class: class.to_string(),
            hardware_id: hardware_id.to_string(),
            online: AtomicBool::new(true),
            attributes: Mutex::new(
                attributes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            files: Mutex::new(BTreeMap::new()),
            replies: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            write_status: AtomicI32::new(status::SUCCESS),
            calls: Mutex::new(Vec::new()),
            callback: Mutex::new(None),
            user_data: Mutex::new(None),
        }
    }

    /// Attribute value as stored, regardless of reachability. Not logged.
    pub fn attribute(&self, attr: &str) -> Option<String> {
        lock(&self.attributes).get(attr).cloned()
    }

    /// Change an attribute behind the proxy's back, as the device itself would. Not logged.
    pub fn set_raw(&self, attr: &str, value: &str) {
        lock(&self.attributes).insert(attr.to_string(), value.to_string());
    }

    /// Status returned by every following write. A failed write is recorded but not stored.
    pub fn fail_writes(&self, code: i32) {
        self.write_status.store(code, Ordering::SeqCst);
    }

    /// Every `(attribute, value)` written through [`NativeFunction::set_attribute`], in order.
    pub fn writes(&self) -> Vec<(String, String)> {
        lock(&self.writes).clone()
    }

    /// Every `(method, args)` received through [`NativeFunction::call`], in order.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        lock(&self.calls).clone()
    }

    /// Reply returned for the next and all following calls of `method`.
    pub fn script(&self, method: &str, reply: NativeReply) {
        lock(&self.replies).insert(method.to_string(), reply);
    }

    /// Store a file on the simulated embedded filesystem.
    pub fn put_file(&self, path: &str, content: &[u8]) {
        lock(&self.files).insert(path.to_string(), content.to_vec());
    }

    pub fn has_callback(&self) -> bool {
        lock(&self.callback).is_some()
    }

    /// Publish a new advertised value, as the device does on change.
    ///
    /// Updates `advertisedValue` and invokes the registered callback, if any, on the
    /// calling thread. Nothing is published while the function is offline.
    pub fn push_value(&self, value: &str) {
        if !self.is_online() {
            debug!("{} is offline, dropping advertised value {value:?}", self.hardware_id);
            return;
        }
        self.set_raw("advertisedValue", value);
        // Clone out of the lock, the callback reads back into this function.
        let callback = lock(&self.callback).clone();
        if let Some(callback) = callback {
            callback(self as &dyn NativeFunction, value);
        }
    }

    fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn builtin_call(&self, method: &str, args: &[&str]) -> NativeReply {
        match method {
            "get_list" => {
                let pattern = args.first().copied().unwrap_or("");
                let records = lock(&self.files)
                    .iter()
                    .filter(|(name, _)| wildcard_match(pattern, name))
                    .map(|(name, content)| file_record(name, content))
                    .collect();
                NativeReply::Records(records)
            }
            "remove" => match args.first() {
                Some(path) => match lock(&self.files).remove(*path) {
                    Some(_) => NativeReply::Status(status::SUCCESS),
                    None => NativeReply::Status(status::FILE_NOT_FOUND),
                },
                None => NativeReply::Status(status::INVALID_ARGUMENT),
            },
            "format_fs" => {
                lock(&self.files).clear();
                NativeReply::Status(status::SUCCESS)
            }
            _ => NativeReply::Status(status::SUCCESS),
        }
    }
}

impl NativeFunction for MemoryFunction {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn hardware_id(&self) -> String {
        self.hardware_id.clone()
    }

    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn get_attribute(&self, attr: &str) -> Option<String> {
        if !self.is_online() {
            return None;
        }
        let value = self.attribute(attr);
        trace!("{}.{attr} -> {value:?}", self.hardware_id);
        value
    }

    fn set_attribute(&self, attr: &str, value: &str) -> i32 {
        if !self.is_online() {
            return status::DEVICE_NOT_FOUND;
        }
        trace!("{}.{attr} <- {value:?}", self.hardware_id);
        lock(&self.writes).push((attr.to_string(), value.to_string()));
        let code = self.write_status.load(Ordering::SeqCst);
        if code == status::SUCCESS {
            self.set_raw(attr, value);
        }
        code
    }

    fn call(&self, method: &str, args: &[&str]) -> NativeReply {
        if !self.is_online() {
            return NativeReply::Status(status::DEVICE_NOT_FOUND);
        }
        trace!("{}.{method}({args:?})", self.hardware_id);
        lock(&self.calls).push((
            method.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
        let scripted = lock(&self.replies).get(method).cloned();
        scripted.unwrap_or_else(|| self.builtin_call(method, args))
    }

    fn download(&self, path: &str) -> Result<Vec<u8>, i32> {
        if !self.is_online() {
            return Err(status::DEVICE_NOT_FOUND);
        }
        lock(&self.files)
            .get(path)
            .cloned()
            .ok_or(status::FILE_NOT_FOUND)
    }

    fn upload(&self, path: &str, content: &[u8]) -> i32 {
        if !self.is_online() {
            return status::DEVICE_NOT_FOUND;
        }
        self.put_file(path, content);
        status::SUCCESS
    }

    fn register_value_callback(&self, callback: Option<ValueCallback>) -> i32 {
        *lock(&self.callback) = callback;
        status::SUCCESS
    }

    fn user_data(&self) -> Option<String> {
        lock(&self.user_data).clone()
    }

    fn set_user_data(&self, data: Option<String>) {
        *lock(&self.user_data) = data;
    }
}

struct FirmwareFile {
    product_prefix: String,
    path: String,
    release: i32,
}

/// Simulated native device library.
#[derive(Default)]
pub struct MemoryHub {
    functions: RwLock<Vec<Arc<MemoryFunction>>>,
    events: Mutex<VecDeque<DeviceEvent>>,
    bootloaders: Mutex<Vec<String>>,
    firmwares: Mutex<Vec<FirmwareFile>>,
    timelines: Mutex<HashMap<String, Vec<(f64, f64)>>>,
}

impl MemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn all(&self) -> Vec<Arc<MemoryFunction>> {
        self.functions
            .read()
            .map(|functions| functions.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    fn of_serial(&self, serial: &str) -> Vec<Arc<MemoryFunction>> {
        self.all()
            .into_iter()
            .filter(|f| f.serial_number() == serial)
            .collect()
    }

    fn queue(&self, event: DeviceEvent) {
        debug!("Queueing {event:?}");
        lock(&self.events).push_back(event);
    }

    /// Add a function, online, with the given initial attributes.
    ///
    /// The first function of a serial also queues an arrival event for that module.
    pub fn add_function(
        &self,
        class: &str,
        hardware_id: &str,
        attributes: &[(&str, &str)],
    ) -> Arc<MemoryFunction> {
        let func = Arc::new(MemoryFunction::new(class, hardware_id, attributes));
        let serial = func.serial_number();
        let first_of_module = self.of_serial(&serial).is_empty();
        match self.functions.write() {
            Ok(mut functions) => functions.push(func.clone()),
            Err(e) => e.into_inner().push(func.clone()),
        }
        if first_of_module {
            self.queue(DeviceEvent::Arrival { serial });
        }
        func
    }

    pub fn function(&self, hardware_id: &str) -> Option<Arc<MemoryFunction>> {
        self.all()
            .into_iter()
            .find(|f| f.hardware_id == hardware_id)
    }

    /// Disconnect every function of module `serial`.
    pub fn unplug(&self, serial: &str) {
        for func in self.of_serial(serial) {
            func.set_online(false);
        }
        self.queue(DeviceEvent::Removal {
            serial: serial.to_string(),
        });
    }

    /// Reconnect every function of module `serial`.
    pub fn plug(&self, serial: &str) {
        for func in self.of_serial(serial) {
            func.set_online(true);
        }
        self.queue(DeviceEvent::Arrival {
            serial: serial.to_string(),
        });
    }

    /// Signal that the configuration of module `serial` changed.
    pub fn reconfigure(&self, serial: &str) {
        self.queue(DeviceEvent::ConfigChange {
            serial: serial.to_string(),
        });
    }

    pub fn add_bootloader(&self, serial: &str) {
        lock(&self.bootloaders).push(serial.to_string());
    }

    /// Make a firmware file available to [`DeviceLibrary::check_firmware`].
    ///
    /// `product_prefix` is matched against the beginning of the module serial.
    pub fn add_firmware(&self, product_prefix: &str, path: &str, release: i32) {
        lock(&self.firmwares).push(FirmwareFile {
            product_prefix: product_prefix.to_string(),
            path: path.to_string(),
            release,
        });
    }

    /// Datalogger contents of `hardware_id` as `(timestamp, value)` pairs.
    pub fn set_timeline(&self, hardware_id: &str, samples: &[(f64, f64)]) {
        lock(&self.timelines).insert(hardware_id.to_string(), samples.to_vec());
    }
}

impl DeviceLibrary for MemoryHub {
    fn find_function(&self, class: &str, name: &str) -> Option<Arc<dyn NativeFunction>> {
        self.all()
            .into_iter()
            .find(|f| f.class == class && answers_to(&**f, name))
            .map(|f| f as Arc<dyn NativeFunction>)
    }

    fn functions(&self, class: &str) -> Vec<Arc<dyn NativeFunction>> {
        self.all()
            .into_iter()
            .filter(|f| f.class == class && f.is_online())
            .map(|f| f as Arc<dyn NativeFunction>)
            .collect()
    }

    fn handle_events(&self) -> Vec<DeviceEvent> {
        lock(&self.events).drain(..).collect()
    }

    fn firmware_update(
        &self,
        serial: &str,
        path: &str,
        _settings: &[u8],
        _force: bool,
    ) -> Option<Arc<dyn NativeFirmwareUpdate>> {
        debug!("Preparing simulated firmware update of {serial} from {path:?}");
        Some(Arc::new(MemoryFirmwareUpdate::new(path)))
    }

    fn check_firmware(&self, serial: &str, path: &str, min_release: i32) -> String {
        lock(&self.firmwares)
            .iter()
            .filter(|fw| {
                serial.starts_with(&fw.product_prefix)
                    && fw.path.starts_with(path)
                    && fw.release > min_release
            })
            .max_by_key(|fw| fw.release)
            .map(|fw| fw.path.clone())
            .unwrap_or_default()
    }

    fn all_bootloaders(&self) -> Vec<String> {
        lock(&self.bootloaders).clone()
    }

    fn consolidated_data_set(
        &self,
        start: f64,
        end: f64,
        sensors: &[String],
    ) -> Option<Arc<dyn NativeConsolidatedDataSet>> {
        let timelines = lock(&self.timelines);
        let series: Vec<&Vec<(f64, f64)>> = sensors
            .iter()
            .map(|hwid| timelines.get(hwid))
            .collect::<Option<_>>()?;
        Some(Arc::new(MemoryConsolidatedDataSet::merge(
            start, end, &series,
        )))
    }
}

/// Firmware update that advances by a fixed step on every progress poll.
pub struct MemoryFirmwareUpdate {
    path: String,
    started: AtomicBool,
    progress: AtomicI32,
}

impl MemoryFirmwareUpdate {
    fn new(path: &str) -> Self {
        MemoryFirmwareUpdate {
            path: path.to_string(),
            started: AtomicBool::new(false),
            progress: AtomicI32::new(0),
        }
    }
}

impl NativeFirmwareUpdate for MemoryFirmwareUpdate {
    fn start_update(&self) -> i32 {
        if self.path.is_empty() {
            self.progress.store(status::INVALID_ARGUMENT, Ordering::SeqCst);
            return status::INVALID_ARGUMENT;
        }
        self.started.store(true, Ordering::SeqCst);
        self.progress.load(Ordering::SeqCst)
    }

    fn progress(&self) -> i32 {
        if !self.started.load(Ordering::SeqCst) {
            return self.progress.load(Ordering::SeqCst);
        }
        let advance = |p: i32| (0..100).contains(&p).then(|| (p + FIRMWARE_STEP).min(100));
        match self
            .progress
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, advance)
        {
            Ok(previous) => (previous + FIRMWARE_STEP).min(100),
            Err(current) => current,
        }
    }

    fn progress_message(&self) -> String {
        match self.progress.load(Ordering::SeqCst) {
            p if p < 0 => "Invalid firmware path".to_string(),
            0 if !self.started.load(Ordering::SeqCst) => "Not started".to_string(),
            100 => "Firmware update completed".to_string(),
            p => format!("Flashing firmware ({p}%)"),
        }
    }
}

/// Rows of several timelines aligned on their common timestamps.
pub struct MemoryConsolidatedDataSet {
    rows: Vec<Vec<f64>>,
    cursor: Mutex<usize>,
}

impl MemoryConsolidatedDataSet {
    /// `start` and `end` of zero leave that side unbounded.
    fn merge(start: f64, end: f64, series: &[&Vec<(f64, f64)>]) -> Self {
        let in_range = |t: f64| (start == 0.0 || t >= start) && (end == 0.0 || t <= end);
        let mut stamps: Vec<f64> = series
            .iter()
            .flat_map(|s| s.iter().map(|(t, _)| *t))
            .filter(|t| in_range(*t))
            .collect();
        stamps.sort_by(f64::total_cmp);
        stamps.dedup();
        let rows = stamps
            .into_iter()
            .map(|t| {
                let mut row = vec![t];
                row.extend(series.iter().map(|s| {
                    s.iter()
                        .find(|(ts, _)| *ts == t)
                        .map_or(f64::NAN, |(_, v)| *v)
                }));
                row
            })
            .collect();
        MemoryConsolidatedDataSet {
            rows,
            cursor: Mutex::new(0),
        }
    }
}

impl NativeConsolidatedDataSet for MemoryConsolidatedDataSet {
    fn next_record(&self, row: &mut Vec<f64>) -> i32 {
        let mut cursor = lock(&self.cursor);
        row.clear();
        if self.rows.is_empty() {
            return 100;
        }
        match self.rows.get(*cursor) {
            Some(next) => {
                row.extend_from_slice(next);
                *cursor += 1;
                (*cursor * 100 / self.rows.len()) as i32
            }
            None => 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeFunctionExt;
    use googletest::prelude::*;

    #[gtest]
    fn offline_function_reads_nothing_and_refuses_writes() {
        let hub = MemoryHub::new();
        let func = hub.add_function("Relay", "RELAYLO1-27EAB.relay1", &[("state", "1")]);
        hub.unplug("RELAYLO1-27EAB");
        expect_that!(func.get_attribute("state"), none());
        expect_that!(func.set_attribute("state", "0"), eq(status::DEVICE_NOT_FOUND));
        expect_that!(func.writes(), is_empty());
        hub.plug("RELAYLO1-27EAB");
        expect_that!(func.get_int("state"), eq(1));
    }

    #[gtest]
    fn events_are_queued_once_per_module() {
        let hub = MemoryHub::new();
        hub.add_function("Relay", "RELAYLO1-27EAB.relay1", &[]);
        hub.add_function("Relay", "RELAYLO1-27EAB.relay2", &[]);
        hub.unplug("RELAYLO1-27EAB");
        expect_that!(
            hub.handle_events(),
            elements_are![
                eq(&DeviceEvent::Arrival {
                    serial: "RELAYLO1-27EAB".into()
                }),
                eq(&DeviceEvent::Removal {
                    serial: "RELAYLO1-27EAB".into()
                })
            ]
        );
        expect_that!(hub.handle_events(), is_empty());
    }

    #[gtest]
    fn push_value_invokes_callback() {
        let hub = MemoryHub::new();
        let func = hub.add_function("HubPort", "YHUBSHL1-1234.hubPort1", &[]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        func.register_value_callback(Some(Arc::new(move |f: &dyn NativeFunction, v: &str| {
            lock(&sink).push(format!("{}={v}", f.function_id()));
        })));
        func.push_value("ON");
        expect_that!(lock(&seen).clone(), elements_are![eq("hubPort1=ON")]);
        expect_that!(func.attribute("advertisedValue"), some(eq("ON")));
    }

    #[gtest]
    fn builtin_file_commands() {
        let hub = MemoryHub::new();
        let files = hub.add_function("Files", "YHUBWLN1-1234.files", &[]);
        files.upload("startup.js", b"print(1)");
        files.upload("index.html", b"<html/>");
        match files.call("get_list", &["*.js"]) {
            NativeReply::Records(records) => {
                expect_that!(records.len(), eq(1));
                expect_that!(records[0].field("name"), some(eq("startup.js")));
                expect_that!(records[0].field("size"), some(eq("8")));
            }
            other => panic!("unexpected reply {other:?}"),
        }
        expect_that!(
            files.call("remove", &["missing"]).status(),
            eq(status::FILE_NOT_FOUND)
        );
        expect_that!(files.call("format_fs", &[]).status(), eq(status::SUCCESS));
        expect_that!(files.download("startup.js"), err(eq(&status::FILE_NOT_FOUND)));
    }

    #[gtest]
    fn firmware_update_progresses_to_completion() {
        let hub = MemoryHub::new();
        let update = hub
            .firmware_update("RELAYLO1-27EAB", "/fw/RELAYLO1.byn", &[], false)
            .expect("update should be prepared");
        expect_that!(update.progress(), eq(0));
        expect_that!(update.start_update(), eq(0));
        let mut last = 0;
        while last < 100 {
            last = update.progress();
        }
        expect_that!(last, eq(100));
        expect_that!(update.progress_message(), eq("Firmware update completed"));
    }

    #[gtest]
    fn firmware_update_without_path_fails() {
        let hub = MemoryHub::new();
        let update = hub
            .firmware_update("RELAYLO1-27EAB", "", &[], false)
            .expect("update should be prepared");
        expect_that!(update.start_update(), eq(status::INVALID_ARGUMENT));
        expect_that!(update.progress(), eq(status::INVALID_ARGUMENT));
    }

    #[gtest]
    fn check_firmware_picks_newest_matching_release() {
        let hub = MemoryHub::new();
        hub.add_firmware("RELAYLO1", "/fw/RELAYLO1.51000.byn", 51000);
        hub.add_firmware("RELAYLO1", "/fw/RELAYLO1.52000.byn", 52000);
        hub.add_firmware("YHUBSHL1", "/fw/YHUBSHL1.60000.byn", 60000);
        expect_that!(
            hub.check_firmware("RELAYLO1-27EAB", "/fw", 50000),
            eq("/fw/RELAYLO1.52000.byn")
        );
        expect_that!(hub.check_firmware("RELAYLO1-27EAB", "/fw", 52000), eq(""));
    }

    #[gtest]
    fn consolidated_rows_align_timestamps() {
        let hub = MemoryHub::new();
        hub.set_timeline("METEOMK1-1.temperature", &[(10.0, 21.5), (20.0, 21.7)]);
        hub.set_timeline("METEOMK1-1.humidity", &[(20.0, 40.0), (30.0, 41.0)]);
        let data = hub
            .consolidated_data_set(
                0.0,
                25.0,
                &[
                    "METEOMK1-1.temperature".to_string(),
                    "METEOMK1-1.humidity".to_string(),
                ],
            )
            .expect("both timelines exist");
        let mut row = Vec::new();
        expect_that!(data.next_record(&mut row), eq(50));
        expect_that!(row[0], eq(10.0));
        expect_that!(row[1], eq(21.5));
        expect_that!(row[2].is_nan(), eq(true));
        expect_that!(data.next_record(&mut row), eq(100));
        expect_that!(row, elements_are![eq(&20.0), eq(&21.7), eq(&40.0)]);
        expect_that!(
            hub.consolidated_data_set(0.0, 0.0, &["nope".to_string()])
                .is_none(),
            eq(true)
        );
    }
}
