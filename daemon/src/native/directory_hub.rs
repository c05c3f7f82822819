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

//! Native library backed by a directory tree.
//!
//! Modules are mirrored (by a bridge process, a fuse mount, or by hand on a bench) as:
//!
//! ```text
//! <root>/
//! ├── .bootloader/<serial>          modules currently in bootloader mode
//! └── <serial>/
//!     └── <functionId>/
//!         ├── class                 function class, e.g. "Relay"
//!         ├── <attribute>           one file per attribute, plain text
//!         ├── commands              commands appended as "method arg1 arg2..."
//!         └── files/                embedded filesystem of `Files` functions
//! ```
//!
//! A module is present while its directory exists. [`DeviceLibrary::handle_events`] rescans
//! the tree, reports arrivals and removals, and fires the value callback of every function
//! whose `advertisedValue` file changed since the previous scan.
//!
//! The tree carries no datalogger and no flashing path, so consolidated datasets and
//! firmware updates are not available from this backend.

use crate::error::ProxyError;
use crate::native::{
    DeviceEvent, DeviceLibrary, NativeConsolidatedDataSet, NativeFirmwareUpdate, NativeFunction,
    NativeReply, ValueCallback, answers_to, file_record, status, wildcard_match,
};
use crate::system_io::{
    fs_create_dir, fs_read, fs_read_bytes, fs_read_dir, fs_remove_file, fs_write, fs_write_bytes,
};
use log::{debug, info, trace, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

static CLASS_FILE: &str = "class";
static COMMANDS_FILE: &str = "commands";
static FILES_DIR: &str = "files";
static BOOTLOADER_DIR: &str = ".bootloader";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Attribute and file names must stay inside the function directory.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/')
}

/// One function mirrored as a directory.
pub struct DirectoryFunction {
    class: String,
    hardware_id: String,
    dir: PathBuf,
    online: AtomicBool,
    callback: Mutex<Option<ValueCallback>>,
    user_data: Mutex<Option<String>>,
    last_advertised: Mutex<Option<String>>,
}

impl DirectoryFunction {
    fn new(class: &str, hardware_id: String, dir: PathBuf) -> Self {
        DirectoryFunction {
            class: class.to_string(),
            hardware_id,
            dir,
            online: AtomicBool::new(true),
            callback: Mutex::new(None),
            user_data: Mutex::new(None),
            last_advertised: Mutex::new(None),
        }
    }

    fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn files_dir(&self) -> PathBuf {
        self.dir.join(FILES_DIR)
    }

    /// Fire the value callback if `advertisedValue` differs from the last one seen.
    fn poll_advertised(&self) {
        let Some(value) = self.get_attribute("advertisedValue") else {
            return;
        };
        {
            let mut last = lock(&self.last_advertised);
            if last.as_deref() == Some(value.as_str()) {
                return;
            }
            *last = Some(value.clone());
        }
        trace!("{} advertised {value:?}", self.hardware_id);
        let callback = lock(&self.callback).clone();
        if let Some(callback) = callback {
            callback(self as &dyn NativeFunction, &value);
        }
    }

    fn append_command(&self, method: &str, args: &[&str]) -> Result<(), ProxyError> {
        let path = self.dir.join(COMMANDS_FILE);
        let mut log = fs_read(&path).unwrap_or_default();
        log.push_str(method);
        for arg in args {
            log.push(' ');
            log.push_str(arg);
        }
        log.push('\n');
        fs_write(&path, true, log)
    }

    fn list_files(&self, pattern: &str) -> NativeReply {
        let dir = self.files_dir();
        let names = match fs_read_dir(&dir) {
            Ok(names) => names,
            // A function that never stored a file has no files directory yet.
            Err(_) if !dir.exists() => Vec::new(),
            Err(e) => {
                warn!("{e}");
                return NativeReply::Status(status::IO_ERROR);
            }
        };
        let records = names
            .iter()
            .filter(|name| wildcard_match(pattern, name))
            .filter_map(|name| {
                fs_read_bytes(&dir.join(name))
                    .ok()
                    .map(|content| file_record(name, &content))
            })
            .collect();
        NativeReply::Records(records)
    }

    fn remove_file(&self, name: &str) -> NativeReply {
        if !is_plain_name(name) {
            return NativeReply::Status(status::INVALID_ARGUMENT);
        }
        let path = self.files_dir().join(name);
        if !path.is_file() {
            return NativeReply::Status(status::FILE_NOT_FOUND);
        }
        match fs_remove_file(&path) {
            Ok(()) => NativeReply::Status(status::SUCCESS),
            Err(e) => {
                warn!("{e}");
                NativeReply::Status(status::IO_ERROR)
            }
        }
    }

    fn format_fs(&self) -> NativeReply {
        let dir = self.files_dir();
        let names = fs_read_dir(&dir).unwrap_or_default();
        for name in names {
            if let Err(e) = fs_remove_file(&dir.join(&name)) {
                warn!("{e}");
                return NativeReply::Status(status::IO_ERROR);
            }
        }
        NativeReply::Status(status::SUCCESS)
    }
}

impl NativeFunction for DirectoryFunction {
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
        if !self.is_online() || !is_plain_name(attr) {
            return None;
        }
        fs_read(&self.dir.join(attr))
            .ok()
            .map(|raw| raw.trim_end_matches('\n').to_string())
    }

    fn set_attribute(&self, attr: &str, value: &str) -> i32 {
        if !self.is_online() {
            return status::DEVICE_NOT_FOUND;
        }
        if !is_plain_name(attr) || attr == CLASS_FILE || attr == COMMANDS_FILE {
            return status::INVALID_ARGUMENT;
        }
        match fs_write(&self.dir.join(attr), true, value) {
            Ok(()) => status::SUCCESS,
            Err(e) => {
                warn!("{e}");
                status::IO_ERROR
            }
        }
    }

    fn call(&self, method: &str, args: &[&str]) -> NativeReply {
        if !self.is_online() {
            return NativeReply::Status(status::DEVICE_NOT_FOUND);
        }
        match (method, args) {
            ("get_list", _) => self.list_files(args.first().copied().unwrap_or("")),
            ("remove", [name, ..]) => self.remove_file(name),
            ("remove", []) => NativeReply::Status(status::INVALID_ARGUMENT),
            ("format_fs", _) => self.format_fs(),
            _ => match self.append_command(method, args) {
                Ok(()) => NativeReply::Status(status::SUCCESS),
                Err(e) => {
                    warn!("{e}");
                    NativeReply::Status(status::IO_ERROR)
                }
            },
        }
    }

    fn download(&self, path: &str) -> Result<Vec<u8>, i32> {
        if !self.is_online() {
            return Err(status::DEVICE_NOT_FOUND);
        }
        if !is_plain_name(path) {
            return Err(status::INVALID_ARGUMENT);
        }
        let file = self.files_dir().join(path);
        if !file.is_file() {
            return Err(status::FILE_NOT_FOUND);
        }
        fs_read_bytes(&file).map_err(|e| {
            warn!("{e}");
            status::IO_ERROR
        })
    }

    fn upload(&self, path: &str, content: &[u8]) -> i32 {
        if !self.is_online() {
            return status::DEVICE_NOT_FOUND;
        }
        if !is_plain_name(path) {
            return status::INVALID_ARGUMENT;
        }
        let dir = self.files_dir();
        match fs_create_dir(&dir).and_then(|_| fs_write_bytes(&dir.join(path), true, content)) {
            Ok(()) => status::SUCCESS,
            Err(e) => {
                warn!("{e}");
                status::IO_ERROR
            }
        }
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

/// Native library over a directory tree, see the module documentation for the layout.
pub struct DirectoryHub {
    root: PathBuf,
    functions: Mutex<BTreeMap<String, Arc<DirectoryFunction>>>,
    pending: Mutex<Vec<DeviceEvent>>,
}

impl DirectoryHub {
    /// Open the tree at `root`, creating the root directory if needed, and run a first scan.
    ///
    /// The arrivals found by the first scan are delivered by the next
    /// [`DeviceLibrary::handle_events`].
    ///
    /// # Returns: `Result<DirectoryHub, ProxyError>`
    /// * `Ok(DirectoryHub)` - Hub ready for use
    /// * `Err(ProxyError::IOCreate)` - The root directory does not exist and cannot be created
    pub fn open(root: &Path) -> Result<Self, ProxyError> {
        fs_create_dir(root)?;
        let hub = DirectoryHub {
            root: root.to_path_buf(),
            functions: Mutex::new(BTreeMap::new()),
            pending: Mutex::new(Vec::new()),
        };
        let events = hub.scan();
        info!("Opened hub tree {root:?} with {} module(s)", events.len());
        *lock(&hub.pending) = events;
        Ok(hub)
    }

    fn module_serials(&self) -> BTreeSet<String> {
        fs_read_dir(&self.root)
            .unwrap_or_default()
            .into_iter()
            .filter(|name| !name.starts_with('.') && self.root.join(name).is_dir())
            .collect()
    }

    /// Reconcile the known functions with the tree and report hotplug events.
    fn scan(&self) -> Vec<DeviceEvent> {
        let present = self.module_serials();
        let mut events = Vec::new();
        let mut functions = lock(&self.functions);
        for serial in &present {
            let module_dir = self.root.join(serial);
            let mut arrived = false;
            for function_id in fs_read_dir(&module_dir).unwrap_or_default() {
                let dir = module_dir.join(&function_id);
                let Ok(class) = fs_read(&dir.join(CLASS_FILE)) else {
                    continue;
                };
                let hardware_id = format!("{serial}.{function_id}");
                match functions.get(&hardware_id) {
                    Some(func) if func.is_online() => {}
                    Some(func) => {
                        func.set_online(true);
                        arrived = true;
                    }
                    None => {
                        debug!("Discovered {} {hardware_id}", class.trim());
                        let func = DirectoryFunction::new(class.trim(), hardware_id.clone(), dir);
                        functions.insert(hardware_id, Arc::new(func));
                        arrived = true;
                    }
                }
            }
            if arrived {
                events.push(DeviceEvent::Arrival {
                    serial: serial.clone(),
                });
            }
        }
        let mut removed = BTreeSet::new();
        for func in functions.values() {
            let serial = func.serial_number();
            if func.is_online() && !present.contains(&serial) {
                func.set_online(false);
                removed.insert(serial);
            }
        }
        events.extend(
            removed
                .into_iter()
                .map(|serial| DeviceEvent::Removal { serial }),
        );
        events
    }

    fn online_functions(&self) -> Vec<Arc<DirectoryFunction>> {
        lock(&self.functions)
            .values()
            .filter(|f| f.is_online())
            .cloned()
            .collect()
    }
}

impl DeviceLibrary for DirectoryHub {
    fn find_function(&self, class: &str, name: &str) -> Option<Arc<dyn NativeFunction>> {
        lock(&self.functions)
            .values()
            .find(|f| f.class == class && answers_to(&***f, name))
            .map(|f| f.clone() as Arc<dyn NativeFunction>)
    }

    fn functions(&self, class: &str) -> Vec<Arc<dyn NativeFunction>> {
        self.online_functions()
            .into_iter()
            .filter(|f| f.class == class)
            .map(|f| f as Arc<dyn NativeFunction>)
            .collect()
    }

    fn handle_events(&self) -> Vec<DeviceEvent> {
        let mut events: Vec<DeviceEvent> = lock(&self.pending).drain(..).collect();
        events.extend(self.scan());
        // Callbacks run without holding the function table.
        for func in self.online_functions() {
            func.poll_advertised();
        }
        events
    }

    fn firmware_update(
        &self,
        serial: &str,
        _path: &str,
        _settings: &[u8],
        _force: bool,
    ) -> Option<Arc<dyn NativeFirmwareUpdate>> {
        warn!("Firmware update of {serial} is not available from a hub tree");
        None
    }

    /// Firmware files are named `<productPrefix>.<release>.byn`, the product prefix being the
    /// part of the serial number before the dash.
    fn check_firmware(&self, serial: &str, path: &str, min_release: i32) -> String {
        let prefix = serial.split('-').next().unwrap_or(serial);
        let dir = Path::new(path);
        fs_read_dir(dir)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|name| {
                let release = name
                    .strip_prefix(prefix)?
                    .strip_prefix('.')?
                    .strip_suffix(".byn")?
                    .parse::<i32>()
                    .ok()?;
                (release > min_release).then_some((release, name))
            })
            .max_by_key(|(release, _)| *release)
            .map(|(_, name)| dir.join(name).to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn all_bootloaders(&self) -> Vec<String> {
        fs_read_dir(&self.root.join(BOOTLOADER_DIR)).unwrap_or_default()
    }

    fn consolidated_data_set(
        &self,
        _start: f64,
        _end: f64,
        _sensors: &[String],
    ) -> Option<Arc<dyn NativeConsolidatedDataSet>> {
        debug!("No datalogger in a hub tree");
        None
    }
}
