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

//! Firmware updates are not device functions: the updater is created by the native library
//! for one module and polled until it reports completion.

use crate::error::ProxyError;
use crate::native::{DeviceLibrary, NativeFirmwareUpdate};
use log::{debug, info};
use std::fmt;
use std::sync::Arc;

const CLASS: &str = "FirmwareUpdate";

/// Handle on a native firmware update.
#[derive(Clone, Default)]
pub struct FirmwareUpdateProxy {
    update: Option<Arc<dyn NativeFirmwareUpdate>>,
    serial: String,
    path: String,
}

impl fmt::Debug for FirmwareUpdateProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirmwareUpdateProxy")
            .field("serial", &self.serial)
            .field("path", &self.path)
            .field("prepared", &self.update.is_some())
            .finish()
    }
}

impl FirmwareUpdateProxy {
    /// Prepare the update of module `serial` with the firmware at `path`.
    ///
    /// The proxy stays empty if the library refuses to prepare it.
    pub fn new(
        library: &dyn DeviceLibrary,
        serial: &str,
        path: &str,
        settings: &[u8],
        force: bool,
    ) -> Self {
        let update = library.firmware_update(serial, path, settings, force);
        if update.is_none() {
            debug!("No firmware update could be prepared for {serial} from {path:?}");
        }
        FirmwareUpdateProxy {
            update,
            serial: serial.to_string(),
            path: path.to_string(),
        }
    }

    fn require(&self) -> Result<&Arc<dyn NativeFirmwareUpdate>, ProxyError> {
        self.update
            .as_ref()
            .ok_or(ProxyError::NotConnected(CLASS))
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Start flashing in the background.
    ///
    /// # Returns: `Result<i32, ProxyError>`
    /// * `Ok(i32)` - Current progress in percent, or a negative native error code
    /// * `Err(ProxyError::NotConnected)` - No update was prepared
    pub fn start_update(&self) -> Result<i32, ProxyError> {
        let update = self.require()?;
        info!("Starting firmware update of {} from {:?}", self.serial, self.path);
        Ok(update.start_update())
    }

    /// Progress in percent, `100` when done, negative on failure.
    pub fn get_progress(&self) -> Result<i32, ProxyError> {
        Ok(self.require()?.progress())
    }

    pub fn get_progress_message(&self) -> Result<String, ProxyError> {
        Ok(self.require()?.progress_message())
    }

    /// Path of the newest firmware under `path` for `serial` that is newer than `release`.
    ///
    /// An empty string when none qualifies.
    pub fn check_firmware(
        library: &dyn DeviceLibrary,
        serial: &str,
        path: &str,
        release: i32,
    ) -> String {
        library.check_firmware(serial, path, release)
    }

    /// Serial numbers of the modules waiting in bootloader mode.
    pub fn get_all_bootloaders(library: &dyn DeviceLibrary) -> Vec<String> {
        library.all_bootloaders()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::memory_hub::MemoryHub;
    use crate::native::status;
    use googletest::prelude::*;

    #[gtest]
    fn empty_updater_is_not_connected() {
        let update = FirmwareUpdateProxy::default();
        expect_that!(
            update.start_update(),
            err(displays_as(eq("No FirmwareUpdate connected")))
        );
        expect_that!(
            update.get_progress_message(),
            err(displays_as(eq("No FirmwareUpdate connected")))
        );
    }

    #[gtest]
    fn update_is_polled_to_completion() {
        let hub = MemoryHub::new();
        let update =
            FirmwareUpdateProxy::new(&hub, "RELAYLO1-27EAB", "/fw/RELAYLO1.52000.byn", &[], false);
        expect_that!(update.get_progress_message(), ok(eq("Not started")));
        expect_that!(update.start_update(), ok(eq(&0)));
        let mut progress = 0;
        while (0..100).contains(&progress) {
            progress = update.get_progress().expect("update is prepared");
        }
        expect_that!(progress, eq(100));
        expect_that!(
            update.get_progress_message(),
            ok(eq("Firmware update completed"))
        );
    }

    #[gtest]
    fn failure_is_reported_as_negative_progress() {
        let hub = MemoryHub::new();
        let update = FirmwareUpdateProxy::new(&hub, "RELAYLO1-27EAB", "", &[], true);
        expect_that!(update.start_update(), ok(eq(&status::INVALID_ARGUMENT)));
        expect_that!(update.get_progress(), ok(lt(&0)));
    }

    #[gtest]
    fn bootloaders_are_listed() {
        let hub = MemoryHub::new();
        hub.add_bootloader("RELAYLO1-27EAB");
        expect_that!(
            FirmwareUpdateProxy::get_all_bootloaders(&hub),
            elements_are![eq("RELAYLO1-27EAB")]
        );
    }
}
