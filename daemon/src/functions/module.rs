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

use crate::error::ProxyError;
use crate::functions::firmware_update::FirmwareUpdateProxy;
use crate::native::DeviceLibrary;
use crate::proxy::{FunctionProxy, function_proxy, proxy_enum};

proxy_enum! {
    /// Whether the running settings match the ones saved in flash.
    pub enum PersistentSettings {
        Loaded = 1 => "LOADED",
        Saved = 2 => "SAVED",
        Modified = 3 => "MODIFIED",
    }
}

proxy_enum! {
    /// Localization beacon.
    pub enum Beacon {
        Off = 1 => "OFF",
        On = 2 => "ON",
    }
}

function_proxy! {
    /// The module itself, as opposed to one of its functions.
    ///
    /// A module also answers to its bare serial number.
    pub struct ModuleProxy {
        class: "Module",
        extends: [],
        advertises: None,
        fields: {
            PRODUCT_NAME: String = "productName", ReadOnly, cached;
            SERIAL_NUMBER: String = "serialNumber", ReadOnly, cached;
            PRODUCT_ID: i32 = "productId", ReadOnly, cached;
            PRODUCT_RELEASE: i32 = "productRelease", ReadOnly, cached;
            FIRMWARE_RELEASE: String = "firmwareRelease", ReadOnly, cached;
            PERSISTENT_SETTINGS: PersistentSettings = "persistentSettings", ReadOnly, cached;
            /// Brightness of the status LEDs, in percent.
            LUMINOSITY: i32 = "luminosity", ReadWrite, cached;
            BEACON: Beacon = "beacon", ReadWrite, cached;
            /// Milliseconds since the module was powered up.
            UP_TIME: i64 = "upTime", ReadOnly;
            /// Current drawn from USB, in mA.
            USB_CURRENT: i32 = "usbCurrent", ReadOnly;
            REBOOT_COUNTDOWN: i32 = "rebootCountdown", ReadOnly;
            /// Free integer kept in flash for the application.
            USER_VAR: i32 = "userVar", ReadWrite, cached;
        }
    }
}

impl ModuleProxy {
    pub fn get_product_name(&self) -> Result<String, ProxyError> {
        self.get(Self::PRODUCT_NAME)
    }

    pub fn get_product_id(&self) -> Result<i32, ProxyError> {
        self.get(Self::PRODUCT_ID)
    }

    pub fn get_product_release(&self) -> Result<i32, ProxyError> {
        self.get(Self::PRODUCT_RELEASE)
    }

    pub fn get_firmware_release(&self) -> Result<String, ProxyError> {
        self.get(Self::FIRMWARE_RELEASE)
    }

    pub fn get_persistent_settings(&self) -> Result<PersistentSettings, ProxyError> {
        self.get(Self::PERSISTENT_SETTINGS)
    }

    pub fn get_luminosity(&self) -> Result<i32, ProxyError> {
        self.get(Self::LUMINOSITY)
    }

    pub fn set_luminosity(&self, luminosity: i32) -> Result<i32, ProxyError> {
        if !(-1..=100).contains(&luminosity) {
            return Err(ProxyError::Argument(format!(
                "luminosity {luminosity} is outside 0..=100"
            )));
        }
        self.set(Self::LUMINOSITY, luminosity)
    }

    pub fn get_beacon(&self) -> Result<Beacon, ProxyError> {
        self.get(Self::BEACON)
    }

    pub fn set_beacon(&self, beacon: Beacon) -> Result<i32, ProxyError> {
        self.set(Self::BEACON, beacon)
    }

    pub fn get_up_time(&self) -> Result<i64, ProxyError> {
        self.get(Self::UP_TIME)
    }

    pub fn get_usb_current(&self) -> Result<i32, ProxyError> {
        self.get(Self::USB_CURRENT)
    }

    pub fn get_reboot_countdown(&self) -> Result<i32, ProxyError> {
        self.get(Self::REBOOT_COUNTDOWN)
    }

    pub fn get_user_var(&self) -> Result<i32, ProxyError> {
        self.get(Self::USER_VAR)
    }

    pub fn set_user_var(&self, value: i32) -> Result<i32, ProxyError> {
        self.set(Self::USER_VAR, value)
    }

    /// Persist the current settings of every function of the module.
    pub fn save_to_flash(&self) -> Result<i32, ProxyError> {
        self.core().call_status("saveToFlash", &[])
    }

    /// Drop unsaved changes and reload the settings from flash.
    pub fn revert_from_flash(&self) -> Result<i32, ProxyError> {
        self.core().call_status("revertFromFlash", &[])
    }

    /// Schedule a reboot in `seconds_before_reset` seconds.
    pub fn reboot(&self, seconds_before_reset: i32) -> Result<i32, ProxyError> {
        self.core()
            .call_status("reboot", &[&seconds_before_reset.to_string()])
    }

    /// Schedule a reboot into the bootloader in `seconds_before_reset` seconds.
    pub fn trigger_firmware_update(&self, seconds_before_reset: i32) -> Result<i32, ProxyError> {
        self.core().call_status(
            "triggerFirmwareUpdate",
            &[&seconds_before_reset.to_string()],
        )
    }

    /// Prepare a firmware update of this module.
    ///
    /// # Arguments
    ///
    /// * `library` - The native library hosting the module
    /// * `path` - Firmware file or directory to pick the firmware from
    /// * `settings` - Settings to restore once flashed, empty to keep the current ones
    /// * `force` - Flash even if the firmware is not newer
    ///
    /// # Returns: `Result<FirmwareUpdateProxy, ProxyError>`
    /// * `Ok(FirmwareUpdateProxy)` - The updater, not started yet
    /// * `Err(ProxyError::NotConnected)` - The proxy is unattached
    pub fn update_firmware(
        &self,
        library: &dyn DeviceLibrary,
        path: &str,
        settings: &[u8],
        force: bool,
    ) -> Result<FirmwareUpdateProxy, ProxyError> {
        let serial = self.get_serial_number()?;
        Ok(FirmwareUpdateProxy::new(
            library, &serial, path, settings, force,
        ))
    }

    /// Newest firmware found under `path` that is newer than the running one.
    ///
    /// An empty string means the module is up to date.
    pub fn check_firmware(
        &self,
        library: &dyn DeviceLibrary,
        path: &str,
        only_new: bool,
    ) -> Result<String, ProxyError> {
        let serial = self.get_serial_number()?;
        let release = if only_new {
            self.get_firmware_release()?
                .parse::<i32>()
                .unwrap_or_default()
        } else {
            0
        };
        Ok(FirmwareUpdateProxy::check_firmware(
            library, &serial, path, release,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::memory_hub::MemoryHub;
    use crate::proxy::ProxyManager;
    use googletest::prelude::*;
    use std::sync::Arc;

    fn module() -> (Arc<MemoryHub>, ProxyManager) {
        let hub = Arc::new(MemoryHub::new());
        hub.add_function(
            "Module",
            "RELAYLO1-27EAB.module",
            &[
                ("productName", "Yocto-LatchedRelay"),
                ("firmwareRelease", "51000"),
                ("persistentSettings", "2"),
                ("beacon", "0"),
            ],
        );
        let manager = ProxyManager::new(hub.clone());
        (hub, manager)
    }

    #[gtest]
    fn module_answers_to_its_serial() {
        let (_hub, manager) = module();
        let module = manager.find::<ModuleProxy>("RELAYLO1-27EAB");
        expect_that!(module.is_online(), eq(true));
        expect_that!(module.get_product_name(), ok(eq("Yocto-LatchedRelay")));
        expect_that!(
            module.live(ModuleProxy::PERSISTENT_SETTINGS),
            eq(PersistentSettings::Modified)
        );
    }

    #[gtest]
    fn flash_commands_call_through() {
        let (hub, manager) = module();
        let module = manager.find::<ModuleProxy>("RELAYLO1-27EAB");
        expect_that!(module.save_to_flash(), ok(eq(&0)));
        expect_that!(module.reboot(2), ok(eq(&0)));
        let func = hub.function("RELAYLO1-27EAB.module").expect("module");
        expect_that!(
            func.calls(),
            elements_are![
                eq(&("saveToFlash".to_string(), Vec::<String>::new())),
                eq(&("reboot".to_string(), vec!["2".to_string()]))
            ]
        );
    }

    #[gtest]
    fn luminosity_is_range_checked() {
        let (_hub, manager) = module();
        let module = manager.find::<ModuleProxy>("RELAYLO1-27EAB");
        expect_that!(module.set_luminosity(101), err(anything()));
        expect_that!(module.set_luminosity(50), ok(eq(&0)));
    }

    #[gtest]
    fn check_firmware_skips_running_release() {
        let (hub, manager) = module();
        hub.add_firmware("RELAYLO1", "/fw/RELAYLO1.51000.byn", 51000);
        hub.add_firmware("RELAYLO1", "/fw/RELAYLO1.52000.byn", 52000);
        let module = manager.find::<ModuleProxy>("RELAYLO1-27EAB");
        expect_that!(
            module.check_firmware(&*hub, "/fw", true),
            ok(eq("/fw/RELAYLO1.52000.byn"))
        );
        hub.function("RELAYLO1-27EAB.module")
            .expect("module")
            .set_raw("firmwareRelease", "52000");
        expect_that!(module.check_firmware(&*hub, "/fw", true), ok(eq("")));
    }
}
