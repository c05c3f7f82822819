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
use crate::proxy::{FunctionProxy, function_proxy, proxy_enum};

proxy_enum! {
    /// Source currently powering the module.
    ///
    /// Older firmwares advertise `USB` and `EXT`, newer ones `FROM_USB` and `FROM_EXT`.
    pub enum PowerState {
        Off = 1 => "OFF",
        FromUsb = 2 => "FROM_USB" | "USB",
        FromExt = 3 => "FROM_EXT" | "EXT",
    }
}

proxy_enum! {
    /// Power source selection.
    pub enum PowerControl {
        Auto = 1 => "AUTO",
        FromUsb = 2 => "FROM_USB",
        FromExt = 3 => "FROM_EXT",
        Off = 4 => "OFF",
    }
}

function_proxy! {
    /// Dual power switch of a module that can run from USB or an external supply.
    pub struct DualPowerProxy {
        class: "DualPower",
        extends: [],
        advertises: Some("powerState"),
        fields: {
            POWER_STATE: PowerState = "powerState", ReadOnly, cached;
            POWER_CONTROL: PowerControl = "powerControl", ReadWrite, cached;
            /// External supply voltage, in mV.
            EXT_VOLTAGE: i32 = "extVoltage", ReadOnly;
        }
    }
}

impl DualPowerProxy {
    pub fn get_power_state(&self) -> Result<PowerState, ProxyError> {
        self.get(Self::POWER_STATE)
    }

    /// Last advertised power source.
    pub fn power_state(&self) -> PowerState {
        self.live(Self::POWER_STATE)
    }

    pub fn get_power_control(&self) -> Result<PowerControl, ProxyError> {
        self.get(Self::POWER_CONTROL)
    }

    pub fn set_power_control(&self, control: PowerControl) -> Result<i32, ProxyError> {
        self.set(Self::POWER_CONTROL, control)
    }

    pub fn get_ext_voltage(&self) -> Result<i32, ProxyError> {
        self.get(Self::EXT_VOLTAGE)
    }
}
