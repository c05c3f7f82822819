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
use crate::functions::sensor::{SENSOR_PROPERTIES, SensorFunction};
use crate::proxy::{Flag, FunctionProxy, function_proxy};

function_proxy! {
    /// Voltage sensor.
    pub struct VoltageProxy {
        class: "Voltage",
        extends: [SENSOR_PROPERTIES],
        advertises: Some("currentValue"),
        fields: {
            ENABLED: Flag = "enabled", ReadWrite, cached;
        }
    }
}

impl SensorFunction for VoltageProxy {}

impl VoltageProxy {
    pub fn get_enabled(&self) -> Result<Flag, ProxyError> {
        self.get(Self::ENABLED)
    }

    pub fn set_enabled(&self, enabled: Flag) -> Result<i32, ProxyError> {
        self.set(Self::ENABLED, enabled)
    }
}
