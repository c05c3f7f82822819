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
use crate::proxy::{FunctionProxy, function_proxy};

function_proxy! {
    /// Humidity sensor. The advertised value follows the configured unit.
    pub struct HumidityProxy {
        class: "Humidity",
        extends: [SENSOR_PROPERTIES],
        advertises: Some("currentValue"),
        fields: {
            /// Relative humidity in %RH.
            REL_HUM: f64 = "relHum", ReadOnly;
            /// Absolute humidity in g/m3.
            ABS_HUM: f64 = "absHum", ReadOnly;
        }
    }
}

impl SensorFunction for HumidityProxy {}

impl HumidityProxy {
    pub fn get_rel_hum(&self) -> Result<f64, ProxyError> {
        self.get(Self::REL_HUM)
    }

    pub fn get_abs_hum(&self) -> Result<f64, ProxyError> {
        self.get(Self::ABS_HUM)
    }
}
