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
    /// Barometric or GNSS altimeter.
    pub struct AltimeterProxy {
        class: "Altimeter",
        extends: [SENSOR_PROPERTIES],
        advertises: Some("currentValue"),
        fields: {
            /// Barometric pressure adjusted to sea level, in hPa.
            QNH: f64 = "qnh", ReadWrite, cached;
            TECHNOLOGY: String = "technology", ReadOnly, cached;
        }
    }
}

impl SensorFunction for AltimeterProxy {}

impl AltimeterProxy {
    pub fn get_qnh(&self) -> Result<f64, ProxyError> {
        self.get(Self::QNH)
    }

    pub fn set_qnh(&self, qnh: f64) -> Result<i32, ProxyError> {
        self.set(Self::QNH, qnh)
    }

    pub fn get_technology(&self) -> Result<String, ProxyError> {
        self.get(Self::TECHNOLOGY)
    }

    /// Adjust the QNH so that the current altitude reads `altitude`.
    pub fn set_current_altitude(&self, altitude: f64) -> Result<i32, ProxyError> {
        self.core().call_status("set_currentValue", &[&altitude.to_string()])
    }
}
