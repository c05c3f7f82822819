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
    /// Three-axis accelerometer. The advertised value is the norm of the acceleration in g.
    pub struct AccelerometerProxy {
        class: "Accelerometer",
        extends: [SENSOR_PROPERTIES],
        advertises: Some("currentValue"),
        fields: {
            /// Measure update frequency in Hz.
            BANDWIDTH: i32 = "bandwidth", ReadWrite, cached;
            X_VALUE: f64 = "xValue", ReadOnly;
            Y_VALUE: f64 = "yValue", ReadOnly;
            Z_VALUE: f64 = "zValue", ReadOnly;
            GRAVITY_CANCELLATION: Flag = "gravityCancellation", ReadWrite, cached;
        }
    }
}

impl SensorFunction for AccelerometerProxy {}

impl AccelerometerProxy {
    pub fn get_bandwidth(&self) -> Result<i32, ProxyError> {
        self.get(Self::BANDWIDTH)
    }

    pub fn set_bandwidth(&self, bandwidth: i32) -> Result<i32, ProxyError> {
        self.set(Self::BANDWIDTH, bandwidth)
    }

    /// Acceleration along each axis, in g.
    pub fn get_axes(&self) -> Result<[f64; 3], ProxyError> {
        Ok([
            self.get(Self::X_VALUE)?,
            self.get(Self::Y_VALUE)?,
            self.get(Self::Z_VALUE)?,
        ])
    }

    pub fn get_gravity_cancellation(&self) -> Result<Flag, ProxyError> {
        self.get(Self::GRAVITY_CANCELLATION)
    }

    pub fn set_gravity_cancellation(&self, enabled: Flag) -> Result<i32, ProxyError> {
        self.set(Self::GRAVITY_CANCELLATION, enabled)
    }
}
