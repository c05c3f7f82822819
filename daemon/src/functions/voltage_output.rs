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
use crate::proxy::{FunctionProxy, function_proxy};

function_proxy! {
    /// Programmable voltage output.
    pub struct VoltageOutputProxy {
        class: "VoltageOutput",
        extends: [],
        advertises: Some("currentVoltage"),
        fields: {
            /// Output voltage, in V.
            CURRENT_VOLTAGE: f64 = "currentVoltage", ReadWrite, cached;
            /// Pending transition, as `<target>:<duration in ms>`.
            VOLTAGE_TRANSITION: String = "voltageTransition", ReadWrite;
            /// Output voltage applied at power on, in V.
            VOLTAGE_AT_START_UP: f64 = "voltageAtStartUp", ReadWrite, cached;
        }
    }
}

impl VoltageOutputProxy {
    pub fn get_current_voltage(&self) -> Result<f64, ProxyError> {
        self.get(Self::CURRENT_VOLTAGE)
    }

    pub fn set_current_voltage(&self, voltage: f64) -> Result<i32, ProxyError> {
        self.set(Self::CURRENT_VOLTAGE, voltage)
    }

    pub fn get_voltage_transition(&self) -> Result<String, ProxyError> {
        self.get(Self::VOLTAGE_TRANSITION)
    }

    pub fn get_voltage_at_start_up(&self) -> Result<f64, ProxyError> {
        self.get(Self::VOLTAGE_AT_START_UP)
    }

    pub fn set_voltage_at_start_up(&self, voltage: f64) -> Result<i32, ProxyError> {
        self.set(Self::VOLTAGE_AT_START_UP, voltage)
    }

    /// Cached power-on voltage.
    pub fn voltage_at_start_up(&self) -> f64 {
        self.live(Self::VOLTAGE_AT_START_UP)
    }

    /// Write-through of the power-on voltage, skipped when unchanged.
    pub fn write_voltage_at_start_up(&self, voltage: f64) {
        self.write(Self::VOLTAGE_AT_START_UP, voltage)
    }

    /// Ramp the output to `target` volts over `duration_ms` milliseconds.
    ///
    /// # Returns: `Result<i32, ProxyError>`
    /// * `Ok(i32)` - Native status code
    /// * `Err(ProxyError::Argument)` - The target is not a number or the duration is negative
    /// * `Err(ProxyError::NotConnected)` - The proxy is unattached
    pub fn voltage_move(&self, target: f64, duration_ms: i32) -> Result<i32, ProxyError> {
        if target.is_nan() || duration_ms < 0 {
            return Err(ProxyError::Argument(format!(
                "cannot move to {target} V over {duration_ms} ms"
            )));
        }
        // The device takes the target in mV precision.
        let target = (target * 1000.0).round() / 1000.0;
        self.set(Self::VOLTAGE_TRANSITION, format!("{target}:{duration_ms}"))
    }
}
