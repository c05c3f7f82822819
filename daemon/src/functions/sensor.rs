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

//! Properties and commands shared by every measuring function.
//!
//! Sensor proxies list [`SENSOR_PROPERTIES`] after `extends` and implement
//! [`SensorFunction`] to get the typed accessors of the common fields.

use crate::error::ProxyError;
use crate::functions::{expect_records, join_values};
use crate::proxy::{
    Field, FunctionProxy, Property, ProxyValue, ReadOnly, function_proxy, proxy_enum,
};

proxy_enum! {
    /// How the advertised value is computed.
    pub enum AdvMode {
        Immediate = 1 => "IMMEDIATE",
        PeriodAvg = 2 => "PERIOD_AVG",
        PeriodMin = 3 => "PERIOD_MIN",
        PeriodMax = 4 => "PERIOD_MAX",
    }
}

pub const UNIT: Field<String, ReadOnly> = Field::new("unit");
pub const CURRENT_VALUE: Field<f64, ReadOnly> = Field::new("currentValue");
pub const LOWEST_VALUE: Field<f64> = Field::new("lowestValue");
pub const HIGHEST_VALUE: Field<f64> = Field::new("highestValue");
pub const CURRENT_RAW_VALUE: Field<f64, ReadOnly> = Field::new("currentRawValue");
/// Datalogger recording frequency, e.g. `"1/s"`, `"10/m"` or `"OFF"`.
pub const LOG_FREQUENCY: Field<String> = Field::new("logFrequency");
/// Timed report frequency, same syntax as [`LOG_FREQUENCY`].
pub const REPORT_FREQUENCY: Field<String> = Field::new("reportFrequency");
pub const ADV_MODE: Field<AdvMode> = Field::new("advMode");
pub const CALIBRATION_PARAM: Field<String> = Field::new("calibrationParam");
pub const RESOLUTION: Field<f64> = Field::new("resolution");
pub const SENSOR_STATE: Field<i32, ReadOnly> = Field::new("sensorState");

pub const SENSOR_PROPERTIES: &[Property] = &[
    Property::new::<String>("unit", false, true),
    Property::new::<f64>("currentValue", false, true),
    Property::new::<f64>("lowestValue", true, false),
    Property::new::<f64>("highestValue", true, false),
    Property::new::<f64>("currentRawValue", false, false),
    Property::new::<String>("logFrequency", true, true),
    Property::new::<String>("reportFrequency", true, true),
    Property::new::<AdvMode>("advMode", true, true),
    Property::new::<String>("calibrationParam", true, false),
    Property::new::<f64>("resolution", true, true),
    Property::new::<i32>("sensorState", false, false),
];

/// Accessors and commands common to sensor proxies.
pub trait SensorFunction: FunctionProxy {
    fn get_unit(&self) -> Result<String, ProxyError> {
        self.get(UNIT)
    }

    fn get_current_value(&self) -> Result<f64, ProxyError> {
        self.get(CURRENT_VALUE)
    }

    /// Last measure pushed by the device, `NaN` while offline.
    fn current_value(&self) -> f64 {
        self.live(CURRENT_VALUE)
    }

    fn get_lowest_value(&self) -> Result<f64, ProxyError> {
        self.get(LOWEST_VALUE)
    }

    fn set_lowest_value(&self, value: f64) -> Result<i32, ProxyError> {
        self.set(LOWEST_VALUE, value)
    }

    fn get_highest_value(&self) -> Result<f64, ProxyError> {
        self.get(HIGHEST_VALUE)
    }

    fn set_highest_value(&self, value: f64) -> Result<i32, ProxyError> {
        self.set(HIGHEST_VALUE, value)
    }

    fn get_current_raw_value(&self) -> Result<f64, ProxyError> {
        self.get(CURRENT_RAW_VALUE)
    }

    fn get_log_frequency(&self) -> Result<String, ProxyError> {
        self.get(LOG_FREQUENCY)
    }

    fn set_log_frequency(&self, frequency: &str) -> Result<i32, ProxyError> {
        self.set(LOG_FREQUENCY, frequency.to_string())
    }

    fn get_report_frequency(&self) -> Result<String, ProxyError> {
        self.get(REPORT_FREQUENCY)
    }

    fn set_report_frequency(&self, frequency: &str) -> Result<i32, ProxyError> {
        self.set(REPORT_FREQUENCY, frequency.to_string())
    }

    fn get_adv_mode(&self) -> Result<AdvMode, ProxyError> {
        self.get(ADV_MODE)
    }

    fn set_adv_mode(&self, mode: AdvMode) -> Result<i32, ProxyError> {
        self.set(ADV_MODE, mode)
    }

    fn get_resolution(&self) -> Result<f64, ProxyError> {
        self.get(RESOLUTION)
    }

    fn set_resolution(&self, resolution: f64) -> Result<i32, ProxyError> {
        self.set(RESOLUTION, resolution)
    }

    fn get_sensor_state(&self) -> Result<i32, ProxyError> {
        self.get(SENSOR_STATE)
    }

    /// Reset the recorded extremes to the current value.
    fn reset_extremes(&self) -> Result<i32, ProxyError> {
        let current = self.get_current_value()?;
        match self.set_lowest_value(current)? {
            0 => self.set_highest_value(current),
            code => Ok(code),
        }
    }

    /// Install a linear interpolation calibration.
    ///
    /// # Arguments
    ///
    /// * `raw` - Values measured by the sensor
    /// * `reference` - Values the sensor should have reported, same length as `raw`
    ///
    /// # Returns: `Result<i32, ProxyError>`
    /// * `Ok(i32)` - Native status code
    /// * `Err(ProxyError::Argument)` - The point lists differ in length
    /// * `Err(ProxyError::NotConnected)` - The proxy is unattached
    fn calibrate_from_points(&self, raw: &[f64], reference: &[f64]) -> Result<i32, ProxyError> {
        if raw.len() != reference.len() {
            return Err(ProxyError::Argument(format!(
                "{} raw values for {} reference values",
                raw.len(),
                reference.len()
            )));
        }
        self.core().call_status(
            "calibrateFromPoints",
            &[&join_values(raw), &join_values(reference)],
        )
    }

    /// Calibration points currently installed, as `(raw, reference)` pairs.
    fn load_calibration_points(&self) -> Result<Vec<(f64, f64)>, ProxyError> {
        let reply = self.core().call("loadCalibrationPoints", &[])?;
        let records = expect_records("loadCalibrationPoints", reply)?;
        Ok(records
            .iter()
            .map(|r| {
                (
                    f64::from_native_text(r.field("raw")),
                    f64::from_native_text(r.field("ref")),
                )
            })
            .collect())
    }
}

function_proxy! {
    /// Any sensor, through its common properties only.
    pub struct SensorProxy {
        class: "Sensor",
        extends: [SENSOR_PROPERTIES],
        advertises: Some("currentValue"),
        fields: {}
    }
}

impl SensorFunction for SensorProxy {}
