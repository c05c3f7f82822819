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
use crate::functions::join_values;
use crate::functions::sensor::{SENSOR_PROPERTIES, SensorFunction};
use crate::proxy::{FunctionProxy, function_proxy, proxy_enum};

/// Temperature of the NTC reference point, in Kelvin.
const NTC_REFERENCE_K: f64 = 298.15;
/// Offset between Celsius and Kelvin.
const KELVIN: f64 = 273.15;

proxy_enum! {
    /// Kind of probe wired to the input.
    pub enum TemperatureSensorType {
        Digital = 1 => "DIGITAL",
        TypeK = 2 => "TYPE_K",
        TypeE = 3 => "TYPE_E",
        TypeJ = 4 => "TYPE_J",
        TypeN = 5 => "TYPE_N",
        TypeR = 6 => "TYPE_R",
        TypeS = 7 => "TYPE_S",
        TypeT = 8 => "TYPE_T",
        Pt100FourWires = 9 => "PT100_4WIRES",
        Pt100ThreeWires = 10 => "PT100_3WIRES",
        Pt100TwoWires = 11 => "PT100_2WIRES",
        ResOhm = 12 => "RES_OHM",
        ResNtc = 13 => "RES_NTC",
        ResLinear = 14 => "RES_LINEAR",
        ResInternal = 15 => "RES_INTERNAL",
        Ir = 16 => "IR",
        ResPt1000 = 17 => "RES_PT1000",
        ChannelOff = 18 => "CHANNEL_OFF",
    }
}

function_proxy! {
    /// Temperature sensor.
    pub struct TemperatureProxy {
        class: "Temperature",
        extends: [SENSOR_PROPERTIES],
        advertises: Some("currentValue"),
        fields: {
            SENSOR_TYPE: TemperatureSensorType = "sensorType", ReadWrite, cached;
            /// Raw electrical signal measured by the probe.
            SIGNAL_VALUE: f64 = "signalValue", ReadOnly;
            SIGNAL_UNIT: String = "signalUnit", ReadOnly, cached;
            COMMAND: String = "command", ReadWrite;
        }
    }
}

impl SensorFunction for TemperatureProxy {}

/// Resistance/temperature table of a thermistor following the beta equation.
///
/// Points run from -40°C to 150°C in 10°C steps, temperatures in Celsius.
fn ntc_table(res25: f64, beta: f64) -> (Vec<f64>, Vec<f64>) {
    (-4..=15)
        .map(|step| {
            let celsius = f64::from(step * 10);
            let kelvin = celsius + KELVIN;
            let ohms = res25 * (beta * (1.0 / kelvin - 1.0 / NTC_REFERENCE_K)).exp();
            (celsius, ohms)
        })
        .unzip()
}

impl TemperatureProxy {
    pub fn get_sensor_type(&self) -> Result<TemperatureSensorType, ProxyError> {
        self.get(Self::SENSOR_TYPE)
    }

    pub fn set_sensor_type(&self, sensor_type: TemperatureSensorType) -> Result<i32, ProxyError> {
        self.set(Self::SENSOR_TYPE, sensor_type)
    }

    pub fn get_signal_value(&self) -> Result<f64, ProxyError> {
        self.get(Self::SIGNAL_VALUE)
    }

    pub fn get_signal_unit(&self) -> Result<String, ProxyError> {
        self.get(Self::SIGNAL_UNIT)
    }

    /// Configure an NTC thermistor input from its datasheet parameters.
    ///
    /// # Arguments
    ///
    /// * `res25` - Resistance at 25°C, in Ohms
    /// * `beta` - Beta coefficient, in Kelvin
    ///
    /// # Returns: `Result<i32, ProxyError>`
    /// * `Ok(i32)` - Native status code
    /// * `Err(ProxyError::Argument)` - A parameter is not strictly positive
    /// * `Err(ProxyError::NotConnected)` - The proxy is unattached
    pub fn set_ntc_parameters(&self, res25: f64, beta: f64) -> Result<i32, ProxyError> {
        if !(res25 > 0.0 && beta > 0.0) {
            return Err(ProxyError::Argument(format!(
                "NTC parameters must be positive, got R25={res25} and B={beta}"
            )));
        }
        let (temperatures, resistances) = ntc_table(res25, beta);
        self.core().call_status(
            "set_thermistorResponseTable",
            &[&join_values(&temperatures), &join_values(&resistances)],
        )
    }
}
