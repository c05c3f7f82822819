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
use crate::proxy::{FunctionProxy, function_proxy, proxy_enum};

proxy_enum! {
    /// Spectral response the light measure is weighted with.
    pub enum MeasureType {
        HumanEye = 1 => "HUMAN_EYE",
        WideSpectrum = 2 => "WIDE_SPECTRUM",
        Infrared = 3 => "INFRARED",
        HighRate = 4 => "HIGH_RATE",
        HighEnergy = 5 => "HIGH_ENERGY",
        HighResolution = 6 => "HIGH_RESOLUTION",
    }
}

function_proxy! {
    /// Ambient light sensor, in lux.
    pub struct LightSensorProxy {
        class: "LightSensor",
        extends: [SENSOR_PROPERTIES],
        advertises: Some("currentValue"),
        fields: {
            MEASURE_TYPE: MeasureType = "measureType", ReadWrite, cached;
        }
    }
}

impl SensorFunction for LightSensorProxy {}

impl LightSensorProxy {
    pub fn get_measure_type(&self) -> Result<MeasureType, ProxyError> {
        self.get(Self::MEASURE_TYPE)
    }

    pub fn set_measure_type(&self, measure_type: MeasureType) -> Result<i32, ProxyError> {
        self.set(Self::MEASURE_TYPE, measure_type)
    }

    /// Single point calibration: the current measure should read `calibrated_value`.
    pub fn calibrate(&self, calibrated_value: f64) -> Result<i32, ProxyError> {
        if calibrated_value.is_nan() {
            return Err(ProxyError::Argument(
                "calibration value must be a number".to_string(),
            ));
        }
        self.core()
            .call_status("calibrate", &[&calibrated_value.to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::memory_hub::MemoryHub;
    use crate::native::status;
    use crate::proxy::ProxyManager;
    use googletest::prelude::*;
    use rstest::*;
    use std::sync::Arc;

    #[gtest]
    #[rstest]
    #[case::first(MeasureType::HumanEye, "0")]
    #[case::middle(MeasureType::HighRate, "3")]
    #[case::last(MeasureType::HighResolution, "5")]
    fn measure_type_round_trip(#[case] measure_type: MeasureType, #[case] native: &str) {
        let hub = Arc::new(MemoryHub::new());
        let func = hub.add_function("LightSensor", "LIGHTMK3-1.lightSensor", &[]);
        let manager = ProxyManager::new(hub.clone());
        let light = manager.find::<LightSensorProxy>("lightSensor");
        expect_that!(light.set_measure_type(measure_type), ok(eq(&status::SUCCESS)));
        expect_that!(func.attribute("measureType"), some(eq(native)));
        expect_that!(light.get_measure_type(), ok(eq(&measure_type)));
    }

    #[gtest]
    fn calibrate_rejects_nan() {
        let hub = Arc::new(MemoryHub::new());
        let func = hub.add_function("LightSensor", "LIGHTMK3-1.lightSensor", &[]);
        let manager = ProxyManager::new(hub.clone());
        let light = manager.find::<LightSensorProxy>("");
        expect_that!(light.calibrate(f64::NAN), err(anything()));
        expect_that!(light.calibrate(450.0), ok(eq(&status::SUCCESS)));
        expect_that!(
            func.calls(),
            elements_are![eq(&("calibrate".to_string(), vec!["450".to_string()]))]
        );
    }
}
