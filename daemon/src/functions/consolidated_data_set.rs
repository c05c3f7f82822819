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
use crate::native::{DeviceLibrary, NativeConsolidatedDataSet};
use crate::proxy::ProxyCore;
use std::fmt;
use std::sync::Arc;

const CLASS: &str = "ConsolidatedDataSet";

/// Merged datalogger contents of several sensors, one row per timestamp.
///
/// Each row holds the UTC timestamp followed by one value per sensor, in the order the
/// sensors were given, `NaN` where a sensor has no measure at that instant.
#[derive(Clone, Default)]
pub struct ConsolidatedDataSetProxy {
    data: Option<Arc<dyn NativeConsolidatedDataSet>>,
    sensors: Vec<String>,
}

impl fmt::Debug for ConsolidatedDataSetProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsolidatedDataSetProxy")
            .field("sensors", &self.sensors)
            .field("prepared", &self.data.is_some())
            .finish()
    }
}

impl ConsolidatedDataSetProxy {
    /// Prepare a consolidated read of `sensors` between `start` and `end`.
    ///
    /// # Arguments
    ///
    /// * `library` - The native library the sensors belong to
    /// * `start` - UTC start time in seconds, `0` for the oldest measure
    /// * `end` - UTC end time in seconds, `0` for the newest measure
    /// * `sensors` - Cores of the sensor proxies, which must all be attached
    ///
    /// # Returns: `Result<ConsolidatedDataSetProxy, ProxyError>`
    /// * `Ok(ConsolidatedDataSetProxy)` - Possibly empty if the library could not prepare it
    /// * `Err(ProxyError::NotConnected)` - One of the sensors is unattached
    /// * `Err(ProxyError::Argument)` - No sensor was given or `end` is before `start`
    pub fn init(
        library: &dyn DeviceLibrary,
        start: f64,
        end: f64,
        sensors: &[&ProxyCore],
    ) -> Result<Self, ProxyError> {
        if sensors.is_empty() {
            return Err(ProxyError::Argument(
                "a consolidated dataset needs at least one sensor".to_string(),
            ));
        }
        if end != 0.0 && end < start {
            return Err(ProxyError::Argument(format!(
                "dataset ends at {end} before it starts at {start}"
            )));
        }
        let sensors = sensors
            .iter()
            .map(|core| Ok(core.require_attached()?.hardware_id()))
            .collect::<Result<Vec<_>, ProxyError>>()?;
        Ok(ConsolidatedDataSetProxy {
            data: library.consolidated_data_set(start, end, &sensors),
            sensors,
        })
    }

    /// Hardware ids of the sensors, in column order.
    pub fn sensors(&self) -> &[String] {
        &self.sensors
    }

    /// Fill `row` with the next `[timestamp, value, ...]` row.
    ///
    /// # Returns: `Result<i32, ProxyError>`
    /// * `Ok(i32)` - Progress in percent, `100` once the last row was delivered, or a
    ///   negative native error code
    /// * `Err(ProxyError::NotConnected)` - The dataset could not be prepared
    pub fn next_record(&self, row: &mut Vec<f64>) -> Result<i32, ProxyError> {
        let data = self.data.as_ref().ok_or(ProxyError::NotConnected(CLASS))?;
        Ok(data.next_record(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{HumidityProxy, TemperatureProxy};
    use crate::native::memory_hub::MemoryHub;
    use crate::proxy::{FunctionProxy, ProxyManager};
    use googletest::prelude::*;

    fn meteo() -> (Arc<MemoryHub>, ProxyManager) {
        let hub = Arc::new(MemoryHub::new());
        hub.add_function("Temperature", "METEOMK1-1.temperature", &[]);
        hub.add_function("Humidity", "METEOMK1-1.humidity", &[]);
        hub.set_timeline("METEOMK1-1.temperature", &[(10.0, 21.5), (20.0, 21.7)]);
        hub.set_timeline("METEOMK1-1.humidity", &[(20.0, 40.0)]);
        let manager = ProxyManager::new(hub.clone());
        (hub, manager)
    }

    #[gtest]
    fn rows_follow_sensor_order() {
        let (hub, manager) = meteo();
        let temperature = manager.find::<TemperatureProxy>("");
        let humidity = manager.find::<HumidityProxy>("");
        let data = ConsolidatedDataSetProxy::init(
            &*hub,
            0.0,
            0.0,
            &[&**humidity.core(), &**temperature.core()],
        )
        .expect("both sensors are attached");
        let mut row = Vec::new();
        expect_that!(data.next_record(&mut row), ok(eq(&50)));
        expect_that!(row[0], eq(10.0));
        expect_that!(row[1].is_nan(), eq(true));
        expect_that!(row[2], eq(21.5));
        expect_that!(data.next_record(&mut row), ok(eq(&100)));
        expect_that!(row, elements_are![eq(&20.0), eq(&40.0), eq(&21.7)]);
    }

    #[gtest]
    fn unattached_sensor_is_rejected() {
        let (hub, manager) = meteo();
        let temperature = manager.find::<TemperatureProxy>("");
        let missing = manager.find::<HumidityProxy>("outdoor");
        expect_that!(
            ConsolidatedDataSetProxy::init(
                &*hub,
                0.0,
                0.0,
                &[&**temperature.core(), &**missing.core()]
            ),
            err(displays_as(eq("No Humidity connected")))
        );
        expect_that!(
            ConsolidatedDataSetProxy::init(&*hub, 30.0, 10.0, &[&**temperature.core()]),
            err(displays_as(starts_with("ProxyError::Argument")))
        );
    }

    #[gtest]
    fn empty_dataset_is_not_connected() {
        let mut row = Vec::new();
        expect_that!(
            ConsolidatedDataSetProxy::default().next_record(&mut row),
            err(displays_as(eq("No ConsolidatedDataSet connected")))
        );
    }
}
