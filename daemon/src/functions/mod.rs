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

//! The catalogue of concrete proxy types.
//!
//! Each submodule declares one device function class with `function_proxy!` and adds the
//! commands specific to it. [`CLASSES`] and [`find_core`] expose the whole catalogue by
//! class name, which is what the DBus interfaces work with.

pub mod accelerometer;
pub mod altimeter;
pub mod audio;
pub mod cellular;
pub mod consolidated_data_set;
pub mod dual_power;
pub mod files;
pub mod firmware_update;
pub mod hub_port;
pub mod humidity;
pub mod light_sensor;
pub mod message_box;
pub mod module;
pub mod pressure;
pub mod relay;
pub mod rfid_reader;
pub mod sensor;
pub mod temperature;
pub mod voltage;
pub mod voltage_output;
pub mod wireless;

pub use self::accelerometer::AccelerometerProxy;
pub use self::altimeter::AltimeterProxy;
pub use self::audio::{AudioInProxy, AudioOutProxy};
pub use self::cellular::{CellRecordProxy, CellularProxy};
pub use self::consolidated_data_set::ConsolidatedDataSetProxy;
pub use self::dual_power::DualPowerProxy;
pub use self::files::{FileRecordProxy, FilesProxy};
pub use self::firmware_update::FirmwareUpdateProxy;
pub use self::hub_port::HubPortProxy;
pub use self::humidity::HumidityProxy;
pub use self::light_sensor::LightSensorProxy;
pub use self::message_box::{MessageBoxProxy, SmsProxy};
pub use self::module::ModuleProxy;
pub use self::pressure::PressureProxy;
pub use self::relay::RelayProxy;
pub use self::rfid_reader::{RfidReaderProxy, RfidTagInfoProxy};
pub use self::sensor::{SensorFunction, SensorProxy};
pub use self::temperature::TemperatureProxy;
pub use self::voltage::VoltageProxy;
pub use self::voltage_output::VoltageOutputProxy;
pub use self::wireless::{WirelessProxy, WlanRecordProxy};

use crate::error::ProxyError;
use crate::native::{NativeRecord, NativeReply, status};
use crate::proxy::{FunctionClass, FunctionProxy, ProxyCore, ProxyManager};
use std::sync::Arc;

macro_rules! catalogue {
    ($($proxy:ty),+ $(,)?) => {
        /// Every function class the daemon can proxy, by class name.
        pub const CLASSES: &[&FunctionClass] = &[$(<$proxy as FunctionProxy>::CLASS),+];

        /// Dynamic [`ProxyManager::lookup`]: the core of the proxy of class `class` answering
        /// to `name`.
        ///
        /// # Arguments
        ///
        /// * `manager` - The registry the proxy is looked up in
        /// * `class` - Function class name, e.g. `"Relay"`
        /// * `name` - Any name form the function answers to, or empty for the first one
        ///
        /// # Returns: `Result<Arc<ProxyCore>, ProxyError>`
        /// * `Ok(Arc<ProxyCore>)` - The proxy's core, online or not
        /// * `Err(ProxyError::NotConnected)` - No function of the class answers to `name`
        /// * `Err(ProxyError::UnknownClass)` - `class` is not in the catalogue
        pub fn find_core(
            manager: &ProxyManager,
            class: &str,
            name: &str,
        ) -> Result<Arc<ProxyCore>, ProxyError> {
            $(
                if class == <$proxy as FunctionProxy>::CLASS.name {
                    return manager
                        .lookup::<$proxy>(name)
                        .map(|proxy| proxy.core().clone())
                        .ok_or(ProxyError::NotConnected(<$proxy as FunctionProxy>::CLASS.name));
                }
            )+
            Err(ProxyError::UnknownClass(class.to_string()))
        }
    };
}

catalogue!(
    SensorProxy,
    AccelerometerProxy,
    AltimeterProxy,
    HumidityProxy,
    TemperatureProxy,
    PressureProxy,
    VoltageProxy,
    LightSensorProxy,
    VoltageOutputProxy,
    RelayProxy,
    AudioInProxy,
    AudioOutProxy,
    DualPowerProxy,
    HubPortProxy,
    ModuleProxy,
    FilesProxy,
    RfidReaderProxy,
    WirelessProxy,
    CellularProxy,
    MessageBoxProxy,
);

/// Class descriptor of `name`.
pub fn class(name: &str) -> Result<&'static FunctionClass, ProxyError> {
    CLASSES
        .iter()
        .copied()
        .find(|c| c.name == name)
        .ok_or_else(|| ProxyError::UnknownClass(name.to_string()))
}

/// Comma-separated native list form of `values`.
pub(crate) fn join_values<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Unwrap the records of a data-returning command.
pub(crate) fn expect_records(
    operation: &str,
    reply: NativeReply,
) -> Result<Vec<NativeRecord>, ProxyError> {
    match reply {
        NativeReply::Records(records) => Ok(records),
        // An empty list is reported as a bare success by some firmwares.
        NativeReply::Status(status::SUCCESS) => Ok(Vec::new()),
        NativeReply::Status(code) => Err(ProxyError::Status {
            operation: operation.to_string(),
            code,
        }),
        NativeReply::Text(text) => Err(ProxyError::Internal(format!(
            "{operation} returned text {text:?} where records were expected"
        ))),
    }
}

/// Unwrap the text of a data-returning command.
pub(crate) fn expect_text(operation: &str, reply: NativeReply) -> Result<String, ProxyError> {
    match reply {
        NativeReply::Text(text) => Ok(text),
        NativeReply::Status(status::SUCCESS) => Ok(String::new()),
        NativeReply::Status(code) => Err(ProxyError::Status {
            operation: operation.to_string(),
            code,
        }),
        NativeReply::Records(_) => Err(ProxyError::Internal(format!(
            "{operation} returned records where text was expected"
        ))),
    }
}

/// Split a comma-separated native list, dropping empty items.
pub(crate) fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
