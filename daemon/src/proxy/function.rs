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
use crate::proxy::core::{Field, FunctionClass, Property, ProxyCore, ReadOnly, ReadWrite};
use crate::proxy::value::ProxyValue;
use std::sync::Arc;

/// Logical name of the function, as set by the user.
pub const LOGICAL_NAME: Field<String> = Field::new("logicalName");

/// Short string published by the device on every change.
pub const ADVERTISED_VALUE: Field<String, ReadOnly> = Field::new("advertisedValue");

/// Properties every function has.
pub const FUNCTION_PROPERTIES: &[Property] = &[
    Property::new::<String>("logicalName", true, true),
    Property::new::<String>("advertisedValue", false, true),
];

/// A typed proxy over one device function.
///
/// Implementations are generated by `function_proxy!`. Everything here is provided on top
/// of [`ProxyCore`]: call-through accessors fail with [`ProxyError::NotConnected`] while the
/// proxy is unattached, live accessors return the sentinel while it is offline.
pub trait FunctionProxy: Send + Sync + Sized + 'static {
    const CLASS: &'static FunctionClass;

    fn from_core(core: Arc<ProxyCore>) -> Self;

    fn core(&self) -> &Arc<ProxyCore>;

    /// Whether the hosting module is reachable.
    fn is_online(&self) -> bool {
        self.core().is_online()
    }

    /// `<serial>.<functionId>` of the attached function.
    fn get_hardware_id(&self) -> Result<String, ProxyError> {
        Ok(self.core().require_attached()?.hardware_id())
    }

    fn get_function_id(&self) -> Result<String, ProxyError> {
        Ok(self.core().require_attached()?.function_id())
    }

    /// Serial number of the module hosting the function.
    fn get_serial_number(&self) -> Result<String, ProxyError> {
        Ok(self.core().require_attached()?.serial_number())
    }

    fn get_logical_name(&self) -> Result<String, ProxyError> {
        self.core().get(LOGICAL_NAME)
    }

    fn set_logical_name(&self, name: &str) -> Result<i32, ProxyError> {
        self.core().set(LOGICAL_NAME, name.to_string())
    }

    /// Cached logical name.
    fn logical_name(&self) -> String {
        self.core().live(LOGICAL_NAME)
    }

    fn get_advertised_value(&self) -> Result<String, ProxyError> {
        self.core().get(ADVERTISED_VALUE)
    }

    /// Last advertised value.
    fn advertised_value(&self) -> String {
        self.core().live(ADVERTISED_VALUE)
    }

    fn get_user_data(&self) -> Result<Option<String>, ProxyError> {
        Ok(self.core().require_attached()?.user_data())
    }

    fn set_user_data(&self, data: Option<String>) -> Result<(), ProxyError> {
        self.core().require_attached()?.set_user_data(data);
        Ok(())
    }

    /// See [`ProxyCore::get`].
    fn get<T: ProxyValue, A>(&self, field: Field<T, A>) -> Result<T, ProxyError> {
        self.core().get(field)
    }

    /// See [`ProxyCore::set`].
    fn set<T: ProxyValue>(&self, field: Field<T, ReadWrite>, value: T) -> Result<i32, ProxyError> {
        self.core().set(field, value)
    }

    /// See [`ProxyCore::live`].
    fn live<T: ProxyValue, A>(&self, field: Field<T, A>) -> T {
        self.core().live(field)
    }

    /// See [`ProxyCore::write`].
    fn write<T: ProxyValue>(&self, field: Field<T, ReadWrite>, value: T) {
        self.core().write(field, value)
    }
}
