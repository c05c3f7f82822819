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

use yoctoproxy_api::control::{call_write_cached_property, call_write_property};

pub async fn set_handler(
    name: &Option<String>,
    class: &str,
    property: &str,
    value: &str,
    cached: bool,
) -> Result<String, zbus::Error> {
    let name = name.as_deref().unwrap_or("");
    if cached {
        return call_write_cached_property(class, name, property, value).await;
    }
    match call_write_property(class, name, property, value).await? {
        0 => Ok(format!("{class} {property} set to {value}")),
        code => Err(zbus::Error::Failure(format!(
            "Writing {class} {property} failed with status {code}"
        ))),
    }
}
