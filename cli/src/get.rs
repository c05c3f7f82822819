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

use yoctoproxy_api::status::{call_is_online, call_read_cached_property, call_read_property};

pub async fn get_handler(
    name: &Option<String>,
    class: &str,
    property: &str,
    cached: bool,
) -> Result<String, zbus::Error> {
    let name = name.as_deref().unwrap_or("");
    if !call_is_online(class, name).await? {
        return Err(zbus::Error::Failure(format!("No {class} connected")));
    }
    if cached {
        call_read_cached_property(class, name, property).await
    } else {
        call_read_property(class, name, property).await
    }
}
