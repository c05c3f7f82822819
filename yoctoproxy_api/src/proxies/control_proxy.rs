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

use zbus::{Result, proxy};
#[proxy(
    default_service = "com.canonical.yoctoproxy",
    interface = "com.canonical.yoctoproxy.control",
    default_path = "/com/canonical/yoctoproxy/control"
)]
pub trait Control {
    async fn write_property(
        &self,
        class: &str,
        name: &str,
        property: &str,
        value: &str,
    ) -> Result<i32>;

    async fn write_cached_property(
        &self,
        class: &str,
        name: &str,
        property: &str,
        value: &str,
    ) -> Result<String>;
}
