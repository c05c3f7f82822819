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

use googletest::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use yoctoproxy::comm::dbus;
use yoctoproxy::functions::relay::RelayState;
use yoctoproxy::functions::{RelayProxy, SensorFunction, TemperatureProxy};
use yoctoproxy::native::directory_hub::DirectoryHub;
use yoctoproxy::proxy::{FunctionProxy, ProxyManager};
use yoctoproxy::system_io::{fs_create_dir, fs_read, fs_write};

fn add_function(root: &Path, serial: &str, function_id: &str, attributes: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(serial).join(function_id);
    fs_create_dir(&dir).expect("create function dir");
    for (attr, value) in attributes {
        fs_write(&dir.join(attr), true, value).expect("write attribute");
    }
    dir
}

fn bench() -> (TempDir, ProxyManager) {
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    add_function(
        tmp.path(),
        "RELAYLO1-27EAB",
        "relay1",
        &[("class", "Relay"), ("logicalName", "pump"), ("state", "0")],
    );
    add_function(
        tmp.path(),
        "YTHERMC1-51C02",
        "temperature1",
        &[
            ("class", "Temperature"),
            ("logicalName", "oven"),
            ("currentValue", "21.5"),
            ("advertisedValue", "21.5"),
        ],
    );
    let hub = DirectoryHub::open(tmp.path()).expect("open hub");
    let manager = ProxyManager::new(Arc::new(hub));
    expect_that!(manager.handle_events(), eq(2));
    (tmp, manager)
}

#[gtest]
fn writes_by_name_land_in_the_tree() {
    let (tmp, manager) = bench();
    expect_that!(
        dbus::write_property(&manager, "Relay", "pump", "state", "B"),
        ok(eq(&0))
    );
    expect_that!(
        fs_read(&tmp.path().join("RELAYLO1-27EAB/relay1/state")),
        ok(eq("1"))
    );
    let pump = manager.find::<RelayProxy>("pump");
    expect_that!(pump.get_state(), ok(eq(&RelayState::B)));
    expect_that!(pump.pulse(250), ok(eq(&0)));
    expect_that!(
        fs_read(&tmp.path().join("RELAYLO1-27EAB/relay1/commands")),
        ok(eq("pulse 250\n"))
    );
}

#[gtest]
fn advertised_file_changes_reach_the_proxy() {
    let (tmp, manager) = bench();
    let oven = manager.find::<TemperatureProxy>("oven");
    expect_that!(oven.current_value(), eq(21.5));
    fs_write(
        &tmp.path().join("YTHERMC1-51C02/temperature1/advertisedValue"),
        true,
        "22.75",
    )
    .expect("write advertised value");
    manager.handle_events();
    expect_that!(oven.current_value(), eq(22.75));
}

#[gtest]
fn removed_module_goes_offline_until_it_returns() {
    let (tmp, manager) = bench();
    let pump = manager.find::<RelayProxy>("pump");
    let module = tmp.path().join("RELAYLO1-27EAB");
    let parked = tmp.path().join(".parked");
    std::fs::rename(&module, &parked).expect("park module");
    manager.handle_events();
    expect_that!(pump.is_online(), eq(false));
    expect_that!(
        dbus::read_cached_property(&manager, "Relay", "pump", "state"),
        ok(eq("INVALID"))
    );
    std::fs::rename(&parked, &module).expect("unpark module");
    manager.handle_events();
    expect_that!(pump.is_online(), eq(true));
    expect_that!(pump.state(), eq(RelayState::A));
}
