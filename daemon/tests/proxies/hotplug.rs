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

use crate::common::*;
use googletest::prelude::*;
use rstest::*;
use std::sync::Arc;
use yoctoproxy::comm::dbus;
use yoctoproxy::functions::relay::RelayState;
use yoctoproxy::functions::{RelayProxy, SensorFunction, TemperatureProxy};
use yoctoproxy::proxy::FunctionProxy;

#[gtest]
#[rstest]
#[case::logical_name("pump")]
#[case::hardware_id("RELAYLO1-27EAB.relay1")]
#[case::function_id("relay1")]
#[case::serial_dot_logical("RELAYLO1-27EAB.pump")]
fn every_name_form_yields_the_same_proxy(bench: Bench, #[case] name: &str) {
    let by_logical = bench.manager.find::<RelayProxy>("pump");
    let other = bench.manager.find::<RelayProxy>(name);
    expect_that!(Arc::ptr_eq(&by_logical, &other), eq(true));
    expect_that!(other.get_hardware_id(), ok(eq(PUMP)));
}

#[gtest]
#[rstest]
fn empty_name_prefers_an_unattached_proxy(empty_bench: Bench) {
    let first = empty_bench.manager.find::<RelayProxy>("");
    expect_not_connected(&first.get_state(), "Relay");
    let again = empty_bench.manager.find::<RelayProxy>("");
    expect_that!(Arc::ptr_eq(&first, &again), eq(true));

    empty_bench
        .hub
        .add_function("Relay", PUMP, &[("logicalName", "pump"), ("state", "1")]);
    expect_that!(empty_bench.pump(), eq(1));
    expect_that!(first.get_state(), ok(eq(&RelayState::B)));
    // The only proxy is attached now, an empty name hands it out.
    let attached = empty_bench.manager.find::<RelayProxy>("");
    expect_that!(Arc::ptr_eq(&first, &attached), eq(true));
}

#[gtest]
#[rstest]
fn unmatched_name_attaches_on_arrival(bench: Bench) {
    let boiler = bench.manager.find::<RelayProxy>("boiler");
    expect_that!(boiler.is_online(), eq(false));
    expect_not_connected(&boiler.get_state(), "Relay");

    bench.hub.add_function(
        "Relay",
        "RELAYHI1-0F0F0.relay1",
        &[("logicalName", "boiler"), ("state", "1")],
    );
    bench.pump();
    expect_that!(boiler.is_online(), eq(true));
    expect_that!(boiler.get_hardware_id(), ok(eq("RELAYHI1-0F0F0.relay1")));
    expect_that!(boiler.state(), eq(RelayState::B));
}

#[gtest]
#[rstest]
fn arrival_does_not_bind_a_function_twice(empty_bench: Bench) {
    let anonymous = empty_bench.manager.find::<RelayProxy>("");
    let named = empty_bench.manager.find::<RelayProxy>("pump");
    expect_that!(Arc::ptr_eq(&named, &anonymous), eq(false));

    empty_bench
        .hub
        .add_function("Relay", PUMP, &[("logicalName", "pump"), ("state", "0")]);
    empty_bench.pump();
    let attached: Vec<bool> = [&anonymous, &named]
        .iter()
        .map(|p| p.core().is_attached())
        .collect();
    expect_that!(attached.iter().filter(|a| **a).count(), eq(1));
}

#[gtest]
#[rstest]
fn proxy_named_while_away_is_found_by_hardware_id(bench: Bench) {
    bench.hub.unplug(RELAY_SERIAL);
    bench.pump();
    let pump = bench.manager.find::<RelayProxy>("pump");
    expect_that!(pump.core().is_attached(), eq(false));

    bench.hub.plug(RELAY_SERIAL);
    let by_hardware_id = bench.manager.find::<RelayProxy>(PUMP);
    expect_that!(Arc::ptr_eq(&pump, &by_hardware_id), eq(true));
    expect_that!(pump.is_online(), eq(true));

    bench.pump();
    expect_that!(pump.state(), eq(RelayState::A));
    expect_that!(bench.manager.proxies().len(), eq(1));
}

#[gtest]
#[rstest]
fn bus_names_without_a_function_register_nothing(bench: Bench) {
    for n in 0..1000 {
        let name = format!("nope{n}");
        expect_that!(dbus::is_online(&bench.manager, "Relay", &name), ok(eq(&false)));
    }
    expect_that!(bench.manager.proxies(), is_empty());
    expect_that!(
        dbus::is_online(&bench.manager, "Relay", "valve"),
        ok(eq(&true))
    );
    expect_that!(bench.manager.proxies().len(), eq(1));
}

#[gtest]
#[rstest]
fn empty_bus_name_is_the_first_function_after_an_unmatched_one(bench: Bench) {
    // A typed lookup leaves an unattached proxy behind, the bus must not pick it.
    let siren = bench.manager.find::<RelayProxy>("siren");
    expect_not_connected(
        &dbus::read_property(&bench.manager, "Relay", "siren", "state"),
        "Relay",
    );
    expect_that!(
        dbus::read_property(&bench.manager, "Relay", "", "state"),
        ok(eq("A"))
    );
    expect_that!(dbus::is_online(&bench.manager, "Relay", ""), ok(eq(&true)));
    expect_that!(
        dbus::write_property(&bench.manager, "Relay", "", "state", "B"),
        ok(eq(&0))
    );
    expect_that!(
        bench.hub.function(PUMP).expect("pump").attribute("state"),
        some(eq("1"))
    );
    expect_that!(siren.core().is_attached(), eq(false));
}

#[gtest]
#[rstest]
fn removal_marks_offline_and_arrival_restores(bench: Bench) {
    let pump = bench.manager.find::<RelayProxy>("pump");
    let valve = bench.manager.find::<RelayProxy>("valve");
    let oven = bench.manager.find::<TemperatureProxy>("oven");
    expect_that!(pump.state(), eq(RelayState::A));

    bench.hub.unplug(RELAY_SERIAL);
    expect_that!(bench.pump(), eq(1));
    expect_that!(pump.is_online(), eq(false));
    expect_that!(valve.is_online(), eq(false));
    expect_that!(pump.state(), eq(RelayState::Invalid));
    // Other modules are untouched.
    expect_that!(oven.is_online(), eq(true));
    expect_that!(oven.current_value(), eq(21.5));

    bench
        .hub
        .function(PUMP)
        .expect("pump")
        .set_raw("state", "1");
    bench.hub.plug(RELAY_SERIAL);
    bench.pump();
    expect_that!(pump.is_online(), eq(true));
    expect_that!(pump.state(), eq(RelayState::B));
    expect_that!(valve.state(), eq(RelayState::B));
}

#[gtest]
#[rstest]
fn config_change_reloads_the_cache(bench: Bench) {
    let pump = bench.manager.find::<RelayProxy>("pump");
    let func = bench.hub.function(PUMP).expect("pump");
    func.set_raw("logicalName", "sump");
    expect_that!(pump.logical_name(), eq("pump"));

    bench.hub.reconfigure(RELAY_SERIAL);
    bench.pump();
    expect_that!(pump.logical_name(), eq("sump"));
    // Still reachable under the name it was requested with.
    let again = bench.manager.find::<RelayProxy>("pump");
    expect_that!(Arc::ptr_eq(&pump, &again), eq(true));
}

#[gtest]
#[rstest]
fn first_and_next_walk_the_class(bench: Bench) {
    let first = bench.manager.first::<RelayProxy>().expect("a relay is plugged");
    expect_that!(first.get_hardware_id(), ok(eq(PUMP)));
    let second = bench.manager.next(&*first).expect("two relays are plugged");
    expect_that!(second.get_hardware_id(), ok(eq(VALVE)));
    expect_that!(bench.manager.next(&*second).is_none(), eq(true));

    let by_name = bench.manager.find::<RelayProxy>("valve");
    expect_that!(Arc::ptr_eq(&second, &by_name), eq(true));
}

#[gtest]
#[rstest]
fn first_of_an_absent_class_is_none(bench: Bench) {
    expect_that!(
        bench
            .manager
            .first::<yoctoproxy::functions::HumidityProxy>()
            .is_none(),
        eq(true)
    );
}

#[gtest]
#[rstest]
fn advertised_values_reach_the_cache(bench: Bench) {
    let oven = bench.manager.find::<TemperatureProxy>("oven");
    let func = bench.hub.function(THERMOMETER).expect("thermometer");
    func.push_value("180.25");
    expect_that!(oven.current_value(), eq(180.25));
    expect_that!(oven.advertised_value(), eq("180.25"));

    bench.hub.unplug("YTHERMC1-51C02");
    bench.pump();
    expect_that!(oven.current_value().is_nan(), eq(true));
}

#[gtest]
#[rstest]
fn shutdown_releases_callbacks(bench: Bench) {
    let _pump = bench.manager.find::<RelayProxy>("pump");
    let func = bench.hub.function(PUMP).expect("pump");
    expect_that!(func.has_callback(), eq(true));
    bench.manager.shutdown();
    expect_that!(func.has_callback(), eq(false));
    expect_that!(bench.manager.proxies(), is_empty());
}
