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
use yoctoproxy::functions::dual_power::PowerControl;
use yoctoproxy::functions::relay::{RelayState, StateAtPowerOn};
use yoctoproxy::functions::{
    self, AudioOutProxy, DualPowerProxy, RelayProxy, VoltageOutputProxy,
};
use yoctoproxy::native::{INVALID_STRING, status};
use yoctoproxy::proxy::{Flag, FunctionProxy};

#[gtest]
#[rstest]
fn unattached_proxies_of_every_class_are_not_connected(empty_bench: Bench) {
    for class in functions::CLASSES {
        expect_not_connected(
            &functions::find_core(&empty_bench.manager, class.name, ""),
            class.name,
        );
    }
    expect_that!(empty_bench.manager.proxies(), is_empty());

    let relay = empty_bench.manager.find::<RelayProxy>("pump");
    let core = relay.core();
    expect_not_connected(&core.read_property("logicalName"), "Relay");
    expect_not_connected(&core.write_property("logicalName", "x"), "Relay");
    expect_that!(core.cached_property("logicalName"), ok(eq(INVALID_STRING)));
    expect_not_connected(&relay.get_state(), "Relay");
    expect_not_connected(&relay.set_state(RelayState::B), "Relay");
    expect_not_connected(&relay.pulse(100), "Relay");
    expect_not_connected(&relay.get_serial_number(), "Relay");
}

#[gtest]
#[rstest]
fn sentinel_writes_succeed_without_reaching_the_device(bench: Bench) {
    let pump = bench.manager.find::<RelayProxy>("pump");
    expect_that!(pump.set_state(RelayState::Invalid), ok(eq(&status::SUCCESS)));
    let output = bench.manager.find::<VoltageOutputProxy>("");
    expect_that!(
        output.set_current_voltage(f64::NAN),
        ok(eq(&status::SUCCESS))
    );
    expect_that!(bench.hub.function(PUMP).expect("pump").writes(), is_empty());
    expect_that!(
        bench.hub.function(OUTPUT).expect("output").writes(),
        is_empty()
    );
}

#[gtest]
#[rstest]
fn every_power_on_state_survives_a_round_trip(
    bench: Bench,
    #[values(StateAtPowerOn::Unchanged, StateAtPowerOn::A, StateAtPowerOn::B)]
    state: StateAtPowerOn,
) {
    let pump = bench.manager.find::<RelayProxy>("pump");
    expect_that!(pump.set_state_at_power_on(state), ok(eq(&status::SUCCESS)));
    let func = bench.hub.function(PUMP).expect("pump");
    expect_that!(
        func.attribute("stateAtPowerOn"),
        some(eq(&(state as i32 - 1).to_string()))
    );
    expect_that!(pump.get_state_at_power_on(), ok(eq(&state)));
}

#[gtest]
#[rstest]
fn every_power_control_survives_a_round_trip(empty_bench: Bench) {
    empty_bench
        .hub
        .add_function("DualPower", "YGENMOD1-10001.dualPower", &[("powerControl", "0")]);
    let power = empty_bench.manager.find::<DualPowerProxy>("");
    for control in PowerControl::VARIANTS.iter().copied() {
        expect_that!(power.set_power_control(control), ok(eq(&status::SUCCESS)));
        expect_that!(power.get_power_control(), ok(eq(&control)));
    }
}

#[gtest]
#[rstest]
fn live_reads_follow_the_connection(bench: Bench) {
    let output = bench.manager.find::<VoltageOutputProxy>(OUTPUT);
    let func = bench.hub.function(OUTPUT).expect("output");
    func.push_value("3.3");
    expect_that!(output.live(VoltageOutputProxy::CURRENT_VOLTAGE), eq(3.3));

    bench.hub.unplug("TX010V01-9A2C1");
    bench.pump();
    expect_that!(
        output.live(VoltageOutputProxy::CURRENT_VOLTAGE).is_nan(),
        eq(true)
    );
    expect_that!(output.voltage_at_start_up().is_nan(), eq(true));
    func.push_value("4.4");

    bench.hub.plug("TX010V01-9A2C1");
    bench.pump();
    func.push_value("4.5");
    expect_that!(output.live(VoltageOutputProxy::CURRENT_VOLTAGE), eq(4.5));
    expect_that!(output.voltage_at_start_up(), eq(5.0));
}

#[gtest]
#[rstest]
fn cached_write_skips_the_unchanged_value(bench: Bench) {
    let output = bench.manager.find::<VoltageOutputProxy>("");
    let func = bench.hub.function(OUTPUT).expect("output");
    expect_that!(output.voltage_at_start_up(), eq(5.0));

    output.write_voltage_at_start_up(5.0);
    expect_that!(func.writes(), is_empty());

    output.write_voltage_at_start_up(7.5);
    expect_that!(
        func.writes(),
        elements_are![eq(&("voltageAtStartUp".to_string(), "7.5".to_string()))]
    );
    expect_that!(output.voltage_at_start_up(), eq(7.5));

    output.write_voltage_at_start_up(f64::NAN);
    expect_that!(func.writes().len(), eq(1));
}

#[gtest]
#[rstest]
fn busy_device_gets_the_cached_write_again(bench: Bench) {
    let output = bench.manager.find::<VoltageOutputProxy>("");
    let func = bench.hub.function(OUTPUT).expect("output");
    func.fail_writes(status::DEVICE_BUSY);

    output.write_voltage_at_start_up(7.5);
    expect_that!(func.attribute("voltageAtStartUp"), some(eq("5.0")));
    expect_that!(output.voltage_at_start_up(), eq(5.0));

    func.fail_writes(status::SUCCESS);
    output.write_voltage_at_start_up(7.5);
    expect_that!(func.writes().len(), eq(2));
    expect_that!(output.voltage_at_start_up(), eq(7.5));
}

#[gtest]
#[rstest]
#[case::unmuted("0", Flag::False)]
#[case::muted("1", Flag::True)]
#[case::garbage("7", Flag::Invalid)]
fn mute_is_shifted_into_the_proxy_range(
    bench: Bench,
    #[case] native: &str,
    #[case] expected: Flag,
) {
    bench
        .hub
        .function(SPEAKER)
        .expect("speaker")
        .set_raw("mute", native);
    let speaker = bench.manager.find::<AudioOutProxy>("");
    expect_that!(speaker.get_mute(), ok(eq(&expected)));
    expect_that!(speaker.mute(), eq(expected));
}

#[gtest]
#[rstest]
fn mute_writes_unshift(bench: Bench) {
    let speaker = bench.manager.find::<AudioOutProxy>(SPEAKER);
    expect_that!(speaker.mute(), eq(Flag::False));
    speaker.write_mute(Flag::True);
    let func = bench.hub.function(SPEAKER).expect("speaker");
    expect_that!(func.attribute("mute"), some(eq("1")));
    expect_that!(speaker.mute(), eq(Flag::True));
}

#[gtest]
#[rstest]
fn toggle_flips_between_positions(bench: Bench) {
    let valve = bench.manager.find::<RelayProxy>("valve");
    expect_that!(valve.toggle(), ok(eq(&status::SUCCESS)));
    expect_that!(valve.get_state(), ok(eq(&RelayState::A)));
    bench
        .hub
        .function(VALVE)
        .expect("valve")
        .set_raw("state", "garbage");
    expect_that!(valve.toggle(), ok(eq(&status::IO_ERROR)));
}
