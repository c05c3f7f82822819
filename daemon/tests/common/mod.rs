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
use rstest::*;
use std::sync::Arc;
use yoctoproxy::error::ProxyError;
use yoctoproxy::native::memory_hub::MemoryHub;
use yoctoproxy::proxy::ProxyManager;

pub static RELAY_SERIAL: &str = "RELAYLO1-27EAB";
pub static PUMP: &str = "RELAYLO1-27EAB.relay1";
pub static VALVE: &str = "RELAYLO1-27EAB.relay2";
pub static OUTPUT: &str = "TX010V01-9A2C1.voltageOutput1";
pub static SPEAKER: &str = "YSPEAKR1-00B7F.audioOut";
pub static THERMOMETER: &str = "YTHERMC1-51C02.temperature1";

/// A simulated bench of a few modules and the registry driving it.
pub struct Bench {
    pub hub: Arc<MemoryHub>,
    pub manager: ProxyManager,
}

impl Bench {
    /// Drain the pending hotplug events, as the daemon's event pump does.
    pub fn pump(&self) -> usize {
        self.manager.handle_events()
    }
}

#[fixture]
pub fn bench() -> Bench {
    let hub = Arc::new(MemoryHub::new());
    hub.add_function(
        "Relay",
        PUMP,
        &[("logicalName", "pump"), ("state", "0"), ("stateAtPowerOn", "0")],
    );
    hub.add_function("Relay", VALVE, &[("logicalName", "valve"), ("state", "1")]);
    hub.add_function(
        "VoltageOutput",
        OUTPUT,
        &[("currentVoltage", "0"), ("voltageAtStartUp", "5.0")],
    );
    hub.add_function("AudioOut", SPEAKER, &[("volume", "50"), ("mute", "0")]);
    hub.add_function(
        "Temperature",
        THERMOMETER,
        &[("logicalName", "oven"), ("unit", "°C"), ("currentValue", "21.5")],
    );
    let manager = ProxyManager::new(hub.clone());
    let bench = Bench { hub, manager };
    // Start from a quiet queue, like a daemon that has already seen the modules arrive.
    bench.pump();
    bench
}

#[fixture]
pub fn empty_bench() -> Bench {
    let hub = Arc::new(MemoryHub::new());
    let manager = ProxyManager::new(hub.clone());
    Bench { hub, manager }
}

pub fn expect_not_connected<T: std::fmt::Debug>(res: &Result<T, ProxyError>, class: &str) {
    match res {
        Err(e) => {
            assert_that!(
                e.to_string(),
                eq(&format!("No {class} connected")),
                "Mismatched error signature"
            );
        }
        Ok(v) => panic!("Result mismatch: got Ok({v:?}), expected No {class} connected"),
    }
}
