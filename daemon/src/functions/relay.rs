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
use crate::native::status;
use crate::proxy::{FunctionProxy, function_proxy, proxy_enum};

proxy_enum! {
    /// Position of a relay.
    pub enum RelayState {
        A = 1 => "A",
        B = 2 => "B",
    }
}

proxy_enum! {
    /// Position applied when the module powers up.
    pub enum StateAtPowerOn {
        Unchanged = 1 => "UNCHANGED",
        A = 2 => "A",
        B = 3 => "B",
    }
}

proxy_enum! {
    /// Output of a relay driving an external load.
    pub enum RelayOutput {
        Off = 1 => "OFF",
        On = 2 => "ON",
    }
}

function_proxy! {
    /// Relay with an idle position (A) and an active position (B).
    pub struct RelayProxy {
        class: "Relay",
        extends: [],
        advertises: Some("state"),
        fields: {
            STATE: RelayState = "state", ReadWrite, cached;
            STATE_AT_POWER_ON: StateAtPowerOn = "stateAtPowerOn", ReadWrite, cached;
            /// Longest time the relay may stay in state A before switching back, in ms.
            /// Zero means no limit.
            MAX_TIME_ON_STATE_A: i64 = "maxTimeOnStateA", ReadWrite, cached;
            MAX_TIME_ON_STATE_B: i64 = "maxTimeOnStateB", ReadWrite, cached;
            OUTPUT: RelayOutput = "output", ReadWrite, cached;
            /// Remaining time of the current pulse, in ms.
            PULSE_TIMER: i64 = "pulseTimer", ReadOnly;
            /// Time before a delayed pulse starts, in ms.
            COUNTDOWN: i64 = "countdown", ReadOnly;
        }
    }
}

impl RelayProxy {
    pub fn get_state(&self) -> Result<RelayState, ProxyError> {
        self.get(Self::STATE)
    }

    pub fn set_state(&self, state: RelayState) -> Result<i32, ProxyError> {
        self.set(Self::STATE, state)
    }

    /// Last position advertised by the relay.
    pub fn state(&self) -> RelayState {
        self.live(Self::STATE)
    }

    pub fn get_state_at_power_on(&self) -> Result<StateAtPowerOn, ProxyError> {
        self.get(Self::STATE_AT_POWER_ON)
    }

    pub fn set_state_at_power_on(&self, state: StateAtPowerOn) -> Result<i32, ProxyError> {
        self.set(Self::STATE_AT_POWER_ON, state)
    }

    pub fn get_output(&self) -> Result<RelayOutput, ProxyError> {
        self.get(Self::OUTPUT)
    }

    pub fn set_output(&self, output: RelayOutput) -> Result<i32, ProxyError> {
        self.set(Self::OUTPUT, output)
    }

    pub fn get_pulse_timer(&self) -> Result<i64, ProxyError> {
        self.get(Self::PULSE_TIMER)
    }

    pub fn get_countdown(&self) -> Result<i64, ProxyError> {
        self.get(Self::COUNTDOWN)
    }

    /// Switch to state B for `ms_duration` milliseconds, then back to A.
    pub fn pulse(&self, ms_duration: i32) -> Result<i32, ProxyError> {
        if ms_duration < 0 {
            return Err(ProxyError::Argument(format!(
                "negative pulse duration {ms_duration}"
            )));
        }
        self.core()
            .call_status("pulse", &[&ms_duration.to_string()])
    }

    /// Like [`pulse`](Self::pulse), starting after `ms_delay` milliseconds.
    pub fn delayed_pulse(&self, ms_delay: i32, ms_duration: i32) -> Result<i32, ProxyError> {
        if ms_delay < 0 || ms_duration < 0 {
            return Err(ProxyError::Argument(format!(
                "negative delayed pulse timing {ms_delay}/{ms_duration}"
            )));
        }
        self.core().call_status(
            "delayedPulse",
            &[&ms_delay.to_string(), &ms_duration.to_string()],
        )
    }

    /// Switch to the opposite position.
    ///
    /// # Returns: `Result<i32, ProxyError>`
    /// * `Ok(status::IO_ERROR)` - The current position could not be read
    /// * `Ok(i32)` - Native status code of the switch
    /// * `Err(ProxyError::NotConnected)` - The proxy is unattached
    pub fn toggle(&self) -> Result<i32, ProxyError> {
        let next = match self.get_state()? {
            RelayState::A => RelayState::B,
            RelayState::B => RelayState::A,
            RelayState::Invalid => return Ok(status::IO_ERROR),
        };
        self.set_state(next)
    }
}
