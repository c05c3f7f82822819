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
use crate::proxy::{Flag, FunctionProxy, function_proxy, proxy_enum};

proxy_enum! {
    /// Power and enumeration state of a hub port.
    pub enum PortState {
        Off = 1 => "OFF",
        /// Overload, the port was shut down.
        Ovrld = 2 => "OVRLD",
        On = 3 => "ON",
        Run = 4 => "RUN",
        Prog = 5 => "PROG",
    }
}

function_proxy! {
    /// Downstream port of a YoctoHub.
    pub struct HubPortProxy {
        class: "HubPort",
        extends: [],
        advertises: Some("portState"),
        fields: {
            ENABLED: Flag = "enabled", ReadWrite, cached;
            PORT_STATE: PortState = "portState", ReadOnly, cached;
            /// Communication speed with the downstream module, in kbps.
            BAUD_RATE: i32 = "baudRate", ReadOnly, cached;
        }
    }
}

impl HubPortProxy {
    pub fn get_enabled(&self) -> Result<Flag, ProxyError> {
        self.get(Self::ENABLED)
    }

    pub fn set_enabled(&self, enabled: Flag) -> Result<i32, ProxyError> {
        self.set(Self::ENABLED, enabled)
    }

    pub fn get_port_state(&self) -> Result<PortState, ProxyError> {
        self.get(Self::PORT_STATE)
    }

    /// Last advertised port state.
    pub fn port_state(&self) -> PortState {
        self.live(Self::PORT_STATE)
    }

    pub fn get_baud_rate(&self) -> Result<i32, ProxyError> {
        self.get(Self::BAUD_RATE)
    }
}
