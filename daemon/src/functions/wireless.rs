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
use crate::functions::expect_records;
use crate::proxy::{FunctionProxy, function_proxy, proxy_enum, record_proxy};

proxy_enum! {
    pub enum Security {
        Unknown = 1 => "UNKNOWN",
        Open = 2 => "OPEN",
        Wep = 3 => "WEP",
        WpaPsk = 4 => "WPA_PSK",
        Wpa2Psk = 5 => "WPA2_PSK",
    }
}

proxy_enum! {
    pub enum WlanState {
        Down = 1 => "DOWN",
        Scanning = 2 => "SCANNING",
        Connected = 3 => "CONNECTED",
        Rejected = 4 => "REJECTED",
    }
}

function_proxy! {
    /// WiFi interface of a networked hub.
    pub struct WirelessProxy {
        class: "Wireless",
        extends: [],
        advertises: Some("linkQuality"),
        fields: {
            /// Link quality, in percent.
            LINK_QUALITY: i32 = "linkQuality", ReadOnly, cached;
            SSID: String = "ssid", ReadOnly, cached;
            CHANNEL: i32 = "channel", ReadOnly;
            SECURITY: Security = "security", ReadOnly, cached;
            /// Last status message of the interface.
            MESSAGE: String = "message", ReadOnly;
            /// Network configuration, as `<MODE>:<ssid>\<key>`.
            WLAN_CONFIG: String = "wlanConfig", ReadWrite, cached;
            WLAN_STATE: WlanState = "wlanState", ReadOnly, cached;
        }
    }
}

record_proxy! {
    /// A network found by a scan.
    pub struct WlanRecordProxy("WlanRecord") {
        get_ssid -> String = "ssid";
        get_channel -> i32 = "channel";
        get_security -> String = "sec";
        get_link_quality -> i32 = "rssi";
    }
}

impl WirelessProxy {
    pub fn get_link_quality(&self) -> Result<i32, ProxyError> {
        self.get(Self::LINK_QUALITY)
    }

    pub fn get_ssid(&self) -> Result<String, ProxyError> {
        self.get(Self::SSID)
    }

    pub fn get_channel(&self) -> Result<i32, ProxyError> {
        self.get(Self::CHANNEL)
    }

    pub fn get_security(&self) -> Result<Security, ProxyError> {
        self.get(Self::SECURITY)
    }

    pub fn get_message(&self) -> Result<String, ProxyError> {
        self.get(Self::MESSAGE)
    }

    pub fn get_wlan_config(&self) -> Result<String, ProxyError> {
        self.get(Self::WLAN_CONFIG)
    }

    pub fn get_wlan_state(&self) -> Result<WlanState, ProxyError> {
        self.get(Self::WLAN_STATE)
    }

    fn configure(&self, mode: &str, ssid: &str, key: &str) -> Result<i32, ProxyError> {
        if ssid.is_empty() {
            return Err(ProxyError::Argument("empty SSID".to_string()));
        }
        self.set(Self::WLAN_CONFIG, format!("{mode}:{ssid}\\{key}"))
    }

    /// Join an existing infrastructure network. Takes effect once saved and rebooted.
    pub fn join_network(&self, ssid: &str, key: &str) -> Result<i32, ProxyError> {
        self.configure("INFRA", ssid, key)
    }

    /// Create an ad-hoc network.
    pub fn adhoc_network(&self, ssid: &str, key: &str) -> Result<i32, ProxyError> {
        self.configure("ADHOC", ssid, key)
    }

    /// Run as an access point.
    pub fn soft_ap_network(&self, ssid: &str, key: &str) -> Result<i32, ProxyError> {
        self.configure("SOFTAP", ssid, key)
    }

    /// Start scanning for networks without changing the configuration.
    pub fn start_wlan_scan(&self) -> Result<i32, ProxyError> {
        let config = self.get_wlan_config()?;
        self.set(Self::WLAN_CONFIG, format!("SCAN:{config}"))
    }

    /// Networks found by the last scan.
    pub fn get_detected_wlans(&self) -> Result<Vec<WlanRecordProxy>, ProxyError> {
        let reply = self.core().call("get_detectedWlans", &[])?;
        Ok(expect_records("get_detectedWlans", reply)?
            .into_iter()
            .map(WlanRecordProxy::new)
            .collect())
    }
}
