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
use crate::functions::{expect_records, expect_text, split_list};
use crate::native::status;
use crate::proxy::{FunctionProxy, function_proxy, proxy_enum, record_proxy};

proxy_enum! {
    /// Radio technology of the serving cell.
    pub enum CellType {
        Gprs = 1 => "GPRS",
        Egprs = 2 => "EGPRS",
        Wcdma = 3 => "WCDMA",
        Hsdpa = 4 => "HSDPA",
        NoService = 5 => "NONE",
        Cdma = 6 => "CDMA",
        LteM = 7 => "LTE_M",
        NbIot = 8 => "NB_IOT",
        EcGsmIot = 9 => "EC_GSM_IOT",
    }
}

proxy_enum! {
    pub enum AirplaneMode {
        Off = 1 => "OFF",
        On = 2 => "ON",
    }
}

proxy_enum! {
    /// When the data connection may be used.
    pub enum EnableData {
        HomeNetwork = 1 => "HOMENETWORK",
        Roaming = 2 => "ROAMING",
        Never = 3 => "NEVER",
        Neutrality = 4 => "NEUTRALITY",
    }
}

function_proxy! {
    /// Cellular modem.
    pub struct CellularProxy {
        class: "Cellular",
        extends: [],
        advertises: Some("linkQuality"),
        fields: {
            /// Link quality, in percent.
            LINK_QUALITY: i32 = "linkQuality", ReadOnly, cached;
            CELL_OPERATOR: String = "cellOperator", ReadOnly, cached;
            CELL_IDENTIFIER: String = "cellIdentifier", ReadOnly;
            CELL_TYPE: CellType = "cellType", ReadOnly;
            IMSI: String = "imsi", ReadOnly;
            MESSAGE: String = "message", ReadOnly;
            /// SIM PIN, write-only in practice: the device reports it obfuscated.
            PIN: String = "pin", ReadWrite;
            LOCKED_OPERATOR: String = "lockedOperator", ReadWrite, cached;
            AIRPLANE_MODE: AirplaneMode = "airplaneMode", ReadWrite, cached;
            ENABLE_DATA: EnableData = "enableData", ReadWrite, cached;
            APN: String = "apn", ReadWrite, cached;
            /// Keep-alive ping interval, in seconds.
            PING_INTERVAL: i32 = "pingInterval", ReadWrite, cached;
            /// Bytes sent since the counters were last cleared.
            DATA_SENT: i32 = "dataSent", ReadWrite;
            DATA_RECEIVED: i32 = "dataReceived", ReadWrite;
        }
    }
}

record_proxy! {
    /// A cell found by a survey.
    pub struct CellRecordProxy("CellRecord") {
        get_cell_operator -> String = "operator";
        get_mobile_country_code -> i32 = "mcc";
        get_mobile_network_code -> i32 = "mnc";
        get_location_area_code -> i32 = "lac";
        get_cell_id -> i32 = "cellId";
        /// Received signal strength, in dBm.
        get_signal_strength -> i32 = "dbm";
        get_timing_advance -> i32 = "tad";
    }
}

impl CellularProxy {
    pub fn get_link_quality(&self) -> Result<i32, ProxyError> {
        self.get(Self::LINK_QUALITY)
    }

    pub fn get_cell_operator(&self) -> Result<String, ProxyError> {
        self.get(Self::CELL_OPERATOR)
    }

    pub fn get_cell_identifier(&self) -> Result<String, ProxyError> {
        self.get(Self::CELL_IDENTIFIER)
    }

    pub fn get_cell_type(&self) -> Result<CellType, ProxyError> {
        self.get(Self::CELL_TYPE)
    }

    pub fn get_imsi(&self) -> Result<String, ProxyError> {
        self.get(Self::IMSI)
    }

    pub fn get_message(&self) -> Result<String, ProxyError> {
        self.get(Self::MESSAGE)
    }

    pub fn set_pin(&self, pin: &str) -> Result<i32, ProxyError> {
        self.set(Self::PIN, pin.to_string())
    }

    pub fn get_locked_operator(&self) -> Result<String, ProxyError> {
        self.get(Self::LOCKED_OPERATOR)
    }

    pub fn set_locked_operator(&self, operator: &str) -> Result<i32, ProxyError> {
        self.set(Self::LOCKED_OPERATOR, operator.to_string())
    }

    pub fn get_airplane_mode(&self) -> Result<AirplaneMode, ProxyError> {
        self.get(Self::AIRPLANE_MODE)
    }

    pub fn set_airplane_mode(&self, mode: AirplaneMode) -> Result<i32, ProxyError> {
        self.set(Self::AIRPLANE_MODE, mode)
    }

    pub fn get_enable_data(&self) -> Result<EnableData, ProxyError> {
        self.get(Self::ENABLE_DATA)
    }

    pub fn set_enable_data(&self, policy: EnableData) -> Result<i32, ProxyError> {
        self.set(Self::ENABLE_DATA, policy)
    }

    pub fn get_apn(&self) -> Result<String, ProxyError> {
        self.get(Self::APN)
    }

    pub fn set_apn(&self, apn: &str) -> Result<i32, ProxyError> {
        self.set(Self::APN, apn.to_string())
    }

    pub fn get_ping_interval(&self) -> Result<i32, ProxyError> {
        self.get(Self::PING_INTERVAL)
    }

    pub fn set_ping_interval(&self, seconds: i32) -> Result<i32, ProxyError> {
        self.set(Self::PING_INTERVAL, seconds)
    }

    pub fn get_data_sent(&self) -> Result<i32, ProxyError> {
        self.get(Self::DATA_SENT)
    }

    pub fn get_data_received(&self) -> Result<i32, ProxyError> {
        self.get(Self::DATA_RECEIVED)
    }

    /// Unlock a blocked SIM with its PUK and set a new PIN.
    pub fn send_puk(&self, puk: &str, new_pin: &str) -> Result<i32, ProxyError> {
        self.core().call_status("sendPUK", &[puk, new_pin])
    }

    pub fn change_pin(&self, current_pin: &str, new_pin: &str) -> Result<i32, ProxyError> {
        self.core().call_status("changePin", &[current_pin, new_pin])
    }

    /// Reset both data counters, stopping at the first failure.
    pub fn clear_data_counters(&self) -> Result<i32, ProxyError> {
        match self.set(Self::DATA_RECEIVED, 0)? {
            status::SUCCESS => self.set(Self::DATA_SENT, 0),
            code => Ok(code),
        }
    }

    /// Send a raw AT command to the modem and return its answer.
    pub fn at_command(&self, command: &str) -> Result<String, ProxyError> {
        if command.is_empty() {
            return Err(ProxyError::Argument("empty AT command".to_string()));
        }
        let reply = self.core().call("_AT", &[command])?;
        expect_text("_AT", reply)
    }

    /// Cells visible from the current location.
    pub fn quick_cell_survey(&self) -> Result<Vec<CellRecordProxy>, ProxyError> {
        let reply = self.core().call("quickCellSurvey", &[])?;
        Ok(expect_records("quickCellSurvey", reply)?
            .into_iter()
            .map(CellRecordProxy::new)
            .collect())
    }

    /// Names of the operators the modem can register with.
    pub fn get_available_operators(&self) -> Result<Vec<String>, ProxyError> {
        let reply = self.core().call("get_availableOperators", &[])?;
        Ok(split_list(&expect_text("get_availableOperators", reply)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeReply;
    use crate::native::memory_hub::MemoryHub;
    use crate::proxy::ProxyManager;
    use googletest::prelude::*;
    use std::sync::Arc;

    fn cellular() -> (Arc<MemoryHub>, ProxyManager) {
        let hub = Arc::new(MemoryHub::new());
        hub.add_function(
            "Cellular",
            "YHUBGSM5-1.cellular",
            &[("dataSent", "1200"), ("dataReceived", "5400"), ("cellType", "7")],
        );
        let manager = ProxyManager::new(hub.clone());
        (hub, manager)
    }

    #[gtest]
    fn counters_are_cleared_received_first() {
        let (hub, manager) = cellular();
        let cellular = manager.find::<CellularProxy>("");
        expect_that!(cellular.clear_data_counters(), ok(eq(&status::SUCCESS)));
        let func = hub.function("YHUBGSM5-1.cellular").expect("cellular");
        expect_that!(
            func.writes(),
            elements_are![
                eq(&("dataReceived".to_string(), "0".to_string())),
                eq(&("dataSent".to_string(), "0".to_string()))
            ]
        );
    }

    #[gtest]
    fn cell_type_is_shifted() {
        let (_hub, manager) = cellular();
        let cellular = manager.find::<CellularProxy>("cellular");
        expect_that!(cellular.get_cell_type(), ok(eq(&CellType::NbIot)));
    }

    #[gtest]
    fn at_command_returns_modem_answer() {
        let (hub, manager) = cellular();
        let func = hub.function("YHUBGSM5-1.cellular").expect("cellular");
        func.script("_AT", NativeReply::Text("+CSQ: 18,99\r\nOK".to_string()));
        func.script(
            "get_availableOperators",
            NativeReply::Text("Orange,Swisscom".to_string()),
        );
        let cellular = manager.find::<CellularProxy>("");
        expect_that!(cellular.at_command("AT+CSQ"), ok(ends_with("OK")));
        expect_that!(cellular.at_command(""), err(anything()));
        expect_that!(
            cellular.get_available_operators(),
            ok(elements_are![eq("Orange"), eq("Swisscom")])
        );
    }

    #[gtest]
    fn unattached_survey_is_not_connected() {
        let manager = ProxyManager::new(Arc::new(MemoryHub::new()));
        let cellular = manager.find::<CellularProxy>("gsm");
        expect_that!(
            cellular.quick_cell_survey(),
            err(displays_as(eq("No Cellular connected")))
        );
        expect_that!(
            CellRecordProxy::default().get_cell_id(),
            err(displays_as(eq("No CellRecord connected")))
        );
    }
}
