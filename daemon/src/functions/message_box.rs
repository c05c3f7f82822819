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
use crate::native::status;
use crate::proxy::{FunctionProxy, function_proxy, record_proxy};

function_proxy! {
    /// SMS storage and sending of a cellular modem.
    pub struct MessageBoxProxy {
        class: "MessageBox",
        extends: [],
        advertises: Some("slotsInUse"),
        fields: {
            SLOTS_IN_USE: i32 = "slotsInUse", ReadOnly, cached;
            SLOTS_COUNT: i32 = "slotsCount", ReadOnly, cached;
            PDU_SENT: i32 = "pduSent", ReadWrite;
            PDU_RECEIVED: i32 = "pduReceived", ReadWrite;
            COMMAND: String = "command", ReadWrite;
        }
    }
}

record_proxy! {
    /// A stored SMS.
    pub struct SmsProxy("Sms") {
        get_slot -> i32 = "slot";
        get_sender -> String = "sender";
        get_recipient -> String = "recipient";
        get_text_data -> String = "textData";
        get_timestamp -> String = "timestamp";
        get_msg_class -> i32 = "msgClass";
    }
}

impl MessageBoxProxy {
    pub fn get_slots_in_use(&self) -> Result<i32, ProxyError> {
        self.get(Self::SLOTS_IN_USE)
    }

    pub fn get_slots_count(&self) -> Result<i32, ProxyError> {
        self.get(Self::SLOTS_COUNT)
    }

    pub fn get_pdu_sent(&self) -> Result<i32, ProxyError> {
        self.get(Self::PDU_SENT)
    }

    pub fn get_pdu_received(&self) -> Result<i32, ProxyError> {
        self.get(Self::PDU_RECEIVED)
    }

    /// Reset both PDU counters, stopping at the first failure.
    pub fn clear_pdu_counters(&self) -> Result<i32, ProxyError> {
        match self.set(Self::PDU_RECEIVED, 0)? {
            status::SUCCESS => self.set(Self::PDU_SENT, 0),
            code => Ok(code),
        }
    }

    fn send(&self, method: &str, recipient: &str, message: &str) -> Result<i32, ProxyError> {
        if recipient.is_empty() {
            return Err(ProxyError::Argument("empty SMS recipient".to_string()));
        }
        self.core().call_status(method, &[recipient, message])
    }

    pub fn send_text_message(&self, recipient: &str, message: &str) -> Result<i32, ProxyError> {
        self.send("sendTextMessage", recipient, message)
    }

    /// Send a class 0 message, displayed immediately and not stored by the recipient.
    pub fn send_flash_message(&self, recipient: &str, message: &str) -> Result<i32, ProxyError> {
        self.send("sendFlashMessage", recipient, message)
    }

    /// Messages currently stored on the SIM.
    pub fn get_messages(&self) -> Result<Vec<SmsProxy>, ProxyError> {
        let reply = self.core().call("get_messages", &[])?;
        Ok(expect_records("get_messages", reply)?
            .into_iter()
            .map(SmsProxy::new)
            .collect())
    }
}
