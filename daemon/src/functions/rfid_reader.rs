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
use crate::proxy::{FunctionProxy, function_proxy, record_proxy};

function_proxy! {
    /// RFID/NFC tag reader.
    pub struct RfidReaderProxy {
        class: "RfidReader",
        extends: [],
        advertises: Some("nTags"),
        fields: {
            /// Number of tags currently in range.
            N_TAGS: i32 = "nTags", ReadOnly, cached;
            /// Tag scan frequency, in Hz.
            REFRESH_RATE: i32 = "refreshRate", ReadWrite, cached;
        }
    }
}

record_proxy! {
    /// Description of a tag in range.
    pub struct RfidTagInfoProxy("RfidTagInfo") {
        get_tag_id -> String = "id";
        get_tag_type -> i32 = "tagType";
        get_tag_type_str -> String = "typeStr";
        /// Memory size, in bytes.
        get_tag_memory_size -> i32 = "size";
        /// Usable memory, in bytes.
        get_tag_usable_size -> i32 = "usable";
        get_tag_block_size -> i32 = "blockSize";
        get_tag_first_block -> i32 = "firstBlock";
        get_tag_last_block -> i32 = "lastBlock";
    }
}

fn check_hex(data: &str) -> Result<(), ProxyError> {
    if data.len() % 2 != 0 || !data.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ProxyError::Argument(format!(
            "{data:?} is not an even-length hexadecimal string"
        )));
    }
    Ok(())
}

impl RfidReaderProxy {
    pub fn get_n_tags(&self) -> Result<i32, ProxyError> {
        self.get(Self::N_TAGS)
    }

    pub fn get_refresh_rate(&self) -> Result<i32, ProxyError> {
        self.get(Self::REFRESH_RATE)
    }

    pub fn set_refresh_rate(&self, rate: i32) -> Result<i32, ProxyError> {
        self.set(Self::REFRESH_RATE, rate)
    }

    /// Identifiers of the tags currently in range.
    pub fn get_tag_id_list(&self) -> Result<Vec<String>, ProxyError> {
        let reply = self.core().call("get_tagIdList", &[])?;
        Ok(split_list(&expect_text("get_tagIdList", reply)?))
    }

    /// Description of tag `tag_id`. An empty record when the reader returned none.
    pub fn get_tag_info(&self, tag_id: &str) -> Result<RfidTagInfoProxy, ProxyError> {
        let reply = self.core().call("get_tagInfo", &[tag_id])?;
        Ok(expect_records("get_tagInfo", reply)?
            .into_iter()
            .next()
            .map(RfidTagInfoProxy::new)
            .unwrap_or_default())
    }

    /// Read `n_bytes` from tag `tag_id` starting at `first_block`, as hexadecimal.
    pub fn tag_read_hex(
        &self,
        tag_id: &str,
        first_block: i32,
        n_bytes: i32,
    ) -> Result<String, ProxyError> {
        let reply = self.core().call(
            "tagReadHex",
            &[tag_id, &first_block.to_string(), &n_bytes.to_string()],
        )?;
        expect_text("tagReadHex", reply)
    }

    /// Write hexadecimal `data` to tag `tag_id` starting at `first_block`.
    pub fn tag_write_hex(
        &self,
        tag_id: &str,
        first_block: i32,
        data: &str,
    ) -> Result<i32, ProxyError> {
        check_hex(data)?;
        self.core()
            .call_status("tagWriteHex", &[tag_id, &first_block.to_string(), data])
    }

    /// Read `n_chars` characters of text from tag `tag_id` starting at `first_block`.
    pub fn tag_read_str(
        &self,
        tag_id: &str,
        first_block: i32,
        n_chars: i32,
    ) -> Result<String, ProxyError> {
        let reply = self.core().call(
            "tagReadStr",
            &[tag_id, &first_block.to_string(), &n_chars.to_string()],
        )?;
        expect_text("tagReadStr", reply)
    }

    /// Write `text` to tag `tag_id` starting at `first_block`.
    pub fn tag_write_str(
        &self,
        tag_id: &str,
        first_block: i32,
        text: &str,
    ) -> Result<i32, ProxyError> {
        self.core()
            .call_status("tagWriteStr", &[tag_id, &first_block.to_string(), text])
    }
}
