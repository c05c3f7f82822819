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
use crate::proxy::{FunctionProxy, function_proxy, record_proxy};

function_proxy! {
    /// Embedded filesystem of a module.
    pub struct FilesProxy {
        class: "Files",
        extends: [],
        advertises: Some("filesCount"),
        fields: {
            FILES_COUNT: i32 = "filesCount", ReadOnly, cached;
            /// Free space, in bytes.
            FREE_SPACE: i32 = "freeSpace", ReadOnly, cached;
        }
    }
}

record_proxy! {
    /// One entry of a filesystem listing.
    pub struct FileRecordProxy("FileRecord") {
        get_name -> String = "name";
        get_size -> i32 = "size";
        get_crc -> i32 = "crc";
    }
}

impl FilesProxy {
    pub fn get_files_count(&self) -> Result<i32, ProxyError> {
        self.get(Self::FILES_COUNT)
    }

    pub fn get_free_space(&self) -> Result<i32, ProxyError> {
        self.get(Self::FREE_SPACE)
    }

    /// Files whose name matches `pattern` (`*` and `?` wildcards, empty for all).
    pub fn get_list(&self, pattern: &str) -> Result<Vec<FileRecordProxy>, ProxyError> {
        let reply = self.core().call("get_list", &[pattern])?;
        Ok(expect_records("get_list", reply)?
            .into_iter()
            .map(FileRecordProxy::new)
            .collect())
    }

    /// Content of file `path`.
    ///
    /// # Returns: `Result<Vec<u8>, ProxyError>`
    /// * `Ok(Vec<u8>)` - The file content
    /// * `Err(ProxyError::Status)` - The native download failed, e.g. `FILE_NOT_FOUND`
    /// * `Err(ProxyError::NotConnected)` - The proxy is unattached
    pub fn download(&self, path: &str) -> Result<Vec<u8>, ProxyError> {
        let func = self.core().require_attached()?;
        func.download(path).map_err(|code| ProxyError::Status {
            operation: format!("download of {path}"),
            code,
        })
    }

    pub fn upload(&self, path: &str, content: &[u8]) -> Result<i32, ProxyError> {
        if path.is_empty() {
            return Err(ProxyError::Argument("empty file name".to_string()));
        }
        Ok(self.core().require_attached()?.upload(path, content))
    }

    pub fn remove(&self, path: &str) -> Result<i32, ProxyError> {
        self.core().call_status("remove", &[path])
    }

    /// Erase every file. Only `Files` functions of hubs support it.
    pub fn format_fs(&self) -> Result<i32, ProxyError> {
        self.core().call_status("format_fs", &[])
    }

    /// Whether a file named exactly `name` exists.
    pub fn file_exist(&self, name: &str) -> Result<bool, ProxyError> {
        if name.is_empty() {
            return Ok(false);
        }
        let listing = self.get_list(name)?;
        for record in &listing {
            if record.get_name()? == name {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
