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

//! Error Wrapping File System I/O Helpers
//!
//! Thin wrappers around standard file system operations with automatic conversion to
//! [`ProxyError`] I/O variants. All functions trace-log the path they touch, which is
//! usually the quickest way to see what the [`DirectoryHub`](crate::native::directory_hub)
//! backend is doing.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use yoctoproxy::system_io::{fs_read, fs_write};
//! # use std::path::Path;
//! # fn example() -> Result<(), yoctoproxy::error::ProxyError> {
//! let value = fs_read(Path::new("/var/lib/yoctoproxy/hub/RELAYLO1-12345/relay1/state"))?;
//! fs_write(Path::new("/var/lib/yoctoproxy/hub/RELAYLO1-12345/relay1/state"), false, "1")?;
//! # Ok(())
//! # }
//! ```

use crate::error::ProxyError;
use log::trace;
use std::fs::{OpenOptions, create_dir_all, remove_file};
use std::io::{Read, Write};
use std::path::Path;

/// Read the contents of a file to a String.
///
/// # Arguments
///
/// * `file_path` - Path to the file to read
///
/// # Returns: `Result<String, ProxyError>`
/// * `Ok(String)` - The complete contents of the file
/// * `Err(ProxyError::IORead)` - If the file cannot be read (doesn't exist, permissions, etc.)
pub fn fs_read(file_path: &Path) -> Result<String, ProxyError> {
    trace!("Attempting to read from {file_path:?}");
    let mut buf: String = String::new();
    let result = OpenOptions::new()
        .read(true)
        .open(file_path)
        .and_then(|mut f| f.read_to_string(&mut buf));

    match result {
        Ok(_) => {
            trace!("Reading done");
            Ok(buf)
        }
        Err(e) => Err(ProxyError::IORead {
            file: file_path.into(),
            e,
        }),
    }
}

/// Read the raw contents of a file.
///
/// # Returns: `Result<Vec<u8>, ProxyError>`
/// * `Ok(Vec<u8>)` - The complete contents of the file
/// * `Err(ProxyError::IORead)` - If the file cannot be read
pub fn fs_read_bytes(file_path: &Path) -> Result<Vec<u8>, ProxyError> {
    trace!("Attempting to read bytes from {file_path:?}");
    let mut buf = Vec::new();
    let result = OpenOptions::new()
        .read(true)
        .open(file_path)
        .and_then(|mut f| f.read_to_end(&mut buf));

    match result {
        Ok(n) => {
            trace!("Read {n} bytes");
            Ok(buf)
        }
        Err(e) => Err(ProxyError::IORead {
            file: file_path.into(),
            e,
        }),
    }
}

/// Write a string value to a file, replacing its previous content.
///
/// # Arguments
///
/// * `file_path` - Path to the file to write
/// * `create` - If `true`, create the file if it doesn't exist; if `false`, file must already exist
/// * `value` - The string value to write (implements `AsRef<str>`)
///
/// # Returns: `Result<(), ProxyError>`
/// * `Ok(())` - Write succeeded
/// * `Err(ProxyError::IOWrite)` - If the write fails (permissions, file doesn't exist when create=false, etc.)
pub fn fs_write(file_path: &Path, create: bool, value: impl AsRef<str>) -> Result<(), ProxyError> {
    trace!(
        "Attempting to write {:?} to {:?}",
        value.as_ref(),
        file_path
    );
    let result = OpenOptions::new()
        .create(create)
        .read(false)
        .write(true)
        .truncate(true)
        .open(file_path)
        .and_then(|mut f| write!(f, "{}", value.as_ref()));
    match result {
        Ok(_) => {
            trace!("Write done.");
            Ok(())
        }
        Err(e) => Err(ProxyError::IOWrite {
            data: value.as_ref().to_string(),
            file: file_path.into(),
            e,
        }),
    }
}

/// Write binary data to a file, truncating existing content.
///
/// # Returns: `Result<(), ProxyError>`
/// * `Ok(())` - Write succeeded
/// * `Err(ProxyError::IOWrite)` - If the write fails
pub fn fs_write_bytes(file_path: &Path, create: bool, data: &[u8]) -> Result<(), ProxyError> {
    trace!("Attempting to write {} bytes to {file_path:?}", data.len());
    let result = OpenOptions::new()
        .create(create)
        .write(true)
        .truncate(true)
        .open(file_path)
        .and_then(|mut f| f.write_all(data));

    match result {
        Ok(_) => {
            trace!("Write done.");
            Ok(())
        }
        Err(e) => Err(ProxyError::IOWrite {
            data: format!("<{} bytes>", data.len()),
            file: file_path.into(),
            e,
        }),
    }
}

/// Recursively create directories up to the specified path.
///
/// # Returns: `Result<(), ProxyError>`
/// * `Ok(())` - Directory created (or already existed)
/// * `Err(ProxyError::IOCreate)` - If directory creation fails
pub fn fs_create_dir(path: &Path) -> Result<(), ProxyError> {
    trace!("Attempting to Create '{path:?}'");
    match create_dir_all(path) {
        Ok(_) => {
            trace!("Directory created at {path:?}.");
            Ok(())
        }
        Err(e) => Err(ProxyError::IOCreate {
            file: path.into(),
            e,
        }),
    }
}

/// Remove a single file.
///
/// # Returns: `Result<(), ProxyError>`
/// * `Ok(())` - File removed
/// * `Err(ProxyError::IODelete)` - If removal fails (doesn't exist, permissions, etc.)
pub fn fs_remove_file(path: &Path) -> Result<(), ProxyError> {
    trace!("Attempting to delete '{path:?}'");
    match remove_file(path) {
        Ok(_) => {
            trace!("Deleted {path:?}");
            Ok(())
        }
        Err(e) => Err(ProxyError::IODelete {
            file: path.into(),
            e,
        }),
    }
}

/// Read the contents of a directory and return entry names, sorted.
///
/// Entries that cannot be read are silently skipped. Sorting keeps enumeration order
/// stable between polls.
///
/// # Returns: `Result<Vec<String>, ProxyError>`
/// * `Ok(Vec<String>)` - Entry names in the directory (files and subdirectories)
/// * `Err(ProxyError::IOReadDir)` - If the directory cannot be read
pub fn fs_read_dir(dir: &Path) -> Result<Vec<String>, ProxyError> {
    trace!("Attempting to read directory '{dir:?}'");
    std::fs::read_dir(dir).map_or_else(
        |e| {
            Err(ProxyError::IOReadDir {
                dir: dir.to_owned(),
                e,
            })
        },
        |iter| {
            let mut ret: Vec<String> = iter
                .filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect();
            ret.sort();
            trace!("Dir reading done.");
            Ok(ret)
        },
    )
}
