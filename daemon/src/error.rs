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

use log::error;
use std::path::PathBuf;
use zbus::fdo;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The proxy has no native function attached. The message is fixed per class.
    #[error("No {0} connected")]
    NotConnected(&'static str),
    #[error("ProxyError::UnknownClass: {0} is not a known function class")]
    UnknownClass(String),
    #[error("ProxyError::UnknownProperty: {class} has no property {property}")]
    UnknownProperty {
        class: &'static str,
        property: String,
    },
    #[error("ProxyError::ReadOnly: {class}.{property} cannot be written")]
    ReadOnly {
        class: &'static str,
        property: String,
    },
    #[error("ProxyError::InvalidValue: {value:?} is not a valid value for {property}")]
    InvalidValue { property: String, value: String },
    #[error("ProxyError::Status: {operation} failed with status {code}")]
    Status { operation: String, code: i32 },
    #[error("ProxyError::Argument: {0}")]
    Argument(String),
    #[error("ProxyError::IORead: An IO error occurred when reading from {file:?}: {e}")]
    IORead { file: PathBuf, e: std::io::Error },
    #[error("ProxyError::IOWrite: An IO error occurred when writing {data:?} to {file:?}: {e}")]
    IOWrite {
        data: String,
        file: PathBuf,
        e: std::io::Error,
    },
    #[error("ProxyError::IOCreate: An IO error occurred when creating {file:?}: {e}")]
    IOCreate { file: PathBuf, e: std::io::Error },
    #[error("ProxyError::IODelete: An IO error occurred when deleting {file:?}: {e}")]
    IODelete { file: PathBuf, e: std::io::Error },
    #[error("ProxyError::IOReadDir: An IO error occurred when reading directory {dir:?}: {e}")]
    IOReadDir { dir: PathBuf, e: std::io::Error },
    #[error("ProxyError::TomlDe: Failed to parse {file:?}: {e}")]
    TomlDe { file: PathBuf, e: toml::de::Error },
    #[error("ProxyError::Internal: An Internal error occurred: {0}")]
    Internal(String),
}

impl From<ProxyError> for fdo::Error {
    fn from(err: ProxyError) -> Self {
        error!("{err}");
        match err {
            ProxyError::UnknownClass(..) => fdo::Error::InvalidArgs(err.to_string()),
            ProxyError::UnknownProperty { .. } => fdo::Error::InvalidArgs(err.to_string()),
            ProxyError::ReadOnly { .. } => fdo::Error::InvalidArgs(err.to_string()),
            ProxyError::InvalidValue { .. } => fdo::Error::InvalidArgs(err.to_string()),
            ProxyError::Argument(..) => fdo::Error::InvalidArgs(err.to_string()),
            ProxyError::IORead { .. } => fdo::Error::IOError(err.to_string()),
            ProxyError::IOWrite { .. } => fdo::Error::IOError(err.to_string()),
            ProxyError::IOCreate { .. } => fdo::Error::IOError(err.to_string()),
            ProxyError::IODelete { .. } => fdo::Error::IOError(err.to_string()),
            ProxyError::IOReadDir { .. } => fdo::Error::IOError(err.to_string()),
            _ => fdo::Error::Failed(err.to_string()),
        }
    }
}
