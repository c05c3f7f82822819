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

//! The generic proxy layer.
//!
//! Every proxy type is the same four pieces:
//!
//! - a registry entry in the [`ProxyManager`], which finds or creates it by name
//! - the attachment lifecycle of its [`ProxyCore`] (`link_to_hardware`, then
//!   `module_config_has_changed`)
//! - typed accessors over [`Field`] constants: `get`/`set` call through to the native
//!   function, `live`/`write` go through the cache
//! - the cache callbacks, `module_config_has_changed` and `value_change_callback`
//!
//! Per-type code only declares fields (see [`macros`]) and a few commands; the concrete types
//! live in [`crate::functions`].

pub mod core;
pub mod function;
pub mod macros;
pub mod manager;
pub mod value;

pub use self::core::{
    Access, CacheSlot, Field, FunctionClass, Property, ProxyCore, ReadOnly, ReadWrite,
};
pub use self::function::{ADVERTISED_VALUE, FUNCTION_PROPERTIES, FunctionProxy, LOGICAL_NAME};
pub(crate) use self::macros::{function_proxy, record_proxy};
pub use self::manager::ProxyManager;
pub use self::value::{Flag, ProxyValue};
pub(crate) use self::value::proxy_enum;
