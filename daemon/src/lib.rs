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

//! Typed proxies over the Yoctopuce device-access library.
//!
//! The native library (enumeration, transport, command framing, firmware flashing,
//! datalogger) is reached only through the traits of [`native`]. On top of it:
//!
//! - [`proxy`] holds the generic machinery: the [`ProxyManager`](proxy::ProxyManager)
//!   registry, the [`ProxyCore`](proxy::ProxyCore) attachment lifecycle and cache, and the
//!   value translation rules (sentinels, enum shift)
//! - [`functions`] is the catalogue of concrete proxy types, one per device function class
//! - [`comm`] exposes the catalogue over DBus, as served by the `yoctoproxyd` daemon
//!
//! ```ignore
//! use std::sync::Arc;
//! use yoctoproxy::functions::RelayProxy;
//! use yoctoproxy::native::memory_hub::MemoryHub;
//! use yoctoproxy::proxy::ProxyManager;
//!
//! let manager = ProxyManager::new(Arc::new(MemoryHub::new()));
//! let relay = manager.find::<RelayProxy>("pump");
//! if relay.is_online() {
//!     relay.pulse(200)?;
//! }
//! ```

pub mod comm;
pub mod config;
pub mod error;
pub mod functions;
pub mod native;
pub mod proxy;
pub mod system_io;
