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

//! Declarative generation of proxy types.
//!
//! [`function_proxy!`] turns a field list into a proxy struct implementing
//! [`FunctionProxy`](crate::proxy::FunctionProxy): one typed [`Field`](crate::proxy::Field)
//! constant per attribute plus the [`FunctionClass`](crate::proxy::FunctionClass) used by
//! the dynamic API. The common function properties (`logicalName`, `advertisedValue`) are
//! always included; further base groups are listed after `extends`.
//!
//! ```ignore
//! function_proxy! {
//!     /// A relay.
//!     pub struct RelayProxy {
//!         class: "Relay",
//!         extends: [],
//!         advertises: Some("state"),
//!         fields: {
//!             STATE: RelayState = "state", ReadWrite, cached;
//!             PULSE_TIMER: i64 = "pulseTimer", ReadOnly;
//!         }
//!     }
//! }
//! ```
//!
//! [`record_proxy!`] wraps an immutable [`NativeRecord`](crate::native::NativeRecord)
//! snapshot with one getter per field.

macro_rules! function_proxy {
    (@cached cached) => {
        true
    };
    (@cached) => {
        false
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            class: $class:literal,
            extends: [$($base:path),* $(,)?],
            advertises: $advertised:expr,
            fields: {
                $(
                    $(#[$field_meta:meta])*
                    $field:ident : $ty:ty = $attr:literal, $access:ident $(, $cached:ident)?;
                )*
            }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            core: ::std::sync::Arc<$crate::proxy::ProxyCore>,
        }

        impl $name {
            $(
                $(#[$field_meta])*
                pub const $field: $crate::proxy::Field<$ty, $crate::proxy::$access> =
                    $crate::proxy::Field::new($attr);
            )*

            /// Properties declared by this class itself, base classes excluded.
            pub const OWN_PROPERTIES: &'static [$crate::proxy::Property] = &[
                $(
                    $crate::proxy::Property::new::<$ty>(
                        $attr,
                        <$crate::proxy::$access as $crate::proxy::Access>::WRITABLE,
                        $crate::proxy::function_proxy!(@cached $($cached)?),
                    ),
                )*
            ];
        }

        impl $crate::proxy::FunctionProxy for $name {
            const CLASS: &'static $crate::proxy::FunctionClass = &$crate::proxy::FunctionClass {
                name: $class,
                advertised: $advertised,
                groups: &[
                    $crate::proxy::FUNCTION_PROPERTIES,
                    $($base,)*
                    $name::OWN_PROPERTIES,
                ],
            };

            fn from_core(core: ::std::sync::Arc<$crate::proxy::ProxyCore>) -> Self {
                $name { core }
            }

            fn core(&self) -> &::std::sync::Arc<$crate::proxy::ProxyCore> {
                &self.core
            }
        }
    };
}
pub(crate) use function_proxy;

macro_rules! record_proxy {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident ($class:literal) {
            $(
                $(#[$getter_meta:meta])*
                $getter:ident -> $ty:ty = $field:literal;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            record: Option<::std::sync::Arc<$crate::native::NativeRecord>>,
        }

        impl $name {
            pub fn new(record: $crate::native::NativeRecord) -> Self {
                $name {
                    record: Some(::std::sync::Arc::new(record)),
                }
            }

            /// The snapshot, or the "not connected" error for an empty record.
            pub fn record(&self) -> Result<&$crate::native::NativeRecord, $crate::error::ProxyError> {
                self.record
                    .as_deref()
                    .ok_or($crate::error::ProxyError::NotConnected($class))
            }

            $(
                $(#[$getter_meta])*
                pub fn $getter(&self) -> Result<$ty, $crate::error::ProxyError> {
                    Ok(<$ty as $crate::proxy::ProxyValue>::from_native_text(
                        self.record()?.field($field),
                    ))
                }
            )*
        }
    };
}
pub(crate) use record_proxy;
