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

//! Value translation between the native library and the proxy layer.
//!
//! Each proxy value type has its own "invalid" sentinel, distinct from the native one:
//!
//! | proxy type | proxy sentinel     | native sentinel   |
//! |------------|--------------------|-------------------|
//! | `i32`      | `-1`               | [`INVALID_INT`]   |
//! | `i64`      | `-1`               | [`INVALID_LONG`]  |
//! | `f64`      | `NaN`              | [`INVALID_DOUBLE`]|
//! | `String`   | [`INVALID_STRING`] | [`INVALID_STRING`]|
//! | enums      | `Invalid` (0)      | out of range      |
//!
//! Enums declared with [`proxy_enum!`] are shifted by one: native `0..N-1` is proxy `1..N`
//! and proxy `0` is reserved for `Invalid`.

use crate::native::{
    INVALID_DOUBLE, INVALID_INT, INVALID_LONG, INVALID_STRING, NativeFunction, NativeFunctionExt,
};
use std::fmt;

/// A value that can live in a proxy field.
pub trait ProxyValue: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The proxy sentinel.
    fn invalid() -> Self;

    fn is_invalid(&self) -> bool;

    /// Read `attr` from `func`, translating the native sentinel into the proxy one.
    fn read_native(func: &dyn NativeFunction, attr: &str) -> Self;

    /// Translate a raw native text, as found in record snapshots. `None` is invalid.
    fn from_native_text(raw: Option<&str>) -> Self;

    /// Native textual form, used for attribute writes.
    fn to_native(&self) -> String;

    /// Parse an advertised value. Anything unparsable is invalid.
    fn from_advertised(value: &str) -> Self;

    /// Textual form handed to DBus clients.
    fn to_text(&self) -> String;

    /// Parse the textual form received from DBus clients.
    fn parse_text(text: &str) -> Option<Self>;
}

impl ProxyValue for i32 {
    fn invalid() -> Self {
        -1
    }

    fn is_invalid(&self) -> bool {
        *self == -1
    }

    fn read_native(func: &dyn NativeFunction, attr: &str) -> Self {
        match func.get_int(attr) {
            INVALID_INT => -1,
            value => value,
        }
    }

    fn from_native_text(raw: Option<&str>) -> Self {
        raw.and_then(|r| r.trim().parse().ok())
            .filter(|v| *v != INVALID_INT)
            .unwrap_or(-1)
    }

    fn to_native(&self) -> String {
        self.to_string()
    }

    fn from_advertised(value: &str) -> Self {
        value.trim().parse().unwrap_or(-1)
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn parse_text(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl ProxyValue for i64 {
    fn invalid() -> Self {
        -1
    }

    fn is_invalid(&self) -> bool {
        *self == -1
    }

    fn read_native(func: &dyn NativeFunction, attr: &str) -> Self {
        match func.get_long(attr) {
            INVALID_LONG => -1,
            value => value,
        }
    }

    fn from_native_text(raw: Option<&str>) -> Self {
        raw.and_then(|r| r.trim().parse().ok())
            .filter(|v| *v != INVALID_LONG)
            .unwrap_or(-1)
    }

    fn to_native(&self) -> String {
        self.to_string()
    }

    fn from_advertised(value: &str) -> Self {
        value.trim().parse().unwrap_or(-1)
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn parse_text(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl ProxyValue for f64 {
    fn invalid() -> Self {
        f64::NAN
    }

    fn is_invalid(&self) -> bool {
        self.is_nan()
    }

    fn read_native(func: &dyn NativeFunction, attr: &str) -> Self {
        let value = func.get_double(attr);
        if value == INVALID_DOUBLE {
            f64::NAN
        } else {
            value
        }
    }

    fn from_native_text(raw: Option<&str>) -> Self {
        raw.and_then(|r| r.trim().parse().ok())
            .filter(|v| *v != INVALID_DOUBLE)
            .unwrap_or(f64::NAN)
    }

    fn to_native(&self) -> String {
        self.to_string()
    }

    fn from_advertised(value: &str) -> Self {
        value.trim().parse().unwrap_or(f64::NAN)
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn parse_text(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl ProxyValue for String {
    fn invalid() -> Self {
        INVALID_STRING.to_string()
    }

    fn is_invalid(&self) -> bool {
        self == INVALID_STRING
    }

    fn read_native(func: &dyn NativeFunction, attr: &str) -> Self {
        func.get_string(attr)
    }

    fn from_native_text(raw: Option<&str>) -> Self {
        raw.unwrap_or(INVALID_STRING).to_string()
    }

    fn to_native(&self) -> String {
        self.clone()
    }

    fn from_advertised(value: &str) -> Self {
        value.to_string()
    }

    fn to_text(&self) -> String {
        self.clone()
    }

    fn parse_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

/// Declare a shifted proxy enum.
///
/// Each variant carries its proxy value (native value plus one) and the word the device
/// uses for it in advertised values, optionally followed by `|`-separated aliases. Matching
/// an alias is logged at debug level.
///
/// ```ignore
/// proxy_enum! {
///     /// Output of a relay.
///     pub enum RelayState {
///         A = 1 => "A",
///         B = 2 => "B",
///     }
/// }
/// ```
macro_rules! proxy_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal => $word:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[repr(i32)]
        $vis enum $name {
            #[default]
            Invalid = 0,
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $name {
            /// Every valid variant, in proxy value order.
            pub const VARIANTS: &'static [$name] = &[$($name::$variant),+];

            /// Shift a native value into the proxy range. Anything out of range is `Invalid`.
            pub fn from_native(raw: i32) -> Self {
                let shifted = raw.wrapping_add(1);
                Self::VARIANTS
                    .iter()
                    .copied()
                    .find(|v| *v as i32 == shifted)
                    .unwrap_or($name::Invalid)
            }

            /// Native value of this variant. `Invalid` maps to `-1`.
            pub fn native(self) -> i32 {
                self as i32 - 1
            }

            /// Variant with the given proxy value, `0` included.
            pub fn from_value(value: i32) -> Option<Self> {
                if value == 0 {
                    return Some($name::Invalid);
                }
                Self::VARIANTS.iter().copied().find(|v| *v as i32 == value)
            }

            /// Word used by the device for this variant.
            pub fn name(self) -> &'static str {
                match self {
                    $name::Invalid => "INVALID",
                    $( $name::$variant => $word ),+
                }
            }

            /// Exact match against the device vocabulary, aliases included.
            pub fn from_word(word: &str) -> Self {
                $(
                    if word == $word {
                        return $name::$variant;
                    }
                    $(
                        if word == $alias {
                            ::log::debug!(
                                "{}: accepted alias {:?} for {}",
                                stringify!($name),
                                word,
                                $word
                            );
                            return $name::$variant;
                        }
                    )*
                )+
                $name::Invalid
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl $crate::proxy::ProxyValue for $name {
            fn invalid() -> Self {
                $name::Invalid
            }

            fn is_invalid(&self) -> bool {
                *self == $name::Invalid
            }

            fn read_native(func: &dyn $crate::native::NativeFunction, attr: &str) -> Self {
                Self::from_native($crate::native::NativeFunctionExt::get_int(func, attr))
            }

            fn from_native_text(raw: Option<&str>) -> Self {
                raw.and_then(|r| r.trim().parse::<i32>().ok())
                    .map_or($name::Invalid, Self::from_native)
            }

            fn to_native(&self) -> String {
                self.native().to_string()
            }

            fn from_advertised(value: &str) -> Self {
                Self::from_word(value.trim())
            }

            fn to_text(&self) -> String {
                self.name().to_string()
            }

            fn parse_text(text: &str) -> Option<Self> {
                let text = text.trim();
                if text.eq_ignore_ascii_case("INVALID") {
                    return Some($name::Invalid);
                }
                match Self::from_word(&text.to_ascii_uppercase()) {
                    $name::Invalid => text.parse::<i32>().ok().and_then(Self::from_value),
                    variant => Some(variant),
                }
            }
        }
    };
}
pub(crate) use proxy_enum;

proxy_enum! {
    /// Two-state setting (`enabled`, `mute`, ...).
    pub enum Flag {
        False = 1 => "FALSE",
        True = 2 => "TRUE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::memory_hub::MemoryHub;
    use googletest::prelude::*;
    use rstest::*;

    proxy_enum! {
        enum Power {
            Off = 1 => "OFF",
            /// Powered through the USB cable.
            FromUsb = 2 => "FROM_USB" | "USB",
            FromExt = 3 => "FROM_EXT" | "EXT",
        }
    }

    #[gtest]
    #[rstest]
    #[case::first(0, Power::Off)]
    #[case::last(2, Power::FromExt)]
    #[case::below(-1, Power::Invalid)]
    #[case::above(3, Power::Invalid)]
    #[case::native_sentinel(INVALID_INT, Power::Invalid)]
    fn enum_shift(#[case] native: i32, #[case] expected: Power) {
        expect_that!(Power::from_native(native), eq(expected));
    }

    #[gtest]
    fn documented_variants_keep_their_vocabulary() {
        expect_that!(Power::VARIANTS.len(), eq(3));
        expect_that!(Power::FromUsb.name(), eq("FROM_USB"));
        expect_that!(Power::from_word("USB"), eq(Power::FromUsb));
    }

    #[gtest]
    fn shift_is_reversible_for_every_variant() {
        for variant in Power::VARIANTS {
            expect_that!(Power::from_native(variant.native()), eq(*variant));
        }
        expect_that!(Power::Invalid.native(), eq(-1));
    }

    #[gtest]
    #[rstest]
    #[case::word("FROM_USB", Power::FromUsb)]
    #[case::alias("EXT", Power::FromExt)]
    #[case::unknown("BATTERY", Power::Invalid)]
    #[case::case_sensitive("off", Power::Invalid)]
    fn advertised_vocabulary(#[case] word: &str, #[case] expected: Power) {
        expect_that!(Power::from_word(word), eq(expected));
    }

    #[gtest]
    #[rstest]
    #[case::word("off", Some(Power::Off))]
    #[case::number("3", Some(Power::FromExt))]
    #[case::zero("0", Some(Power::Invalid))]
    #[case::out_of_range("9", None)]
    #[case::garbage("maybe", None)]
    fn text_parsing(#[case] text: &str, #[case] expected: Option<Power>) {
        expect_that!(Power::parse_text(text), eq(expected));
    }

    #[gtest]
    fn native_sentinels_become_proxy_sentinels() {
        let hub = MemoryHub::new();
        let func = hub.add_function("Sensor", "SENSOR01-1.sensor", &[("good", "12")]);
        expect_that!(i32::read_native(&*func, "missing"), eq(-1));
        expect_that!(i64::read_native(&*func, "missing"), eq(-1));
        expect_that!(f64::read_native(&*func, "missing").is_nan(), eq(true));
        expect_that!(String::read_native(&*func, "missing"), eq(INVALID_STRING));
        expect_that!(Flag::read_native(&*func, "missing"), eq(Flag::Invalid));
        expect_that!(i32::read_native(&*func, "good"), eq(12));
        expect_that!(f64::read_native(&*func, "good"), eq(12.0));
    }

    #[gtest]
    fn record_text_translation() {
        expect_that!(i32::from_native_text(Some("42")), eq(42));
        expect_that!(i32::from_native_text(Some(&INVALID_INT.to_string())), eq(-1));
        expect_that!(i32::from_native_text(None), eq(-1));
        expect_that!(String::from_native_text(None), eq(INVALID_STRING));
        expect_that!(Flag::from_native_text(Some("1")), eq(Flag::True));
    }

    #[gtest]
    fn advertised_numbers() {
        expect_that!(f64::from_advertised("21.5"), eq(21.5));
        expect_that!(f64::from_advertised("n/a").is_nan(), eq(true));
        expect_that!(i32::from_advertised(" 7 "), eq(7));
    }

    #[gtest]
    fn invalid_values_are_recognised() {
        expect_that!(i32::invalid().is_invalid(), eq(true));
        expect_that!(f64::invalid().is_invalid(), eq(true));
        expect_that!(String::invalid().is_invalid(), eq(true));
        expect_that!(Flag::invalid().is_invalid(), eq(true));
        expect_that!(Flag::True.is_invalid(), eq(false));
    }
}
