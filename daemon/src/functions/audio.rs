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

//! Audio inputs and outputs share the same property set.

use crate::error::ProxyError;
use crate::proxy::{Flag, FunctionProxy, function_proxy};

function_proxy! {
    /// Audio input, e.g. a microphone channel.
    pub struct AudioInProxy {
        class: "AudioIn",
        extends: [],
        advertises: Some("volume"),
        fields: {
            /// Gain, in percent.
            VOLUME: i32 = "volume", ReadWrite, cached;
            MUTE: Flag = "mute", ReadWrite, cached;
            /// Supported gain range, as `<min>-<max>`.
            VOLUME_RANGE: String = "volumeRange", ReadOnly, cached;
            /// Detected signal level, in mV.
            SIGNAL: i32 = "signal", ReadOnly;
            /// Time elapsed without a detected signal, in seconds.
            NO_SIGNAL_FOR: i32 = "noSignalFor", ReadOnly;
        }
    }
}

function_proxy! {
    /// Audio output, e.g. a speaker channel.
    pub struct AudioOutProxy {
        class: "AudioOut",
        extends: [],
        advertises: Some("volume"),
        fields: {
            VOLUME: i32 = "volume", ReadWrite, cached;
            MUTE: Flag = "mute", ReadWrite, cached;
            VOLUME_RANGE: String = "volumeRange", ReadOnly, cached;
            SIGNAL: i32 = "signal", ReadOnly;
            NO_SIGNAL_FOR: i32 = "noSignalFor", ReadOnly;
        }
    }
}

macro_rules! audio_accessors {
    ($proxy:ident) => {
        impl $proxy {
            pub fn get_volume(&self) -> Result<i32, ProxyError> {
                self.get(Self::VOLUME)
            }

            pub fn set_volume(&self, volume: i32) -> Result<i32, ProxyError> {
                self.set(Self::VOLUME, volume)
            }

            pub fn get_mute(&self) -> Result<Flag, ProxyError> {
                self.get(Self::MUTE)
            }

            pub fn set_mute(&self, mute: Flag) -> Result<i32, ProxyError> {
                self.set(Self::MUTE, mute)
            }

            /// Cached mute state.
            pub fn mute(&self) -> Flag {
                self.live(Self::MUTE)
            }

            pub fn write_mute(&self, mute: Flag) {
                self.write(Self::MUTE, mute)
            }

            pub fn get_volume_range(&self) -> Result<String, ProxyError> {
                self.get(Self::VOLUME_RANGE)
            }

            pub fn get_signal(&self) -> Result<i32, ProxyError> {
                self.get(Self::SIGNAL)
            }

            pub fn get_no_signal_for(&self) -> Result<i32, ProxyError> {
                self.get(Self::NO_SIGNAL_FOR)
            }
        }
    };
}

audio_accessors!(AudioInProxy);
audio_accessors!(AudioOutProxy);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::memory_hub::MemoryHub;
    use crate::proxy::ProxyManager;
    use googletest::prelude::*;
    use rstest::*;
    use std::sync::Arc;

    #[gtest]
    #[rstest]
    #[case::unmuted("0", Flag::False)]
    #[case::muted("1", Flag::True)]
    #[case::garbage("5", Flag::Invalid)]
    fn mute_is_shifted(#[case] native: &str, #[case] expected: Flag) {
        let hub = Arc::new(MemoryHub::new());
        hub.add_function("AudioOut", "YMAXBUZ1-1.audioOut1", &[("mute", native)]);
        let manager = ProxyManager::new(hub.clone());
        let out = manager.find::<AudioOutProxy>("audioOut1");
        expect_that!(out.get_mute(), ok(eq(&expected)));
        expect_that!(out.mute(), eq(expected));
    }

    #[gtest]
    fn volume_is_advertised() {
        let hub = Arc::new(MemoryHub::new());
        let func = hub.add_function("AudioIn", "YMAXBUZ1-1.audioIn1", &[("volume", "40")]);
        let manager = ProxyManager::new(hub.clone());
        let input = manager.find::<AudioInProxy>("");
        expect_that!(input.live(AudioInProxy::VOLUME), eq(40));
        func.push_value("65");
        expect_that!(input.live(AudioInProxy::VOLUME), eq(65));
        expect_that!(input.set_volume(-1), ok(eq(&0)));
        expect_that!(func.writes(), is_empty());
    }
}
