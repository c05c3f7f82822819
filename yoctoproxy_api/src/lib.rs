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

//! Client side of the yoctoproxy DBus service.
//!
//! Every helper opens a system bus connection, builds the matching proxy and performs a
//! single call, so it can be used from short-lived tools without further setup.

pub mod control;
pub mod proxies;
pub mod status;

/// Split a newline-separated listing returned by the daemon, dropping empty lines.
pub fn listing(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;

    #[gtest]
    #[rstest]
    #[case::empty("", 0)]
    #[case::single("Relay", 1)]
    #[case::trailing_newline("Relay\nSensor\n", 2)]
    #[case::blank_lines("Relay\n\n  \nSensor", 2)]
    fn listing_drops_blank_lines(#[case] text: &str, #[case] count: usize) {
        expect_that!(listing(text).len(), eq(count));
    }
}
