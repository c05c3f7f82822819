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

mod get;
mod set;
mod status;

use crate::get::get_handler;
use crate::set::set_handler;
use crate::status::{properties_handler, status_handler};
use clap::{Parser, Subcommand, arg, command};
use log::{debug, error};

#[derive(Parser, Debug)]
#[command(name = "yocto")]
#[command(bin_name = "yocto")]
struct Cli {
    #[arg(
        long = "name",
        help = r#"function to operate on: hardware id, logical name, function id or
<serial>.<logicalName>. When omitted, the daemon picks the first function
of the requested class.
        "#
    )]
    name: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the online functions, of every class or of CLASS only
    Status { class: Option<String> },
    /// List the properties of CLASS with their access and caching
    Properties { class: String },
    /// Read PROPERTY of a CLASS function
    Get {
        class: String,
        property: String,
        /// Read the last known value instead of querying the device
        #[arg(long)]
        cached: bool,
    },
    /// Write VALUE to PROPERTY of a CLASS function
    Set {
        class: String,
        property: String,
        value: String,
        /// Skip the write if VALUE is already the last known value
        #[arg(long)]
        cached: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    debug!("parsed cli command with {cli:?}");
    let result = match &cli.command {
        Commands::Status { class } => status_handler(class).await,
        Commands::Properties { class } => properties_handler(class).await,
        Commands::Get {
            class,
            property,
            cached,
        } => get_handler(&cli.name, class, property, *cached).await,
        Commands::Set {
            class,
            property,
            value,
            cached,
        } => set_handler(&cli.name, class, property, value, *cached).await,
    };
    match result {
        Ok(msg) => {
            println!("{msg}");
            Ok(())
        }
        Err(e) => {
            error!("{e}");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;

    #[gtest]
    fn set_takes_class_property_and_value() {
        let cli = Cli::try_parse_from([
            "yocto", "--name", "pump", "set", "Relay", "state", "B", "--cached",
        ])
        .expect("valid command line");
        expect_that!(cli.name.as_deref(), some(eq("pump")));
        match cli.command {
            Commands::Set {
                class,
                property,
                value,
                cached,
            } => {
                expect_that!(class, eq("Relay"));
                expect_that!(property, eq("state"));
                expect_that!(value, eq("B"));
                expect_that!(cached, eq(true));
            }
            other => panic!("parsed {other:?}"),
        }
    }

    #[gtest]
    #[rstest]
    #[case::status_all(&["yocto", "status"], true)]
    #[case::status_class(&["yocto", "status", "Relay"], true)]
    #[case::get(&["yocto", "get", "Sensor", "currentValue"], true)]
    #[case::get_missing_property(&["yocto", "get", "Sensor"], false)]
    #[case::properties_missing_class(&["yocto", "properties"], false)]
    #[case::unknown_command(&["yocto", "load", "Relay"], false)]
    fn command_line_validation(#[case] args: &[&str], #[case] valid: bool) {
        expect_that!(Cli::try_parse_from(args).is_ok(), eq(valid));
    }
}
