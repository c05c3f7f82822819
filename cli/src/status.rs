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

use yoctoproxy_api::status::{call_get_classes, call_get_functions, call_get_properties};

fn function_rows(functions: &std::collections::BTreeMap<String, String>, class: &str) -> String {
    functions
        .iter()
        .map(|(hwid, name)| format!("| {class} | {hwid} | {name} |\n"))
        .collect()
}

async fn get_class_status_message(class: &str) -> Result<String, zbus::Error> {
    let functions = call_get_functions(class).await?;
    if functions.is_empty() {
        return Ok(format!("No {class} online"));
    }
    Ok(format!(
        "---- {class} ----\n        | class | hardware id | logical name |\n{}",
        function_rows(&functions, class)
    ))
}

async fn get_full_status_message() -> Result<String, zbus::Error> {
    let mut ret_string = String::from(
        "---- FUNCTIONS ----\n    | class | hardware id | logical name |\n",
    );
    for class in call_get_classes().await? {
        let functions = call_get_functions(&class).await?;
        ret_string += function_rows(&functions, &class).as_str();
    }
    Ok(ret_string)
}

pub async fn status_handler(class: &Option<String>) -> Result<String, zbus::Error> {
    let ret_string = match class {
        None => get_full_status_message().await?,
        Some(class) => get_class_status_message(class).await?,
    };
    Ok(ret_string)
}

pub async fn properties_handler(class: &str) -> Result<String, zbus::Error> {
    Ok(call_get_properties(class).await?.join("\n"))
}
