// Copyright 2024 Kevin Ludwig
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command-line front end for OS/8 disk and tape image manipulation.
//!
//! Parses arguments with `clap`, initializes logging from `RUST_LOG`, and
//! dispatches into `os8_fs_os8`. A failing operation prints one diagnostic
//! line to stderr and exits non-zero.

mod cli;
mod commands;
mod image;

use clap::Parser;

use cli::{Cli, Command};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Dir { image, columns, empties, pattern } => commands::dir(image, columns, empties, pattern),
        Command::Delete { image, quiet, patterns } => commands::delete(image, quiet, patterns),
        Command::Create { image, exists } => commands::create(image, exists),
        Command::Zero { image } => commands::zero(image),
        Command::Files { image, text, as_image, args } => commands::files(image, text, as_image, args),
    };

    if let Err(error) = result {
        eprintln!("os8pip: {error}");
        std::process::exit(1);
    }
}
