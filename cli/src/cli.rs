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

//! Argument grammar: one subcommand per operation, with the image-selection
//! and format-override flags shared via `#[command(flatten)]`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "os8pip", about = "Manipulate files on an OS/8 disk or tape image")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List files (and optionally empty slots) in the image's directory.
    Dir {
        #[command(flatten)]
        image: ImageArgs,
        /// Number of names per output line.
        #[arg(long)]
        columns: Option<usize>,
        /// Also list empty directory slots.
        #[arg(long)]
        empties: bool,
        /// OS/8 name pattern, e.g. `*.TX`; defaults to every file.
        pattern: Option<String>,
    },
    /// Delete files matching a name pattern.
    Delete {
        #[command(flatten)]
        image: ImageArgs,
        /// Skip the per-file confirmation prompt.
        #[arg(long)]
        quiet: bool,
        /// OS/8 name patterns, e.g. `A.TX` or `B*.*`.
        #[arg(required = true)]
        patterns: Vec<String>,
    },
    /// Create a new, empty image.
    Create {
        #[command(flatten)]
        image: ImageArgs,
        /// Overwrite the host path if it already exists.
        #[arg(long)]
        exists: bool,
    },
    /// Reinitialize an existing image to a single empty directory.
    Zero {
        #[command(flatten)]
        image: ImageArgs,
    },
    /// Copy files to or from the image, or print an image text file to
    /// stdout, inferred from which arguments start with `os8:`.
    Files {
        #[command(flatten)]
        image: ImageArgs,
        /// Force text-mode copy (line-ending translation).
        #[arg(long, conflicts_with = "as_image")]
        text: bool,
        /// Force binary-mode copy (verbatim bytes).
        #[arg(long = "image", conflicts_with = "text")]
        as_image: bool,
        /// Host paths and/or `os8:NAME` arguments.
        #[arg(required = true)]
        args: Vec<String>,
    },
}

/// Flags shared by every subcommand: which host file backs the image, and
/// how to interpret it.
#[derive(Args)]
pub struct ImageArgs {
    /// Path to the image file on the host.
    #[arg(long)]
    pub os8: PathBuf,
    /// Force RK05 three-byte-per-two-word packing.
    #[arg(long, conflicts_with_all = ["tu56", "dt8"])]
    pub rk05: bool,
    /// Force DECtape 129-word packing.
    #[arg(long)]
    pub tu56: bool,
    /// Synonym for `--tu56`.
    #[arg(long)]
    pub dt8: bool,
    /// Select RK05 sub-filesystem A (default).
    #[arg(long, conflicts_with = "rkb")]
    pub rka: bool,
    /// Select RK05 sub-filesystem B.
    #[arg(long)]
    pub rkb: bool,
}
