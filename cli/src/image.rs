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

//! Image-format inference from the `--os8` path's extension, length, and any
//! explicit override flags.

use std::path::Path;

use os8_ds_std::FileStorage;
use os8_err::{Error, Result};
use os8_fs::geometry::Geometry;

use crate::cli::ImageArgs;

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

fn rk05_geometry(args: &ImageArgs) -> Geometry {
    if args.rkb {
        Geometry::RK05_B
    } else {
        Geometry::RK05_A
    }
}

/// Opens an existing image and infers its geometry, consulting the file's
/// length to disambiguate a `.tu56`/`.dt8` extension when no override flag
/// was given.
pub fn open_image(args: &ImageArgs) -> Result<(FileStorage, Geometry)> {
    let storage = FileStorage::open(&args.os8)?;
    let len = storage.len()?;

    let geometry = if args.rk05 || has_extension(&args.os8, "rk05") {
        rk05_geometry(args)
    } else if args.tu56 || args.dt8 {
        Geometry::DECTAPE
    } else if has_extension(&args.os8, "tu56") || has_extension(&args.os8, "dt8") {
        match len {
            380292 => Geometry::DECTAPE,
            377344 => Geometry::DISK,
            other => {
                return Err(Error::Format(format!(
                    "{} has length {other}, not a recognized DECtape image size",
                    args.os8.display()
                )))
            }
        }
    } else if has_extension(&args.os8, "dsk") {
        Geometry::DISK
    } else {
        return Err(Error::Usage(format!(
            "cannot infer image format for {}; pass --rk05, --tu56, or --dt8",
            args.os8.display()
        )));
    };

    Ok((storage, geometry))
}

/// Picks the geometry for a brand new image, which has no length yet to
/// consult.
pub fn geometry_for_create(args: &ImageArgs) -> Result<Geometry> {
    if args.rk05 || has_extension(&args.os8, "rk05") {
        return Ok(rk05_geometry(args));
    }
    if args.tu56 || args.dt8 || has_extension(&args.os8, "tu56") || has_extension(&args.os8, "dt8") {
        return Ok(Geometry::DECTAPE);
    }
    if has_extension(&args.os8, "dsk") {
        return Ok(Geometry::DISK);
    }
    Err(Error::Usage(format!(
        "cannot infer image format for {}; pass --rk05, --tu56, or --dt8",
        args.os8.display()
    )))
}

/// Creates the host file for a fresh image of `geometry`, sized to hold
/// exactly its blocks, then opens it.
pub fn create_image(args: &ImageArgs, geometry: &Geometry, allow_overwrite: bool) -> Result<FileStorage> {
    if args.os8.exists() && !allow_overwrite {
        return Err(Error::Usage(format!(
            "{} already exists; pass --exists to overwrite",
            args.os8.display()
        )));
    }
    let size = geometry.total_blocks as u64 * geometry.packing.bytes_per_block() as u64;
    std::fs::write(&args.os8, vec![0u8; size as usize])?;
    FileStorage::open(&args.os8)
}
