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

//! One function per subcommand: open or create the image, drive the
//! directory engine and streamer, print what each operation calls for.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use log::info;
use os8_ds_std::FileStorage;
use os8_err::{Error, Result};
use os8_fs::{
    device::BlockDevice,
    name::{build_pattern, build_sixbit, validate_filename},
};
use os8_fs_os8::{
    streamer::{copy_binary_from_image, copy_binary_to_image, copy_text_from_image, copy_text_to_image, is_text_extension},
    Directory,
};

use crate::{
    cli::ImageArgs,
    image::{self},
};

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y"))
}

pub fn dir(image: ImageArgs, columns: Option<usize>, empties: bool, pattern: Option<String>) -> Result<()> {
    let (storage, geometry) = image::open_image(&image)?;
    let device = BlockDevice::new(&storage, geometry);
    let directory = Directory::read(&device)?;
    let pattern = build_pattern(pattern.as_deref().unwrap_or("*.*"))?;

    let mut lines = Vec::new();
    let mut cursor = directory.init_cursor();
    while directory.valid(&mut cursor) {
        let entry = directory.next_entry(&mut cursor);
        if entry.empty {
            if empties {
                lines.push(format!("<empty {}>", entry.length));
            }
        } else if pattern.matches(&entry.name) {
            lines.push(format!("{} {}", entry.name.to_filename(), entry.length));
        }
    }

    let columns = columns.unwrap_or(1).max(1);
    for chunk in lines.chunks(columns) {
        println!("{}", chunk.join("  "));
    }
    Ok(())
}

pub fn delete(image: ImageArgs, quiet: bool, patterns: Vec<String>) -> Result<()> {
    let (storage, geometry) = image::open_image(&image)?;
    let device = BlockDevice::new(&storage, geometry);
    let mut directory = Directory::read(&device)?;

    let mut deleted = 0u32;
    for raw in &patterns {
        let pattern = build_pattern(raw)?;
        let mut cursor = directory.init_cursor();
        let mut matches = Vec::new();
        while let Some(entry) = directory.lookup(&mut cursor, &pattern) {
            matches.push(entry);
        }
        for entry in matches {
            if quiet || confirm(&format!("Delete {}? [y/N]", entry.name.to_filename()))? {
                directory.delete_entry(entry);
                deleted += 1;
            }
        }
    }
    if deleted == 0 {
        return Err(Error::NotFound);
    }
    directory.consolidate();
    directory.commit(&device)?;
    info!("deleted {deleted} file(s) from {}", image.os8.display());
    Ok(())
}

pub fn create(image: ImageArgs, exists: bool) -> Result<()> {
    let geometry = image::geometry_for_create(&image)?;
    if image.os8.exists() {
        if !exists {
            return Err(Error::Usage(format!(
                "{} already exists; pass --exists to overwrite",
                image.os8.display()
            )));
        }
        if !confirm(&format!("Overwrite existing image {}? [y/N]", image.os8.display()))? {
            return Err(Error::Usage("create cancelled".into()));
        }
    }
    let storage = image::create_image(&image, &geometry, true)?;
    let device = BlockDevice::new(&storage, geometry);
    let mut directory = Directory::create(&geometry);
    directory.write_fresh(&device, &geometry)?;
    info!("created {} image at {}", geometry.name, image.os8.display());
    Ok(())
}

pub fn zero(image: ImageArgs) -> Result<()> {
    if !confirm(&format!("Zero the directory on {}? [y/N]", image.os8.display()))? {
        return Err(Error::Usage("zero cancelled".into()));
    }
    let (storage, geometry) = image::open_image(&image)?;
    let device = BlockDevice::new(&storage, geometry);
    let mut directory = Directory::read(&device)?;
    directory.zero(&geometry);
    directory.commit(&device)?;
    info!("zeroed directory on {}", image.os8.display());
    Ok(())
}

pub fn files(image: ImageArgs, force_text: bool, force_image: bool, args: Vec<String>) -> Result<()> {
    let (storage, geometry) = image::open_image(&image)?;
    let device = BlockDevice::new(&storage, geometry);
    let mut directory = Directory::read(&device)?;

    if args.len() == 1 && args[0].starts_with("os8:") && !args[0].contains('*') {
        return print_text(&directory, &device, &args[0]);
    }

    let last = args.last().expect("clap requires at least one argument");
    if last.starts_with("os8:") {
        let sources = &args[..args.len() - 1];
        if sources.is_empty() || sources.iter().any(|s| s.starts_with("os8:")) {
            return Err(Error::Usage(
                "copying to the image needs one or more host source paths before the os8: destination".into(),
            ));
        }
        let dest = &last["os8:".len()..];
        if dest.is_empty() {
            for source in sources {
                copy_to_image_inferred(&mut directory, &device, source, force_text, force_image)?;
            }
        } else {
            if sources.len() != 1 {
                return Err(Error::Usage(
                    "an explicit os8: destination name only accepts a single source file".into(),
                ));
            }
            copy_to_image_named(&mut directory, &device, &sources[0], dest, force_text, force_image)?;
        }
        directory.commit(&device)?;
        return Ok(());
    }

    if args[..args.len() - 1].iter().all(|a| a.starts_with("os8:")) {
        let host_dest = Path::new(last);
        for source in &args[..args.len() - 1] {
            let name = &source["os8:".len()..];
            let pattern = build_pattern(name)?;
            let mut cursor = directory.init_cursor();
            let mut any = false;
            while let Some(entry) = directory.lookup(&mut cursor, &pattern) {
                copy_from_image(&device, &entry, host_dest, force_text, force_image)?;
                any = true;
            }
            if !any {
                return Err(Error::NotFound);
            }
        }
        return Ok(());
    }

    Err(Error::Usage(
        "could not infer a copy direction: exactly one side's arguments must start with os8:".into(),
    ))
}

fn print_text(directory: &Directory, device: &BlockDevice<FileStorage>, arg: &str) -> Result<()> {
    let name = &arg["os8:".len()..];
    let pattern = build_pattern(name)?;
    let mut cursor = directory.init_cursor();
    let entry = directory.lookup(&mut cursor, &pattern).ok_or(Error::NotFound)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    copy_text_from_image(device, &entry, &mut handle)
}

fn host_name_halves(path: &Path) -> Result<(String, String)> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Usage(format!("cannot infer a name from {}", path.display())))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    Ok((stem.to_string(), ext.to_string()))
}

fn copy_to_image_inferred(
    directory: &mut Directory,
    device: &BlockDevice<FileStorage>,
    source: &str,
    force_text: bool,
    force_image: bool,
) -> Result<()> {
    let path = Path::new(source);
    let (name, ext) = host_name_halves(path)?;
    let six = build_sixbit(&name, &ext)?;
    copy_host_file_to_image(directory, device, path, six, use_text(&ext, force_text, force_image))
}

fn copy_to_image_named(
    directory: &mut Directory,
    device: &BlockDevice<FileStorage>,
    source: &str,
    dest: &str,
    force_text: bool,
    force_image: bool,
) -> Result<()> {
    let path = Path::new(source);
    let (name, ext) = validate_filename(dest)?;
    let six = build_sixbit(&name, &ext)?;
    copy_host_file_to_image(directory, device, path, six, use_text(&ext, force_text, force_image))
}

fn use_text(ext: &str, force_text: bool, force_image: bool) -> bool {
    if force_image {
        false
    } else if force_text {
        true
    } else {
        is_text_extension(ext)
    }
}

fn copy_host_file_to_image(
    directory: &mut Directory,
    device: &BlockDevice<FileStorage>,
    path: &Path,
    name: os8_fs::name::SixBitName,
    text: bool,
) -> Result<()> {
    let mut file = File::open(path)?;
    if text {
        copy_text_to_image(directory, device, name, &mut file)
    } else {
        let total = file.metadata()?.len();
        copy_binary_to_image(directory, device, name, &mut file, total)
    }
}

fn copy_from_image(
    device: &BlockDevice<FileStorage>,
    entry: &os8_fs_os8::Entry,
    host_dest: &Path,
    force_text: bool,
    force_image: bool,
) -> Result<()> {
    let filename = entry.name.to_filename();
    let out_path = if host_dest.is_dir() {
        host_dest.join(filename.to_ascii_lowercase())
    } else {
        host_dest.to_path_buf()
    };
    let ext = filename.rsplit('.').next().unwrap_or("");
    let mut out = File::create(&out_path)?;
    if use_text(ext, force_text, force_image) {
        copy_text_from_image(device, entry, &mut out)
    } else {
        copy_binary_from_image(device, entry, &mut out)
    }
}
