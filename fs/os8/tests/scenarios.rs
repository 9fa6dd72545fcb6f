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

//! End-to-end scenarios driving the directory engine and streamer through a
//! whole create/copy/delete/consolidate lifecycle against a `tempfile`-backed
//! image, one `FileStorage` per test to keep the advisory lock scoped.

use std::io::Cursor as IoCursor;

use os8_ds_std::FileStorage;
use os8_fs::{device::BlockDevice, geometry::Geometry, name::build_sixbit};
use os8_fs_os8::Directory;

fn fresh_image(geometry: &Geometry) -> (tempfile::TempPath, FileStorage) {
    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.into_temp_path();
    std::fs::write(&path, vec![0u8; geometry.total_blocks as usize * geometry.packing.bytes_per_block()]).unwrap();
    let storage = FileStorage::open(&path).unwrap();
    (path, storage)
}

#[test]
fn scenario_1_create_fresh_dectape_image() {
    let geometry = Geometry::DECTAPE;
    let (_path, storage) = fresh_image(&geometry);
    let device = BlockDevice::new(&storage, geometry);

    let mut directory = Directory::create(&geometry);
    directory.write_fresh(&device, &geometry).unwrap();

    let directory = Directory::read(&device).unwrap();
    assert_eq!(directory.segments[0].first_file_block(), 7);
    assert_eq!(directory.segments[0].number_files(), 1);

    let mut cursor = directory.init_cursor();
    let entry = directory.next_entry(&mut cursor);
    assert!(entry.empty);
    assert_eq!(entry.length, 730);
    assert!(!directory.valid(&mut cursor));
}

#[test]
fn scenario_2_copy_a_1024_byte_host_file() {
    let geometry = Geometry::DECTAPE;
    let (_path, storage) = fresh_image(&geometry);
    let device = BlockDevice::new(&storage, geometry);

    let mut directory = Directory::create(&geometry);
    directory.write_fresh(&device, &geometry).unwrap();

    let name = build_sixbit("hello", "tx").unwrap();
    let mut reader = IoCursor::new(vec![0x41u8; 1024]);
    os8_fs_os8::streamer::copy_binary_to_image(&mut directory, &device, name, &mut reader, 1024).unwrap();
    directory.commit(&device).unwrap();

    let directory = Directory::read(&device).unwrap();
    let mut cursor = directory.init_cursor();
    let present = directory.next_entry(&mut cursor);
    assert!(!present.empty);
    assert_eq!(present.name.to_filename(), "HELLO.TX");
    assert_eq!(present.length, 2);
    assert_eq!(present.file_block, 7);

    let empty = directory.next_entry(&mut cursor);
    assert!(empty.empty);
    assert_eq!(empty.length, 728);
    assert_eq!(empty.file_block, 9);
}

#[test]
fn scenario_3_copy_six_small_files() {
    let geometry = Geometry::DECTAPE;
    let (_path, storage) = fresh_image(&geometry);
    let device = BlockDevice::new(&storage, geometry);

    let mut directory = Directory::create(&geometry);
    directory.write_fresh(&device, &geometry).unwrap();

    for letter in ["A", "B", "C", "D", "E", "F"] {
        let name = build_sixbit(letter, "").unwrap();
        let mut reader = IoCursor::new(vec![0u8; 256]);
        os8_fs_os8::streamer::copy_binary_to_image(&mut directory, &device, name, &mut reader, 256).unwrap();
    }
    directory.commit(&device).unwrap();

    let directory = Directory::read(&device).unwrap();
    let mut cursor = directory.init_cursor();
    for (i, letter) in ["A", "B", "C", "D", "E", "F"].iter().enumerate() {
        let entry = directory.next_entry(&mut cursor);
        assert!(!entry.empty);
        assert_eq!(entry.name.to_filename(), *letter);
        assert_eq!(entry.length, 1);
        assert_eq!(entry.file_block, 7 + i as u32);
    }
    let empty = directory.next_entry(&mut cursor);
    assert!(empty.empty);
    assert_eq!(empty.length, 724);
}

#[test]
fn scenario_4_delete_one_file_and_consolidate() {
    let geometry = Geometry::DECTAPE;
    let (_path, storage) = fresh_image(&geometry);
    let device = BlockDevice::new(&storage, geometry);

    let mut directory = Directory::create(&geometry);
    directory.write_fresh(&device, &geometry).unwrap();
    for letter in ["A", "B", "C", "D", "E", "F"] {
        let name = build_sixbit(letter, "").unwrap();
        let mut reader = IoCursor::new(vec![0u8; 256]);
        os8_fs_os8::streamer::copy_binary_to_image(&mut directory, &device, name, &mut reader, 256).unwrap();
    }

    let pattern = os8_fs::name::build_pattern("C").unwrap();
    let deleted = directory.delete_matching(&pattern);
    assert_eq!(deleted, 1);
    directory.commit(&device).unwrap();

    let directory = Directory::read(&device).unwrap();
    let mut cursor = directory.init_cursor();
    for letter in ["A", "B", "D", "E", "F"] {
        let entry = directory.next_entry(&mut cursor);
        assert!(!entry.empty);
        assert_eq!(entry.name.to_filename(), letter);
        assert_eq!(entry.length, 1);
    }
    let empty = directory.next_entry(&mut cursor);
    assert!(empty.empty);
    assert_eq!(empty.length, 725);
    assert_eq!(empty.file_block, 9);
    assert!(!directory.valid(&mut cursor));
}

#[test]
fn scenario_5_eighty_files_force_a_second_segment() {
    let geometry = Geometry::DECTAPE;
    let (_path, storage) = fresh_image(&geometry);
    let device = BlockDevice::new(&storage, geometry);

    let mut directory = Directory::create(&geometry);
    directory.write_fresh(&device, &geometry).unwrap();

    for i in 0..80 {
        let name = build_sixbit(&format!("F{i}"), "").unwrap();
        let mut reader = IoCursor::new(vec![0u8; 256]);
        os8_fs_os8::streamer::copy_binary_to_image(&mut directory, &device, name, &mut reader, 256).unwrap();
    }
    directory.commit(&device).unwrap();

    let directory = Directory::read(&device).unwrap();
    assert_eq!(directory.segments[0].next_segment(), 2);
    directory.validate().unwrap();

    let mut cursor = directory.init_cursor();
    let mut total_present = 0u32;
    let mut total_empty = 0u32;
    while directory.valid(&mut cursor) {
        let entry = directory.next_entry(&mut cursor);
        if entry.empty {
            total_empty += entry.length;
        } else {
            total_present += entry.length;
        }
    }
    assert_eq!(total_present, 80);
    assert_eq!(total_present + total_empty, 730);
}

#[test]
fn scenario_6_text_round_trip() {
    let geometry = Geometry::DECTAPE;
    let (_path, storage) = fresh_image(&geometry);
    let device = BlockDevice::new(&storage, geometry);

    let mut directory = Directory::create(&geometry);
    directory.write_fresh(&device, &geometry).unwrap();

    let name = build_sixbit("foo", "tx").unwrap();
    let mut reader = IoCursor::new(b"foo\nbar\n".to_vec());
    os8_fs_os8::streamer::copy_text_to_image(&mut directory, &device, name, &mut reader).unwrap();
    directory.commit(&device).unwrap();

    let directory = Directory::read(&device).unwrap();
    let mut cursor = directory.init_cursor();
    let entry = directory.next_entry(&mut cursor);
    assert!(!entry.empty);

    let mut out = Vec::new();
    os8_fs_os8::streamer::copy_text_from_image(&device, &entry, &mut out).unwrap();
    assert_eq!(out, b"foo\nbar\n");
}
