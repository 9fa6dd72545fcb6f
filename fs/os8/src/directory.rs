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

//! The in-memory, fixed-capacity directory: up to six segments reachable
//! from segment 1, plus the cursor operations that walk their entries.

use log::error;
use os8_ds::DataStorage;
use os8_fs::{device::BlockDevice, geometry::Geometry, name::SixBitName, Error, Result};

use crate::{
    cursor::Cursor,
    entry::{Entry, MAX_ADDITIONAL_WORDS},
    segment::{negate, Segment, HEADER_WORDS, MAX_SEGMENTS},
};

/// The directory's first segment always occupies this medium-relative
/// block; later segments occupy `FIRST_DIR_BLOCK + segment_index`.
pub const FIRST_DIR_BLOCK: u32 = 1;

pub struct Directory {
    pub segments: [Segment; MAX_SEGMENTS],
}

impl Directory {
    /// Reads segment 1 and every segment reachable from it via
    /// `next_segment`. Unreached array slots stay zeroed and are never
    /// written back, matching the teacher's dirty-only commit discipline.
    pub fn read<S: DataStorage>(device: &BlockDevice<S>) -> Result<Self> {
        let mut segments: [Segment; MAX_SEGMENTS] = std::array::from_fn(|_| Segment::zeroed());
        segments[0] = Segment::from_words(device.read_block(FIRST_DIR_BLOCK)?);

        let mut current = 0usize;
        loop {
            let next = segments[current].next_segment();
            if next == 0 {
                break;
            }
            let next_index = next as usize - 1;
            if next_index >= MAX_SEGMENTS {
                return Err(Error::InvalidDirectory(format!(
                    "next_segment {next} exceeds the {MAX_SEGMENTS}-segment chain"
                )));
            }
            segments[next_index] =
                Segment::from_words(device.read_block(FIRST_DIR_BLOCK + next_index as u32)?);
            current = next_index;
        }

        let directory = Self { segments };
        directory.validate()?;
        Ok(directory)
    }

    /// Writes every dirty segment, in ascending index order, and clears
    /// their dirty bits.
    pub fn commit<S: DataStorage>(&mut self, device: &BlockDevice<S>) -> Result<()> {
        self.validate()?;
        for (index, segment) in self.segments.iter_mut().enumerate() {
            if segment.dirty {
                device.write_block(FIRST_DIR_BLOCK + index as u32, &segment.words)?;
                segment.dirty = false;
            }
        }
        Ok(())
    }

    /// Rewrites segment 1 as a single empty entry covering the whole
    /// device, leaving `first_file_block` untouched so reserved system
    /// blocks stay reserved. Other segments are left in memory but become
    /// unreachable.
    pub fn zero(&mut self, geometry: &Geometry) {
        let segment = &mut self.segments[0];
        let first_file_block = segment.first_file_block();
        segment.set_number_files(1);
        segment.set_next_segment(0);
        segment.set_flag_word(0);
        segment.words[HEADER_WORDS] = 0;
        segment.words[HEADER_WORDS + 1] = negate((geometry.total_blocks - first_file_block) as u16);
        segment.dirty = true;
    }

    /// Builds a fresh, fully-zeroed six-segment directory: segment 1 holds
    /// one empty entry spanning the device's whole data range.
    pub fn create(geometry: &Geometry) -> Self {
        let mut segments: [Segment; MAX_SEGMENTS] = std::array::from_fn(|_| Segment::zeroed());
        let first = &mut segments[0];
        first.set_number_files(1);
        first.set_first_file_block(geometry.first_data_block);
        first.set_next_segment(0);
        first.set_flag_word(0);
        first.set_additional_words_raw(negate(1));
        first.words[HEADER_WORDS] = 0;
        first.words[HEADER_WORDS + 1] = negate(geometry.data_blocks() as u16);
        for segment in segments.iter_mut() {
            segment.dirty = true;
        }
        Self { segments }
    }

    /// Writes a freshly built directory to a blank image: the reserved
    /// pre-directory blocks, all six segment blocks unconditionally, and
    /// one block at the device's last index to extend the host file to
    /// full size.
    pub fn write_fresh<S: DataStorage>(&mut self, device: &BlockDevice<S>, geometry: &Geometry) -> Result<()> {
        self.validate()?;
        let zero_block = [0u16; os8_fs::codec::WORDS_PER_BLOCK];
        let first_dir_block = geometry.first_data_block - MAX_SEGMENTS as u32;
        for block in 0..first_dir_block {
            device.write_block(block, &zero_block)?;
        }
        for (index, segment) in self.segments.iter_mut().enumerate() {
            device.write_block(first_dir_block + index as u32, &segment.words)?;
            segment.dirty = false;
        }
        device.write_block(geometry.total_blocks - 1, &zero_block)?;
        Ok(())
    }

    pub fn init_cursor(&self) -> Cursor {
        Cursor {
            segment: 0,
            offset: HEADER_WORDS,
            next_block: self.segments[0].first_file_block(),
            file_number: 1,
        }
    }

    /// True once `cursor` has walked past every entry of its current
    /// segment, without regard to whether a next segment exists.
    pub fn segment_exhausted(&self, cursor: &Cursor) -> bool {
        cursor.file_number > self.segments[cursor.segment].number_files()
    }

    /// Advances `cursor` across segment boundaries until it sits on a
    /// readable entry, or returns `false` once the chain is exhausted.
    pub fn valid(&self, cursor: &mut Cursor) -> bool {
        while self.segment_exhausted(cursor) {
            let next = self.segments[cursor.segment].next_segment();
            if next == 0 {
                return false;
            }
            cursor.segment = next as usize - 1;
            cursor.offset = HEADER_WORDS;
            cursor.next_block = self.segments[cursor.segment].first_file_block();
            cursor.file_number = 1;
        }
        true
    }

    /// Materializes the entry at `cursor` without moving it.
    pub fn peek(&self, cursor: &Cursor) -> Entry {
        let segment = &self.segments[cursor.segment];
        let offset = cursor.offset;
        if segment.words[offset] == 0 {
            let length = negate(segment.words[offset + 1]) as u32;
            Entry {
                empty: true,
                name: SixBitName([0; 4]),
                file_block: cursor.next_block,
                length,
                additional: Vec::new(),
                segment: cursor.segment,
                offset,
                file_number: cursor.file_number,
            }
        } else {
            let name = SixBitName([
                segment.words[offset],
                segment.words[offset + 1],
                segment.words[offset + 2],
                segment.words[offset + 3],
            ]);
            let additional_count = segment.additional_words_count().min(MAX_ADDITIONAL_WORDS);
            let additional = segment.words[offset + 4..offset + 4 + additional_count].to_vec();
            let length_offset = offset + 4 + segment.additional_words_count();
            let length = negate(segment.words[length_offset]) as u32;
            Entry {
                empty: false,
                name,
                file_block: cursor.next_block,
                length,
                additional,
                segment: cursor.segment,
                offset,
                file_number: cursor.file_number,
            }
        }
    }

    /// Advances `cursor` past `entry`, which must be the entry most
    /// recently returned by [`Directory::peek`] at this position.
    pub fn advance(&self, cursor: &mut Cursor, entry: &Entry) {
        cursor.file_number += 1;
        cursor.offset += entry.word_length();
        cursor.next_block += entry.length;
    }

    /// Peeks the entry at `cursor`, then advances past it.
    pub fn next_entry(&self, cursor: &mut Cursor) -> Entry {
        let entry = self.peek(cursor);
        self.advance(cursor, &entry);
        entry
    }

    /// Repositions `cursor` to stand immediately before `entry`.
    pub fn restore(&self, cursor: &mut Cursor, entry: &Entry) {
        cursor.segment = entry.segment;
        cursor.offset = entry.offset;
        cursor.next_block = entry.file_block;
        cursor.file_number = entry.file_number;
    }

    /// Writes `entry`'s words back into its segment and marks that
    /// segment dirty.
    pub fn put(&mut self, entry: &Entry) {
        let segment = &mut self.segments[entry.segment];
        let offset = entry.offset;
        if entry.empty {
            segment.words[offset] = 0;
            segment.words[offset + 1] = negate(entry.length as u16);
        } else {
            segment.words[offset] = entry.name.0[0];
            segment.words[offset + 1] = entry.name.0[1];
            segment.words[offset + 2] = entry.name.0[2];
            segment.words[offset + 3] = entry.name.0[3];
            for (i, &word) in entry.additional.iter().enumerate() {
                segment.words[offset + 4 + i] = word;
            }
            segment.words[offset + 4 + entry.additional.len()] = negate(entry.length as u16);
        }
        segment.dirty = true;
    }

    /// The sanity checks required of every segment reachable from segment 1.
    pub fn validate(&self) -> Result<()> {
        let mut visited = [false; MAX_SEGMENTS];
        let mut index = 0usize;
        loop {
            if visited[index] {
                error!("segment chain cycles back to segment {}", index + 1);
                return Err(Error::InvalidDirectory(format!(
                    "segment chain cycles back to segment {}",
                    index + 1
                )));
            }
            visited[index] = true;
            let segment = &self.segments[index];
            let files = segment.number_files();
            if !(1..=99).contains(&files) {
                error!("segment {} has {files} files, expected 1..=99", index + 1);
                return Err(Error::InvalidDirectory(format!(
                    "segment {} has {files} files, expected 1..=99",
                    index + 1
                )));
            }
            let additional = segment.additional_words_count();
            if additional > 9 {
                error!("segment {} has {additional} additional words, expected 0..=9", index + 1);
                return Err(Error::InvalidDirectory(format!(
                    "segment {} has {additional} additional words, expected 0..=9",
                    index + 1
                )));
            }
            let flag = segment.flag_word();
            if flag != 0 && !(0o1400..=0o1777).contains(&flag) {
                error!("segment {} flag word {flag:#o} outside 01400-01777", index + 1);
                return Err(Error::InvalidDirectory(format!(
                    "segment {} flag word {flag:#o} outside 01400-01777",
                    index + 1
                )));
            }
            let next = segment.next_segment();
            if next as usize > MAX_SEGMENTS {
                error!("segment {} links to out-of-range segment {next}", index + 1);
                return Err(Error::InvalidDirectory(format!(
                    "segment {} links to out-of-range segment {next}",
                    index + 1
                )));
            }
            if next == 0 {
                return Ok(());
            }
            index = next as usize - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_zero_keeps_reserved_first_file_block() {
        let geometry = Geometry::DECTAPE;
        let mut directory = Directory::create(&geometry);
        assert_eq!(directory.segments[0].first_file_block(), 7);
        assert_eq!(directory.segments[0].number_files(), 1);

        let mut cursor = directory.init_cursor();
        let entry = directory.next_entry(&mut cursor);
        assert!(entry.empty);
        assert_eq!(entry.length, geometry.data_blocks());

        directory.zero(&geometry);
        assert_eq!(directory.segments[0].first_file_block(), 7);
        assert_eq!(
            directory.segments[0].number_files(),
            1
        );
    }

    #[test]
    fn validate_rejects_zero_file_segment() {
        let mut directory = Directory::create(&Geometry::DECTAPE);
        directory.segments[0].set_number_files(0);
        assert!(directory.validate().is_err());
    }

    #[test]
    fn put_then_peek_round_trips_a_present_entry() {
        let mut directory = Directory::create(&Geometry::DECTAPE);
        let cursor = directory.init_cursor();
        let entry = Entry {
            empty: false,
            name: SixBitName([1, 2, 3, 0]),
            file_block: 7,
            length: 3,
            additional: vec![0],
            segment: cursor.segment,
            offset: cursor.offset,
            file_number: cursor.file_number,
        };
        directory.put(&entry);
        let read_back = directory.peek(&cursor);
        assert_eq!(read_back, entry);
    }
}
