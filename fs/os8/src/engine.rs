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

//! Name matching driven lookup, empty-slot allocation, insertion with
//! cross-segment rebalancing, deletion, and consolidation.

use os8_fs::name::{Pattern, SixBitName};

use crate::{
    cursor::Cursor,
    directory::Directory,
    entry::Entry,
    segment::{Segment, EMPTY_ENTRY_WORDS, MAX_SEGMENTS},
};
use os8_err::{Error, Result};

impl Directory {
    /// Forward walk from `cursor`, returning the first present, non-empty
    /// entry whose name matches `pattern`. Leaves the cursor positioned
    /// just past the match, so a repeated call resumes the search (used to
    /// expand a wildcard into every matching file).
    pub fn lookup(&self, cursor: &mut Cursor, pattern: &Pattern) -> Option<Entry> {
        while self.valid(cursor) {
            let entry = self.next_entry(cursor);
            if !entry.empty && entry.length != 0 && pattern.matches(&entry.name) {
                return Some(entry);
            }
        }
        None
    }

    /// Exact (non-wildcard) name search, used internally by [`Directory::allocate`]
    /// to find a same-named file to replace. Unlike [`Directory::lookup`] this
    /// compares the raw name words directly rather than through a [`Pattern`].
    fn find_exact(&self, name: &SixBitName) -> Option<Entry> {
        let mut cursor = self.init_cursor();
        while self.valid(&mut cursor) {
            let entry = self.next_entry(&mut cursor);
            if !entry.empty && entry.length != 0 && entry.name == *name {
                return Some(entry);
            }
        }
        None
    }

    /// Deletes any existing file named `name`, then returns a best-fit
    /// empty entry of at least `size` blocks. Mirrors the teacher's
    /// allocate-then-overwrite semantics used by the binary and text copy
    /// paths.
    pub fn allocate(&mut self, name: &SixBitName, size: u32) -> Result<Entry> {
        let exclude = self.find_exact(name);
        if let Some(existing) = exclude.clone() {
            self.delete_entry(existing);
        }
        self.get_empty_entry(exclude.as_ref(), size)
            .ok_or(Error::AllocationFailed)
    }

    /// The last entry (by file number) of `segment`, used to find both the
    /// segment's current write head and the entry to relocate during
    /// cross-segment rebalancing.
    fn last_entry(&self, segment: usize) -> Entry {
        let mut cursor = Cursor {
            segment,
            offset: crate::segment::HEADER_WORDS,
            next_block: self.segments[segment].first_file_block(),
            file_number: 1,
        };
        let mut last = None;
        while !self.segment_exhausted(&cursor) {
            last = Some(self.next_entry(&mut cursor));
        }
        last.expect("a valid segment always holds at least one entry")
    }

    /// Offset at which a new entry of `size` words would fit in `segment`,
    /// or `None` if the segment has no room (leaving at least one spare
    /// word past the new entry, matching the teacher's conservative
    /// headroom).
    fn unused_offset(&self, segment: usize, size: usize) -> Option<usize> {
        let last = self.last_entry(segment);
        let end = last.offset + last.word_length();
        if end + size < os8_fs::codec::WORDS_PER_BLOCK {
            Some(end)
        } else {
            None
        }
    }

    /// Best-fit (or, for `length == 0`, largest-fit) empty entry search.
    /// `exclude` lets a caller avoid reclaiming the slot it just vacated.
    pub fn get_empty_entry(&self, exclude: Option<&Entry>, length: u32) -> Option<Entry> {
        let mut cursor = self.init_cursor();
        let mut best: Option<Entry> = None;
        while self.valid(&mut cursor) {
            let entry = self.next_entry(&mut cursor);
            if !entry.empty || entry.length < length {
                continue;
            }
            if let Some(exclude) = exclude {
                if entry.same_slot(exclude) {
                    continue;
                }
            }
            let is_better = match &best {
                None => true,
                Some(current) if length == 0 => entry.length > current.length,
                Some(current) => entry.length < current.length,
            };
            if is_better {
                best = Some(entry);
            }
        }
        best
    }

    /// Inserts a new present entry named `name` of `length` blocks in place
    /// of `empty`, which must be an empty entry previously returned by
    /// [`Directory::get_empty_entry`] with `length <= empty.length`.
    ///
    /// Rebalances entries across segments (and appends a new segment) if
    /// `empty`'s segment has no room for the new entry plus the minimum
    /// headroom the teacher's USR preserves, then runs [`Directory::consolidate`].
    pub fn enter(&mut self, mut empty: Entry, name: SixBitName, length: u32) -> Result<()> {
        let additional_count = self.segments[empty.segment].additional_words_count();
        let new_entry_words = 4 + additional_count + 1;
        let min_free = new_entry_words + EMPTY_ENTRY_WORDS;

        let mut target_offset = self.unused_offset(empty.segment, min_free);
        while target_offset.is_none() {
            let mut scan = empty.segment;
            let mut relocated = false;
            loop {
                let next = self.segments[scan].next_segment();
                if next == 0 {
                    break;
                }
                let next_index = next as usize - 1;
                if let Some(next_unused) = self.unused_offset(next_index, min_free) {
                    let last = self.last_entry(scan);
                    let relocating_target = last.same_slot(&empty);
                    let last_words = last.word_length();

                    self.segments[scan].bump_number_files(-1);
                    self.segments[next_index].bump_number_files(1);
                    self.segments[next_index].bump_first_file_block(-(last.length as i32));

                    let mut moved = last;
                    moved.segment = next_index;
                    moved.offset = crate::segment::HEADER_WORDS;
                    moved.file_number = 1;
                    moved.file_block = self.segments[next_index].first_file_block();

                    self.segments[next_index].fix_up(
                        crate::segment::HEADER_WORDS,
                        last_words,
                        next_unused,
                    );
                    self.put(&moved);

                    if relocating_target {
                        empty = moved;
                    }
                    relocated = true;
                    break;
                }
                scan = next_index;
            }

            if !relocated {
                let new_index = scan + 1;
                if new_index >= MAX_SEGMENTS {
                    return Err(Error::DirectoryFull);
                }
                self.segments[scan].set_next_segment((new_index + 1) as u16);
                let last = self.last_entry(scan);
                let first_file_block = last.file_block + last.length;
                let additional_raw = self.segments[scan].words[4];

                let fresh = &mut self.segments[new_index];
                *fresh = Segment::zeroed();
                fresh.set_number_files(1);
                fresh.set_first_file_block(first_file_block);
                fresh.set_next_segment(0);
                fresh.set_flag_word(0);
                fresh.set_additional_words_raw(additional_raw);
                fresh.words[crate::segment::HEADER_WORDS] = 0;
                fresh.words[crate::segment::HEADER_WORDS + 1] = 0;
                fresh.dirty = true;
            }

            target_offset = self.unused_offset(empty.segment, min_free);
        }
        let target_offset = target_offset.expect("loop only exits once a target offset is found");

        self.segments[empty.segment].fix_up(empty.offset, new_entry_words, target_offset);
        self.segments[empty.segment].bump_number_files(1);

        let present = Entry {
            empty: false,
            name,
            file_block: empty.file_block,
            length,
            additional: vec![0; additional_count],
            segment: empty.segment,
            offset: empty.offset,
            file_number: empty.file_number,
        };
        self.put(&present);

        let mut cursor = Cursor {
            segment: present.segment,
            offset: present.offset,
            next_block: present.file_block,
            file_number: present.file_number,
        };
        self.advance(&mut cursor, &present);
        let mut remainder = self.peek(&cursor);
        remainder.length -= length;
        self.put(&remainder);

        self.consolidate();
        Ok(())
    }

    /// Overwrites `entry` with the empty-entry marker, shrinking its
    /// segment by the vacated metadata words. Does not itself run
    /// [`Directory::consolidate`] — callers that delete several files in
    /// one command run it once at the end, matching the teacher.
    pub fn delete_entry(&mut self, mut entry: Entry) {
        let old_words = entry.word_length();
        self.segments[entry.segment].fix_down(entry.offset, old_words, EMPTY_ENTRY_WORDS);
        entry.empty = true;
        entry.name = SixBitName([0; 4]);
        entry.additional.clear();
        self.put(&entry);
    }

    /// Deletes every present entry matching `pattern`, then runs
    /// [`Directory::consolidate`] once. Returns the number of files
    /// deleted.
    pub fn delete_matching(&mut self, pattern: &Pattern) -> u32 {
        let mut deleted = 0;
        let mut cursor = self.init_cursor();
        while let Some(entry) = self.lookup(&mut cursor, pattern) {
            self.restore(&mut cursor, &entry);
            self.delete_entry(entry);
            deleted += 1;
        }
        if deleted > 0 {
            self.consolidate();
        }
        deleted
    }

    /// One forward pass dropping zero-length empties and merging adjacent
    /// same-segment empty pairs. Deliberately weak — no cross-segment
    /// merging, no segment unlinking — to match the original USR's CONSOL
    /// routine and keep on-disk mount compatibility.
    pub fn consolidate(&mut self) {
        let mut cursor = self.init_cursor();
        while self.valid(&mut cursor) {
            let entry = self.next_entry(&mut cursor);
            if !entry.empty {
                continue;
            }
            if entry.length == 0 {
                self.segments[entry.segment].fix_down(entry.offset, EMPTY_ENTRY_WORDS, 0);
                self.segments[entry.segment].bump_number_files(-1);
                // `read` already advanced past this entry's old words, but
                // fix_down just slid whatever followed into its place —
                // reprocess that slot rather than skipping it.
                cursor.offset = entry.offset;
                cursor.file_number = entry.file_number;
                continue;
            }
            if self.segment_exhausted(&cursor) {
                continue;
            }
            let next = self.peek(&cursor);
            if !next.empty {
                continue;
            }
            let mut merged = entry;
            merged.length += next.length;
            self.put(&merged);
            self.segments[next.segment].fix_down(next.offset, EMPTY_ENTRY_WORDS, 0);
            self.segments[merged.segment].bump_number_files(-1);
            self.restore(&mut cursor, &merged);
        }
    }
}
