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

//! A single directory entry, materialized as plain data rather than a
//! pointer into a segment, so segment-shuffling mutations never invalidate
//! a live value — callers reposition a [`crate::cursor::Cursor`] by
//! `(segment, offset)` instead.

use os8_fs::name::SixBitName;

/// Bounded the same way the original USR bounds it: at most nine retained
/// metadata words, even if `additional_words_count` claims more.
pub const MAX_ADDITIONAL_WORDS: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub empty: bool,
    pub name: SixBitName,
    pub file_block: u32,
    pub length: u32,
    pub additional: Vec<u16>,
    /// 0-based index into the directory's segment array.
    pub segment: usize,
    /// Word offset of this entry's first word within its segment.
    pub offset: usize,
    /// 1-based position of this entry within its segment.
    pub file_number: u32,
}

impl Entry {
    /// Words this entry occupies on disk: 2 for an empty entry, or
    /// 4 name words + metadata words + 1 length word for a present one.
    pub fn word_length(&self) -> usize {
        if self.empty {
            crate::segment::EMPTY_ENTRY_WORDS
        } else {
            4 + self.additional.len() + 1
        }
    }

    pub fn same_slot(&self, other: &Entry) -> bool {
        self.segment == other.segment && self.file_number == other.file_number
    }
}
