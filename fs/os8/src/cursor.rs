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

//! A forward-walking position into a [`crate::directory::Directory`].
//!
//! A cursor is plain data: which segment, the word offset of the next
//! entry, the absolute data block that entry starts at, and the 1-based
//! file number within the segment. `Directory` provides the operations
//! that interpret it (`peek`, `read`, `valid`, `restore`); the cursor
//! itself has none.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub segment: usize,
    pub offset: usize,
    pub next_block: u32,
    pub file_number: u32,
}
