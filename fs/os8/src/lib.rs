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

//! The OS/8 directory: segments, cursor, the matching/allocation/insertion/
//! deletion/consolidation engine, and the binary/text file streamer.
//!
//! Everything here operates on the words and names `os8_fs` defines; this
//! crate owns what those words mean as a filesystem.

pub mod cursor;
pub mod directory;
pub mod engine;
pub mod entry;
pub mod segment;
pub mod streamer;

pub use cursor::Cursor;
pub use directory::Directory;
pub use entry::Entry;
pub use segment::{Segment, MAX_SEGMENTS};
