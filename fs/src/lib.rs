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

//! Shared building blocks for OS/8 filesystem code: the 12-bit word codec,
//! device geometry, positioned block I/O, and six-bit name matching.
//!
//! The directory model, cursor, and engine that consume these live in
//! `os8_fs_os8`; this crate only knows about bytes, words, and names.

pub use os8_err::*;

pub mod codec;
pub mod device;
pub mod geometry;
pub mod name;

pub use codec::{Block, Packing, Word, WORDS_PER_BLOCK};
pub use device::BlockDevice;
pub use geometry::Geometry;
pub use name::{Pattern, SixBitName};
