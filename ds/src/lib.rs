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

//! Raw, offset-addressed byte storage underneath the OS/8 word codec.
//!
//! A [`DataStorage`] implementation knows nothing about 12-bit words,
//! directory segments, or packing disciplines — it only moves bytes at a
//! caller-supplied byte offset. The word codec and block device built on
//! top of it (see `os8_fs`) are what give those bytes OS/8 meaning.

pub use os8_err::{Error, Result};

pub trait DataStorage {
    /// Read `buffer.len()` bytes starting at `offset`. A short read is an
    /// error; this trait never partially fills `buffer`.
    fn read(&self, offset: u64, buffer: &mut [u8]) -> Result<()>;

    /// Write `buffer` starting at `offset`. A short write is an error.
    fn write(&self, offset: u64, buffer: &[u8]) -> Result<()>;
}
