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

//! Binary and text payload copy between the host and allocated file
//! extents.
//!
//! Binary copy moves bytes verbatim, 512 to a block. Text copy unpacks or
//! packs three ASCII characters per two words, applying OS/8's line-ending
//! and end-of-file conventions on the way in, and stripping them on the
//! way out.

use std::io::{Read, Seek, SeekFrom, Write};

use os8_ds::DataStorage;
use os8_fs::{
    codec::{Block, WORDS_PER_BLOCK},
    device::BlockDevice,
    name::SixBitName,
    Result,
};

use crate::directory::Directory;

/// Host file extensions (case-insensitive, without the leading dot) the
/// teacher's original tool treats as OS/8 text files rather than binary.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "ba", "bi", "fc", "ft", "he", "hl", "ls", "ma", "pa", "ps", "ra", "ro", "sb", "sl", "te", "tx",
];

pub fn is_text_extension(extension: &str) -> bool {
    TEXT_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(extension))
}

const BYTES_PER_BLOCK: u64 = (WORDS_PER_BLOCK * 2) as u64;

/// Streams `reader` (exactly `total_bytes` long) into a freshly allocated
/// file named `name`, zero-padding the final block. Deletes any existing
/// same-named file first.
pub fn copy_binary_to_image<S: DataStorage>(
    directory: &mut Directory,
    device: &BlockDevice<S>,
    name: SixBitName,
    reader: &mut impl Read,
    total_bytes: u64,
) -> Result<()> {
    let output_blocks = total_bytes.div_ceil(BYTES_PER_BLOCK) as u32;
    let empty = directory.allocate(&name, output_blocks)?;

    let mut block_no = 0u32;
    let mut buffer = [0u8; BYTES_PER_BLOCK as usize];
    loop {
        let read = read_fill(reader, &mut buffer)?;
        if read == 0 {
            break;
        }
        for b in &mut buffer[read..] {
            *b = 0;
        }
        let block = bytes_to_words(&buffer);
        device.write_block(empty.file_block + block_no, &block)?;
        block_no += 1;
    }

    directory.enter(empty, name, block_no)
}

/// Streams `entry`'s blocks verbatim to `writer`.
pub fn copy_binary_from_image<S: DataStorage>(
    device: &BlockDevice<S>,
    entry: &crate::entry::Entry,
    writer: &mut impl Write,
) -> Result<()> {
    for offset in 0..entry.length {
        let block = device.read_block(entry.file_block + offset)?;
        writer.write_all(&words_to_bytes(&block))?;
    }
    Ok(())
}

/// Unpacks `entry`'s blocks as OS/8 text: three characters per two words,
/// stripping the mark bit, rubout, carriage return, NUL, and control-Z.
/// Stops at the first control-Z or when the extent ends.
pub fn copy_text_from_image<S: DataStorage>(
    device: &BlockDevice<S>,
    entry: &crate::entry::Entry,
    writer: &mut impl Write,
) -> Result<()> {
    'blocks: for offset in 0..entry.length {
        let block = device.read_block(entry.file_block + offset)?;
        for pair in block.chunks_exact(2) {
            let (w0, w1) = (pair[0], pair[1]);
            for ch in unpack_triplet(w0, w1) {
                if ch == 0x1A {
                    break 'blocks;
                }
                if ch != 0x7F && ch != 0x0D && ch != 0x00 {
                    writer.write_all(&[ch])?;
                }
            }
        }
    }
    Ok(())
}

fn unpack_triplet(w0: u16, w1: u16) -> [u8; 3] {
    let c0 = (w0 & 0x7F) as u8;
    let c1 = (w1 & 0x7F) as u8;
    let c2 = (((w0 >> 4) & 0x70) | (w1 >> 8)) as u8;
    [c0, c1, c2]
}

/// Streams `reader`'s bytes into a temporary buffer using the text-copy
/// packing rules (every LF gets a CR prefix, every character carries the
/// mark bit, a trailing control-Z is appended if absent), then commits the
/// packed buffer to the image exactly as [`copy_binary_to_image`] would.
///
/// Buffering through a real temp file (rather than an in-memory `Vec`)
/// matches the teacher's approach of not assuming the whole host file fits
/// in memory.
pub fn copy_text_to_image<S: DataStorage>(
    directory: &mut Directory,
    device: &BlockDevice<S>,
    name: SixBitName,
    reader: &mut impl Read,
) -> Result<()> {
    let mut temp = tempfile::tempfile()?;
    let mut packer = TextPacker::new(&mut temp);

    let mut byte = [0u8; 1];
    let mut ctrl_z_seen = false;
    loop {
        let read = reader.read(&mut byte)?;
        if read == 0 {
            break;
        }
        let c = byte[0];
        if c == 0x1A {
            ctrl_z_seen = true;
            break;
        }
        if c == 0x0A {
            packer.push(0x8D)?;
        }
        if c != 0x00 {
            packer.push(c | 0x80)?;
        }
    }
    if !ctrl_z_seen {
        packer.push(0x1A)?;
    }
    packer.flush()?;

    let total_bytes = temp.stream_position()?;
    temp.seek(SeekFrom::Start(0))?;
    copy_binary_to_image(directory, device, name, &mut temp, total_bytes)
}

/// Packs pushed bytes three-per-two-words into the underlying writer,
/// padding a partial trailing group with zero words on [`TextPacker::flush`].
struct TextPacker<'w, W: Write> {
    writer: &'w mut W,
    slot: usize,
    w0: u16,
    w1: u16,
}

impl<'w, W: Write> TextPacker<'w, W> {
    fn new(writer: &'w mut W) -> Self {
        Self {
            writer,
            slot: 0,
            w0: 0,
            w1: 0,
        }
    }

    fn push(&mut self, ch: u8) -> std::io::Result<()> {
        match self.slot {
            0 => self.w0 = ch as u16,
            1 => self.w1 = ch as u16,
            _ => {
                self.w0 |= ((ch as u16) & 0x70) << 4;
                self.w1 |= ((ch as u16) & 0x0F) << 8;
                self.writer.write_all(&self.w0.to_le_bytes())?;
                self.writer.write_all(&self.w1.to_le_bytes())?;
                self.w0 = 0;
                self.w1 = 0;
            }
        }
        self.slot = (self.slot + 1) % 3;
        Ok(())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if self.slot != 0 {
            self.writer.write_all(&self.w0.to_le_bytes())?;
            self.writer.write_all(&self.w1.to_le_bytes())?;
        }
        Ok(())
    }
}

fn read_fill(reader: &mut impl Read, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let read = reader.read(&mut buffer[filled..])?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(filled)
}

fn bytes_to_words(bytes: &[u8]) -> Block {
    let mut block = [0u16; WORDS_PER_BLOCK];
    for (i, word) in block.iter_mut().enumerate() {
        *word = bytes[i * 2] as u16 | ((bytes[i * 2 + 1] as u16) << 8);
    }
    block
}

fn words_to_bytes(block: &Block) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(block.len() * 2);
    for &word in block {
        bytes.push((word & 0xFF) as u8);
        bytes.push((word >> 8) as u8);
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_extension_match_is_case_insensitive() {
        assert!(is_text_extension("TX"));
        assert!(is_text_extension("tx"));
        assert!(!is_text_extension("bin"));
    }

    #[test]
    fn unpack_triplet_strips_mark_bit() {
        // Packed from 'f' (0x66), 'o' (0x6F), 'o' (0x6F) with mark bits set.
        let c0 = 0x66 | 0x80;
        let c2 = 0x6F | 0x80;
        let w0 = c0 as u16 | (((c2 as u16) & 0x70) << 4);
        let c1 = 0x6F | 0x80;
        let w1 = c1 as u16 | (((c2 as u16) & 0x0F) << 8);
        assert_eq!(unpack_triplet(w0, w1), [0x66, 0x6F, 0x6F]);
    }

    #[test]
    fn text_packer_round_trips_foo_bar() {
        let mut buffer = Vec::new();
        {
            let mut packer = TextPacker::new(&mut buffer);
            for &ch in b"foo\x8dbar\x8d\x9a" {
                packer.push(ch).unwrap();
            }
            packer.flush().unwrap();
        }
        let mut words = Vec::new();
        for pair in buffer.chunks_exact(2) {
            words.push(u16::from_le_bytes([pair[0], pair[1]]));
        }
        let mut decoded = Vec::new();
        for pair in words.chunks_exact(2) {
            decoded.extend(unpack_triplet(pair[0], pair[1]));
        }
        // mark bit stripped below; 'foo' + cr(0x8d stripped of mark->0x0d
        // filtered by the real copy path, here we only check unpacking)
        assert_eq!(&decoded[0..3], b"foo");
    }
}
