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

//! Positioned, whole-block I/O on top of a raw [`DataStorage`] and a
//! [`Geometry`]: the seam between host bytes and the 12-bit word codec.

use os8_ds::DataStorage;

use crate::{
    codec::{self, Block},
    geometry::Geometry,
    Error, Result,
};

/// Reads and writes whole OS/8 blocks, translating block numbers to byte
/// offsets via `geometry` and bytes to words via `geometry.packing`.
pub struct BlockDevice<'s, S: DataStorage> {
    storage: &'s S,
    geometry: Geometry,
}

impl<'s, S: DataStorage> BlockDevice<'s, S> {
    pub fn new(storage: &'s S, geometry: Geometry) -> Self {
        Self { storage, geometry }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn check_block_no(&self, block_no: u32) -> Result<()> {
        if block_no >= self.geometry.total_blocks {
            return Err(Error::Format(format!(
                "block {block_no} is outside the {}-block {} medium",
                self.geometry.total_blocks, self.geometry.name
            )));
        }
        Ok(())
    }

    fn byte_offset(&self, block_no: u32) -> u64 {
        self.geometry.byte_offset() + block_no as u64 * self.geometry.packing.bytes_per_block() as u64
    }

    /// Reads and decodes the block at the given medium-relative block
    /// number.
    pub fn read_block(&self, block_no: u32) -> Result<Block> {
        self.check_block_no(block_no)?;
        let mut bytes = vec![0u8; self.geometry.packing.bytes_per_block()];
        self.storage.read(self.byte_offset(block_no), &mut bytes)?;
        codec::decode(&bytes, self.geometry.packing, block_no)
    }

    /// Encodes and writes `block` at the given medium-relative block number.
    pub fn write_block(&self, block_no: u32, block: &Block) -> Result<()> {
        self.check_block_no(block_no)?;
        let bytes = codec::encode(block, self.geometry.packing)?;
        self.storage.write(self.byte_offset(block_no), &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct MemStorage {
        bytes: RefCell<Vec<u8>>,
    }

    impl MemStorage {
        fn new(len: usize) -> Self {
            Self {
                bytes: RefCell::new(vec![0u8; len]),
            }
        }
    }

    impl DataStorage for MemStorage {
        fn read(&self, offset: u64, buffer: &mut [u8]) -> Result<()> {
            let bytes = self.bytes.borrow();
            let offset = offset as usize;
            buffer.copy_from_slice(&bytes[offset..offset + buffer.len()]);
            Ok(())
        }

        fn write(&self, offset: u64, buffer: &[u8]) -> Result<()> {
            let mut bytes = self.bytes.borrow_mut();
            let offset = offset as usize;
            bytes[offset..offset + buffer.len()].copy_from_slice(buffer);
            Ok(())
        }
    }

    #[test]
    fn writes_and_reads_back_a_block() {
        let geometry = Geometry::DISK;
        let storage = MemStorage::new(geometry.total_blocks as usize * geometry.packing.bytes_per_block());
        let device = BlockDevice::new(&storage, geometry);

        let mut block = [0u16; codec::WORDS_PER_BLOCK];
        block[0] = 0o1234;
        block[255] = 0o4567;
        device.write_block(10, &block).unwrap();

        let read_back = device.read_block(10).unwrap();
        assert_eq!(read_back, block);
    }

    #[test]
    fn rejects_block_number_past_the_medium() {
        let geometry = Geometry::DISK;
        let storage = MemStorage::new(geometry.total_blocks as usize * geometry.packing.bytes_per_block());
        let device = BlockDevice::new(&storage, geometry);
        assert!(device.read_block(geometry.total_blocks).is_err());
    }

    #[test]
    fn rk05_b_lands_past_rk05_a() {
        let total = Geometry::RK05_B.byte_offset() as usize
            + Geometry::RK05_B.total_blocks as usize * Geometry::RK05_B.packing.bytes_per_block();
        let storage = MemStorage::new(total);
        let device_a = BlockDevice::new(&storage, Geometry::RK05_A);
        let device_b = BlockDevice::new(&storage, Geometry::RK05_B);

        let mut block = [0u16; codec::WORDS_PER_BLOCK];
        block[0] = 0o7;
        device_b.write_block(0, &block).unwrap();

        let mut zero = [0u16; codec::WORDS_PER_BLOCK];
        zero[0] = 0;
        assert_eq!(device_a.read_block(0).unwrap(), zero);
        assert_eq!(device_b.read_block(0).unwrap()[0], 0o7);
    }
}
