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

//! Per-device-family block layout: total block count, where the directory
//! starts, and which word-packing discipline the medium uses.

use crate::codec::Packing;

/// Static layout facts about one OS/8 filesystem instance on a medium.
///
/// `base_block` is the medium-relative block at which this filesystem's
/// block 0 lives; it is nonzero only for RK05 filesystem B, which shares a
/// physical image with filesystem A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub name: &'static str,
    pub packing: Packing,
    pub total_blocks: u32,
    pub first_data_block: u32,
    pub base_block: u32,
}

impl Geometry {
    /// Blocks available to files and directory segments, i.e. everything
    /// from `first_data_block` to the end of the medium.
    pub const fn data_blocks(&self) -> u32 {
        self.total_blocks - self.first_data_block
    }

    pub const fn byte_offset(&self) -> u64 {
        self.base_block as u64 * self.packing.bytes_per_block() as u64
    }

    /// DECtape: 737 blocks, two physical 258-byte records per logical
    /// block (737*516 = 380292 bytes). Directory occupies blocks 1-6 (six
    /// segments); data starts at 7.
    pub const DECTAPE: Geometry = Geometry {
        name: "dectape",
        packing: Packing::DecTape129,
        total_blocks: 737,
        first_data_block: 7,
        base_block: 0,
    };

    /// A plain .dsk image using two-byte-per-word packing (737*512 =
    /// 377344 bytes), same block count and directory layout as DECtape.
    pub const DISK: Geometry = Geometry {
        name: "disk",
        packing: Packing::TwoBytePerWord,
        total_blocks: 737,
        first_data_block: 7,
        base_block: 0,
    };

    /// RK05 filesystem A: the first 3248 blocks of the pack, three-byte
    /// packing, directory occupies blocks 1-6.
    pub const RK05_A: Geometry = Geometry {
        name: "rk05a",
        packing: Packing::ThreeBytePerTwoWord,
        total_blocks: 3248,
        first_data_block: 7,
        base_block: 0,
    };

    /// RK05 filesystem B: the second 3248-block half of the same pack.
    pub const RK05_B: Geometry = Geometry {
        name: "rk05b",
        packing: Packing::ThreeBytePerTwoWord,
        total_blocks: 3248,
        first_data_block: 7,
        base_block: 3248,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dectape_free_blocks_matches_reference_image() {
        assert_eq!(Geometry::DECTAPE.data_blocks(), 730);
    }

    #[test]
    fn rk05_free_blocks_matches_reference_image() {
        assert_eq!(Geometry::RK05_A.data_blocks(), 3241);
    }

    #[test]
    fn rk05_b_base_offset_follows_a() {
        let expected = 3248u64 * Packing::ThreeBytePerTwoWord.bytes_per_block() as u64;
        assert_eq!(Geometry::RK05_B.byte_offset(), expected);
    }
}
