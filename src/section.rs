use crate::error::ChunkDecodeError;
use nbt::CompoundTag;
use std::sync::Arc;

/// Amount of blocks in a section.
pub(crate) const SECTION_BLOCKS: usize = 4096;

/// Owned, cheaply clonable block identity handle.
///
/// Queries hand out clones instead of references into the region cache,
/// so clearing a cache never invalidates values a caller still holds.
pub type BlockName = Arc<str>;

/// A 16x16x16 cube of blocks: a palette of block names plus one palette
/// index per block.
pub struct Section {
    /// Ordered block names; insertion order defines the index space.
    palette: Vec<BlockName>,
    /// Palette index per block, laid out as `256 * x + 16 * y + z`.
    bitmap: Vec<u16>,
}

impl Section {
    /// Section without block data. Block lookups on it are a caller error.
    pub(crate) fn empty() -> Self {
        Section {
            palette: Vec::new(),
            bitmap: vec![0; SECTION_BLOCKS],
        }
    }

    /// Decodes the section from its chunk document subtree.
    ///
    /// A subtree without `block_states` produces an empty section. A
    /// palette without packed data leaves the bitmap all-zero, which
    /// resolves every block to the single palette entry.
    pub(crate) fn from_document(tag: &CompoundTag) -> Result<Self, ChunkDecodeError> {
        if !tag.contains_key("block_states") {
            return Ok(Section::empty());
        }

        let block_states = tag
            .get_compound_tag("block_states")
            .map_err(|err| ChunkDecodeError::document(format!("block_states: {:?}", err)))?;

        let palette_tags = block_states
            .get_compound_tag_vec("palette")
            .map_err(|err| ChunkDecodeError::document(format!("palette: {:?}", err)))?;

        let mut palette = Vec::with_capacity(palette_tags.len());

        for entry in palette_tags {
            let name = entry
                .get_str("Name")
                .map_err(|err| ChunkDecodeError::document(format!("palette Name: {:?}", err)))?;

            palette.push(BlockName::from(name));
        }

        let mut bitmap = vec![0u16; SECTION_BLOCKS];

        if block_states.contains_key("data") {
            let data = block_states
                .get_i64_vec("data")
                .map_err(|err| ChunkDecodeError::document(format!("data: {:?}", err)))?;

            unpack_bitmap(&mut bitmap, data, palette.len())?;
        }

        Ok(Section { palette, bitmap })
    }

    /// Returns the block name at section-local coordinates.
    ///
    /// Panics if the section is empty or a coordinate is out of `[0, 16)`.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> BlockName {
        assert!(!self.is_empty(), "block lookup in section without data");
        assert!(
            in_section_range(x) && in_section_range(y) && in_section_range(z),
            "section local coordinates ({}, {}, {}) out of bounds",
            x,
            y,
            z
        );

        let index = (256 * x + 16 * y + z) as usize;
        self.palette[self.bitmap[index] as usize].clone()
    }

    /// Whether the source subtree carried no `block_states` at all.
    pub fn is_empty(&self) -> bool {
        self.palette.is_empty()
    }

    /// Whether the section holds at most one distinct block.
    pub fn is_uniform(&self) -> bool {
        self.palette.len() <= 1
    }

    pub fn palette(&self) -> &[BlockName] {
        &self.palette
    }
}

fn in_section_range(coordinate: i32) -> bool {
    (0..16).contains(&coordinate)
}

/// Amount of bits one palette index occupies in the packed data.
///
/// Never below 4 bits, the smallest packing the format uses.
pub(crate) fn palette_bit_width(palette_len: usize) -> u32 {
    let max_index = palette_len.saturating_sub(1);

    if max_index < 16 {
        4
    } else {
        usize::BITS - max_index.leading_zeros()
    }
}

/// Unpacks 4096 palette indices out of the 64-bit word array.
///
/// Words are consumed from the low bits up; leftover high bits of a word
/// are discarded rather than carried into the next word.
fn unpack_bitmap(
    bitmap: &mut [u16],
    data: &[i64],
    palette_len: usize,
) -> Result<(), ChunkDecodeError> {
    let width = palette_bit_width(palette_len);
    let blocks_per_word = (64 / width) as usize;
    let mask = (1u64 << width) - 1;

    'words: for (word_index, word) in data.iter().enumerate() {
        let mut bits = *word as u64;

        for slot in 0..blocks_per_word {
            let index = blocks_per_word * word_index + slot;

            if index >= SECTION_BLOCKS {
                break 'words;
            }

            let entry = (bits & mask) as usize;

            if entry >= palette_len {
                return Err(ChunkDecodeError::document(format!(
                    "palette index {} out of range for palette of {}",
                    entry, palette_len
                )));
            }

            bitmap[index] = entry as u16;
            bits >>= width;
        }
    }

    Ok(())
}
