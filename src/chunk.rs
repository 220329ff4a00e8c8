use crate::error::ChunkDecodeError;
use crate::section::Section;
use nbt::CompoundTag;

/// Amount of vertical sections in a populated chunk.
const CHUNK_SECTIONS: usize = 24;
/// Lowest section index of the supported world height.
pub(crate) const SECTION_Y_MIN: i32 = -4;
/// Highest section index of the supported world height.
pub(crate) const SECTION_Y_MAX: i32 = 19;

/// A 16x16 column of blocks over the full world height.
///
/// A chunk is either absent (its region header slot held no data) or
/// fully populated with all 24 section slots.
pub struct Chunk {
    sections: Vec<Section>,
}

impl Chunk {
    /// Chunk for a region slot without data.
    pub(crate) fn absent() -> Self {
        Chunk {
            sections: Vec::new(),
        }
    }

    /// Assembles the chunk out of its decoded document.
    ///
    /// Source sections are ordered by their recorded `Y` index. Some
    /// files carry an extra leading section at `Y = -5`; it lies below
    /// the supported height and is skipped. Source index `i` lands in
    /// slot `i + 4`, and a list too short to fill all 24 slots pads the
    /// remainder with empty sections.
    pub(crate) fn from_document(document: &CompoundTag) -> Result<Self, ChunkDecodeError> {
        let source_sections = document
            .get_compound_tag_vec("sections")
            .map_err(|err| ChunkDecodeError::document(format!("sections: {:?}", err)))?;

        if source_sections.is_empty() {
            return Err(ChunkDecodeError::document(
                "chunk document has no sections".to_string(),
            ));
        }

        let skip = if section_y(source_sections[0])? == -5 {
            1
        } else {
            0
        };

        let mut sections = Vec::with_capacity(CHUNK_SECTIONS);

        for slot in 0..CHUNK_SECTIONS {
            match source_sections.get(slot + skip) {
                Some(tag) => sections.push(Section::from_document(tag)?),
                None => sections.push(Section::empty()),
            }
        }

        Ok(Chunk { sections })
    }

    /// Whether the source region slot held no chunk data.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Returns the section at vertical index `y` in `[-4, 19]`.
    ///
    /// Panics on an absent chunk or an out-of-range index.
    pub fn section(&self, y: i32) -> &Section {
        assert!(!self.is_empty(), "section lookup in absent chunk");
        assert!(
            (SECTION_Y_MIN..=SECTION_Y_MAX).contains(&y),
            "section index {} out of bounds",
            y
        );

        &self.sections[(y + 4) as usize]
    }
}

fn section_y(tag: &CompoundTag) -> Result<i32, ChunkDecodeError> {
    // Stored as a byte in current files, as an int in older ones.
    if let Ok(y) = tag.get_i8("Y") {
        return Ok(y as i32);
    }

    match tag.get_i32("Y") {
        Ok(y) => Ok(y),
        Err(err) => Err(ChunkDecodeError::document(format!("section Y: {:?}", err))),
    }
}

#[cfg(test)]
mod tests {
    use crate::chunk::Chunk;
    use nbt::CompoundTag;

    fn section_tag(y: i32, name: &str) -> CompoundTag {
        let mut palette_entry = CompoundTag::new();
        palette_entry.insert_str("Name", name);

        let mut block_states = CompoundTag::new();
        block_states.insert_compound_tag_vec("palette", vec![palette_entry]);

        let mut section = CompoundTag::new();
        section.insert_i8("Y", y as i8);
        section.insert_compound_tag("block_states", block_states);
        section
    }

    fn chunk_document(first_y: i32, count: usize) -> CompoundTag {
        let sections: Vec<CompoundTag> = (0..count as i32)
            .map(|index| section_tag(first_y + index, &format!("minecraft:block_{}", index)))
            .collect();

        let mut document = CompoundTag::new();
        document.insert_compound_tag_vec("sections", sections);
        document
    }

    #[test]
    fn test_absent_chunk() {
        let chunk = Chunk::absent();

        assert!(chunk.is_empty());
    }

    #[test]
    fn test_standard_section_window() {
        let document = chunk_document(-4, 24);
        let chunk = Chunk::from_document(&document).unwrap();

        assert!(!chunk.is_empty());
        assert_eq!(&*chunk.section(-4).block_at(0, 0, 0), "minecraft:block_0");
        assert_eq!(&*chunk.section(0).block_at(5, 5, 5), "minecraft:block_4");
        assert_eq!(&*chunk.section(19).block_at(15, 15, 15), "minecraft:block_23");
    }

    #[test]
    fn test_alternate_window_skips_leading_section() {
        // Lists starting at Y = -5 carry one section below world floor.
        let document = chunk_document(-5, 25);
        let chunk = Chunk::from_document(&document).unwrap();

        assert_eq!(&*chunk.section(-4).block_at(0, 0, 0), "minecraft:block_1");
        assert_eq!(&*chunk.section(19).block_at(0, 0, 0), "minecraft:block_24");
    }

    #[test]
    fn test_short_section_list_pads_empty() {
        let document = chunk_document(-4, 1);
        let chunk = Chunk::from_document(&document).unwrap();

        assert!(!chunk.is_empty());
        assert_eq!(&*chunk.section(-4).block_at(0, 0, 0), "minecraft:block_0");
        assert!(chunk.section(0).is_empty());
        assert!(chunk.section(19).is_empty());
    }

    #[test]
    fn test_missing_sections_list_fails() {
        assert!(Chunk::from_document(&CompoundTag::new()).is_err());
    }

    #[test]
    fn test_empty_sections_list_fails() {
        let mut document = CompoundTag::new();
        document.insert_compound_tag_vec("sections", Vec::<CompoundTag>::new());

        assert!(Chunk::from_document(&document).is_err());
    }

    #[test]
    #[should_panic(expected = "absent chunk")]
    fn test_section_lookup_in_absent_chunk_panics() {
        Chunk::absent().section(0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_section_index_out_of_bounds_panics() {
        let document = chunk_document(-4, 24);
        let chunk = Chunk::from_document(&document).unwrap();

        chunk.section(20);
    }
}
