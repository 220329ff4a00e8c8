use crate::chunk::Chunk;
use crate::error::{ChunkDecodeError, RegionError};
use crate::pool::ThreadPool;
use byteorder::{BigEndian, ReadBytesExt};
use log::debug;
use nbt::decode::{read_gzip_compound_tag, read_zlib_compound_tag};
use nbt::CompoundTag;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

/// Amount of chunks in region.
const REGION_CHUNKS: usize = 1024;
/// Length of the location table in bytes.
const REGION_LOCATIONS_BYTES_LENGTH: usize = 4 * REGION_CHUNKS;
/// Region header length in bytes: locations plus timestamps.
const REGION_HEADER_BYTES_LENGTH: usize = 8 * REGION_CHUNKS;
/// Region sector length in bytes.
const REGION_SECTOR_BYTES_LENGTH: usize = 4096;

/// Gzip compression type value.
const GZIP_COMPRESSION_TYPE: u8 = 1;
/// Zlib compression type value.
const ZLIB_COMPRESSION_TYPE: u8 = 2;

/// Region represents a 32x32 group of chunks backed by one file.
///
/// Chunks are decoded lazily: the first lookup reads the whole file,
/// fans the 1024 slot decodes out on the shared pool and keeps the
/// result until `clear_cache`. The cache is never partially populated.
pub struct Region {
    /// X-axis coordinate.
    x: i32,
    /// Z-axis coordinate.
    z: i32,
    /// File in which region is stored.
    path: PathBuf,
    /// Pool shared with every other region of the world.
    pool: Arc<ThreadPool>,
    cache: Option<Vec<Chunk>>,
}

/// One record of the header location table.
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
struct ChunkLocation {
    /// Sector index from which starts chunk data.
    start_sector_index: u32,
    /// Amount of sectors used to store chunk.
    sectors: u8,
}

impl ChunkLocation {
    fn is_empty(&self) -> bool {
        self.sectors == 0
    }
}

impl Region {
    pub fn new<P: Into<PathBuf>>(x: i32, z: i32, path: P, pool: Arc<ThreadPool>) -> Self {
        Region {
            x,
            z,
            path: path.into(),
            pool,
            cache: None,
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Reads and decodes the whole region file.
    ///
    /// Idempotent: an already cached region returns immediately. Any
    /// present-but-corrupt slot fails the build and leaves the region
    /// uncached.
    pub fn build_cache(&mut self) -> Result<(), RegionError> {
        if self.cache.is_some() {
            return Ok(());
        }

        let buffer = Arc::new(fs::read(&self.path)?);
        let locations = read_locations(&buffer)?;

        debug!(
            target: "anvil-world",
            "Building cache for region x: {}, z: {} from {} bytes",
            self.x,
            self.z,
            buffer.len()
        );

        let mut handles = Vec::with_capacity(REGION_CHUNKS);

        for location in locations.iter().copied() {
            let buffer = buffer.clone();

            handles.push(
                self.pool
                    .submit(move || decode_slot(&buffer, location)),
            );
        }

        let mut chunks = Vec::with_capacity(REGION_CHUNKS);

        for (index, handle) in handles.into_iter().enumerate() {
            let chunk = handle.wait().map_err(|source| RegionError::ChunkDecode {
                chunk_x: (index / 32) as i32,
                chunk_z: (index % 32) as i32,
                source,
            })?;

            chunks.push(chunk);
        }

        self.cache = Some(chunks);

        Ok(())
    }

    /// Drops every cached chunk. No-op when the region is not cached.
    pub fn clear_cache(&mut self) {
        self.cache = None;
    }

    /// Returns the chunk at region-local coordinates, building the
    /// cache first if needed.
    ///
    /// Panics if a coordinate is out of `[0, 32)`.
    pub fn fetch_chunk(&mut self, chunk_x: i32, chunk_z: i32) -> Result<&Chunk, RegionError> {
        assert!(
            (0..32).contains(&chunk_x) && (0..32).contains(&chunk_z),
            "region chunk coordinates ({}, {}) out of bounds",
            chunk_x,
            chunk_z
        );

        self.build_cache()?;

        let chunks = match &self.cache {
            Some(chunks) => chunks,
            None => unreachable!("cache populated by build_cache"),
        };

        Ok(&chunks[(chunk_x * 32 + chunk_z) as usize])
    }
}

/// Parses the 1024 big-endian location records of the header.
///
/// A file shorter than the header describes no chunks at all.
fn read_locations(buffer: &[u8]) -> Result<[ChunkLocation; REGION_CHUNKS], std::io::Error> {
    let mut locations = [ChunkLocation::default(); REGION_CHUNKS];

    if REGION_HEADER_BYTES_LENGTH > buffer.len() {
        return Ok(locations);
    }

    let mut cursor = Cursor::new(&buffer[..REGION_LOCATIONS_BYTES_LENGTH]);

    for location in locations.iter_mut() {
        let value = cursor.read_u32::<BigEndian>()?;

        *location = ChunkLocation {
            start_sector_index: value >> 8,
            sectors: (value & 0xFF) as u8,
        };
    }

    Ok(locations)
}

/// Decodes one chunk slot out of the in-memory region file.
fn decode_slot(buffer: &[u8], location: ChunkLocation) -> Result<Chunk, ChunkDecodeError> {
    match read_chunk_document(buffer, location)? {
        Some(document) => Chunk::from_document(&document),
        None => Ok(Chunk::absent()),
    }
}

/// Extracts, decompresses and parses one chunk payload.
///
/// Returns `None` for an absent header record.
fn read_chunk_document(
    buffer: &[u8],
    location: ChunkLocation,
) -> Result<Option<CompoundTag>, ChunkDecodeError> {
    if location.is_empty() {
        return Ok(None);
    }

    let offset = location.start_sector_index as usize * REGION_SECTOR_BYTES_LENGTH;

    if offset + 5 > buffer.len() {
        return Err(ChunkDecodeError::TruncatedPayload {
            offset,
            length: 0,
            file_length: buffer.len(),
        });
    }

    let mut prefix = Cursor::new(&buffer[offset..offset + 5]);
    let length = prefix.read_u32::<BigEndian>()?;
    let compression_scheme = prefix.read_u8()?;

    // Length counts the compression byte itself.
    let payload_end = offset + 4 + length as usize;

    if length == 0 || payload_end > buffer.len() {
        return Err(ChunkDecodeError::TruncatedPayload {
            offset,
            length,
            file_length: buffer.len(),
        });
    }

    let mut cursor = Cursor::new(&buffer[offset + 5..payload_end]);

    match compression_scheme {
        GZIP_COMPRESSION_TYPE => Ok(Some(read_gzip_compound_tag(&mut cursor)?)),
        ZLIB_COMPRESSION_TYPE => Ok(Some(read_zlib_compound_tag(&mut cursor)?)),
        _ => Err(ChunkDecodeError::UnsupportedCompressionScheme { compression_scheme }),
    }
}
