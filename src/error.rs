use nbt::decode::TagDecodeError;
use std::{error::Error, fmt::Display, io};

/// Possible errors while decoding a single chunk payload.
#[derive(Debug)]
pub enum ChunkDecodeError {
    /// Currently are only 2 types of compression: Gzip and Zlib.
    ///
    /// This should not occur under normal conditions.
    ///
    /// Region file are corrupted or was introduced new compression type.
    UnsupportedCompressionScheme {
        /// Compression scheme type id.
        compression_scheme: u8,
    },
    /// Chunk payload continues past the end of the region file.
    ///
    /// This should not occur under normal conditions.
    ///
    /// Region file are corrupted.
    TruncatedPayload {
        /// Payload start offset in bytes from file start.
        offset: usize,
        /// Declared payload length.
        length: u32,
        /// Region file length.
        file_length: usize,
    },
    /// Decoded document misses a field this crate reads or holds an
    /// out-of-range palette index.
    MalformedDocument { detail: String },
    /// I/O Error which happened while were reading chunk data.
    IOError { io_error: io::Error },
    /// Error while decoding binary data to NBT tag.
    ///
    /// This should not occur under normal conditions.
    ///
    /// Region file are corrupted or a developer error in the NBT library.
    TagDecodeError { tag_decode_error: TagDecodeError },
}

impl ChunkDecodeError {
    pub(crate) fn document(detail: String) -> Self {
        ChunkDecodeError::MalformedDocument { detail }
    }
}

impl From<io::Error> for ChunkDecodeError {
    fn from(io_error: io::Error) -> Self {
        ChunkDecodeError::IOError { io_error }
    }
}

impl From<TagDecodeError> for ChunkDecodeError {
    fn from(tag_decode_error: TagDecodeError) -> Self {
        ChunkDecodeError::TagDecodeError { tag_decode_error }
    }
}

impl Error for ChunkDecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use ChunkDecodeError::*;
        match self {
            IOError { io_error } => Some(io_error),
            // TagDecodeError does not implement std::error::Error; its
            // detail is carried by the variant's Debug representation.
            _ => None,
        }
    }
}

impl Display for ChunkDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ChunkDecodeError::*;
        match self {
            UnsupportedCompressionScheme { compression_scheme } => {
                write!(f, "Unsupported compression scheme: {}", compression_scheme)
            }
            TruncatedPayload {
                offset,
                length,
                file_length,
            } => write!(
                f,
                "Chunk payload of {} bytes at offset {} exceeds file length {}",
                length, offset, file_length
            ),
            MalformedDocument { detail } => write!(f, "Malformed chunk document: {}", detail),
            IOError { .. } => write!(f, "IO Error"),
            TagDecodeError { .. } => write!(f, "Failed to decode nbt"),
        }
    }
}

/// Possible errors while building a region cache.
#[derive(Debug)]
pub enum RegionError {
    /// I/O Error which happened while were reading the region file.
    IOError { io_error: io::Error },
    /// Decoding one chunk slot failed.
    ChunkDecode {
        /// Chunk x coordinate inside region.
        chunk_x: i32,
        /// Chunk z coordinate inside region.
        chunk_z: i32,
        source: ChunkDecodeError,
    },
}

impl From<io::Error> for RegionError {
    fn from(io_error: io::Error) -> Self {
        RegionError::IOError { io_error }
    }
}

impl Error for RegionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RegionError::IOError { io_error } => Some(io_error),
            RegionError::ChunkDecode { source, .. } => Some(source),
        }
    }
}

impl Display for RegionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionError::IOError { .. } => write!(f, "IO Error"),
            RegionError::ChunkDecode {
                chunk_x,
                chunk_z,
                source,
            } => write!(
                f,
                "Failed to decode chunk {}, {}: {}",
                chunk_x, chunk_z, source
            ),
        }
    }
}

/// Possible errors while querying a world.
#[derive(Debug)]
pub enum WorldError {
    /// I/O Error which happened while were listing the region folder.
    IOError { io_error: io::Error },
    /// Region at specified coordinates not found on disk.
    RegionNotFound {
        /// Region x coordinate.
        region_x: i32,
        /// Region z coordinate.
        region_z: i32,
    },
    /// Block belongs to a chunk slot which holds no data.
    UninitializedBlock { x: i32, y: i32, z: i32 },
    /// Building the cache of the region owning the block failed.
    Region {
        region_x: i32,
        region_z: i32,
        source: RegionError,
    },
}

impl From<io::Error> for WorldError {
    fn from(io_error: io::Error) -> Self {
        WorldError::IOError { io_error }
    }
}

impl Error for WorldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use WorldError::*;
        match self {
            IOError { io_error } => Some(io_error),
            Region { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Display for WorldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use WorldError::*;
        match self {
            IOError { .. } => write!(f, "IO Error"),
            RegionNotFound { region_x, region_z } => {
                write!(f, "Region {}, {} not found", region_x, region_z)
            }
            UninitializedBlock { x, y, z } => {
                write!(f, "Uninitialized block ({}, {}, {})", x, y, z)
            }
            Region {
                region_x,
                region_z,
                source,
            } => write!(f, "Region {}, {}: {}", region_x, region_z, source),
        }
    }
}
