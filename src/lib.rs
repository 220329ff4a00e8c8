//! Read-only access to Minecraft Anvil world saves.
//!
//! A [`World`] indexes every region file of a save directory and
//! resolves global block coordinates down to block names. Region files
//! are decoded lazily: the first query against a region reads it once,
//! fans the 1024 chunk decodes out over a shared [`ThreadPool`] and
//! caches the result until [`Region::clear_cache`] revokes it.
//!
//! ```no_run
//! use anvil_world::{ThreadPool, World};
//! use std::sync::Arc;
//!
//! let pool = Arc::new(ThreadPool::new());
//! let mut world = World::open("saves/my-world", pool).unwrap();
//!
//! let block = world.get_block(100, 64, -200).unwrap();
//! println!("{}", block);
//! ```

pub mod chunk;
pub mod error;
pub mod pool;
pub mod position;
pub mod region;
pub mod section;
pub mod world;

pub use crate::chunk::Chunk;
pub use crate::error::{ChunkDecodeError, RegionError, WorldError};
pub use crate::pool::{TaskHandle, ThreadPool};
pub use crate::position::BlockRoute;
pub use crate::region::Region;
pub use crate::section::{BlockName, Section};
pub use crate::world::World;
