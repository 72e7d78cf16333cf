//! Bridge to the host-side art storage that holds the authoritative geometry of every item.
//!
//! The core never looks inside the store. It pushes segment data with [`ArtStore::commit`] at
//! commit points and pulls it back with [`ArtStore::fetch`] after the store has changed it
//! (reverse, fitting, flattening, reduction).

mod fitting;
mod flattening;
mod memory;

pub use fitting::fit_segments;
pub use flattening::{flatten_segments, reduce_segments};
pub use memory::MemoryStore;

use crate::config::{FitOptions, FlattenOptions};
use crate::segment::Segment;

/// Opaque reference to host-side art.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ArtHandle(pub u64);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("unknown art handle {0:?}")]
    UnknownHandle(ArtHandle),
    #[error("art {0:?} is locked")]
    Locked(ArtHandle),
    #[error("store rejected the request: {0}")]
    Rejected(String),
}

pub trait ArtStore {
    /// Allocates host-side art for a new item.
    fn create(&mut self) -> ArtHandle;
    fn release(&mut self, handle: ArtHandle);

    fn segment_count(&self, handle: ArtHandle) -> Result<usize, StoreError>;
    fn fetch(&self, handle: ArtHandle) -> Result<Vec<Segment>, StoreError>;
    fn commit(&mut self, handle: ArtHandle, segments: &[Segment], closed: bool) -> Result<(), StoreError>;

    fn reverse(&mut self, handle: ArtHandle) -> Result<(), StoreError>;
    /// Returns the segment count after fitting.
    fn points_to_curves(&mut self, handle: ArtHandle, options: &FitOptions) -> Result<usize, StoreError>;
    /// Returns the segment count after flattening.
    fn curves_to_points(&mut self, handle: ArtHandle, options: &FlattenOptions) -> Result<usize, StoreError>;
    /// Returns the segment count after reduction.
    fn reduce_segments(&mut self, handle: ArtHandle, flatness: f64) -> Result<usize, StoreError>;
}
