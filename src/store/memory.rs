use super::{fit_segments, flatten_segments, reduce_segments, ArtHandle, ArtStore, StoreError};
use crate::config::{FitOptions, FlattenOptions};
use crate::segment::{reverse_segments, Segment};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct Art {
    segments: Vec<Segment>,
    closed: bool,
    locked: bool,
}

/// Keeps all art in process memory. Used by tests and by hosts without their own storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    art: HashMap<ArtHandle, Art>,
    next_handle: u64,
    commits: usize,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Makes every write to `handle` fail with [`StoreError::Locked`] until unlocked.
    pub fn lock(&mut self, handle: ArtHandle) -> Result<(), StoreError> {
        self.get_mut_unlocked(handle)?.locked = true;
        Ok(())
    }

    pub fn unlock(&mut self, handle: ArtHandle) -> Result<(), StoreError> {
        self.get_mut_unlocked(handle)?.locked = false;
        Ok(())
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    pub fn segments(&self, handle: ArtHandle) -> Option<&[Segment]> {
        self.art.get(&handle).map(|art| art.segments.as_slice())
    }

    pub fn is_closed(&self, handle: ArtHandle) -> Option<bool> {
        self.art.get(&handle).map(|art| art.closed)
    }

    pub fn contains(&self, handle: ArtHandle) -> bool {
        self.art.contains_key(&handle)
    }

    fn get(&self, handle: ArtHandle) -> Result<&Art, StoreError> {
        self.art.get(&handle).ok_or(StoreError::UnknownHandle(handle))
    }

    fn get_mut_unlocked(&mut self, handle: ArtHandle) -> Result<&mut Art, StoreError> {
        self.art.get_mut(&handle).ok_or(StoreError::UnknownHandle(handle))
    }

    fn get_mut(&mut self, handle: ArtHandle) -> Result<&mut Art, StoreError> {
        let art = self.get_mut_unlocked(handle)?;
        if art.locked {
            Err(StoreError::Locked(handle))
        } else {
            Ok(art)
        }
    }
}

impl ArtStore for MemoryStore {
    fn create(&mut self) -> ArtHandle {
        let handle = ArtHandle(self.next_handle);
        self.next_handle += 1;
        self.art.insert(handle, Art::default());
        handle
    }

    fn release(&mut self, handle: ArtHandle) {
        self.art.remove(&handle);
    }

    fn segment_count(&self, handle: ArtHandle) -> Result<usize, StoreError> {
        Ok(self.get(handle)?.segments.len())
    }

    fn fetch(&self, handle: ArtHandle) -> Result<Vec<Segment>, StoreError> {
        Ok(self.get(handle)?.segments.clone())
    }

    fn commit(&mut self, handle: ArtHandle, segments: &[Segment], closed: bool) -> Result<(), StoreError> {
        let art = self.get_mut(handle)?;
        art.segments.clear();
        art.segments.extend_from_slice(segments);
        art.closed = closed;
        self.commits += 1;
        Ok(())
    }

    fn reverse(&mut self, handle: ArtHandle) -> Result<(), StoreError> {
        reverse_segments(&mut self.get_mut(handle)?.segments);
        Ok(())
    }

    fn points_to_curves(&mut self, handle: ArtHandle, options: &FitOptions) -> Result<usize, StoreError> {
        let art = self.get_mut(handle)?;
        art.segments = fit_segments(&art.segments, art.closed, options);
        Ok(art.segments.len())
    }

    fn curves_to_points(&mut self, handle: ArtHandle, options: &FlattenOptions) -> Result<usize, StoreError> {
        if options.max_point_distance <= 0.0 {
            return Err(StoreError::Rejected(format!(
                "max point distance must be positive, got {}",
                options.max_point_distance
            )));
        }
        let art = self.get_mut(handle)?;
        art.segments = flatten_segments(&art.segments, art.closed, options);
        Ok(art.segments.len())
    }

    fn reduce_segments(&mut self, handle: ArtHandle, flatness: f64) -> Result<usize, StoreError> {
        let art = self.get_mut(handle)?;
        art.segments = reduce_segments(&art.segments, flatness);
        Ok(art.segments.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry_utilities::types::*;

    #[test]
    fn commit_and_fetch() {
        let mut store = MemoryStore::new();
        let handle = store.create();
        let segments = vec![Segment::corner(point(0.0, 0.0)), Segment::corner(point(1.0, 0.0))];
        store.commit(handle, &segments, true).unwrap();
        assert_eq!(store.fetch(handle).unwrap(), segments);
        assert_eq!(store.segment_count(handle).unwrap(), 2);
        assert_eq!(store.is_closed(handle), Some(true));
        assert_eq!(store.commit_count(), 1);
    }

    #[test]
    fn locked_art_rejects_writes() {
        let mut store = MemoryStore::new();
        let handle = store.create();
        store.lock(handle).unwrap();
        assert_eq!(store.commit(handle, &[], false), Err(StoreError::Locked(handle)));
        assert_eq!(store.reverse(handle), Err(StoreError::Locked(handle)));
        assert_eq!(store.commit_count(), 0);
        store.unlock(handle).unwrap();
        assert!(store.commit(handle, &[], false).is_ok());
    }

    #[test]
    fn released_handles_are_unknown() {
        let mut store = MemoryStore::new();
        let handle = store.create();
        store.release(handle);
        assert_eq!(store.fetch(handle), Err(StoreError::UnknownHandle(handle)));
        assert_ne!(store.create(), handle);
    }

    #[test]
    fn flattening_rejects_non_positive_spacing() {
        let mut store = MemoryStore::new();
        let handle = store.create();
        assert!(matches!(
            store.curves_to_points(handle, &FlattenOptions::with_max_point_distance(0.0)),
            Err(StoreError::Rejected(_))
        ));
    }
}
