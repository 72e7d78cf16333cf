use crate::error::{PathError, Result};
use crate::path_collection::ItemId;
use indexmap::IndexSet;

/// Remembers which items have local edits that the backing store has not seen yet.
///
/// Edits are recorded with [`CommitManager::mark`] and written out with [`CommitManager::commit`]
/// at the commit points of the document. Only one commit can be in flight at a time.
#[derive(Debug, Default)]
pub struct CommitManager {
    pending: IndexSet<ItemId>,
    committing: bool,
}

impl CommitManager {
    pub fn new() -> CommitManager {
        CommitManager::default()
    }

    pub fn mark(&mut self, id: ItemId) {
        if self.pending.insert(id) {
            log::trace!("{:?} has pending edits", id);
        }
    }

    pub fn is_pending(&self, id: ItemId) -> bool {
        self.pending.contains(&id)
    }

    pub fn pending(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.pending.iter().copied()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drops pending edits of an item that no longer exists.
    pub fn forget(&mut self, id: ItemId) {
        self.pending.shift_remove(&id);
    }

    /// Enters the commit section.
    pub fn begin(&mut self) -> Result<()> {
        if self.committing {
            log::warn!("rejected reentrant commit");
            return Err(PathError::ReentrantCommit);
        }
        self.committing = true;
        Ok(())
    }

    /// Leaves the commit section. A successful flush clears the pending flag of `id`,
    /// a failed one leaves it set.
    pub fn finish(&mut self, id: ItemId, succeeded: bool) {
        self.committing = false;
        if succeeded {
            self.pending.shift_remove(&id);
        }
    }

    /// Runs `flush` for `id` if it has pending edits.
    pub fn commit<F>(&mut self, id: ItemId, flush: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        if !self.pending.contains(&id) {
            return Ok(());
        }

        self.begin()?;
        let result = flush();
        self.finish(id, result.is_ok());
        match &result {
            Ok(()) => log::debug!("committed {:?}", id),
            Err(err) => log::warn!("commit of {:?} failed: {}", id, err),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ArtHandle, StoreError};

    fn id(index: u32) -> ItemId {
        ItemId::new(index, 0)
    }

    #[test]
    fn commit_clears_the_pending_flag() {
        let mut manager = CommitManager::new();
        manager.mark(id(1));
        manager.mark(id(2));
        manager.mark(id(1));
        assert_eq!(manager.pending().collect::<Vec<_>>(), vec![id(1), id(2)]);

        let mut flushed = 0;
        manager
            .commit(id(1), || {
                flushed += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(flushed, 1);
        assert!(!manager.is_pending(id(1)));
        assert!(manager.is_pending(id(2)));
    }

    #[test]
    fn clean_items_are_not_flushed() {
        let mut manager = CommitManager::new();
        let mut flushed = false;
        manager
            .commit(id(3), || {
                flushed = true;
                Ok(())
            })
            .unwrap();
        assert!(!flushed);
    }

    #[test]
    fn failed_commit_stays_pending() {
        let mut manager = CommitManager::new();
        manager.mark(id(1));
        let result = manager.commit(id(1), || {
            Err(PathError::SyncFailure {
                handle: ArtHandle(7),
                source: StoreError::Locked(ArtHandle(7)),
            })
        });
        assert!(matches!(result, Err(PathError::SyncFailure { .. })));
        assert!(manager.is_pending(id(1)));

        // Not retried behind the caller's back, the next commit runs the flush again.
        let mut calls = 0;
        manager
            .commit(id(1), || {
                calls += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(calls, 1);
    }

    #[test]
    fn commit_inside_a_commit_is_rejected() {
        let mut manager = CommitManager::new();
        manager.mark(id(1));
        manager.begin().unwrap();
        assert!(matches!(manager.commit(id(1), || Ok(())), Err(PathError::ReentrantCommit)));
        assert!(matches!(manager.begin(), Err(PathError::ReentrantCommit)));
        manager.finish(id(1), false);
        assert!(manager.is_pending(id(1)));
        assert!(manager.commit(id(1), || Ok(())).is_ok());
    }
}
