//! The single writer of the visibility status.

use std::sync::{Arc, Mutex, PoisonError};

use crate::Result;
use crate::state::SharedState;
use crate::status::VisibilityStatus;
use crate::store::{BackingStore, StoreKey};

/// Owns the canonical visibility flag.
///
/// Reads and writes go to the backing store; every successful change is
/// published to [`SharedState`]. Toggle and sync are serialized by an
/// internal lock so the store never sees interleaved read-modify-write
/// sequences from this process. Races with external writers still
/// resolve as last writer wins.
pub struct StatusAuthority {
    store: Arc<dyn BackingStore>,
    state: Arc<SharedState>,
    lock: Mutex<()>,
}

impl StatusAuthority {
    pub fn new(store: Arc<dyn BackingStore>, state: Arc<SharedState>) -> Self {
        Self {
            store,
            state,
            lock: Mutex::new(()),
        }
    }

    /// Returns the shared state this authority publishes to.
    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Returns the published status.
    ///
    /// Falls back to reading the store, without publishing, only while
    /// nothing has been published yet.
    pub fn current(&self) -> Result<VisibilityStatus> {
        match self.state.status() {
            Some(status) => Ok(status),
            None => self.read(),
        }
    }

    /// Reads the current status and releases the key before returning.
    pub fn read(&self) -> Result<VisibilityStatus> {
        let (_key, status) = self.read_open()?;
        Ok(status)
    }

    /// Reads the current status and hands the open key to the caller.
    ///
    /// The key is released when the caller drops it.
    pub fn read_open(&self) -> Result<(Box<dyn StoreKey>, VisibilityStatus)> {
        log::debug!("Opening registry key {:?}", crate::store::KEY_PATH);
        let key = self.store.open()?;
        log::debug!("Reading value {:?}", crate::store::VALUE_NAME);
        let raw = key.read_value()?;
        Ok((key, VisibilityStatus::from_raw(raw)))
    }

    /// Reads the status from the store and publishes it.
    ///
    /// Used once at startup and by the registry watcher after every
    /// observed change.
    pub fn sync(&self) -> Result<VisibilityStatus> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let status = self.read()?;
        self.state.set_status(status);
        Ok(status)
    }

    /// Flips the status in the store and publishes the new value.
    ///
    /// On failure the published status is left untouched. The key is
    /// released on every path.
    pub fn toggle(&self) -> Result<VisibilityStatus> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (key, current) = self.read_open()?;
        let next = current.toggled();

        log::debug!("Setting {:?} to {}", crate::store::VALUE_NAME, next.raw());
        key.write_value(next.raw())?;
        drop(key);

        self.state.set_status(next);
        log::info!("Hidden files are now {next}");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::fakes::FakeStore;

    fn authority(store: &Arc<FakeStore>) -> StatusAuthority {
        StatusAuthority::new(store.clone(), Arc::new(SharedState::new()))
    }

    #[test]
    fn read_decodes_backing_value_and_releases_key() {
        // Arrange
        let store = Arc::new(FakeStore::new(2));
        let authority = authority(&store);

        // Act
        let status = authority.read().unwrap();

        // Assert
        assert_eq!(status, VisibilityStatus::Hidden);
        assert_eq!(store.open_handles(), 0);
    }

    #[test]
    fn current_answers_from_published_status() {
        // Arrange
        let store = Arc::new(FakeStore::new(1));
        let authority = authority(&store);
        authority.sync().unwrap();
        store.set_value(2);
        store.fail_open(true);

        // Act
        let status = authority.current().unwrap();

        // Assert
        assert_eq!(status, VisibilityStatus::Visible);
    }

    #[test]
    fn current_reads_store_until_something_is_published() {
        let store = Arc::new(FakeStore::new(2));
        let authority = authority(&store);

        assert_eq!(authority.current().unwrap(), VisibilityStatus::Hidden);
        assert_eq!(authority.state().status(), None);
        assert_eq!(store.open_handles(), 0);
    }

    #[test]
    fn read_open_keeps_key_until_dropped() {
        let store = Arc::new(FakeStore::new(1));
        let authority = authority(&store);

        let (key, status) = authority.read_open().unwrap();
        assert_eq!(status, VisibilityStatus::Visible);
        assert_eq!(store.open_handles(), 1);

        drop(key);
        assert_eq!(store.open_handles(), 0);
    }

    #[test]
    fn read_reports_unavailable_store() {
        let store = Arc::new(FakeStore::new(1));
        store.fail_open(true);
        let authority = authority(&store);

        let err = authority.read().unwrap_err();

        assert!(matches!(err, Error::BackingStoreUnavailable { .. }));
    }

    #[test]
    fn sync_publishes_status() {
        let store = Arc::new(FakeStore::new(2));
        let authority = authority(&store);

        authority.sync().unwrap();

        assert_eq!(
            authority.state().status(),
            Some(VisibilityStatus::Hidden)
        );
    }

    #[test]
    fn toggle_writes_opposite_value_and_publishes() {
        // Arrange
        let store = Arc::new(FakeStore::new(1));
        let authority = authority(&store);
        authority.sync().unwrap();

        // Act
        let next = authority.toggle().unwrap();

        // Assert
        assert_eq!(next, VisibilityStatus::Hidden);
        assert_eq!(store.value(), 2);
        assert_eq!(
            authority.state().status(),
            Some(VisibilityStatus::Hidden)
        );
        assert_eq!(store.open_handles(), 0);
    }

    #[test]
    fn toggles_alternate_strictly() {
        let store = Arc::new(FakeStore::new(2));
        let authority = authority(&store);
        let start = authority.sync().unwrap();

        let mut expected = start;
        for _ in 0..6 {
            expected = expected.toggled();
            assert_eq!(authority.toggle().unwrap(), expected);
            assert_eq!(store.value(), expected.raw());
        }
        assert_eq!(expected, start);
    }

    #[test]
    fn failed_write_leaves_published_status_and_releases_key() {
        // Arrange
        let store = Arc::new(FakeStore::new(1));
        let authority = authority(&store);
        authority.sync().unwrap();
        store.fail_write(true);

        // Act
        let err = authority.toggle().unwrap_err();

        // Assert
        assert!(matches!(err, Error::ValueWriteFailure { .. }));
        assert_eq!(
            authority.state().status(),
            Some(VisibilityStatus::Visible)
        );
        assert_eq!(store.value(), 1);
        assert_eq!(store.open_handles(), 0);
    }

    #[test]
    fn failed_read_leaves_published_status() {
        let store = Arc::new(FakeStore::new(2));
        let authority = authority(&store);
        authority.sync().unwrap();
        store.fail_read(true);

        let err = authority.toggle().unwrap_err();

        assert!(matches!(err, Error::ValueReadFailure { .. }));
        assert_eq!(
            authority.state().status(),
            Some(VisibilityStatus::Hidden)
        );
        assert_eq!(store.open_handles(), 0);
    }

    #[test]
    fn concurrent_toggles_are_serialized() {
        let store = Arc::new(FakeStore::new(1));
        let authority = Arc::new(authority(&store));
        authority.sync().unwrap();

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let authority = authority.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        authority.toggle().unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        // 100 toggles from Visible land back on Visible.
        assert_eq!(store.value(), 1);
        assert_eq!(
            authority.state().status(),
            Some(VisibilityStatus::Visible)
        );
    }
}
