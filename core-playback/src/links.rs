//! Track link prefetching.
//!
//! Holding a decoder link for a track lets the decoder start loading it in
//! the background, so playlist tracks are linked ahead of playback. The cache
//! is bounded and evicts least recently used links first.

use bridge_traits::{DecoderSession, TrackLink};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::{debug, info, instrument};

/// Bounded URI to [`TrackLink`] cache.
pub struct TrackLinkCache {
    cache: Mutex<LruCache<String, TrackLink>>,
}

impl TrackLinkCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Link every URI not already cached.
    ///
    /// Does nothing unless the session is logged in. A URI the session cannot
    /// link is logged and skipped. Returns the number of links added.
    #[instrument(skip(self, session, uris), fields(count = uris.len()))]
    pub fn prefetch(&self, session: &dyn DecoderSession, uris: &[String]) -> usize {
        let state = session.connection_state();
        if !state.is_logged_in() {
            debug!(?state, "Session not logged in, skipping link prefetch");
            return 0;
        }

        let mut added = 0;
        for uri in uris {
            if self.cache.lock().contains(uri) {
                continue;
            }
            match session.link(uri) {
                Ok(link) => {
                    self.cache.lock().put(uri.clone(), link);
                    added += 1;
                }
                Err(e) => info!("Failed to get link {:?}: {}", uri, e),
            }
        }

        debug!(added, cached = self.len(), "Link prefetch complete");
        added
    }

    /// Cached link for `uri`, marking it as recently used.
    pub fn get(&self, uri: &str) -> Option<TrackLink> {
        self.cache.lock().get(uri).cloned()
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.cache.lock().contains(uri)
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.lock().cap().get()
    }

    /// Drop every cached link. Called when playlists are refreshed.
    #[instrument(skip(self))]
    pub fn invalidate(&self) {
        let mut cache = self.cache.lock();
        debug!(dropped = cache.len(), "Invalidating track links");
        cache.clear();
    }
}
