//! Periodic refresh tasks, one per key
//!
//! Starting a watch on a key that already has one aborts the old task.
//! Every watch gets a fresh generation number, and a cycle must confirm
//! through its `WatchGuard` that it is still the current generation before
//! publishing anything.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

struct ActiveWatch {
    generation: u64,
    label: String,
    handle: JoinHandle<()>,
}

pub struct WatchRegistry<K> {
    watches: Mutex<HashMap<K, ActiveWatch>>,
    next_generation: AtomicU64,
}

/// Handle given to each cycle to check it has not been superseded
pub struct WatchGuard<K> {
    registry: Arc<WatchRegistry<K>>,
    key: K,
    generation: u64,
}

impl<K: Clone> Clone for WatchGuard<K> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            key: self.key.clone(),
            generation: self.generation,
        }
    }
}

impl<K> WatchGuard<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn is_current(&self) -> bool {
        self.registry.current_generation(&self.key) == Some(self.generation)
    }
}

impl<K> Default for WatchRegistry<K> {
    fn default() -> Self {
        Self {
            watches: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
        }
    }
}

impl<K> WatchRegistry<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn current_generation(&self, key: &K) -> Option<u64> {
        self.watches
            .lock()
            .ok()
            .and_then(|watches| watches.get(key).map(|w| w.generation))
    }

    /// Start (or replace) the watch for `key`.
    ///
    /// `cycle` runs immediately and then every `period`. Returns the new
    /// generation number.
    pub fn start<F, Fut>(self: &Arc<Self>, key: K, label: String, period: Duration, cycle: F) -> u64
    where
        F: Fn(WatchGuard<K>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let guard = WatchGuard {
            registry: Arc::clone(self),
            key: key.clone(),
            generation,
        };

        // Hold the lock across spawn so the first cycle cannot observe a stale generation
        let mut watches = match self.watches.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !guard.is_current() {
                    debug!("Watch {:?} generation {} superseded, exiting", guard.key, guard.generation);
                    break;
                }
                cycle(guard.clone()).await;
            }
        });

        let previous = watches.insert(key.clone(), ActiveWatch { generation, label, handle });
        drop(watches);

        if let Some(old) = previous {
            old.handle.abort();
            info!("Replaced watch {:?} (generation {} -> {})", key, old.generation, generation);
        } else {
            info!("Started watch {:?} (generation {})", key, generation);
        }

        generation
    }

    /// Stop the watch for `key`; returns false when none was running
    pub fn stop(&self, key: &K) -> bool {
        let removed = match self.watches.lock() {
            Ok(mut w) => w.remove(key),
            Err(poisoned) => poisoned.into_inner().remove(key),
        };

        match removed {
            Some(watch) => {
                watch.handle.abort();
                info!("Stopped watch {:?} (generation {})", key, watch.generation);
                true
            }
            None => false,
        }
    }

    /// Label of the running watch for `key`
    pub fn describe(&self, key: &K) -> Option<String> {
        self.watches
            .lock()
            .ok()
            .and_then(|watches| watches.get(key).map(|w| w.label.clone()))
    }

    pub fn active_count(&self) -> usize {
        self.watches.lock().map(|w| w.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn test_first_cycle_runs_immediately_then_every_period() {
        let registry: Arc<WatchRegistry<u64>> = Arc::new(WatchRegistry::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&runs);
        registry.start(7, "gold 1h".into(), Duration::from_secs(3600), move |_guard| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        assert!(registry.stop(&7));
        tokio::time::sleep(Duration::from_secs(7200)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert!(!registry.stop(&7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_supersedes_previous_generation() {
        let registry: Arc<WatchRegistry<u64>> = Arc::new(WatchRegistry::new());
        let guards: Arc<Mutex<Vec<WatchGuard<u64>>>> = Arc::new(Mutex::new(Vec::new()));

        let record = |guards: Arc<Mutex<Vec<WatchGuard<u64>>>>| {
            move |guard: WatchGuard<u64>| {
                let guards = Arc::clone(&guards);
                async move {
                    guards.lock().unwrap().push(guard);
                }
            }
        };

        let first = registry.start(1, "gold 1h".into(), Duration::from_secs(3600), record(Arc::clone(&guards)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = registry.start(1, "gold 4h".into(), Duration::from_secs(3600), record(Arc::clone(&guards)));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(second > first);
        assert_eq!(registry.active_count(), 1);
        assert_eq!(registry.describe(&1).as_deref(), Some("gold 4h"));

        {
            let seen = guards.lock().unwrap();
            assert_eq!(seen.len(), 2);
            assert_eq!(seen[0].generation(), first);
            assert!(!seen[0].is_current());
            assert!(seen[1].is_current());
        }

        registry.stop(&1);
        assert!(!guards.lock().unwrap()[1].is_current());
        assert!(registry.describe(&1).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watches_are_independent_per_key() {
        let registry: Arc<WatchRegistry<&'static str>> = Arc::new(WatchRegistry::new());
        registry.start("a", "a".into(), Duration::from_secs(60), |_| async {});
        registry.start("b", "b".into(), Duration::from_secs(60), |_| async {});
        assert_eq!(registry.active_count(), 2);
        registry.stop(&"a");
        assert_eq!(registry.active_count(), 1);
        assert_eq!(registry.describe(&"b").as_deref(), Some("b"));
    }
}
