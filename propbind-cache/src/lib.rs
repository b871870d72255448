use dashmap::DashMap;
use std::collections::BinaryHeap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Pluggable storage for computed results, keyed by an opaque cache key.
///
/// `cache` has put-if-absent semantics: under a concurrent first-access race
/// the first writer wins and later writes for the same key are discarded.
/// Implementations must be safe to call from multiple threads.
pub trait CacheStrategy<K, V>: Send + Sync {
    /// Store the value under the key unless an entry already exists.
    fn cache(&self, key: K, value: V);

    /// Get the cached value for the key, if present.
    fn get(&self, key: &K) -> Option<V>;

    /// Remove the entry for the key.
    fn expire(&self, key: &K);

    /// Remove all entries.
    fn expire_all(&self);
}

// ---------------------------------------------------------------------------
// ConcurrentMapCache — plain key→value base strategy
// ---------------------------------------------------------------------------

/// A thread-safe key→value store backed by `DashMap`.
pub struct ConcurrentMapCache<K, V> {
    inner: DashMap<K, V>,
}

impl<K: Eq + Hash, V> ConcurrentMapCache<K, V> {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> Default for ConcurrentMapCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> CacheStrategy<K, V> for ConcurrentMapCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn cache(&self, key: K, value: V) {
        self.inner.entry(key).or_insert(value);
    }

    fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key).map(|entry| entry.value().clone())
    }

    fn expire(&self, key: &K) {
        self.inner.remove(key);
    }

    fn expire_all(&self) {
        self.inner.clear();
    }
}

// ---------------------------------------------------------------------------
// WeakKeyCache — keys held weakly, purged lazily
// ---------------------------------------------------------------------------

/// A map key holding a `Weak` reference to its referent.
///
/// The hash is captured from the referent at wrap time so lookups stay valid
/// after the referent is dropped. Two keys are equal when their referents are
/// both alive and equal; a dead key is only equal to itself.
struct WeakKey<K> {
    referent: Weak<K>,
    hash: u64,
}

impl<K: Hash> WeakKey<K> {
    fn new(referent: &Arc<K>) -> Self {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        referent.hash(&mut hasher);
        Self {
            referent: Arc::downgrade(referent),
            hash: hasher.finish(),
        }
    }

    fn is_live(&self) -> bool {
        self.referent.strong_count() > 0
    }
}

impl<K> Hash for WeakKey<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl<K: Eq> PartialEq for WeakKey<K> {
    fn eq(&self, other: &Self) -> bool {
        match (self.referent.upgrade(), other.referent.upgrade()) {
            (Some(a), Some(b)) => a == b,
            _ => Weak::ptr_eq(&self.referent, &other.referent),
        }
    }
}

impl<K: Eq> Eq for WeakKey<K> {}

/// A `CacheStrategy` over `Arc<K>` keys that does not keep its keys alive.
///
/// Once the last strong reference to a key is dropped, the entry becomes
/// unreachable and is purged lazily on the next `cache`/`get`/`expire` call.
pub struct WeakKeyCache<K, V> {
    inner: DashMap<WeakKey<K>, V>,
}

impl<K: Eq + Hash, V> WeakKeyCache<K, V> {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    fn purge_keys(&self) {
        self.inner.retain(|key, _| key.is_live());
    }
}

impl<K: Eq + Hash, V> Default for WeakKeyCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> CacheStrategy<Arc<K>, V> for WeakKeyCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn cache(&self, key: Arc<K>, value: V) {
        self.purge_keys();
        self.inner.entry(WeakKey::new(&key)).or_insert(value);
    }

    fn get(&self, key: &Arc<K>) -> Option<V> {
        self.purge_keys();
        self.inner
            .get(&WeakKey::new(key))
            .map(|entry| entry.value().clone())
    }

    fn expire(&self, key: &Arc<K>) {
        self.purge_keys();
        self.inner.remove(&WeakKey::new(key));
    }

    fn expire_all(&self) {
        self.inner.clear();
    }
}

// ---------------------------------------------------------------------------
// ExpiringCache — decorator scheduling per-key expiry on one timer thread
// ---------------------------------------------------------------------------

/// An entry in the expiry queue. Ordered as a min-heap on deadline; the
/// sequence number breaks ties so ordering is total without `K: Ord`.
struct Scheduled<K> {
    deadline: Instant,
    seq: u64,
    key: K,
}

impl<K> PartialEq for Scheduled<K> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl<K> Eq for Scheduled<K> {}

impl<K> PartialOrd for Scheduled<K> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Scheduled<K> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the earliest deadline on top.
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct TimerState<K> {
    queue: BinaryHeap<Scheduled<K>>,
    next_seq: u64,
    shutdown: bool,
}

struct Timer<K> {
    state: Mutex<TimerState<K>>,
    signal: Condvar,
}

/// A `CacheStrategy` decorator that expires entries after a fixed lifetime.
///
/// Every `cache` call schedules an `expire(key)` on a single background timer
/// thread shared by all keys of this instance. The thread lives as long as the
/// decorator; call [`ExpiringCache::shutdown`] to tear it down early (`Drop`
/// does so as well).
pub struct ExpiringCache<K, V> {
    delegate: Arc<dyn CacheStrategy<K, V>>,
    lifetime: Duration,
    timer: Arc<Timer<K>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Clone + Send + 'static,
    V: 'static,
{
    pub fn new(delegate: Arc<dyn CacheStrategy<K, V>>, lifetime: Duration) -> Self {
        let timer = Arc::new(Timer {
            state: Mutex::new(TimerState {
                queue: BinaryHeap::new(),
                next_seq: 0,
                shutdown: false,
            }),
            signal: Condvar::new(),
        });

        let worker = {
            let timer = Arc::clone(&timer);
            let delegate = Arc::clone(&delegate);
            std::thread::spawn(move || run_expiry_loop(timer, delegate))
        };

        Self {
            delegate,
            lifetime,
            timer,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Stop the timer thread. Entries already stored stay in the delegate;
    /// pending expirations are dropped. Idempotent.
    pub fn shutdown(&self) {
        {
            let mut state = self.timer.state.lock().unwrap();
            state.shutdown = true;
        }
        self.timer.signal.notify_all();
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    fn schedule_for_expiry(&self, key: K) {
        {
            let mut state = self.timer.state.lock().unwrap();
            let seq = state.next_seq;
            state.next_seq += 1;
            state.queue.push(Scheduled {
                deadline: Instant::now() + self.lifetime,
                seq,
                key,
            });
        }
        self.timer.signal.notify_one();
    }
}

fn run_expiry_loop<K, V>(timer: Arc<Timer<K>>, delegate: Arc<dyn CacheStrategy<K, V>>) {
    let mut state = timer.state.lock().unwrap();
    loop {
        if state.shutdown {
            return;
        }
        let now = Instant::now();
        let next_deadline = state.queue.peek().map(|scheduled| scheduled.deadline);
        state = match next_deadline {
            None => timer.signal.wait(state).unwrap(),
            Some(deadline) if deadline <= now => {
                let scheduled = state.queue.pop().unwrap();
                // Expire outside the lock so concurrent cache calls never
                // block on the delegate.
                drop(state);
                delegate.expire(&scheduled.key);
                timer.state.lock().unwrap()
            }
            Some(deadline) => timer.signal.wait_timeout(state, deadline - now).unwrap().0,
        };
    }
}

impl<K, V> CacheStrategy<K, V> for ExpiringCache<K, V>
where
    K: Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn cache(&self, key: K, value: V) {
        self.delegate.cache(key.clone(), value);
        self.schedule_for_expiry(key);
    }

    fn get(&self, key: &K) -> Option<V> {
        self.delegate.get(key)
    }

    fn expire(&self, key: &K) {
        self.delegate.expire(key);
    }

    fn expire_all(&self) {
        self.delegate.expire_all();
    }
}

impl<K, V> Drop for ExpiringCache<K, V> {
    fn drop(&mut self) {
        {
            let mut state = self.timer.state.lock().unwrap();
            state.shutdown = true;
        }
        self.timer.signal.notify_all();
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}
