//! A concurrent memoizing map that never forgets more than you let it.
//!
//! [`Lobot`] pairs lazy value construction with a hard capacity bound. The value constructor runs
//! at most once per cached key, concurrent lookups of the same key wait for the single in-flight
//! construction, and the map as a whole never holds more than its configured number of entries.
//!
//! # Examples
//!
//! A memoizing string-length map:
//!
//! ```
//! # use lobot::Lobot;
//! // The constructor accepts a function or closure which we call the "value constructor".
//! // It takes a reference to a key and returns a new value associated with that key.
//! let lobot = Lobot::new(|word: &&str| word.len());
//!
//! assert_eq!(lobot.get("cloud"), 5);
//! assert_eq!(lobot.get("city"), 4);
//! ```
//!
//! The value constructor is only called once for each resident key:
//!
//! ```
//! # use lobot::Lobot;
//! # use std::cell::Cell;
//! let counter = Cell::new(0);
//!
//! let lobot = Lobot::new(|x| {
//!     counter.set(counter.get() + 1);
//!     *x * 2
//! });
//!
//! assert_eq!(lobot.get(21), 42);
//! assert_eq!(lobot.get(21), 42);
//! assert_eq!(counter.get(), 1);
//! ```
//!
//! The capacity bound holds no matter how many keys pass through:
//!
//! ```
//! # use lobot::Lobot;
//! let lobot = Lobot::with_capacity(64, |x| *x);
//!
//! for i in 0..1_000 {
//!     assert_eq!(lobot.get(i), i);
//! }
//!
//! // Old entries were dropped along the way; the most recent key is always resident.
//! assert!(lobot.len() <= 64);
//! assert!(lobot.contains(&999));
//! ```
//!
//! Thread safe:
//!
//! ```
//! # use lobot::Lobot;
//! # use rayon::prelude::*;
//! # use std::sync::atomic::{AtomicU8, Ordering};
//! let counter = AtomicU8::new(0);
//!
//! let lobot = Lobot::new(|_| counter.fetch_add(1, Ordering::Relaxed));
//!
//! // Many threads racing on one key still run the constructor exactly once.
//! [0_i32; 32].par_iter().for_each(|_| {
//!     assert_eq!(lobot.get(0), 0);
//! });
//!
//! assert_eq!(counter.load(Ordering::Relaxed), 1);
//! ```
//!
//! # Eviction
//!
//! Keys are sharded into fixed buckets of at most 16 pairs each. Inserting into a full bucket
//! drops that bucket's oldest pair first. An evicted key is not an error; a later [`Lobot::get`]
//! simply runs the value constructor again.
//!
//! # Deadlock
//!
//! [`Lobot`] can only deadlock if the value constructor never returns; infinite loops and I/O
//! without a timeout are the usual suspects. Threads competing for values cannot deadlock among
//! themselves because there are no mutual dependencies between buckets.
//!
//! Values must implement [`Clone`] so that waiters receive their own copy once construction
//! finishes. Store [`Copy`] types directly; wrap everything else in [`Arc`].
//!
//! [`Clone`]: std::clone::Clone
//! [`Copy`]: std::marker::Copy
//! [`Arc`]: std::sync::Arc

#![forbid(unsafe_code)]

use parking_lot::RwLock;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};

const DEFAULT_CAPACITY: usize = 1_024;

/// Maximum number of key-value pairs held by a single bucket.
const MAX_PAIRS: usize = 16;

/// A concurrent memoizing map with lazy value construction and a hard capacity bound.
///
/// # Limitations
///
/// - Insert-once: the constructor function `create` should be memoizable, always producing the
///   same result for any given key. Values cannot be updated like a normal map.
/// - The number of buckets is fixed at 1/16 of the configured capacity. Entries beyond a bucket's
///   quota evict that bucket's oldest entry, so a sufficiently skewed key distribution can evict
///   earlier than the total capacity suggests.
#[derive(Debug)]
pub struct Lobot<K, V, F, H = RandomState> {
    buckets: Vec<RwLock<Vec<(K, V)>>>,
    hasher: H,
    create: F,
}

impl<K, V, F> Lobot<K, V, F>
where
    K: Eq + Hash + PartialEq,
    V: Clone,
    F: Fn(&K) -> V,
{
    /// Create a new memoizer with default capacity and hasher.
    ///
    /// Default capacity is 1,024. See [`Lobot::with_capacity_and_hasher`] for capacity details.
    ///
    /// The value returned by the constructor function must implement `Clone`. `Copy` types can be
    /// used directly; everything else should probably be wrapped in [`Arc`]. See the [crate root]
    /// documentation for more info.
    ///
    /// [`Arc`]: std::sync::Arc
    /// [crate root]: crate#deadlock
    pub fn new(create: F) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, create)
    }

    /// Create a new memoizer with the specified capacity and default hasher.
    ///
    /// # Example
    ///
    /// ```
    /// # use lobot::Lobot;
    /// let lobot = Lobot::with_capacity(64, |key| *key);
    /// assert_eq!(lobot.get(42), 42);
    /// ```
    pub fn with_capacity(capacity: usize, create: F) -> Lobot<K, V, F, RandomState> {
        Self::with_capacity_and_hasher(capacity, RandomState::new(), create)
    }
}

impl<K, V, F, H> Lobot<K, V, F, H>
where
    K: Eq + Hash + PartialEq,
    V: Clone,
    F: Fn(&K) -> V,
    H: BuildHasher,
{
    /// Create a new memoizer with the default capacity and specified hasher.
    ///
    /// # Example
    ///
    /// ```
    /// # use lobot::Lobot;
    /// # use std::collections::hash_map::RandomState;
    /// let lobot = Lobot::with_hasher(RandomState::new(), |key| *key);
    /// assert_eq!(lobot.get(13), 13);
    /// ```
    pub fn with_hasher(hasher: H, create: F) -> Lobot<K, V, F, H> {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher, create)
    }

    /// Create a new memoizer with the specified capacity and hasher.
    ///
    /// # Capacity
    ///
    /// - The number of buckets is fixed to 1/16 of `capacity` (rounded down) for the lifetime of
    ///   `Self`.
    /// - Each bucket holds at most 16 pairs; inserting into a full bucket drops its oldest pair.
    /// - The map therefore never holds more than `capacity` entries in total.
    ///
    /// # Panics
    ///
    /// The `capacity` is required to be greater than or equal to `64`.
    ///
    /// # Example
    ///
    /// ```
    /// # use lobot::Lobot;
    /// # use std::collections::hash_map::RandomState;
    /// let lobot = Lobot::with_capacity_and_hasher(64, RandomState::new(), |key| *key);
    /// assert_eq!(lobot.get(13), 13);
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hasher: H, create: F) -> Lobot<K, V, F, H> {
        assert!(capacity >= 64);
        let max_buckets = capacity / MAX_PAIRS;

        let mut buckets = Vec::with_capacity(max_buckets);
        for _ in 0..max_buckets {
            buckets.push(RwLock::new(Vec::with_capacity(MAX_PAIRS)));
        }

        Lobot {
            buckets,
            hasher,
            create,
        }
    }

    /// Get a value by key, blocking if the constructor has not been called for it yet.
    ///
    /// The constructor runs under the bucket's write lock, so concurrent callers asking for the
    /// same key wait for the single in-flight construction and then clone its result.
    pub fn get(&self, key: K) -> V {
        let bucket = self.bucket(&key);

        // Fast path: Return value if available.
        let guard = self.buckets[bucket].read();
        if let Some(value) = guard
            .iter()
            .find_map(|(k, value)| (k == &key).then_some(value))
        {
            return value.clone();
        }
        drop(guard);

        // Slow path: Acquire a write lock on the hash bucket.
        let mut write_guard = self.buckets[bucket].write();

        // Another thread may have raced for the write lock. Attempt to early return.
        if let Some(value) = write_guard
            .iter()
            .rev()
            .find_map(|(k, value)| (k == &key).then_some(value))
        {
            return value.clone();
        }

        // Run the constructor, which can take an arbitrarily long time.
        let value = (self.create)(&key);

        // Make room if the bucket is at quota, dropping its oldest pair.
        if write_guard.len() >= MAX_PAIRS {
            write_guard.remove(0);
        }
        write_guard.push((key, value.clone()));

        value
    }

    /// Remove a value by key.
    ///
    /// Returns `None` when the key does not exist.
    pub fn remove(&self, key: &K) -> Option<V> {
        let bucket = self.bucket(key);

        let mut write_guard = self.buckets[bucket].write();

        write_guard
            .iter()
            .position(|(k, _)| k == key)
            .map(|index| write_guard.remove(index).1)
    }

    /// Returns `true` if the key exists in this collection.
    pub fn contains(&self, key: &K) -> bool {
        let bucket = self.bucket(key);

        let guard = self.buckets[bucket].read();

        guard.iter().any(|(k, _)| k == key)
    }

    /// Number of entries currently resident across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|lock| lock.read().len()).sum()
    }

    /// Returns `true` when no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|lock| lock.read().is_empty())
    }

    /// Return the key's bucket index.
    fn bucket(&self, key: &K) -> usize {
        self.hasher.hash_one(key) as usize % self.buckets.len()
    }
}
