use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::Flatten;
use core::iter::FusedIterator;
use core::sync::atomic::AtomicUsize;
use core::sync::atomic::Ordering;

use log::debug;
use log::trace;

use crate::error::Error;

/// Load factor used by new tables: three entries per bucket on average.
pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 3.0;

#[inline(always)]
fn bucket_index(hash: u64, bucket_count: usize) -> usize {
    // The remainder is below `bucket_count`, so the cast back cannot truncate.
    (hash % bucket_count as u64) as usize
}

/// Number of buckets used to pre-size a table for `entries` values. Never
/// more than one bucket per entry, however small the load factor.
#[inline(always)]
fn buckets_for(entries: usize, max_load_factor: f32) -> usize {
    ((entries as f64 / max_load_factor as f64) as usize)
        .min(entries)
        .max(1)
}

static NEXT_TABLE_ID: AtomicUsize = AtomicUsize::new(0);

fn next_table_id() -> usize {
    NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed)
}

fn new_buckets<V>(count: usize) -> Vec<Bucket<V>> {
    let mut buckets = Vec::with_capacity(count);
    buckets.resize_with(count, VecDeque::new);
    buckets
}

#[derive(Clone)]
struct Slot<V> {
    hash: u64,
    value: V,
}

/// A chain of slots sharing one `hash % bucket_count` index. New slots are
/// pushed to the front.
type Bucket<V> = VecDeque<Slot<V>>;

/// How the bucket array grows when an insertion would exceed the maximum
/// load factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowthPolicy {
    /// Add exactly one bucket per growth event.
    ///
    /// Every growth event rehashes all entries, so a long run of insertions
    /// costs O(n) per insert on average.
    #[default]
    Linear,
    /// Double the bucket count per growth event, for amortized O(1)
    /// insertion.
    Doubling,
}

impl GrowthPolicy {
    #[inline(always)]
    fn next_bucket_count(self, current: usize) -> usize {
        match self {
            GrowthPolicy::Linear => current.saturating_add(1),
            GrowthPolicy::Doubling => current.saturating_mul(2),
        }
    }
}

/// A cursor into a [`HashTable`], addressing one entry by bucket and slot
/// index.
///
/// Positions are plain values and do not borrow the table. Every structural
/// change (inserting a new entry, removing, rehashing, clearing) moves the
/// table to a new epoch, and positions from an older epoch are stale: the
/// table resolves them to nothing instead of to whatever entry now lives at
/// those indices.
///
/// Any two end positions compare equal, no matter which table or epoch they
/// came from. Other positions are equal when they address the same slot of
/// the same table in the same epoch. A clone is a different table.
#[derive(Debug, Clone, Copy)]
pub struct Position {
    slot: Option<(usize, usize)>,
    table: usize,
    epoch: u64,
}

impl Position {
    /// Returns `true` if this is the end sentinel.
    pub fn is_end(&self) -> bool {
        self.slot.is_none()
    }

    /// Returns the `(bucket, slot)` indices, or `None` for the end sentinel.
    pub fn indices(&self) -> Option<(usize, usize)> {
        self.slot
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        match (self.slot, other.slot) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a == b && self.table == other.table && self.epoch == other.epoch
            }
            _ => false,
        }
    }
}

impl Eq for Position {}

/// Bucket occupancy statistics for a [`HashTable`].
#[cfg(feature = "stats")]
#[derive(Debug, Clone, PartialEq)]
pub struct BucketStats {
    /// Number of buckets in the bucket array
    pub bucket_count: usize,
    /// Number of entries stored
    pub populated: usize,
    /// Number of buckets holding no entries
    pub empty_buckets: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
    /// Load factor (populated / bucket_count)
    pub load_factor: f64,
    /// `chain_histogram[n]` is the number of buckets holding exactly `n`
    /// entries.
    pub chain_histogram: Vec<usize>,
}

#[cfg(feature = "stats")]
impl BucketStats {
    /// Pretty-print the statistics, with a horizontal bar per chain length.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Bucket Statistics ===");
        println!(
            "Population: {} entries in {} buckets ({:.2} load factor)",
            self.populated, self.bucket_count, self.load_factor
        );
        println!(
            "Empty buckets: {} ({:.2}%)",
            self.empty_buckets,
            (self.empty_buckets as f64 / self.bucket_count as f64) * 100.0
        );
        println!("Longest chain: {}", self.longest_chain);

        let max = self.chain_histogram.iter().copied().max().unwrap_or(0);
        let max_bar = 60usize;
        for (len, &count) in self.chain_histogram.iter().enumerate() {
            let width = if max == 0 {
                0
            } else {
                (count * max_bar).div_ceil(max)
            };
            println!("{:>3} | {} ({})", len, "█".repeat(width), count);
        }
    }
}

/// A hash table using separate chaining.
///
/// `HashTable<V>` stores values of type `V` in a bucket array. Each bucket is
/// a chain of values whose hash maps to that bucket, and new values are
/// prepended to their chain. Like the map built on top of it, the table does
/// not hash anything itself: every operation takes the precomputed hash and
/// an equality predicate. The hash is stored next to the value so that
/// rehashing does not need the hasher.
///
/// The table always has at least one bucket. Before a new value is placed,
/// the table checks whether `(len + 1) / bucket_count` would exceed the
/// maximum load factor and, if so, grows the bucket array according to its
/// [`GrowthPolicy`].
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use chain_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::with_buckets(4);
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     chain_hash::hash_table::Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     chain_hash::hash_table::Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
/// assert_eq!(table.len(), 1);
/// ```
pub struct HashTable<V> {
    buckets: Vec<Bucket<V>>,
    populated: usize,
    max_load_factor: f32,
    growth: GrowthPolicy,
    id: usize,
    epoch: u64,
}

impl<V: Clone> Clone for HashTable<V> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            populated: self.populated,
            max_load_factor: self.max_load_factor,
            growth: self.growth,
            id: next_table_id(),
            epoch: 0,
        }
    }
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field(
                "chains",
                &self.buckets.iter().map(VecDeque::len).collect::<Vec<_>>(),
            )
            .field("populated", &self.populated)
            .field("max_load_factor", &self.max_load_factor)
            .field("growth", &self.growth)
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table with a single bucket.
    pub fn new() -> Self {
        Self::with_buckets(1)
    }

    /// Creates an empty table with `buckets` buckets.
    ///
    /// A request for zero buckets creates one bucket.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_buckets(16);
    /// assert_eq!(table.bucket_count(), 16);
    ///
    /// let table: HashTable<String> = HashTable::with_buckets(0);
    /// assert_eq!(table.bucket_count(), 1);
    /// ```
    pub fn with_buckets(buckets: usize) -> Self {
        Self {
            buckets: new_buckets(buckets.max(1)),
            populated: 0,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            growth: GrowthPolicy::default(),
            id: next_table_id(),
            epoch: 0,
        }
    }

    /// Creates an empty table pre-sized for `entries` values under the
    /// default load factor, i.e. with `max(1, entries / 3)` buckets.
    pub fn with_entries(entries: usize) -> Self {
        Self::with_buckets(buckets_for(entries, DEFAULT_MAX_LOAD_FACTOR))
    }

    /// Returns the number of values in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no values.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of buckets. Always at least 1.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the current load factor, `len / bucket_count`.
    pub fn load_factor(&self) -> f32 {
        self.populated as f32 / self.buckets.len() as f32
    }

    /// Returns the load factor above which an insertion grows the table.
    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    /// Sets the load factor above which an insertion grows the table.
    ///
    /// The new value takes effect on the next insertion; the table is not
    /// rehashed immediately. An infinite load factor disables growth.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLoadFactor`] if `max_load_factor` is zero,
    /// negative or NaN.
    pub fn set_max_load_factor(&mut self, max_load_factor: f32) -> Result<(), Error> {
        // Written as a negation so that NaN is rejected too.
        if !(max_load_factor > 0.0) {
            return Err(Error::InvalidLoadFactor(max_load_factor));
        }
        self.max_load_factor = max_load_factor;
        Ok(())
    }

    /// Returns the growth policy.
    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth
    }

    /// Sets the growth policy used by future insertions.
    pub fn set_growth_policy(&mut self, growth: GrowthPolicy) {
        self.growth = growth;
    }

    /// Removes all values and resets the table to a single empty bucket.
    ///
    /// Unlike [`drain`](Self::drain), this discards the grown bucket array.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_buckets(8);
    /// table.entry(1, |&v: &u64| v == 1).or_insert(1);
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.bucket_count(), 1);
    /// ```
    pub fn clear(&mut self) {
        trace!(
            "clearing {} entries from {} buckets",
            self.populated,
            self.buckets.len()
        );
        self.buckets = new_buckets(1);
        self.populated = 0;
        self.bump_epoch();
    }

    /// Rebuilds the bucket array with exactly `buckets` buckets and
    /// redistributes every value by `hash % buckets`.
    ///
    /// Values are moved in iteration order and prepended to their new chain,
    /// so values that share a chain before and after the rehash end up in
    /// reverse order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroBuckets`] if `buckets` is zero. The table is left
    /// unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// table.rehash(32).unwrap();
    /// assert_eq!(table.bucket_count(), 32);
    /// assert!(table.rehash(0).is_err());
    /// assert_eq!(table.bucket_count(), 32);
    /// ```
    pub fn rehash(&mut self, buckets: usize) -> Result<(), Error> {
        if buckets == 0 {
            return Err(Error::ZeroBuckets);
        }
        self.redistribute(buckets);
        Ok(())
    }

    /// Grows the bucket array, if needed, so that `additional` more values
    /// fit under the maximum load factor with the same pre-sizing rule as
    /// [`with_entries`](Self::with_entries).
    pub fn reserve(&mut self, additional: usize) {
        let target = buckets_for(
            self.populated.saturating_add(additional),
            self.max_load_factor,
        );
        if target > self.buckets.len() {
            self.redistribute(target);
        }
    }

    fn redistribute(&mut self, buckets: usize) {
        debug!(
            "rehashing {} entries from {} to {} buckets",
            self.populated,
            self.buckets.len(),
            buckets
        );
        let mut fresh = new_buckets(buckets);
        for slot in core::mem::take(&mut self.buckets).into_iter().flatten() {
            fresh[bucket_index(slot.hash, buckets)].push_front(slot);
        }
        self.buckets = fresh;
        self.bump_epoch();
    }

    #[inline(always)]
    fn rehash_needed(&self) -> bool {
        (self.populated as f64 + 1.0) / self.buckets.len() as f64 > self.max_load_factor as f64
    }

    #[inline(always)]
    fn bump_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    #[inline(always)]
    fn position(&self, bucket: usize, slot: usize) -> Position {
        Position {
            slot: Some((bucket, slot)),
            table: self.id,
            epoch: self.epoch,
        }
    }

    /// Places a value known not to be in the table and returns its bucket.
    /// The value ends up at slot 0 of that bucket.
    fn place(&mut self, hash: u64, value: V) -> usize {
        if self.rehash_needed() {
            let next = self.growth.next_bucket_count(self.buckets.len());
            trace!(
                "inserting entry {} exceeds load factor {}, growing",
                self.populated + 1,
                self.max_load_factor
            );
            self.redistribute(next);
        }
        let bucket = bucket_index(hash, self.buckets.len());
        self.buckets[bucket].push_front(Slot { hash, value });
        self.populated += 1;
        self.bump_epoch();
        bucket
    }

    fn locate(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<(usize, usize)> {
        let bucket = bucket_index(hash, self.buckets.len());
        self.buckets[bucket]
            .iter()
            .position(|slot| slot.hash == hash && eq(&slot.value))
            .map(|slot| (bucket, slot))
    }

    /// Resolves a position against the current epoch and bucket array.
    fn resolve(&self, position: Position) -> Option<(usize, usize)> {
        let (bucket, slot) = position.slot?;
        if position.table != self.id || position.epoch != self.epoch {
            return None;
        }
        self.buckets
            .get(bucket)
            .filter(|chain| slot < chain.len())
            .map(|_| (bucket, slot))
    }

    fn take_slot(&mut self, bucket: usize, slot: usize) -> Option<V> {
        let removed = self.buckets.get_mut(bucket)?.remove(slot)?;
        self.populated -= 1;
        self.bump_epoch();
        Some(removed.value)
    }

    /// Inserts a value without checking whether an equal value is present.
    ///
    /// The caller must ensure no value equal to `value` is stored already,
    /// otherwise the table ends up holding both. Returns the position of the
    /// new value.
    pub fn insert_unique(&mut self, hash: u64, value: V) -> Position {
        let bucket = self.place(hash, value);
        self.position(bucket, 0)
    }

    /// Finds a value by its hash and an equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert_unique(7, "seven");
    /// assert_eq!(table.find(7, |v| *v == "seven"), Some(&"seven"));
    /// assert_eq!(table.find(8, |v| *v == "eight"), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let (bucket, slot) = self.locate(hash, eq)?;
        Some(&self.buckets[bucket][slot].value)
    }

    /// Finds a value by its hash and an equality predicate, returning a
    /// mutable reference.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let (bucket, slot) = self.locate(hash, eq)?;
        Some(&mut self.buckets[bucket][slot].value)
    }

    /// Finds a value and returns its position, or the end position if no
    /// value matches.
    pub fn find_position(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Position {
        match self.locate(hash, eq) {
            Some((bucket, slot)) => self.position(bucket, slot),
            None => self.end(),
        }
    }

    /// Gets the entry for a hash and equality predicate for in-place
    /// manipulation.
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        match self.locate(hash, eq) {
            Some((bucket, slot)) => Entry::Occupied(OccupiedEntry {
                table: self,
                bucket,
                slot,
            }),
            None => Entry::Vacant(VacantEntry { table: self, hash }),
        }
    }

    /// Removes a value by its hash and an equality predicate.
    ///
    /// Removing never shrinks the bucket array.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert_unique(7, "seven");
    /// assert_eq!(table.remove(7, |v| *v == "seven"), Some("seven"));
    /// assert_eq!(table.remove(7, |v| *v == "seven"), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let (bucket, slot) = self.locate(hash, eq)?;
        self.take_slot(bucket, slot)
    }

    /// Keeps only the values for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&mut V) -> bool) {
        let mut removed = 0;
        for chain in &mut self.buckets {
            let before = chain.len();
            chain.retain_mut(|slot| f(&mut slot.value));
            removed += before - chain.len();
        }
        if removed > 0 {
            self.populated -= removed;
            self.bump_epoch();
        }
    }

    /// Returns the position of the first value in iteration order, or the
    /// end position if the table is empty.
    pub fn begin(&self) -> Position {
        self.first_from(0)
    }

    /// Returns the end position.
    pub fn end(&self) -> Position {
        Position {
            slot: None,
            table: self.id,
            epoch: self.epoch,
        }
    }

    fn first_from(&self, bucket: usize) -> Position {
        self.buckets
            .iter()
            .enumerate()
            .skip(bucket)
            .find(|(_, chain)| !chain.is_empty())
            .map_or_else(|| self.end(), |(bucket, _)| self.position(bucket, 0))
    }

    /// Returns the position following `position` in iteration order.
    ///
    /// Moves to the next slot of the same chain, or to the head of the next
    /// non-empty bucket. The end position and stale positions advance to the
    /// end position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_buckets(4);
    /// for v in 0..10u64 {
    ///     table.insert_unique(v, v);
    /// }
    ///
    /// let mut seen = 0;
    /// let mut pos = table.begin();
    /// while pos != table.end() {
    ///     assert!(table.get_at(pos).is_some());
    ///     seen += 1;
    ///     pos = table.advance(pos);
    /// }
    /// assert_eq!(seen, 10);
    /// ```
    pub fn advance(&self, position: Position) -> Position {
        match self.resolve(position) {
            Some((bucket, slot)) if slot + 1 < self.buckets[bucket].len() => {
                self.position(bucket, slot + 1)
            }
            Some((bucket, _)) => self.first_from(bucket + 1),
            None => self.end(),
        }
    }

    /// Returns the value at `position`, or `None` if the position is the end
    /// or stale.
    pub fn get_at(&self, position: Position) -> Option<&V> {
        let (bucket, slot) = self.resolve(position)?;
        Some(&self.buckets[bucket][slot].value)
    }

    /// Returns the value at `position` mutably, or `None` if the position is
    /// the end or stale.
    pub fn get_at_mut(&mut self, position: Position) -> Option<&mut V> {
        let (bucket, slot) = self.resolve(position)?;
        Some(&mut self.buckets[bucket][slot].value)
    }

    /// Removes the value at `position`.
    ///
    /// Returns the removed value and the position of the value that followed
    /// it in iteration order. The returned position belongs to the new epoch;
    /// every other outstanding position becomes stale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EndPosition`] for the end position and
    /// [`Error::StalePosition`] for a position that no longer addresses a
    /// value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert_unique(1, 1u64);
    /// table.insert_unique(2, 2u64);
    ///
    /// let mut pos = table.begin();
    /// while !pos.is_end() {
    ///     let (_, next) = table.remove_at(pos).unwrap();
    ///     pos = next;
    /// }
    /// assert!(table.is_empty());
    /// ```
    pub fn remove_at(&mut self, position: Position) -> Result<(V, Position), Error> {
        if position.is_end() {
            return Err(Error::EndPosition);
        }
        let (bucket, slot) = self.resolve(position).ok_or(Error::StalePosition)?;
        let value = self.take_slot(bucket, slot).ok_or(Error::StalePosition)?;
        let next = if slot < self.buckets[bucket].len() {
            self.position(bucket, slot)
        } else {
            self.first_from(bucket + 1)
        };
        Ok((value, next))
    }

    /// Returns an iterator over the values, bucket by bucket and front to
    /// back within each chain.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.buckets.iter().flatten(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator over mutable references to the values, in the same
    /// order as [`iter`](Self::iter).
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.buckets.iter_mut().flatten(),
            remaining: self.populated,
        }
    }

    /// Removes and yields every value in iteration order. The bucket array
    /// keeps its size.
    ///
    /// Dropping the iterator early still removes the remaining values.
    pub fn drain(&mut self) -> Drain<'_, V> {
        self.bump_epoch();
        Drain {
            table: self,
            bucket_index: 0,
        }
    }

    /// Returns the length of each chain in bucket order.
    pub fn chain_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets.iter().map(VecDeque::len)
    }

    /// Returns occupancy statistics for the bucket array.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> BucketStats {
        let longest_chain = self.chain_lengths().max().unwrap_or(0);
        let mut chain_histogram = alloc::vec![0usize; longest_chain + 1];
        for len in self.chain_lengths() {
            chain_histogram[len] += 1;
        }

        BucketStats {
            bucket_count: self.buckets.len(),
            populated: self.populated,
            empty_buckets: chain_histogram[0],
            longest_chain,
            load_factor: self.populated as f64 / self.buckets.len() as f64,
            chain_histogram,
        }
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
///
/// # Examples
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use chain_hash::hash_table::Entry;
/// # use chain_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # fn hash_str(s: &str) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     s.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::new();
/// let hash = hash_str("key");
///
/// match table.entry(hash, |s: &String| s == "key") {
///     Entry::Vacant(entry) => {
///         entry.insert("key".to_string());
///     }
///     Entry::Occupied(entry) => {
///         println!("Key already exists: {}", entry.get());
///     }
/// }
/// ```
pub enum Entry<'a, V> {
    /// A vacant entry - no matching value is present in the table
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry - a matching value is present in the table
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the value computed by `default` if the entry is vacant and
    /// returns a mutable reference to the value.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to the value if the entry is occupied.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry in a [`HashTable`].
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts the value, growing the table first if needed, and returns a
    /// mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let bucket = self.table.place(self.hash, value);
        &mut self.table.buckets[bucket][0].value
    }

    /// Inserts the value and returns an occupied entry pointing at it.
    pub fn insert_entry(self, value: V) -> OccupiedEntry<'a, V> {
        let bucket = self.table.place(self.hash, value);
        OccupiedEntry {
            table: self.table,
            bucket,
            slot: 0,
        }
    }
}

/// A view into an occupied entry in a [`HashTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    bucket: usize,
    slot: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value.
    pub fn get(&self) -> &V {
        &self.table.buckets[self.bucket][self.slot].value
    }

    /// Gets a mutable reference to the value.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.table.buckets[self.bucket][self.slot].value
    }

    /// Converts the entry into a mutable reference bound to the table's
    /// borrow.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.table.buckets[self.bucket][self.slot].value
    }

    /// Returns the position of this entry.
    pub fn position(&self) -> Position {
        self.table.position(self.bucket, self.slot)
    }

    /// Removes the value from the table and returns it.
    pub fn remove(self) -> V {
        let removed = self.table.buckets[self.bucket]
            .remove(self.slot)
            .expect("occupied entry addresses a live slot");
        self.table.populated -= 1;
        self.table.bump_epoch();
        removed.value
    }
}

/// An iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    inner: Flatten<core::slice::Iter<'a, Bucket<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.inner.next()?;
        self.remaining -= 1;
        Some(&slot.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`iter_mut`] method on [`HashTable`].
///
/// [`iter_mut`]: HashTable::iter_mut
pub struct IterMut<'a, V> {
    inner: Flatten<core::slice::IterMut<'a, Bucket<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.inner.next()?;
        self.remaining -= 1;
        Some(&mut slot.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

/// An owning iterator over the values of a [`HashTable`].
pub struct IntoIter<V> {
    inner: Flatten<alloc::vec::IntoIter<Bucket<V>>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.inner.next()?;
        self.remaining -= 1;
        Some(slot.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> FusedIterator for IntoIter<V> {}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.populated,
            inner: self.buckets.into_iter().flatten(),
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut HashTable<V> {
    type IntoIter = IterMut<'a, V>;
    type Item = &'a mut V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`].
/// It yields owned `V` values and empties the table as it iterates.
///
/// [`drain`]: HashTable::drain
///
/// # Examples
///
/// ```rust
/// # use chain_hash::hash_table::HashTable;
/// #
/// let mut table = HashTable::with_buckets(4);
/// table.insert_unique(1, "1".to_string());
/// table.insert_unique(2, "2".to_string());
///
/// let values: Vec<String> = table.drain().collect();
/// assert!(table.is_empty());
/// assert_eq!(values.len(), 2);
/// assert_eq!(table.bucket_count(), 4);
/// ```
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    bucket_index: usize,
}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(chain) = self.table.buckets.get_mut(self.bucket_index) {
            if let Some(slot) = chain.pop_front() {
                self.table.populated -= 1;
                return Some(slot.value);
            }
            self.bucket_index += 1;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

impl<V> FusedIterator for Drain<'_, V> {}
