use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;
use core::ops::Index;

use crate::error::Error;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::GrowthPolicy;
use crate::hash_table::HashTable;
use crate::hash_table::Position;

fn equivalent_key<Q, K, V>(key: &Q) -> impl Fn(&(K, V)) -> bool + '_
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    move |x| key.eq(x.0.borrow())
}

/// A hash map implemented using the separate-chaining [`HashTable`] as the
/// underlying storage.
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash keys. A key lands in
/// bucket `hash(key) % bucket_count`; colliding keys share that bucket's
/// chain, newest first.
///
/// Iteration visits buckets in order and each chain front to back. Any
/// insertion of a new key may rehash, which reorders iteration.
///
/// # Cursors
///
/// Besides the usual Rust iterators, the map hands out [`Position`]s from
/// [`find`](Self::find), [`begin`](Self::begin) and
/// [`insert_full`](Self::insert_full). Positions can be advanced, read and
/// removed through the map, and turn stale after any structural change.
#[derive(Clone)]
pub struct HashMap<K, V, S> {
    table: HashTable<(K, V)>,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of buckets. Always at least 1.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Returns the current load factor, `len / bucket_count`.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns the load factor above which an insertion grows the map.
    pub fn max_load_factor(&self) -> f32 {
        self.table.max_load_factor()
    }

    /// Sets the load factor above which an insertion grows the map. The map
    /// is not rehashed until the next insertion of a new key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLoadFactor`] if `max_load_factor` is zero,
    /// negative or NaN.
    pub fn set_max_load_factor(&mut self, max_load_factor: f32) -> Result<(), Error> {
        self.table.set_max_load_factor(max_load_factor)
    }

    /// Returns the growth policy.
    pub fn growth_policy(&self) -> GrowthPolicy {
        self.table.growth_policy()
    }

    /// Sets the growth policy used by future insertions.
    pub fn set_growth_policy(&mut self, growth: GrowthPolicy) {
        self.table.set_growth_policy(growth);
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes all elements and resets the map to a single bucket.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// for i in 0..100 {
    ///     map.insert(i, i);
    /// }
    /// assert!(map.bucket_count() > 1);
    ///
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.bucket_count(), 1);
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Rebuilds the map with exactly `buckets` buckets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroBuckets`] if `buckets` is zero, leaving the map
    /// unchanged.
    pub fn rehash(&mut self, buckets: usize) -> Result<(), Error> {
        self.table.rehash(buckets)
    }

    /// Grows the bucket array so that `additional` more elements fit under
    /// the maximum load factor.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Keeps only the pairs for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        self.table.retain(|(k, v)| f(k, v));
    }

    /// Returns an iterator over the key-value pairs of the map, in bucket
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// for (key, value) in map.iter() {
    ///     println!("Key: {}, Value: {}", key, value);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the pairs with mutable references to the
    /// values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values of the map.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Returns an iterator that removes and yields all key-value pairs from the
    /// map. The bucket count is kept.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Returns the position of the first pair in iteration order, or the end
    /// position if the map is empty.
    pub fn begin(&self) -> Position {
        self.table.begin()
    }

    /// Returns the end position.
    pub fn end(&self) -> Position {
        self.table.end()
    }

    /// Returns the position after `position` in iteration order.
    pub fn advance(&self, position: Position) -> Position {
        self.table.advance(position)
    }

    /// Returns the pair at `position`, or `None` for the end position and for
    /// stale positions.
    pub fn get_at(&self, position: Position) -> Option<(&K, &V)> {
        self.table.get_at(position).map(|(k, v)| (k, v))
    }

    /// Returns the key and a mutable reference to the value at `position`.
    pub fn get_at_mut(&mut self, position: Position) -> Option<(&K, &mut V)> {
        self.table.get_at_mut(position).map(|(k, v)| (&*k, v))
    }

    /// Removes the pair at `position`. Returns it together with the position
    /// of the pair that followed it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EndPosition`] for the end position and
    /// [`Error::StalePosition`] if the map changed structurally since the
    /// position was obtained.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// for i in 0..10 {
    ///     map.insert(i, i * 10);
    /// }
    ///
    /// let mut pos = map.begin();
    /// while !pos.is_end() {
    ///     let (&key, _) = map.get_at(pos).unwrap();
    ///     pos = if key % 2 == 0 {
    ///         map.remove_at(pos).unwrap().1
    ///     } else {
    ///         map.advance(pos)
    ///     };
    /// }
    /// assert_eq!(map.len(), 5);
    /// assert!(map.remove_at(map.end()).is_err());
    /// ```
    pub fn remove_at(&mut self, position: Position) -> Result<((K, V), Position), Error> {
        self.table.remove_at(position)
    }

    /// Returns bucket occupancy statistics.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> crate::hash_table::BucketStats {
        self.table.stats()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new hash map with a single bucket and the given hasher
    /// builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(map.is_empty());
    /// assert_eq!(map.bucket_count(), 1);
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_buckets_and_hasher(1, hash_builder)
    }

    /// Creates a new hash map with `buckets` buckets and the given hasher
    /// builder. Zero buckets is treated as one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_buckets_and_hasher(100, SimpleHasher);
    /// assert_eq!(map.bucket_count(), 100);
    /// ```
    pub fn with_buckets_and_hasher(buckets: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_buckets(buckets),
            hash_builder,
        }
    }

    /// Builds a map from a sequence of pairs.
    ///
    /// The bucket array is sized for the sequence's lower size bound before
    /// any pair is inserted. Later pairs overwrite earlier pairs with the same
    /// key.
    pub fn from_pairs_with_hasher<I>(pairs: I, hash_builder: S) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::with_hasher(hash_builder);
        map.extend(pairs);
        map
    }

    /// Replaces the contents of the map with `pairs`.
    ///
    /// The map is cleared, pre-sized for the sequence and then filled. The
    /// hasher, load factor and growth policy are kept.
    pub fn assign<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.clear();
        self.extend(pairs);
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned.
    /// If the map did have this key present, the value is updated, and the old
    /// value is returned. The key itself is not replaced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.insert_full(key, value).1
    }

    /// Inserts a pair given as a tuple. Equivalent to
    /// [`insert`](Self::insert).
    pub fn insert_pair(&mut self, (key, value): (K, V)) -> Option<V> {
        self.insert(key, value)
    }

    /// Inserts a key-value pair and returns the position of the entry
    /// together with the replaced value, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// let (pos, old) = map.insert_full("k", 1);
    /// assert_eq!(old, None);
    /// assert_eq!(map.get_at(pos), Some((&"k", &1)));
    ///
    /// let (again, old) = map.insert_full("k", 2);
    /// assert_eq!(old, Some(1));
    /// assert_eq!(again, pos);
    /// ```
    pub fn insert_full(&mut self, key: K, value: V) -> (Position, Option<V>) {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(mut entry) => {
                let old_value = core::mem::replace(&mut entry.get_mut().1, value);
                (entry.position(), Some(old_value))
            }
            TableEntry::Vacant(entry) => (entry.insert_entry((key, value)).position(), None),
        }
    }

    /// Returns a mutable reference to the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// *map.get_or_insert_default("hits") += 1;
    /// *map.get_or_insert_default("hits") += 1;
    /// assert_eq!(map.get("hits"), Some(&2));
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but `Hash` and
    /// `Eq` on the borrowed form must match those for the key type.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and its value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.find(hash, equivalent_key(key)).map(|(k, v)| (k, v))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_mut(hash, equivalent_key(key)).map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns the position of the entry for `key`, or the end position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// map.insert(1, "a");
    ///
    /// let pos = map.find(&1);
    /// assert_eq!(map.get_at(pos), Some((&1, &"a")));
    /// assert_eq!(map.find(&2), map.end());
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Position
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_position(hash, equivalent_key(key))
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map. Removing an absent key does nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was previously in the map.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, equivalent_key(key))
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    ///
    /// map.entry(1).or_insert("a");
    /// map.entry(2).or_insert("b");
    ///
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), Some(&"b"));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a new hash map with a single bucket using the default hasher
    /// builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::DefaultHashBuilder;
    /// # use chain_hash::HashMap;
    /// #
    /// let map: HashMap<i32, String, DefaultHashBuilder> = HashMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a new hash map with `buckets` buckets using the default hasher
    /// builder.
    pub fn with_buckets(buckets: usize) -> Self {
        Self::with_buckets_and_hasher(buckets, S::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter()
            .all(|(key, value)| other.get(key).is_some_and(|v| *value == *v))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for HashMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    /// Returns a reference to the value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, S> Extend<(&'a K, &'a V)> for HashMap<K, V, S>
where
    K: Hash + Eq + Copy,
    V: Copy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs_with_hasher(iter, S::default())
    }
}

impl<K, V, S, const N: usize> From<[(K, V); N]> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_pairs_with_hasher(pairs, S::default())
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashMap<K, V, S> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V> {
    entry: crate::hash_table::VacantEntry<'a, (K, V)>,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V)>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Returns the position of the entry.
    pub fn position(&self) -> Position {
        self.entry.position()
    }

    /// Inserts a value into the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// An iterator over the key-value pairs of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the key-value pairs of a `HashMap`.
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An owning iterator over the key-value pairs of a `HashMap`.
pub struct IntoIter<K, V> {
    inner: crate::hash_table::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}

impl<K, V> FusedIterator for Drain<'_, K, V> {}

#[cfg(test)]
mod tests {
    use core::hash::BuildHasher;
    use core::hash::Hasher;

    use proptest::prelude::*;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Hashes integers to themselves so bucket placement is predictable.
    #[derive(Clone, Default)]
    struct IdentityHashBuilder;

    struct IdentityHasher(u64);

    impl Hasher for IdentityHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.0 = (self.0 << 8) | b as u64;
            }
        }

        fn write_u32(&mut self, n: u32) {
            self.0 = n as u64;
        }

        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }

        fn write_usize(&mut self, n: usize) {
            self.0 = n as u64;
        }
    }

    impl BuildHasher for IdentityHashBuilder {
        type Hasher = IdentityHasher;

        fn build_hasher(&self) -> Self::Hasher {
            IdentityHasher(0)
        }
    }

    fn expected_linear_buckets(n: usize) -> usize {
        let mut buckets = 1usize;
        for len in 0..n {
            if (len + 1) > 3 * buckets {
                buckets += 1;
            }
        }
        buckets
    }

    #[test]
    fn test_new_and_with_hasher() {
        let map: HashMap<i32, String, SipHashBuilder> = HashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.bucket_count(), 1);
        assert_eq!(map.max_load_factor(), 3.0);
        assert_eq!(map.growth_policy(), GrowthPolicy::Linear);

        let map2 = HashMap::<i32, String, _>::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());
    }

    #[test]
    fn test_with_buckets() {
        let map: HashMap<i32, String, SipHashBuilder> = HashMap::with_buckets(100);
        assert_eq!(map.bucket_count(), 100);
        assert!(map.is_empty());

        let map2: HashMap<i32, String, SipHashBuilder> = HashMap::with_buckets(0);
        assert_eq!(map2.bucket_count(), 1);
    }

    #[test]
    fn test_insert_and_get() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        assert_eq!(map.insert(1, "hello".to_string()), None);
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());

        assert_eq!(map.get(&1), Some(&"hello".to_string()));
        assert_eq!(map.get(&2), None);

        assert_eq!(
            map.insert(1, "world".to_string()),
            Some("hello".to_string())
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"world".to_string()));
    }

    #[test]
    fn test_insert_pair() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        assert_eq!(map.insert_pair((3, 'c')), None);
        assert_eq!(map.insert_pair((3, 'd')), Some('c'));
        assert_eq!(map.get_key_value(&3), Some((&3, &'d')));
    }

    #[test]
    fn test_initializer_scenario() {
        let map: HashMap<i32, char, SipHashBuilder> =
            HashMap::from([(1, 'A'), (2, 'B'), (3, 'A'), (4, 'G')]);
        assert_eq!(map.len(), 4);
        assert_eq!(map[&1], 'A');
        assert_eq!(map[&2], 'B');
        assert_eq!(map[&3], 'A');
        assert_eq!(map[&4], 'G');
        // Pre-sized to 4 / 3 = 1 bucket, then the fourth pair grows it.
        assert_eq!(map.bucket_count(), 2);
    }

    #[test]
    fn test_thousand_keys_then_clear() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..1000u32 {
            map.insert(i, char::from_u32(i % 26 + 65).unwrap());
        }
        assert_eq!(map.len(), 1000);
        assert_eq!(map.get(&25), Some(&'Z'));
        assert_eq!(map.get(&26), Some(&'A'));
        assert_eq!(map.bucket_count(), expected_linear_buckets(1000));

        map.clear();
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), 1);
        assert!(!map.contains_key(&1));
    }

    #[test]
    fn test_get_or_insert_default() {
        let mut map: HashMap<&str, Vec<i32>, SipHashBuilder> = HashMap::new();
        map.get_or_insert_default("a").push(1);
        map.get_or_insert_default("a").push(2);
        assert!(map.get_or_insert_default("b").is_empty());
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], vec![1, 2]);
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn test_index_missing_key_panics() {
        let map: HashMap<i32, i32, SipHashBuilder> = HashMap::new();
        let _value = map[&7];
    }

    #[test]
    fn test_get_mut() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        if let Some(value) = map.get_mut(&1) {
            value.push_str(" world");
        }

        assert_eq!(map.get(&1), Some(&"hello world".to_string()));
        assert_eq!(map.get_mut(&2), None);
    }

    #[test]
    fn test_remove() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());
        map.insert(2, "world".to_string());

        assert_eq!(map.remove(&1), Some("hello".to_string()));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));

        assert_eq!(map.remove(&1), None);
        assert_eq!(map.remove(&3), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove_never_shrinks() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..300 {
            map.insert(i, i);
        }
        let buckets = map.bucket_count();
        for i in 0..300 {
            map.remove(&i);
        }
        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), buckets);
    }

    #[test]
    fn test_remove_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        assert_eq!(map.remove_entry(&1), Some((1, "hello".to_string())));
        assert_eq!(map.len(), 0);
        assert_eq!(map.remove_entry(&1), None);
    }

    #[test]
    fn test_rehash() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..50 {
            map.insert(i, i * 3);
        }
        let before: std::collections::HashMap<i32, i32> =
            map.iter().map(|(k, v)| (*k, *v)).collect();

        map.rehash(7).unwrap();
        assert_eq!(map.bucket_count(), 7);
        assert_eq!(map.len(), 50);
        let after: std::collections::HashMap<i32, i32> =
            map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(before, after);

        assert_eq!(map.rehash(0), Err(Error::ZeroBuckets));
        assert_eq!(map.bucket_count(), 7);
    }

    #[test]
    fn test_load_factor_growth_is_linear() {
        let mut map = HashMap::with_hasher(IdentityHashBuilder);
        let mut buckets = map.bucket_count();
        for i in 0..200u64 {
            map.insert(i, ());
            let now = map.bucket_count();
            assert!(now == buckets || now == buckets + 1);
            buckets = now;
        }
        assert_eq!(map.bucket_count(), expected_linear_buckets(200));

        // Updating existing keys never grows.
        for i in 0..200u64 {
            map.insert(i, ());
        }
        assert_eq!(map.bucket_count(), expected_linear_buckets(200));
    }

    #[test]
    fn test_doubling_policy() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.set_growth_policy(GrowthPolicy::Doubling);
        for i in 0..100 {
            map.insert(i, i);
        }
        assert_eq!(map.bucket_count(), 64);
    }

    #[test]
    fn test_set_max_load_factor_is_not_retroactive() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..30 {
            map.insert(i, i);
        }
        let buckets = map.bucket_count();
        map.set_max_load_factor(1.0).unwrap();
        assert_eq!(map.bucket_count(), buckets);
        assert!(map.set_max_load_factor(-2.0).is_err());
        assert_eq!(map.max_load_factor(), 1.0);

        map.insert(30, 30);
        assert_eq!(map.bucket_count(), buckets + 1);
    }

    #[test]
    fn test_colliding_keys_are_prepended() {
        let mut map = HashMap::with_buckets_and_hasher(4, IdentityHashBuilder);
        map.set_max_load_factor(10.0).unwrap();
        for key in [1u64, 5, 9, 13] {
            map.insert(key, key);
        }
        let keys: Vec<u64> = map.keys().copied().collect();
        assert_eq!(keys, vec![13, 9, 5, 1]);
    }

    #[test]
    fn test_iteration_is_bucket_major() {
        let mut map = HashMap::with_buckets_and_hasher(3, IdentityHashBuilder);
        map.set_max_load_factor(10.0).unwrap();
        for key in [2u64, 0, 1, 3, 4] {
            map.insert(key, ());
        }
        let keys: Vec<u64> = map.keys().copied().collect();
        assert_eq!(keys, vec![3, 0, 4, 1, 2]);
    }

    #[test]
    fn test_find_and_positions() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..20 {
            map.insert(i, i * 2);
        }

        let pos = map.find(&7);
        assert!(!pos.is_end());
        assert_eq!(map.get_at(pos), Some((&7, &14)));
        assert!(map.find(&70).is_end());
        assert_eq!(map.find(&70), map.end());

        if let Some((_, value)) = map.get_at_mut(pos) {
            *value = 100;
        }
        assert_eq!(map.get(&7), Some(&100));

        let mut walked = 0;
        let mut cursor = map.begin();
        while cursor != map.end() {
            walked += 1;
            cursor = map.advance(cursor);
        }
        assert_eq!(walked, map.len());
    }

    #[test]
    fn test_remove_at() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            map.insert(i, i);
        }

        let pos = map.find(&4);
        let expected_next = map.get_at(map.advance(pos)).map(|(k, _)| *k);
        let ((key, value), next) = map.remove_at(pos).unwrap();
        assert_eq!((key, value), (4, 4));
        assert_eq!(map.get_at(next).map(|(k, _)| *k), expected_next);
        assert_eq!(map.len(), 9);

        assert_eq!(map.remove_at(pos), Err(Error::StalePosition));
        assert_eq!(map.remove_at(map.end()), Err(Error::EndPosition));
        assert_eq!(map.len(), 9);
    }

    #[test]
    fn test_positions_go_stale_after_insert() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, 1);
        let pos = map.find(&1);
        map.insert(2, 2);
        assert_eq!(map.get_at(pos), None);

        // Updating a present key is not a structural change.
        let pos = map.find(&1);
        map.insert(1, 10);
        assert_eq!(map.get_at(pos), Some((&1, &10)));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut a = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            a.insert(i, i.to_string());
        }
        let mut b = a.clone();
        assert_eq!(a, b);

        a.insert(100, "a".to_string());
        b.remove(&0);
        *b.get_mut(&1).unwrap() = "changed".to_string();

        assert_eq!(a.len(), 11);
        assert_eq!(b.len(), 9);
        assert_eq!(a.get(&0), Some(&"0".to_string()));
        assert_eq!(a.get(&1), Some(&"1".to_string()));
        assert_eq!(b.get(&100), None);
    }

    #[test]
    fn test_clone_from() {
        let mut a = HashMap::with_hasher(SipHashBuilder::default());
        a.insert(1, 1);
        let mut b = HashMap::with_hasher(SipHashBuilder::default());
        b.insert(2, 2);
        b.clone_from(&a);
        assert_eq!(b.len(), 1);
        assert_eq!(b.get(&1), Some(&1));
    }

    #[test]
    fn test_take_leaves_source_empty() {
        let mut a: HashMap<i32, i32, SipHashBuilder> = HashMap::new();
        for i in 0..40 {
            a.insert(i, i);
        }
        let b = core::mem::take(&mut a);
        assert_eq!(b.len(), 40);
        assert_eq!(b.get(&39), Some(&39));
        assert_eq!(a.len(), 0);
        assert!(a.is_empty());
        assert_eq!(a.bucket_count(), 1);

        a.insert(1, 1);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_round_trip_through_pairs() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..64 {
            map.insert(i, i * i);
        }
        let pairs: Vec<(i32, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        let rebuilt: HashMap<i32, i32, SipHashBuilder> = pairs.into_iter().collect();
        assert_eq!(rebuilt, map);
    }

    #[test]
    fn test_equality_ignores_order() {
        let mut a = HashMap::with_buckets_and_hasher(1, IdentityHashBuilder);
        let mut b = HashMap::with_buckets_and_hasher(9, IdentityHashBuilder);
        for i in 0..20u64 {
            a.insert(i, i);
            b.insert(19 - i, 19 - i);
        }
        assert!(!a.iter().eq(b.iter()));
        assert_eq!(a, b);

        b.insert(3, 4);
        assert_ne!(a, b);
        b.remove(&3);
        assert_ne!(a, b);
    }

    #[test]
    fn test_assign_replaces_contents() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..100 {
            map.insert(i, i);
        }
        map.set_growth_policy(GrowthPolicy::Doubling);
        map.assign([(7, 70), (8, 80)]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.bucket_count(), 1);
        assert_eq!(map.get(&7), Some(&70));
        assert!(!map.contains_key(&0));
        assert_eq!(map.growth_policy(), GrowthPolicy::Doubling);
    }

    #[test]
    fn test_extend() {
        let mut map: HashMap<i32, i32, SipHashBuilder> =
            HashMap::with_hasher(SipHashBuilder::default());
        map.extend([(1, 10), (2, 20)]);
        let other: HashMap<i32, i32, SipHashBuilder> = HashMap::from([(3, 30), (1, 11)]);
        map.extend(other.iter());
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&1), Some(&11));
        assert_eq!(map.get(&3), Some(&30));
    }

    #[test]
    fn test_extend_with_tiny_load_factor() {
        let mut map: HashMap<u32, u32, SipHashBuilder> =
            HashMap::with_hasher(SipHashBuilder::default());
        map.set_max_load_factor(1e-30).unwrap();
        map.extend([(1u32, 1u32)]);
        // Pre-sizing stops at one bucket; the insert itself still grows.
        assert_eq!(map.bucket_count(), 2);
        assert_eq!(map.get(&1), Some(&1));

        map.assign((0..100).map(|i| (i, i)));
        assert_eq!(map.len(), 100);
        assert!(map.bucket_count() >= 100);
    }

    #[test]
    fn test_iterators_are_fused() {
        fn assert_fused<I: FusedIterator>(_: &I) {}

        let mut map: HashMap<i32, i32, SipHashBuilder> = HashMap::from([(1, 10)]);
        let mut keys = map.keys();
        assert_fused(&keys);
        assert_eq!(keys.next(), Some(&1));
        assert_eq!(keys.next(), None);
        assert_eq!(keys.next(), None);

        assert_fused(&map.values());
        assert_fused(&map.values_mut());

        let mut drain = map.drain();
        assert_fused(&drain);
        assert_eq!(drain.next(), Some((1, 10)));
        assert_eq!(drain.next(), None);
        assert_eq!(drain.next(), None);
    }

    #[test]
    fn test_retain() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..100 {
            map.insert(i, i);
        }
        map.retain(|k, v| {
            *v += 1;
            k % 3 == 0
        });
        assert_eq!(map.len(), 34);
        assert_eq!(map.get(&3), Some(&4));
        assert_eq!(map.get(&4), None);
    }

    #[test]
    fn test_entry_api() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        let value = map.entry(1).or_insert("hello".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        let value = map.entry(1).or_insert("world".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        map.entry(2).or_insert_with(|| "computed".to_string());
        assert_eq!(map.get(&2), Some(&"computed".to_string()));

        map.entry(1)
            .and_modify(|v| v.push_str(" world"))
            .or_insert("default".to_string());
        assert_eq!(map.get(&1), Some(&"hello world".to_string()));

        assert_eq!(map.entry(3).key(), &3);
    }

    #[test]
    fn test_occupied_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        match map.entry(1) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &1);
                assert_eq!(entry.get(), &"hello".to_string());

                *entry.get_mut() = "world".to_string();
                let old_value = entry.insert("new".to_string());
                assert_eq!(old_value, "world".to_string());

                let (key, value) = entry.remove_entry();
                assert_eq!(key, 1);
                assert_eq!(value, "new".to_string());
            }
            Entry::Vacant(_) => panic!("Expected occupied entry"),
        }

        assert!(map.is_empty());
    }

    #[test]
    fn test_vacant_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        match map.entry(1) {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &1);
                let value = entry.insert("hello".to_string());
                assert_eq!(value, &"hello".to_string());
            }
            Entry::Occupied(_) => panic!("Expected vacant entry"),
        }

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"hello".to_string()));
    }

    #[test]
    fn test_iterators() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string());
        map.insert(2, "two".to_string());
        map.insert(3, "three".to_string());

        assert_eq!(map.iter().len(), 3);
        let pairs: std::collections::HashMap<i32, String> =
            map.iter().map(|(k, v)| (*k, v.clone())).collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs.get(&1), Some(&"one".to_string()));

        let keys: std::collections::HashSet<i32> = map.keys().copied().collect();
        assert_eq!(keys, [1, 2, 3].into_iter().collect());

        for value in map.values_mut() {
            value.push('!');
        }
        let values: std::collections::HashSet<String> = map.values().cloned().collect();
        assert!(values.contains("one!"));
        assert!(values.contains("three!"));

        for (_, value) in &mut map {
            value.pop();
        }
        let owned: std::collections::HashMap<i32, String> = map.into_iter().collect();
        assert_eq!(owned.get(&2), Some(&"two".to_string()));
    }

    #[test]
    fn test_drain() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..30 {
            map.insert(i, i.to_string());
        }
        let buckets = map.bucket_count();

        let drained: std::collections::HashMap<i32, String> = map.drain().collect();
        assert_eq!(drained.len(), 30);
        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), buckets);
        assert_eq!(drained.get(&29), Some(&"29".to_string()));
    }

    #[test]
    fn test_str_lookups_on_string_keys() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        map.insert("hello".to_string(), 1);
        map.insert("world".to_string(), 2);

        assert_eq!(map.get("hello"), Some(&1));
        assert_eq!(map["world"], 2);
        assert!(map.contains_key("world"));
        assert_eq!(map.remove("hello"), Some(1));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_debug_format() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "a");
        assert_eq!(std::format!("{:?}", map), r#"{1: "a"}"#);
    }

    #[derive(Debug, Clone)]
    enum Action {
        Insert(u8, u16),
        Remove(u8),
        Bump(u8),
        Rehash(u8),
    }

    fn action_strategy() -> impl Strategy<Value = Action> {
        prop_oneof![
            4 => (any::<u8>(), any::<u16>()).prop_map(|(k, v)| Action::Insert(k, v)),
            2 => any::<u8>().prop_map(Action::Remove),
            2 => any::<u8>().prop_map(Action::Bump),
            1 => (0u8..40).prop_map(Action::Rehash),
        ]
    }

    fn test_random(actions: impl Iterator<Item = Action>) {
        let mut ours: HashMap<u8, u16, SipHashBuilder> = HashMap::new();
        let mut model = std::collections::HashMap::<u8, u16>::new();

        for action in actions {
            match action {
                Action::Insert(k, v) => {
                    let was_present = model.contains_key(&k);
                    let buckets = ours.bucket_count();
                    let len = ours.len();
                    assert_eq!(ours.insert(k, v), model.insert(k, v));
                    let grows = !was_present && (len + 1) > 3 * buckets;
                    let expected = if grows { buckets + 1 } else { buckets };
                    assert_eq!(ours.bucket_count(), expected);
                }
                Action::Remove(k) => {
                    assert_eq!(ours.remove(&k), model.remove(&k));
                }
                Action::Bump(k) => {
                    let ours_value = ours.get_or_insert_default(k);
                    *ours_value = ours_value.wrapping_add(1);
                    let model_value = model.entry(k).or_default();
                    *model_value = model_value.wrapping_add(1);
                }
                Action::Rehash(n) => {
                    let result = ours.rehash(n as usize);
                    assert_eq!(result.is_err(), n == 0);
                }
            }
            assert_eq!(ours.len(), model.len());
            assert!(ours.bucket_count() >= 1);
        }

        assert_eq!(ours.iter().count(), model.len());
        let mut keys: Vec<u8> = ours.keys().copied().collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), model.len());

        for (k, v) in &model {
            assert_eq!(ours.get(k), Some(v));
        }

        let rebuilt: HashMap<u8, u16, SipHashBuilder> = ours.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(rebuilt, ours);
    }

    proptest! {
        #[test]
        fn random(actions in proptest::collection::vec(action_strategy(), 1..400)) {
            test_random(actions.into_iter());
        }
    }
}
