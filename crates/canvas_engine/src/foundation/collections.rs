//! Specialized collection types
//!
//! - [`DynamicBuffer`]: growable packed array backing the render command stream
//! - [`HashFactory`]: append-only interning table (content key -> small id)
//! - [`ItemCache`]: name <-> id mapping for assets that arrive asynchronously

use std::collections::HashMap;
use std::hash::Hash;

/// Default initial capacity for dynamic buffers
const DEFAULT_BUFFER_CAPACITY: usize = 256;

/// Growable typed array of plain-old-data values
///
/// Growth doubles the capacity, and `clear` keeps the allocation so a buffer
/// reused every frame stops allocating once it has seen its peak size.
#[derive(Debug, Clone)]
pub struct DynamicBuffer<T: bytemuck::Pod> {
    data: Vec<T>,
}

impl<T: bytemuck::Pod> DynamicBuffer<T> {
    /// Create a buffer with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Create a buffer with a given initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity.max(1)) }
    }

    /// Append a value, doubling capacity when full
    pub fn push(&mut self, value: T) {
        self.reserve_for(1);
        self.data.push(value);
    }

    /// Append a slice of values
    pub fn extend_from_slice(&mut self, values: &[T]) {
        self.reserve_for(values.len());
        self.data.extend_from_slice(values);
    }

    fn reserve_for(&mut self, additional: usize) {
        let needed = self.data.len() + additional;
        if needed > self.data.capacity() {
            let mut capacity = self.data.capacity().max(1);
            while capacity < needed {
                capacity *= 2;
            }
            self.data.reserve_exact(capacity - self.data.len());
        }
    }

    /// Value at index
    pub fn get(&self, index: usize) -> Option<T> {
        self.data.get(index).copied()
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the buffer holds no values
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remove all values, keeping the allocation
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Allocated capacity in values
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Values as a slice
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Raw byte view of the stored values
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Size of the stored values in bytes
    pub fn byte_len(&self) -> usize {
        self.as_bytes().len()
    }
}

impl<T: bytemuck::Pod> Default for DynamicBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Append-only interning table
///
/// Maps a content key to a small sequential id; the value for a key is built
/// once, on first sight. Ids are never reused or evicted.
#[derive(Debug, Clone)]
pub struct HashFactory<K, V> {
    ids: HashMap<K, u32>,
    values: Vec<V>,
}

impl<K: Hash + Eq, V> HashFactory<K, V> {
    /// Create an empty factory
    pub fn new() -> Self {
        Self { ids: HashMap::new(), values: Vec::new() }
    }

    /// Id for `key`, building its value with `make` when first seen
    pub fn intern(&mut self, key: K, make: impl FnOnce(&K) -> V) -> u32 {
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = u32::try_from(self.values.len()).unwrap_or(u32::MAX);
        self.values.push(make(&key));
        self.ids.insert(key, id);
        id
    }

    /// Id of a previously interned key
    pub fn id_of(&self, key: &K) -> Option<u32> {
        self.ids.get(key).copied()
    }

    /// Value for an id
    pub fn get(&self, id: u32) -> Option<&V> {
        self.values.get(id as usize)
    }

    /// Number of interned entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing has been interned
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Hash + Eq, V> Default for HashFactory<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Load state of one cache slot
#[derive(Debug, Clone)]
enum Slot<V> {
    Pending,
    Loaded(V),
    Failed,
}

/// Name-addressed cache whose values may arrive later
///
/// Reserving a name hands out a stable id immediately; lookups by id return
/// `None` until a value is inserted. A failed slot stays failed.
#[derive(Debug, Clone)]
pub struct ItemCache<V> {
    ids: HashMap<String, u32>,
    names: Vec<String>,
    slots: Vec<Slot<V>>,
}

impl<V> ItemCache<V> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self { ids: HashMap::new(), names: Vec::new(), slots: Vec::new() }
    }

    /// Id for `name`, allocating a pending slot on first use
    pub fn reserve(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.ids.insert(name.to_string(), id);
        self.names.push(name.to_string());
        self.slots.push(Slot::Pending);
        id
    }

    /// Id previously reserved for `name`
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Name that owns `id`
    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    /// Store a value; a slot that already holds a value or failed is left alone
    ///
    /// Returns true when the value was stored.
    pub fn insert(&mut self, name: &str, value: V) -> bool {
        let id = self.reserve(name);
        let slot = &mut self.slots[id as usize];
        if matches!(slot, Slot::Pending) {
            *slot = Slot::Loaded(value);
            true
        } else {
            false
        }
    }

    /// Mark a pending slot as permanently failed
    pub fn mark_failed(&mut self, name: &str) {
        let id = self.reserve(name);
        let slot = &mut self.slots[id as usize];
        if matches!(slot, Slot::Pending) {
            *slot = Slot::Failed;
        }
    }

    /// Loaded value for an id
    pub fn get(&self, id: u32) -> Option<&V> {
        match self.slots.get(id as usize) {
            Some(Slot::Loaded(value)) => Some(value),
            _ => None,
        }
    }

    /// True while `id` is reserved, whatever its load state
    pub fn contains_id(&self, id: u32) -> bool {
        (id as usize) < self.slots.len()
    }

    /// Loaded value by name
    pub fn get_by_name(&self, name: &str) -> Option<&V> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    /// True once a value is present for `name`
    pub fn is_loaded(&self, name: &str) -> bool {
        self.get_by_name(name).is_some()
    }

    /// True when `name` failed to load
    pub fn is_failed(&self, name: &str) -> bool {
        self.id_of(name)
            .and_then(|id| self.slots.get(id as usize))
            .is_some_and(|slot| matches!(slot, Slot::Failed))
    }

    /// True when `name` is reserved but neither loaded nor failed
    pub fn is_pending(&self, name: &str) -> bool {
        self.id_of(name)
            .and_then(|id| self.slots.get(id as usize))
            .is_some_and(|slot| matches!(slot, Slot::Pending))
    }

    /// Number of reserved slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when nothing was reserved
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Forget every slot
    pub fn clear(&mut self) {
        self.ids.clear();
        self.names.clear();
        self.slots.clear();
    }
}

impl<V> Default for ItemCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_buffer_growth_doubles() {
        let mut buffer: DynamicBuffer<f32> = DynamicBuffer::with_capacity(4);
        assert!(buffer.capacity() >= 4);
        for i in 0..5 {
            buffer.push(i as f32);
        }
        assert_eq!(buffer.len(), 5);
        assert!(buffer.capacity() >= 8);
        assert_eq!(buffer.get(4), Some(4.0));
        assert_eq!(buffer.get(5), None);
        assert_eq!(buffer.byte_len(), 5 * std::mem::size_of::<f32>());
    }

    #[test]
    fn test_dynamic_buffer_clear_keeps_capacity() {
        let mut buffer: DynamicBuffer<u8> = DynamicBuffer::with_capacity(2);
        buffer.extend_from_slice(&[1, 2, 3, 4, 5]);
        let capacity = buffer.capacity();
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), capacity);
        assert_eq!(buffer.as_bytes(), &[] as &[u8]);
    }

    #[test]
    fn test_hash_factory_interns_by_key() {
        let mut factory: HashFactory<String, usize> = HashFactory::new();
        let a = factory.intern("red".to_string(), |k| k.len());
        let b = factory.intern("blue".to_string(), |k| k.len());
        let c = factory.intern("red".to_string(), |_| unreachable!());
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(factory.len(), 2);
        assert_eq!(factory.get(b), Some(&4));
        assert_eq!(factory.id_of(&"blue".to_string()), Some(b));
        assert_eq!(factory.get(99), None);
    }

    #[test]
    fn test_item_cache_lifecycle() {
        let mut cache: ItemCache<u32> = ItemCache::new();
        let id = cache.reserve("grass");
        assert_eq!(cache.reserve("grass"), id);
        assert!(cache.is_pending("grass"));
        assert_eq!(cache.get(id), None);

        assert!(cache.insert("grass", 7));
        assert!(cache.is_loaded("grass"));
        assert_eq!(cache.get(id), Some(&7));
        // second load of the same name is a no-op
        assert!(!cache.insert("grass", 9));
        assert_eq!(cache.get(id), Some(&7));
        assert_eq!(cache.name_of(id), Some("grass"));
    }

    #[test]
    fn test_item_cache_failure_is_permanent() {
        let mut cache: ItemCache<u32> = ItemCache::new();
        let id = cache.reserve("missing");
        cache.mark_failed("missing");
        assert!(cache.is_failed("missing"));
        assert!(!cache.insert("missing", 1));
        assert_eq!(cache.get(id), None);
        assert!(!cache.is_pending("missing"));
    }
}
