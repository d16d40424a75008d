use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Default)]
pub struct JoinOrderedMap<K, V> {
    map: HashMap<K, V>,
    // Keys in insertion order; the grid renders tiles in the order their
    // participants joined, so nothing here ever sorts.
    keys: Vec<K>,
}

//
// Only implementing the methods that are needed in tile_set
//
impl<K: Eq + Hash + Clone, V> JoinOrderedMap<K, V> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            keys: vec![],
        }
    }

    //
    // Delegated methods
    //

    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(k)
    }

    pub fn get_mut<Q>(&mut self, k: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get_mut(k)
    }

    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(k)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    //
    // Delegated methods with extra handling to maintain the join order
    //

    pub fn insert(&mut self, k: K, v: V) -> Option<V> {
        self.map.insert(k.clone(), v).or_else(|| {
            self.keys.push(k);
            None
        })
    }

    pub fn remove<Q>(&mut self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.map.remove(k);
        if removed.is_some() {
            self.keys.retain(|key| key.borrow() != k);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.keys.clear();
    }

    //
    // Iteration
    //

    /// Entries in join order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.keys
            .iter()
            .filter_map(move |k| self.map.get(k).map(|v| (k, v)))
    }

    /// Values in arbitrary order, for whole-set flag sweeps where the join
    /// order is irrelevant.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.map.values_mut()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.map.values()
    }
}
