//! Resource arena: loaded GPU-side resources addressed by small integer keys

use std::collections::HashMap;
use std::fmt;

/// Stable handle to a loaded resource. Keys are never reused, so a key whose
/// resource was unloaded stays dangling rather than aliasing a newer one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(u32);

impl ResourceKey {
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceKey({})", self.0)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Slot<R> {
    name: String,
    resource: R,
}

/// Arena of loaded resources, keyed by load order, with a name index
pub struct ResourceTable<R> {
    slots: Vec<Option<Slot<R>>>,
    by_name: HashMap<String, ResourceKey>,
}

impl<R> Default for ResourceTable<R> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<R> ResourceTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a resource and assign it a fresh key. Loading under a name that
    /// is already present unloads the previous resource first.
    pub fn load(&mut self, name: &str, resource: R) -> ResourceKey {
        if let Some(old) = self.by_name.get(name).copied() {
            log::debug!("Replacing resource '{name}' ({old})");
            self.unload(old);
        }
        let key = ResourceKey(self.slots.len() as u32);
        self.slots.push(Some(Slot {
            name: name.to_string(),
            resource,
        }));
        self.by_name.insert(name.to_string(), key);
        key
    }

    pub fn get(&self, key: ResourceKey) -> Option<&R> {
        self.slots
            .get(key.0 as usize)
            .and_then(|slot| slot.as_ref())
            .map(|slot| &slot.resource)
    }

    pub fn get_mut(&mut self, key: ResourceKey) -> Option<&mut R> {
        self.slots
            .get_mut(key.0 as usize)
            .and_then(|slot| slot.as_mut())
            .map(|slot| &mut slot.resource)
    }

    /// Key of the live resource loaded under `name`
    pub fn lookup(&self, name: &str) -> Option<ResourceKey> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, key: ResourceKey) -> Option<&str> {
        self.slots
            .get(key.0 as usize)
            .and_then(|slot| slot.as_ref())
            .map(|slot| slot.name.as_str())
    }

    /// Remove a resource, returning it. The key stays dangling.
    pub fn unload(&mut self, key: ResourceKey) -> Option<R> {
        let slot = self.slots.get_mut(key.0 as usize)?.take()?;
        self.by_name.remove(&slot.name);
        Some(slot.resource)
    }

    /// Number of live resources
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_follow_load_order() {
        let mut table = ResourceTable::new();
        let a = table.load("crate", 1);
        let b = table.load("barrel", 2);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(table.get(b), Some(&2));
        assert_eq!(table.lookup("crate"), Some(a));
        assert_eq!(table.name(a), Some("crate"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_unloaded_key_dangles() {
        let mut table = ResourceTable::new();
        let a = table.load("crate", 1);
        assert_eq!(table.unload(a), Some(1));
        assert_eq!(table.get(a), None);
        assert_eq!(table.lookup("crate"), None);
        assert_eq!(table.unload(a), None);
        assert!(table.is_empty());

        let b = table.load("crate", 3);
        assert_ne!(a, b);
        assert_eq!(table.get(a), None);
    }

    #[test]
    fn test_reloading_a_name_replaces_it() {
        let mut table = ResourceTable::new();
        let old = table.load("skybox", "day");
        let new = table.load("skybox", "night");
        assert_eq!(table.get(old), None);
        assert_eq!(table.get(new), Some(&"night"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_get_mut_edits_in_place() {
        let mut table = ResourceTable::new();
        let key = table.load("counter", 0u32);
        if let Some(value) = table.get_mut(key) {
            *value += 5;
        }
        assert_eq!(table.get(key), Some(&5));
        assert_eq!(table.get(ResourceKey(99)), None);
    }
}
