//! Handle and identifier types for arena-backed storage

use std::fmt;

pub use slotmap::{SecondaryMap, SlotMap};

slotmap::new_key_type! {
    /// Generation-checked handle to an object stored in a scene arena.
    ///
    /// Keys are non-owning: holding one never keeps an object alive, and a
    /// key whose object has been destroyed simply stops resolving.
    pub struct ObjectKey;
}

/// Opaque object identifier assigned by an external allocator
///
/// The scene never generates these; it stores whatever the caller hands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Raw numeric value
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ObjectId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_key_does_not_resolve() {
        let mut arena: SlotMap<ObjectKey, u32> = SlotMap::with_key();
        let key = arena.insert(7);
        arena.remove(key);
        let reused = arena.insert(8);

        assert!(arena.get(key).is_none());
        assert_eq!(arena.get(reused), Some(&8));
    }

    #[test]
    fn test_object_id_display() {
        assert_eq!(ObjectId::from(42).to_string(), "#42");
        assert_eq!(ObjectId(3).get(), 3);
    }
}
