use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Pointer,
    Resize,
}

#[derive(Debug, Default)]
struct ListenerTable {
    next_id: u64,
    active: HashMap<u64, ListenerKind>,
}

/// Live input listeners. Intake systems forward events only while at least
/// one subscription of the matching kind is held.
#[derive(Resource, Debug, Clone, Default)]
pub struct ListenerRegistry {
    table: Arc<Mutex<ListenerTable>>,
}

impl ListenerRegistry {
    pub fn subscribe(&self, kind: ListenerKind) -> Subscription {
        let id = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            let id = table.next_id;
            table.next_id += 1;
            table.active.insert(id, kind);
            id
        };
        debug!("Listener {id} acquired ({kind:?})");
        Subscription {
            id,
            kind,
            table: Arc::downgrade(&self.table),
        }
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.count(kind) > 0
    }

    pub fn count(&self, kind: ListenerKind) -> usize {
        self.table
            .lock()
            .map(|table| table.active.values().filter(|&&k| k == kind).count())
            .unwrap_or(0)
    }
}

/// Scoped listener handle. Dropping it deregisters the listener, whichever
/// way the owner goes away.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    kind: ListenerKind,
    table: Weak<Mutex<ListenerTable>>,
}

impl Subscription {
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(table) = self.table.upgrade() else {
            return;
        };
        let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);
        table.active.remove(&self.id);
        debug!("Listener {} released ({:?})", self.id, self.kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_a_subscription_releases_it() {
        let registry = ListenerRegistry::default();
        let pointer = registry.subscribe(ListenerKind::Pointer);
        let resize = registry.subscribe(ListenerKind::Resize);
        assert!(registry.is_listening(ListenerKind::Pointer));
        assert!(registry.is_listening(ListenerKind::Resize));

        drop(pointer);
        assert!(!registry.is_listening(ListenerKind::Pointer));
        assert_eq!(registry.count(ListenerKind::Resize), 1);
        assert_eq!(resize.kind(), ListenerKind::Resize);
    }

    #[test]
    fn subscriptions_are_released_on_early_exit() {
        let registry = ListenerRegistry::default();

        fn failing_mount(registry: &ListenerRegistry) -> Result<Vec<Subscription>, String> {
            let held = vec![registry.subscribe(ListenerKind::Pointer)];
            if held.len() == 1 {
                return Err("scene failed".into());
            }
            Ok(held)
        }

        assert!(failing_mount(&registry).is_err());
        assert!(!registry.is_listening(ListenerKind::Pointer));
    }

    #[test]
    fn guard_outliving_the_registry_is_harmless() {
        let registry = ListenerRegistry::default();
        let guard = registry.subscribe(ListenerKind::Pointer);
        drop(registry);
        drop(guard);
    }
}
