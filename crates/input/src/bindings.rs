use crate::action::{Action, ActionSnapshot};
use std::collections::HashMap;
use std::hash::Hash;

/// Maps platform keys to actions. Several keys may share one action.
///
/// Generic over the key type so this crate stays independent of the
/// windowing library; the desktop app instantiates it with its key codes.
#[derive(Debug, Clone)]
pub struct KeyBindings<K> {
    map: HashMap<K, Action>,
}

impl<K: Eq + Hash + Copy> KeyBindings<K> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Bind `key` to `action`, replacing any previous binding of that key.
    pub fn bind(mut self, key: K, action: Action) -> Self {
        self.map.insert(key, action);
        self
    }

    pub fn action_for(&self, key: &K) -> Option<Action> {
        self.map.get(key).copied()
    }

    pub fn is_bound(&self, action: Action) -> bool {
        self.map.values().any(|a| *a == action)
    }

    /// Freeze the currently held keys into a snapshot. Unbound keys are ignored.
    pub fn snapshot<'a, I>(&self, held: I) -> ActionSnapshot
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        held.into_iter()
            .filter_map(|k| self.action_for(k))
            .collect()
    }
}

impl<K: Eq + Hash + Copy> Default for KeyBindings<K> {
    fn default() -> Self {
        Self::new()
    }
}
