//! # Tree Editor
//!
//! Primitive mutations used by the migration rules. Every operation is
//! total: a missing key is a no-op, never an error. Each returns whether
//! the tree changed so callers can report what a rule did.
//!
//! The two-tree forms (`move_key`, `copy_key`, ...) need disjoint borrows.
//! When source and destination are nested in one another, use [`take`],
//! [`peek`] and [`put`] one after the other instead.

use cm_core::{Tree, Value};

/// What `put` does when the destination key is already set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    /// Replace any existing value.
    Overwrite,
    /// Keep an existing value and drop the new one.
    IfAbsent,
}

/// Removes and returns `key` from `from`.
pub fn take(from: &mut Tree, key: &str) -> Option<Value> {
    from.remove(key)
}

/// Clones `key` out of `from`, leaving it in place.
pub fn peek(from: &Tree, key: &str) -> Option<Value> {
    from.get(key).cloned()
}

/// Stores `value` under `key` according to `write`.
pub fn put(to: &mut Tree, key: &str, value: Value, write: Write) -> bool {
    if write == Write::IfAbsent && to.contains_key(key) {
        return false;
    }
    to.insert(key, value);
    true
}

pub fn move_key(key: &str, from: &mut Tree, to: &mut Tree) -> bool {
    move_renamed(key, key, from, to)
}

pub fn move_renamed(from_key: &str, to_key: &str, from: &mut Tree, to: &mut Tree) -> bool {
    match take(from, from_key) {
        Some(value) => put(to, to_key, value, Write::Overwrite),
        None => false,
    }
}

pub fn copy_key(from_key: &str, to_key: &str, from: &Tree, to: &mut Tree) -> bool {
    match peek(from, from_key) {
        Some(value) => put(to, to_key, value, Write::Overwrite),
        None => false,
    }
}

pub fn remove_key(key: &str, tree: &mut Tree) -> bool {
    tree.remove(key).is_some()
}

/// Inserts `item` into `collection` under `key`. Both must be present.
pub fn add_keyed(item: Option<Value>, key: Option<&str>, collection: &mut Tree) -> bool {
    match (item, key) {
        (Some(item), Some(key)) => {
            collection.insert(key, item);
            true
        }
        _ => false,
    }
}

/// Removes, bottom-up, every nested tree left empty once its own children
/// have been pruned. Lists are kept, even when empty; trees inside them
/// are pruned but never removed from the list.
///
/// Returns whether anything was removed. A second call is a no-op.
pub fn prune_empty(tree: &mut Tree) -> bool {
    let mut changed = false;
    for value in tree.values_mut() {
        changed |= prune_value(value);
    }
    let before = tree.len();
    tree.retain(|_, value| !matches!(value, Value::Tree(sub) if sub.is_empty()));
    changed || tree.len() != before
}

fn prune_value(value: &mut Value) -> bool {
    match value {
        Value::Tree(sub) => prune_empty(sub),
        Value::List(items) => items.iter_mut().fold(false, |changed, item| {
            let pruned = match item {
                Value::Tree(sub) => prune_empty(sub),
                Value::List(_) => prune_value(item),
                Value::Scalar(_) => false,
            };
            changed | pruned
        }),
        Value::Scalar(_) => false,
    }
}
