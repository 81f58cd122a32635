//! # Migration Rules
//!
//! Declarative records for one restructuring step, and the interpreter that
//! applies them to a document root.
//!
//! A rule names its source and destination by [`Location`] relative to the
//! root. Sources that do not exist make the rule a no-op; destinations are
//! created on demand (the final prune removes the ones left empty).
//!
//! Alias priority lives in the data: deprecated aliases are written with
//! [`Write::IfAbsent`] so they never displace a value placed earlier, while
//! the primary field of a chain uses [`Write::Overwrite`] and always wins.

use crate::editor::{self, Write};
use cm_core::{Tree, Value};
use std::fmt;

/// A tree addressed from the document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Root,
    /// Direct child of the root with this name.
    Child(&'static str),
}

impl Location {
    fn find<'t>(self, root: &'t mut Tree) -> Option<&'t mut Tree> {
        match self {
            Self::Root => Some(root),
            Self::Child(name) => root.get_mut(name).and_then(Value::as_tree_mut),
        }
    }

    fn find_ref(self, root: &Tree) -> Option<&Tree> {
        match self {
            Self::Root => Some(root),
            Self::Child(name) => root.get_tree(name),
        }
    }

    fn resolve(self, root: &mut Tree) -> &mut Tree {
        match self {
            Self::Root => root,
            Self::Child(name) => root.tree_or_insert(name),
        }
    }

    fn path(self, key: &str) -> String {
        match self {
            Self::Root => key.to_string(),
            Self::Child(name) => format!("{name}.{key}"),
        }
    }
}

/// Order in which list entries are keyed into the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationRule {
    /// Remove `from_key` from `from` and store it as `to_key` in `to`.
    Move {
        from_key: String,
        to_key: String,
        from: Location,
        to: Location,
        write: Write,
    },
    /// Like `Move` but the source keeps its value.
    Copy {
        from_key: String,
        to_key: String,
        from: Location,
        to: Location,
        write: Write,
    },
    Remove {
        key: String,
        from: Location,
    },
    /// Turn the list `source.list_key` into entries of `target` keyed by the
    /// value of each entry's `id_field`, which is removed from the entry.
    /// Entries without an id stay a list under `target.list_key`.
    KeyList {
        source: Location,
        list_key: String,
        id_field: String,
        target: Location,
        order: ListOrder,
    },
}

impl MigrationRule {
    pub fn move_key(key: impl Into<String>, from: Location, to: Location) -> Self {
        let key = key.into();
        Self::move_renamed(key.clone(), key, from, to)
    }

    pub fn move_renamed(
        from_key: impl Into<String>,
        to_key: impl Into<String>,
        from: Location,
        to: Location,
    ) -> Self {
        Self::Move {
            from_key: from_key.into(),
            to_key: to_key.into(),
            from,
            to,
            write: Write::Overwrite,
        }
    }

    pub fn copy(
        from_key: impl Into<String>,
        to_key: impl Into<String>,
        from: Location,
        to: Location,
    ) -> Self {
        Self::Copy {
            from_key: from_key.into(),
            to_key: to_key.into(),
            from,
            to,
            write: Write::Overwrite,
        }
    }

    pub fn remove(key: impl Into<String>, from: Location) -> Self {
        Self::Remove {
            key: key.into(),
            from,
        }
    }

    pub fn key_list(
        source: Location,
        list_key: impl Into<String>,
        id_field: impl Into<String>,
        target: Location,
    ) -> Self {
        Self::KeyList {
            source,
            list_key: list_key.into(),
            id_field: id_field.into(),
            target,
            order: ListOrder::Forward,
        }
    }

    /// Marks a move or copy as a deprecated alias: it only fills an empty
    /// destination.
    pub fn if_absent(mut self) -> Self {
        if let Self::Move { write, .. } | Self::Copy { write, .. } = &mut self {
            *write = Write::IfAbsent;
        }
        self
    }

    pub fn reversed(mut self) -> Self {
        if let Self::KeyList { order, .. } = &mut self {
            *order = ListOrder::Reverse;
        }
        self
    }

    /// Applies the rule to `root`; returns whether anything changed.
    pub fn apply(&self, root: &mut Tree) -> bool {
        match self {
            Self::Move {
                from_key,
                to_key,
                from,
                to,
                write,
            } => {
                let Some(value) = from.find(root).and_then(|t| editor::take(t, from_key)) else {
                    return false;
                };
                editor::put(to.resolve(root), to_key, value, *write)
            }
            Self::Copy {
                from_key,
                to_key,
                from,
                to,
                write,
            } => {
                let Some(value) = from.find_ref(root).and_then(|t| editor::peek(t, from_key))
                else {
                    return false;
                };
                editor::put(to.resolve(root), to_key, value, *write)
            }
            Self::Remove { key, from } => from
                .find(root)
                .is_some_and(|t| editor::remove_key(key, t)),
            Self::KeyList {
                source,
                list_key,
                id_field,
                target,
                order,
            } => apply_key_list(root, *source, list_key, id_field, *target, *order),
        }
    }
}

fn apply_key_list(
    root: &mut Tree,
    source: Location,
    list_key: &str,
    id_field: &str,
    target: Location,
    order: ListOrder,
) -> bool {
    let Some(mut items) = source.find(root).and_then(|t| t.take_list(list_key)) else {
        return false;
    };
    if order == ListOrder::Reverse {
        items.reverse();
    }

    let mut keyed = 0;
    let mut leftovers = Vec::new();
    for item in items {
        let mut entry = match item {
            Value::Tree(entry) => entry,
            other => {
                leftovers.push(other);
                continue;
            }
        };
        let Some(id) = entry.get(id_field).and_then(Value::to_key_string) else {
            tracing::warn!(
                list = %source.path(list_key),
                id_field,
                kept_as = %target.path(list_key),
                "List entry has no identifier, kept as a list"
            );
            leftovers.push(Value::Tree(entry));
            continue;
        };
        entry.remove(id_field);
        if editor::add_keyed(Some(Value::Tree(entry)), Some(&id), target.resolve(root)) {
            keyed += 1;
        }
    }

    if leftovers.is_empty() {
        return true;
    }
    if order == ListOrder::Reverse {
        leftovers.reverse();
    }
    // The source container is usually removed by the next rule.
    let collection = target.resolve(root);
    match collection.get_mut(list_key) {
        Some(Value::List(existing)) => existing.extend(leftovers),
        _ => {
            collection.insert(list_key, Value::List(leftovers));
        }
    }
    keyed > 0 || source != target
}

impl fmt::Display for MigrationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move {
                from_key,
                to_key,
                from,
                to,
                write,
            }
            | Self::Copy {
                from_key,
                to_key,
                from,
                to,
                write,
            } => {
                let verb = if matches!(self, Self::Move { .. }) {
                    "move"
                } else {
                    "copy"
                };
                write!(f, "{verb} {} -> {}", from.path(from_key), to.path(to_key))?;
                if *write == Write::IfAbsent {
                    f.write_str(" (if absent)")?;
                }
                Ok(())
            }
            Self::Remove { key, from } => write!(f, "remove {}", from.path(key)),
            Self::KeyList {
                source,
                list_key,
                id_field,
                target,
                order,
            } => {
                write!(
                    f,
                    "key {} by {id_field} into {}",
                    source.path(list_key),
                    target.path("*")
                )?;
                if *order == ListOrder::Reverse {
                    f.write_str(" (reverse)")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> Tree {
        Tree::from_json(value).unwrap()
    }

    fn to_json(tree: &Tree) -> serde_json::Value {
        serde_json::to_value(tree).unwrap()
    }

    const APP: Location = Location::Child("application");

    #[test]
    fn test_move_out_of_child() {
        let mut root = tree(json!({"application": {"listenerType": "mixed"}}));

        let rule = MigrationRule::move_key("listenerType", APP, Location::Root);
        assert!(rule.apply(&mut root));

        assert_eq!(root.get_str("listenerType"), Some("mixed"));
        assert!(root.get_tree("application").unwrap().is_empty());
    }

    #[test]
    fn test_missing_source_creates_nothing() {
        let mut root = Tree::new();

        let rule = MigrationRule::move_key("listenerType", APP, Location::Root);
        assert!(!rule.apply(&mut root));
        assert!(!MigrationRule::remove("application", Location::Root).apply(&mut root));

        assert!(root.is_empty());
    }

    #[test]
    fn test_scalar_where_tree_expected_is_no_source() {
        let mut root = tree(json!({"application": "broken"}));

        let rule = MigrationRule::move_key("listenerType", APP, Location::Root);
        assert!(!rule.apply(&mut root));
        assert_eq!(root.get_str("application"), Some("broken"));
    }

    #[test]
    fn test_move_into_created_child() {
        let mut root = tree(json!({"cache": "lucee.Cache"}));

        let rule = MigrationRule::move_renamed(
            "cache",
            "cacheClasses",
            Location::Root,
            Location::Child("caches"),
        );
        assert!(rule.apply(&mut root));

        assert_eq!(to_json(&root), json!({"caches": {"cacheClasses": "lucee.Cache"}}));
    }

    #[test]
    fn test_alias_does_not_displace_earlier_value() {
        let mut root = tree(json!({
            "fileSystem": {"charset": "latin1", "encoding": "utf-16"}
        }));
        let fs = Location::Child("fileSystem");

        MigrationRule::copy("charset", "templateCharset", fs, Location::Root)
            .if_absent()
            .apply(&mut root);
        let second = MigrationRule::copy("encoding", "templateCharset", fs, Location::Root)
            .if_absent()
            .apply(&mut root);

        assert!(!second);
        assert_eq!(root.get_str("templateCharset"), Some("latin1"));
        assert_eq!(root.get_tree("fileSystem").unwrap().len(), 2);
    }

    #[test]
    fn test_primary_overwrites_alias() {
        let mut root = tree(json!({
            "templateCharset": "latin1",
            "charset": {"templateCharset": "utf-8"}
        }));

        let rule = MigrationRule::move_key(
            "templateCharset",
            Location::Child("charset"),
            Location::Root,
        );
        assert!(rule.apply(&mut root));
        assert_eq!(root.get_str("templateCharset"), Some("utf-8"));
    }

    #[test]
    fn test_key_list_extracts_identifier() {
        let mut root = tree(json!({
            "cache": {"connection": [
                {"name": "default", "type": "RAM"},
                {"name": "sessions", "type": "RAM", "storage": "true"}
            ]}
        }));

        let rule = MigrationRule::key_list(
            Location::Child("cache"),
            "connection",
            "name",
            Location::Child("caches"),
        );
        assert!(rule.apply(&mut root));

        assert_eq!(
            to_json(&root),
            json!({
                "cache": {},
                "caches": {
                    "default": {"type": "RAM"},
                    "sessions": {"type": "RAM", "storage": "true"}
                }
            })
        );
    }

    #[test]
    fn test_key_list_reverse_keeps_unkeyed_entries_in_order() {
        let mut root = tree(json!({
            "cacheHandlers": {"cacheHandler": [
                {"id": "request", "class": "a.Request"},
                {"class": "no.Id.First"},
                "stray",
                {"id": "timespan", "class": "a.Timespan"},
                {"class": "no.Id.Second"}
            ]}
        }));
        let handlers = Location::Child("cacheHandlers");

        let rule = MigrationRule::key_list(handlers, "cacheHandler", "id", handlers).reversed();
        assert!(rule.apply(&mut root));

        let handlers = root.get_tree("cacheHandlers").unwrap();
        let keys: Vec<&str> = handlers.keys().collect();
        assert_eq!(keys, vec!["timespan", "request", "cacheHandler"]);
        assert_eq!(
            serde_json::to_value(handlers.get("cacheHandler").unwrap()).unwrap(),
            json!([{"class": "no.Id.First"}, "stray", {"class": "no.Id.Second"}])
        );
    }

    #[test]
    fn test_key_list_unkeyed_entries_follow_the_target() {
        let mut root = tree(json!({
            "cache": {"connection": [
                {"name": "ram", "class": "A"},
                {"class": "NoName"}
            ]},
            "caches": {"connection": [{"class": "Earlier"}]}
        }));

        let rule = MigrationRule::key_list(
            Location::Child("cache"),
            "connection",
            "name",
            Location::Child("caches"),
        );
        assert!(rule.apply(&mut root));

        assert_eq!(
            to_json(&root),
            json!({
                "cache": {},
                "caches": {
                    "connection": [{"class": "Earlier"}, {"class": "NoName"}],
                    "ram": {"class": "A"}
                }
            })
        );
    }

    #[test]
    fn test_key_list_only_unkeyed_entries_still_moves() {
        let mut root = tree(json!({"extTags": {"extTag": [{"class": "NoNameTag"}]}}));

        let rule = MigrationRule::key_list(
            Location::Child("extTags"),
            "extTag",
            "name",
            Location::Child("cfx"),
        );
        assert!(rule.apply(&mut root));

        assert_eq!(
            to_json(&root),
            json!({"extTags": {}, "cfx": {"extTag": [{"class": "NoNameTag"}]}})
        );
    }

    #[test]
    fn test_key_list_single_tree_and_numeric_ids() {
        let mut root = tree(json!({"extTags": {"extTag": {"name": 7, "type": "java"}}}));

        let rule = MigrationRule::key_list(
            Location::Child("extTags"),
            "extTag",
            "name",
            Location::Child("cfx"),
        );
        assert!(rule.apply(&mut root));

        assert_eq!(
            root.get_tree("cfx").and_then(|c| c.get_tree("7")).and_then(|t| t.get_str("type")),
            Some("java")
        );
    }

    #[test]
    fn test_key_list_without_list_is_noop() {
        let mut root = tree(json!({"cache": {"connection": "oops"}}));
        let rule = MigrationRule::key_list(
            Location::Child("cache"),
            "connection",
            "name",
            Location::Child("caches"),
        );
        assert!(!rule.apply(&mut root));
        assert!(!root.contains_key("caches"));
    }

    #[test]
    fn test_display() {
        let rule = MigrationRule::move_renamed(
            "adminSynchronisation",
            "adminSync",
            APP,
            Location::Root,
        )
        .if_absent();
        assert_eq!(
            rule.to_string(),
            "move application.adminSynchronisation -> adminSync (if absent)"
        );
        let list = MigrationRule::key_list(
            Location::Child("cacheHandlers"),
            "cacheHandler",
            "id",
            Location::Child("cacheHandlers"),
        )
        .reversed();
        assert_eq!(
            list.to_string(),
            "key cacheHandlers.cacheHandler by id into cacheHandlers.* (reverse)"
        );
    }
}
