//! # Section Tables
//!
//! The fixed, ordered rule tables that turn a legacy document into the flat
//! current layout. Each section reads from its legacy container, writes to
//! the root (or to a keyed collection) and then drops the container.
//!
//! Order matters in two places:
//! - sections run in the order returned by [`sections`];
//! - inside a section, alias rules come before the primary rule of the same
//!   destination, so the primary always has the last word.

use crate::rules::{Location, MigrationRule};
use cm_core::Tree;
use serde::{Deserialize, Serialize};

const ROOT: Location = Location::Root;
const CHARSET: Location = Location::Child("charset");
const FILE_SYSTEM: Location = Location::Child("fileSystem");
const REGIONAL: Location = Location::Child("regional");
const APPLICATION: Location = Location::Child("application");
const SCOPE: Location = Location::Child("scope");
const CACHE: Location = Location::Child("cache");
const CACHES: Location = Location::Child("caches");
const CACHE_HANDLERS: Location = Location::Child("cacheHandlers");
const EXT_TAGS: Location = Location::Child("extTags");
const CFX: Location = Location::Child("cfx");
const COMPILER: Location = Location::Child("compiler");

/// Cache types that have a `cachedWithin<Type>` application setting.
pub const STRING_CACHE_TYPES: &[&str] = &[
    "function",
    "include",
    "query",
    "resource",
    "http",
    "file",
    "webservice",
];

/// Cache types that have a `default<Type>` cache assignment.
pub const STRING_CACHE_TYPES_MAX: &[&str] = &[
    "resource",
    "function",
    "include",
    "query",
    "template",
    "object",
    "file",
    "http",
    "webservice",
];

/// Cache type names that expand into per-type field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheTypes {
    /// Feeds `cachedWithin<Type>`.
    pub within: Vec<String>,
    /// Feeds `default<Type>`.
    pub defaults: Vec<String>,
}

impl Default for CacheTypes {
    fn default() -> Self {
        Self {
            within: STRING_CACHE_TYPES.iter().map(|s| (*s).to_string()).collect(),
            defaults: STRING_CACHE_TYPES_MAX
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Uppercases the first character: `query` becomes `Query`.
pub fn ucfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A named group of rules migrated as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: &'static str,
    pub rules: Vec<MigrationRule>,
}

impl Section {
    /// Runs every rule in order; returns how many changed the tree.
    pub fn apply(&self, root: &mut Tree) -> usize {
        let mut changes = 0;
        for rule in &self.rules {
            if rule.apply(root) {
                tracing::trace!(section = self.name, rule = %rule, "Rule applied");
                changes += 1;
            }
        }
        changes
    }
}

/// All sections in execution order.
pub fn sections(cache_types: &CacheTypes) -> Vec<Section> {
    vec![
        charset(),
        regional(),
        application(cache_types),
        caches(cache_types),
        cache_handlers(),
        cfx(),
        compiler(),
    ]
}

fn charset() -> Section {
    Section {
        name: "charset",
        rules: vec![
            MigrationRule::move_key("templateCharset", FILE_SYSTEM, ROOT).if_absent(),
            MigrationRule::copy("charset", "templateCharset", FILE_SYSTEM, ROOT).if_absent(),
            MigrationRule::copy("encoding", "templateCharset", FILE_SYSTEM, ROOT).if_absent(),
            MigrationRule::move_key("templateCharset", CHARSET, ROOT),
            MigrationRule::move_renamed("charset", "webCharset", CHARSET, ROOT).if_absent(),
            MigrationRule::copy("encoding", "webCharset", FILE_SYSTEM, ROOT).if_absent(),
            MigrationRule::copy("defaultEncoding", "webCharset", REGIONAL, ROOT).if_absent(),
            MigrationRule::move_key("webCharset", CHARSET, ROOT),
            MigrationRule::copy("charset", "resourceCharset", FILE_SYSTEM, ROOT).if_absent(),
            MigrationRule::copy("encoding", "resourceCharset", FILE_SYSTEM, ROOT).if_absent(),
            MigrationRule::move_key("resourceCharset", CHARSET, ROOT),
            MigrationRule::remove("charset", ROOT),
        ],
    }
}

fn regional() -> Section {
    Section {
        name: "regional",
        rules: vec![
            MigrationRule::move_key("timezone", REGIONAL, ROOT),
            MigrationRule::move_key("locale", REGIONAL, ROOT),
            MigrationRule::move_key("timeserver", REGIONAL, ROOT),
            MigrationRule::move_key("useTimeserver", REGIONAL, ROOT),
            MigrationRule::remove("regional", ROOT),
        ],
    }
}

fn application(cache_types: &CacheTypes) -> Section {
    let mut rules = vec![
        MigrationRule::move_key("listenerType", APPLICATION, ROOT),
        MigrationRule::move_key("listenerMode", APPLICATION, ROOT),
        MigrationRule::move_key("typeChecking", APPLICATION, ROOT),
        MigrationRule::move_key("cachedAfter", APPLICATION, ROOT),
    ];
    rules.extend(
        cache_types
            .within
            .iter()
            .map(|t| MigrationRule::move_key(format!("cachedWithin{}", ucfirst(t)), APPLICATION, ROOT)),
    );
    rules.extend([
        MigrationRule::move_renamed("allowUrlRequesttimeout", "requestTimeoutInURL", APPLICATION, ROOT),
        MigrationRule::move_renamed("requesttimeout", "requestTimeout", SCOPE, ROOT).if_absent(),
        MigrationRule::move_renamed("requesttimeout", "requestTimeout", APPLICATION, ROOT),
        MigrationRule::move_key("scriptProtect", APPLICATION, ROOT),
        MigrationRule::move_key("classicDateParsing", APPLICATION, ROOT),
        MigrationRule::move_key("cacheDirectory", APPLICATION, ROOT),
        MigrationRule::move_key("cacheDirectoryMaxSize", APPLICATION, ROOT),
        MigrationRule::move_renamed("adminSynchronisation", "adminSync", APPLICATION, ROOT).if_absent(),
        MigrationRule::move_key("adminSync", APPLICATION, ROOT),
        MigrationRule::remove("application", ROOT),
    ]);
    Section {
        name: "application",
        rules,
    }
}

fn caches(cache_types: &CacheTypes) -> Section {
    let mut rules = vec![MigrationRule::move_renamed("cache", "cacheClasses", CACHES, ROOT)];
    rules.extend(
        cache_types
            .defaults
            .iter()
            .map(|t| MigrationRule::move_key(format!("default{}", ucfirst(t)), CACHE, ROOT)),
    );
    rules.extend([
        MigrationRule::key_list(CACHE, "connection", "name", CACHES),
        MigrationRule::remove("cache", ROOT),
    ]);
    Section {
        name: "caches",
        rules,
    }
}

fn cache_handlers() -> Section {
    Section {
        name: "cacheHandlers",
        rules: vec![
            MigrationRule::key_list(CACHE_HANDLERS, "cacheHandler", "id", CACHE_HANDLERS).reversed(),
        ],
    }
}

fn cfx() -> Section {
    Section {
        name: "cfx",
        rules: vec![
            MigrationRule::key_list(EXT_TAGS, "extTag", "name", CFX),
            MigrationRule::remove("extTags", ROOT),
        ],
    }
}

fn compiler() -> Section {
    Section {
        name: "compiler",
        rules: vec![
            MigrationRule::move_renamed(
                "supressWsBeforeArg",
                "suppressWhitespaceBeforeArgument",
                COMPILER,
                ROOT,
            )
            .if_absent(),
            MigrationRule::move_renamed(
                "suppressWsBeforeArg",
                "suppressWhitespaceBeforeArgument",
                COMPILER,
                ROOT,
            ),
            MigrationRule::move_key("dotNotationUpperCase", COMPILER, ROOT),
            MigrationRule::move_renamed("fullNullSupport", "nullSupport", COMPILER, ROOT),
            MigrationRule::move_key("defaultFunctionOutput", COMPILER, ROOT),
            MigrationRule::move_key("externalizeStringGte", COMPILER, ROOT),
            MigrationRule::move_key("allowLuceeDialect", COMPILER, ROOT),
            MigrationRule::move_key("handleUnquotedAttributeValueAsString", COMPILER, ROOT),
            MigrationRule::remove("compiler", ROOT),
        ],
    }
}
