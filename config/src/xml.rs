//! # Legacy Markup Reader
//!
//! Maps a legacy XML configuration document onto a [`Tree`]. Tokenizing is
//! left to `quick-xml`; this module only decides the shape:
//!
//! - every element becomes a nested tree under its (renamed) tag name
//! - attributes become string scalars of that tree
//! - an element with nothing but text becomes a string scalar
//! - repeated sibling elements, and elements named by the read rule, become
//!   lists of trees
//!
//! Names are converted from dashed to camel case (`use-timeserver` becomes
//! `useTimeserver`).

use cm_core::{DocumentReader, Tree, Value};
use errors::ConfigError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashSet;
use std::path::Path;

/// Elements that are always read as lists, even when they occur once.
const DEFAULT_LIST_ELEMENTS: &[&str] = &[
    "cacheHandler",
    "component",
    "connection",
    "customTag",
    "dataSource",
    "debugEntry",
    "extTag",
    "gateway",
    "label",
    "logger",
    "mapping",
    "resourceProvider",
    "rhextension",
];

/// Converts `dashed-name` to `dashedName`. Names without dashes are kept.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '-' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

struct Frame {
    name: String,
    tree: Tree,
    text: String,
    has_children: bool,
}

/// `DocumentReader` for the legacy XML format.
#[derive(Debug, Clone)]
pub struct XmlDocumentReader {
    list_elements: HashSet<String>,
}

impl Default for XmlDocumentReader {
    fn default() -> Self {
        Self {
            list_elements: DEFAULT_LIST_ELEMENTS
                .iter()
                .map(|name| name.to_ascii_lowercase())
                .collect(),
        }
    }
}

impl XmlDocumentReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an element name (after renaming) to the always-a-list rule.
    pub fn with_list_element(mut self, name: &str) -> Self {
        self.list_elements.insert(name.to_ascii_lowercase());
        self
    }

    fn is_list_element(&self, name: &str) -> bool {
        self.list_elements.contains(&name.to_ascii_lowercase())
    }

    fn open(&self, path: &Path, start: &BytesStart<'_>) -> Result<Frame, ConfigError> {
        let raw = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut tree = Tree::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ConfigError::parse(path, e))?;
            let key = camel_case(&String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr
                .unescape_value()
                .map_err(|e| ConfigError::parse(path, e))?;
            tree.insert(key, Value::string(value.into_owned()));
        }
        Ok(Frame {
            name: camel_case(&raw),
            tree,
            text: String::new(),
            has_children: false,
        })
    }

    fn attach(&self, parent: &mut Tree, frame: Frame) {
        let text = frame.text.trim();
        let value = if frame.tree.is_empty() && !frame.has_children && !text.is_empty() {
            Value::string(text)
        } else {
            Value::Tree(frame.tree)
        };

        let existing = parent.remove(&frame.name);
        let merged = match existing {
            Some(Value::List(mut items)) => {
                items.push(value);
                Value::List(items)
            }
            Some(previous) => Value::List(vec![previous, value]),
            None if self.is_list_element(&frame.name) => Value::List(vec![value]),
            None => value,
        };
        parent.insert(frame.name, merged);
    }
}

impl DocumentReader for XmlDocumentReader {
    fn parse(&self, path: &Path, text: &str) -> Result<Tree, ConfigError> {
        let mut reader = Reader::from_str(text);
        reader.trim_text(true);

        let mut document = Tree::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut seen_root = false;

        loop {
            let event = reader.read_event().map_err(|e| {
                ConfigError::parse(
                    path,
                    format!("{e} at position {}", reader.buffer_position()),
                )
            })?;

            match event {
                Event::Start(start) => {
                    if stack.is_empty() && seen_root {
                        return Err(ConfigError::parse(path, "multiple root elements"));
                    }
                    let frame = self.open(path, &start)?;
                    if let Some(parent) = stack.last_mut() {
                        parent.has_children = true;
                    }
                    stack.push(frame);
                }
                Event::Empty(start) => {
                    if stack.is_empty() && seen_root {
                        return Err(ConfigError::parse(path, "multiple root elements"));
                    }
                    let frame = self.open(path, &start)?;
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.has_children = true;
                            self.attach(&mut parent.tree, frame);
                        }
                        None => {
                            seen_root = true;
                            self.attach(&mut document, frame);
                        }
                    }
                }
                Event::End(_) => {
                    let frame = stack
                        .pop()
                        .ok_or_else(|| ConfigError::parse(path, "unexpected closing tag"))?;
                    match stack.last_mut() {
                        Some(parent) => self.attach(&mut parent.tree, frame),
                        None => {
                            seen_root = true;
                            self.attach(&mut document, frame);
                        }
                    }
                }
                Event::Text(content) => {
                    if let Some(frame) = stack.last_mut() {
                        let text = content.unescape().map_err(|e| ConfigError::parse(path, e))?;
                        frame.text.push_str(&text);
                    }
                }
                Event::CData(content) => {
                    if let Some(frame) = stack.last_mut() {
                        frame
                            .text
                            .push_str(&String::from_utf8_lossy(&content.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ConfigError::parse(
                path,
                format!("unexpected end of document inside <{}>", open.name),
            ));
        }
        if !seen_root {
            return Err(ConfigError::parse(path, "no root element"));
        }
        Ok(document)
    }
}
