//! The tag table.
//!
//! Talon types are identified by *tags*: small interned integers allocated
//! the first time a type name is seen. The parser treats tags as opaque
//! except for two questions: "what is the tag for this name" and "what kind
//! of type does this tag name", the latter of which drives the routing of
//! struct-typed global initializers.
//!
//! The table is seeded with the builtin types. Tag 0 is the weak `_` tag
//! that untyped (legacy) declarations carry.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// An interned type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag(pub u32);

impl Tag {
    /// The weak `_` tag carried by untyped declarations.
    pub const INT: Tag = Tag(0);
    pub const BOOL: Tag = Tag(1);
    pub const CHAR: Tag = Tag(2);
    pub const FLOAT: Tag = Tag(3);
    pub const VOID: Tag = Tag(4);
    pub const OBJECT: Tag = Tag(5);
    pub const STRING: Tag = Tag(6);
    pub const ANY: Tag = Tag(7);
}

/// What sort of type a tag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Int,
    Bool,
    Char,
    Float,
    Void,
    Object,
    String,
    Any,
    /// Declared by an `enum`.
    Enum,
    /// Declared by a `struct`.
    Struct,
    /// Declared by a `methodmap`.
    Methodmap,
    /// Declared by an `enum struct`.
    EnumStruct,
    /// Referenced but not yet declared.
    Unknown,
}

struct TagEntry {
    name: String,
    kind: TagKind,
}

/// Allocates and resolves type tags. `add_tag` is idempotent per name.
pub struct TagTable {
    entries: Vec<TagEntry>,
    by_name: FxHashMap<String, u32>,
}

impl TagTable {
    pub fn new() -> Self {
        let mut table = Self {
            entries: Vec::new(),
            by_name: FxHashMap::default(),
        };
        table.seed("_", TagKind::Int);
        table.seed("bool", TagKind::Bool);
        table.seed("char", TagKind::Char);
        table.seed("float", TagKind::Float);
        table.seed("void", TagKind::Void);
        table.seed("object", TagKind::Object);
        table.seed("String", TagKind::String);
        table.seed("any", TagKind::Any);
        // Legacy spelling carried over from the tag-prefix era.
        table.by_name.insert("Float".to_string(), Tag::FLOAT.0);
        table
    }

    fn seed(&mut self, name: &str, kind: TagKind) {
        let id = self.entries.len() as u32;
        self.entries.push(TagEntry {
            name: name.to_string(),
            kind,
        });
        self.by_name.insert(name.to_string(), id);
    }

    /// Intern a type name, allocating a fresh tag on first sight.
    pub fn add_tag(&mut self, name: &str) -> Tag {
        if let Some(&id) = self.by_name.get(name) {
            return Tag(id);
        }
        let id = self.entries.len() as u32;
        self.entries.push(TagEntry {
            name: name.to_string(),
            kind: TagKind::Unknown,
        });
        self.by_name.insert(name.to_string(), id);
        Tag(id)
    }

    /// Intern a type name and record what declared it.
    pub fn add_tag_with_kind(&mut self, name: &str, kind: TagKind) -> Tag {
        let tag = self.add_tag(name);
        self.entries[tag.0 as usize].kind = kind;
        tag
    }

    /// Look up an already-interned name.
    pub fn find(&self, name: &str) -> Option<Tag> {
        self.by_name.get(name).map(|&id| Tag(id))
    }

    pub fn kind(&self, tag: Tag) -> TagKind {
        self.entries
            .get(tag.0 as usize)
            .map(|e| e.kind)
            .unwrap_or(TagKind::Unknown)
    }

    pub fn name(&self, tag: Tag) -> &str {
        self.entries
            .get(tag.0 as usize)
            .map(|e| e.name.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TagTable {
    fn default() -> Self {
        Self::new()
    }
}
