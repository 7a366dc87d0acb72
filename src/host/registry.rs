//! Class registry
//!
//! Describes the CACHE module's classes and hands them to the host on import.
//! A registry is an ordinary value owned by whoever embeds the caches; there is
//! no process-wide table.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, StashError};
use crate::host::{StashObject, Value};

/// Module path shared by every class in the registry.
pub const MODULE_PATH: &str = "stdlib:CACHE";

// == Class Kind ==
/// The three classes exported by the CACHE module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassKind {
    /// Abstract base declaring the contract
    Stash,
    /// Capacity-bounded LRU store
    MemStash,
    /// Fixed-TTL store
    TimeStash,
}

impl ClassKind {
    pub const ALL: [ClassKind; 3] = [ClassKind::Stash, ClassKind::MemStash, ClassKind::TimeStash];

    pub fn name(self) -> &'static str {
        match self {
            ClassKind::Stash => "STASH",
            ClassKind::MemStash => "MEMSTASH",
            ClassKind::TimeStash => "TIMESTASH",
        }
    }

    pub fn is_abstract(self) -> bool {
        self == ClassKind::Stash
    }

    /// Name of the constructor's single parameter, if the class has one.
    pub fn constructor_param(self) -> Option<&'static str> {
        match self {
            ClassKind::Stash => None,
            ClassKind::MemStash => Some("capacity"),
            ClassKind::TimeStash => Some("ttl_seconds"),
        }
    }

    fn parent(self) -> Option<ClassKind> {
        match self {
            ClassKind::Stash => None,
            ClassKind::MemStash | ClassKind::TimeStash => Some(ClassKind::Stash),
        }
    }
}

// == Class Definition ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    pub kind: ClassKind,
    pub name: &'static str,
    pub qualified_name: String,
    pub parent_classes: Vec<String>,
    /// Method resolution order, most derived first
    pub mro: Vec<String>,
}

impl ClassDef {
    fn new(kind: ClassKind) -> Self {
        let parent_classes: Vec<String> = kind.parent().map(qualify).into_iter().collect();
        let mut mro = vec![qualify(kind)];
        mro.extend(parent_classes.iter().cloned());

        Self {
            kind,
            name: kind.name(),
            qualified_name: qualify(kind),
            parent_classes,
            mro,
        }
    }
}

fn qualify(kind: ClassKind) -> String {
    format!("{}.{}", MODULE_PATH, kind.name())
}

// == Class Registry ==
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    classes: BTreeMap<&'static str, ClassDef>,
}

impl ClassRegistry {
    // == Constructor ==
    /// Creates a registry holding STASH, MEMSTASH and TIMESTASH.
    pub fn new() -> Self {
        let classes = ClassKind::ALL
            .iter()
            .map(|&kind| (kind.name(), ClassDef::new(kind)))
            .collect();
        Self { classes }
    }

    /// Looks up a class by name, ignoring case.
    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name.to_uppercase().as_str())
    }

    // == Import ==
    /// Resolves an import declaration list.
    ///
    /// An empty list imports every class. Otherwise each name must exist;
    /// the first unknown name fails the whole import.
    pub fn import(&self, declarations: &[&str]) -> Result<Vec<&ClassDef>> {
        if declarations.is_empty() {
            return Ok(self.classes.values().collect());
        }

        declarations
            .iter()
            .map(|decl| {
                self.class(decl).ok_or_else(|| {
                    StashError::UnknownClass(format!("unknown CACHE class: {}", decl))
                })
            })
            .collect()
    }

    // == Instantiate ==
    /// Creates an object of class `name` and runs its constructor with `args`.
    pub fn instantiate(&self, name: &str, args: &[Value]) -> Result<StashObject> {
        let def = self.class(name).ok_or_else(|| {
            StashError::UnknownClass(format!("unknown CACHE class: {}", name))
        })?;

        let mut object = StashObject::uninitialized(def.kind);
        object.construct(args)?;
        debug!(class = def.name, "instantiated cache object");
        Ok(object)
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}
