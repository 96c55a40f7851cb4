//! Value kinds
//!
//! The closed set of shapes an option can take. Every registered option
//! reports exactly one [`ValueKind`].

use std::fmt::{self, Display, Formatter};

/// Plain primitive values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Integer,
    Float,
    Boolean,
}

/// Identifiers that only mean something once resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Role,
    Channel,
    User,
    Module,
    Command,
}

impl Display for ReferenceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Role => "role",
            Self::Channel => "channel",
            Self::User => "user",
            Self::Module => "module",
            Self::Command => "command",
        };
        f.write_str(s)
    }
}

/// Kind of a single element: map key, map value or list element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomKind {
    Primitive(Primitive),
    Reference(ReferenceKind),
}

/// How list elements are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListStyle {
    /// Insertion ordered, duplicates allowed
    Sequence,
    /// Membership only, persisted as `element -> true`
    Set,
}

/// Shape of a configuration option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar(Primitive),
    Reference(ReferenceKind),
    List(AtomKind, ListStyle),
    Map(AtomKind, AtomKind),
    MapList(AtomKind, AtomKind, ListStyle),
}

impl ValueKind {
    /// Build the single-value kind for an atom
    #[inline]
    #[must_use]
    pub fn single(atom: AtomKind) -> Self {
        match atom {
            AtomKind::Primitive(p) => Self::Scalar(p),
            AtomKind::Reference(r) => Self::Reference(r),
        }
    }

    /// Suffix shown next to the option name in the summary
    #[inline]
    #[must_use]
    pub fn shape_tag(&self) -> Option<&'static str> {
        match self {
            Self::Scalar(_) | Self::Reference(_) => None,
            Self::List(..) => Some("[list]"),
            Self::Map(..) => Some("[map]"),
            Self::MapList(..) => Some("[maplist]"),
        }
    }

    /// Check if the option is addressed by key
    #[inline]
    #[must_use]
    pub fn is_keyed(&self) -> bool {
        matches!(self, Self::Map(..) | Self::MapList(..))
    }
}
