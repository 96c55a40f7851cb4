//! Value codec
//!
//! [`Atom`] parses user text into a typed element and formats it back for
//! display. [`ListValue`] covers the two list styles. Both are driven by a
//! [`CodecContext`] that carries the tenant's directory and name registries.

use crate::directory::{Directory, NameRegistry};
use crate::error::ConfigError;
use crate::ids::{ChannelId, CommandId, ModuleId, RoleId, UserId};
use crate::kind::{AtomKind, ListStyle, Primitive, ReferenceKind};
use std::collections::BTreeMap;

/// Lookups needed to parse and format references
#[derive(Clone, Copy)]
pub struct CodecContext<'a> {
    pub directory: &'a dyn Directory,
    pub modules: &'a dyn NameRegistry,
    pub commands: &'a dyn NameRegistry,
}

impl<'a> CodecContext<'a> {
    /// Create context from collaborators
    #[inline]
    #[must_use]
    pub fn new(
        directory: &'a dyn Directory,
        modules: &'a dyn NameRegistry,
        commands: &'a dyn NameRegistry,
    ) -> Self {
        Self {
            directory,
            modules,
            commands,
        }
    }
}

/// A single element: scalar value, reference, map key or list element
pub trait Atom: Clone + Send + Sync + 'static {
    /// Kind reported to the descriptor registry
    const KIND: AtomKind;

    /// Parse user text
    fn parse(text: &str, ctx: &CodecContext<'_>) -> Result<Self, ConfigError>;

    /// Format for display
    fn format(&self, ctx: &CodecContext<'_>) -> String;

    /// Parse text used as a map key
    fn parse_key(text: &str, ctx: &CodecContext<'_>) -> Result<Self, ConfigError> {
        Self::parse(text, ctx)
    }

    /// Check if this is an unset reference
    fn is_unset(&self) -> bool {
        false
    }
}

impl Atom for String {
    const KIND: AtomKind = AtomKind::Primitive(Primitive::String);

    fn parse(text: &str, _ctx: &CodecContext<'_>) -> Result<Self, ConfigError> {
        Ok(text.to_string())
    }

    fn format(&self, _ctx: &CodecContext<'_>) -> String {
        self.clone()
    }

    fn parse_key(text: &str, _ctx: &CodecContext<'_>) -> Result<Self, ConfigError> {
        Ok(text.to_lowercase())
    }
}

impl Atom for i64 {
    const KIND: AtomKind = AtomKind::Primitive(Primitive::Integer);

    fn parse(text: &str, _ctx: &CodecContext<'_>) -> Result<Self, ConfigError> {
        text.trim()
            .parse()
            .map_err(|_| ConfigError::parse(text, "integer"))
    }

    fn format(&self, _ctx: &CodecContext<'_>) -> String {
        self.to_string()
    }
}

impl Atom for f64 {
    const KIND: AtomKind = AtomKind::Primitive(Primitive::Float);

    fn parse(text: &str, _ctx: &CodecContext<'_>) -> Result<Self, ConfigError> {
        let value: f64 = text
            .trim()
            .parse()
            .map_err(|_| ConfigError::parse(text, "number"))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ConfigError::parse(text, "number"))
        }
    }

    fn format(&self, _ctx: &CodecContext<'_>) -> String {
        self.to_string()
    }
}

impl Atom for bool {
    const KIND: AtomKind = AtomKind::Primitive(Primitive::Boolean);

    fn parse(text: &str, _ctx: &CodecContext<'_>) -> Result<Self, ConfigError> {
        match text.trim().to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ConfigError::parse(text, "boolean")),
        }
    }

    fn format(&self, _ctx: &CodecContext<'_>) -> String {
        self.to_string()
    }
}

fn unresolved(kind: ReferenceKind, text: &str) -> ConfigError {
    ConfigError::ReferenceUnresolved {
        kind,
        input: text.to_string(),
    }
}

impl Atom for RoleId {
    const KIND: AtomKind = AtomKind::Reference(ReferenceKind::Role);

    fn parse(text: &str, ctx: &CodecContext<'_>) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::unset());
        }
        ctx.directory
            .resolve_role(text)
            .ok_or_else(|| unresolved(ReferenceKind::Role, text))
    }

    fn format(&self, ctx: &CodecContext<'_>) -> String {
        match ctx.directory.role_name(self) {
            Some(name) => format!("@{name}"),
            None => self.to_string(),
        }
    }

    fn is_unset(&self) -> bool {
        RoleId::is_unset(self)
    }
}

impl Atom for ChannelId {
    const KIND: AtomKind = AtomKind::Reference(ReferenceKind::Channel);

    fn parse(text: &str, ctx: &CodecContext<'_>) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::unset());
        }
        ctx.directory
            .resolve_channel(text)
            .ok_or_else(|| unresolved(ReferenceKind::Channel, text))
    }

    fn format(&self, ctx: &CodecContext<'_>) -> String {
        match ctx.directory.channel_name(self) {
            Some(name) => format!("#{name}"),
            None => self.to_string(),
        }
    }

    fn is_unset(&self) -> bool {
        ChannelId::is_unset(self)
    }
}

impl Atom for UserId {
    const KIND: AtomKind = AtomKind::Reference(ReferenceKind::User);

    fn parse(text: &str, ctx: &CodecContext<'_>) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::unset());
        }
        ctx.directory
            .resolve_user(text)
            .ok_or_else(|| unresolved(ReferenceKind::User, text))
    }

    fn format(&self, ctx: &CodecContext<'_>) -> String {
        ctx.directory
            .member_name(self)
            .unwrap_or_else(|| self.to_string())
    }

    fn is_unset(&self) -> bool {
        UserId::is_unset(self)
    }
}

fn registered(
    kind: ReferenceKind,
    registry: &dyn NameRegistry,
    text: &str,
) -> Result<String, ConfigError> {
    let name = text.trim().to_lowercase();
    if registry.contains(&name) {
        Ok(name)
    } else {
        Err(ConfigError::UnknownName { kind, input: name })
    }
}

impl Atom for ModuleId {
    const KIND: AtomKind = AtomKind::Reference(ReferenceKind::Module);

    fn parse(text: &str, ctx: &CodecContext<'_>) -> Result<Self, ConfigError> {
        registered(ReferenceKind::Module, ctx.modules, text).map(Self::from)
    }

    fn format(&self, _ctx: &CodecContext<'_>) -> String {
        self.to_string()
    }

    fn is_unset(&self) -> bool {
        ModuleId::is_unset(self)
    }
}

impl Atom for CommandId {
    const KIND: AtomKind = AtomKind::Reference(ReferenceKind::Command);

    fn parse(text: &str, ctx: &CodecContext<'_>) -> Result<Self, ConfigError> {
        registered(ReferenceKind::Command, ctx.commands, text).map(Self::from)
    }

    fn format(&self, _ctx: &CodecContext<'_>) -> String {
        self.to_string()
    }

    fn is_unset(&self) -> bool {
        CommandId::is_unset(self)
    }
}

/// A list option's storage: ordered sequence or membership set
pub trait ListValue: Clone + Default + Send + Sync + 'static {
    type Elem: Atom;

    const STYLE: ListStyle;

    /// Build from parsed elements
    fn from_elems(elems: Vec<Self::Elem>) -> Self;

    /// Elements in display order
    fn elems(&self) -> Vec<&Self::Elem>;

    /// Number of elements
    fn count(&self) -> usize;
}

impl<A: Atom> ListValue for Vec<A> {
    type Elem = A;

    const STYLE: ListStyle = ListStyle::Sequence;

    fn from_elems(elems: Vec<A>) -> Self {
        elems
    }

    fn elems(&self) -> Vec<&A> {
        self.iter().collect()
    }

    fn count(&self) -> usize {
        self.len()
    }
}

impl<A: Atom + Ord> ListValue for BTreeMap<A, bool> {
    type Elem = A;

    const STYLE: ListStyle = ListStyle::Set;

    fn from_elems(elems: Vec<A>) -> Self {
        elems.into_iter().map(|e| (e, true)).collect()
    }

    fn elems(&self) -> Vec<&A> {
        self.keys().collect()
    }

    fn count(&self) -> usize {
        self.len()
    }
}

/// Parse a full replacement list
///
/// An empty leading value clears the list.
pub fn parse_list<L: ListValue>(values: &[&str], ctx: &CodecContext<'_>) -> Result<L, ConfigError> {
    match values.first() {
        None => Ok(L::default()),
        Some(first) if first.is_empty() => Ok(L::default()),
        Some(_) => {
            let elems = values
                .iter()
                .map(|v| <L::Elem as Atom>::parse(v, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(L::from_elems(elems))
        }
    }
}

/// Format each element of a list
pub fn format_list<L: ListValue>(list: &L, ctx: &CodecContext<'_>) -> Vec<String> {
    list.elems().into_iter().map(|e| e.format(ctx)).collect()
}

/// Render a list as `[a, b]`
pub fn render_list<L: ListValue>(list: &L, ctx: &CodecContext<'_>) -> String {
    format!("[{}]", format_list(list, ctx).join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{NameSet, StaticDirectory};

    struct Fixture {
        dir: StaticDirectory,
        modules: NameSet,
        commands: NameSet,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: StaticDirectory::new()
                    .with_role("100", "Mods")
                    .with_channel("200", "general"),
                modules: NameSet::new(["spam", "bored"]),
                commands: NameSet::new(["addrole"]),
            }
        }

        fn ctx(&self) -> CodecContext<'_> {
            CodecContext::new(&self.dir, &self.modules, &self.commands)
        }
    }

    #[test]
    fn integers_reject_garbage() {
        let f = Fixture::new();
        assert_eq!(i64::parse("75", &f.ctx()), Ok(75));
        assert_eq!(
            i64::parse("notanumber", &f.ctx()),
            Err(ConfigError::parse("notanumber", "integer"))
        );
    }

    #[test]
    fn floats_format_plainly() {
        let f = Fixture::new();
        let v = f64::parse("75", &f.ctx()).unwrap();
        assert_eq!(v.format(&f.ctx()), "75");
        assert!(f64::parse("NaN", &f.ctx()).is_err());
        assert_eq!(2.5f64.format(&f.ctx()), "2.5");
    }

    #[test]
    fn booleans_are_case_insensitive() {
        let f = Fixture::new();
        assert_eq!(bool::parse("TRUE", &f.ctx()), Ok(true));
        assert!(bool::parse("yes", &f.ctx()).is_err());
    }

    #[test]
    fn roles_resolve_and_render_by_name() {
        let f = Fixture::new();
        let id = RoleId::parse("<@&100>", &f.ctx()).unwrap();
        assert_eq!(id, RoleId::new("100"));
        assert_eq!(id.format(&f.ctx()), "@Mods");
        assert_eq!(RoleId::new("999").format(&f.ctx()), "999");
        assert!(matches!(
            RoleId::parse("nobody", &f.ctx()),
            Err(ConfigError::ReferenceUnresolved { .. })
        ));
    }

    #[test]
    fn empty_reference_is_unset() {
        let f = Fixture::new();
        assert!(ChannelId::parse("", &f.ctx()).unwrap().is_unset());
    }

    #[test]
    fn modules_validate_against_registry() {
        let f = Fixture::new();
        assert_eq!(ModuleId::parse("Spam", &f.ctx()), Ok(ModuleId::new("spam")));
        assert_eq!(
            ModuleId::parse("nope", &f.ctx()).unwrap_err().to_string(),
            "nope is not a module name!"
        );
        assert_eq!(
            CommandId::parse("bogus", &f.ctx()).unwrap_err().to_string(),
            "bogus is not a command name!"
        );
    }

    #[test]
    fn string_keys_lowercase() {
        let f = Fixture::new();
        assert_eq!(String::parse_key("Kawaii", &f.ctx()).unwrap(), "kawaii");
        assert_eq!(String::parse("Kawaii", &f.ctx()).unwrap(), "Kawaii");
    }

    #[test]
    fn list_parsing_is_all_or_nothing() {
        let f = Fixture::new();
        let ok: BTreeMap<ChannelId, bool> = parse_list(&["#general"], &f.ctx()).unwrap();
        assert_eq!(render_list(&ok, &f.ctx()), "[#general]");
        let bad = parse_list::<BTreeMap<ChannelId, bool>>(&["#general", "#missing"], &f.ctx());
        assert!(bad.is_err());
        let cleared: Vec<String> = parse_list(&[""], &f.ctx()).unwrap();
        assert!(cleared.is_empty());
    }
}
