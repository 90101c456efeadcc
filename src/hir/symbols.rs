//! Symbol identities and descriptors.
//!
//! A [`SymbolKey`] names something a reference can point at: a property, an
//! item type, a piece of metadata, a target. Names compare ignoring ASCII
//! case, the way the build engine treats them.

use std::sync::Arc;

use smol_str::SmolStr;

/// The kind of a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A structural element such as `PropertyGroup` or `Import`.
    Element,
    Attribute,
    Property,
    Item,
    Metadata,
    /// A property function or an allow-listed static member.
    Function,
    Target,
    Task,
}

impl SymbolKind {
    /// Get a display name for this kind.
    pub fn display(&self) -> &'static str {
        match self {
            Self::Element => "Element",
            Self::Attribute => "Attribute",
            Self::Property => "Property",
            Self::Item => "Item",
            Self::Metadata => "Metadata",
            Self::Function => "Function",
            Self::Target => "Target",
            Self::Task => "Task",
        }
    }
}

/// Identity of a symbol.
///
/// `container` is the owning element for attributes, the item type for
/// metadata and the static type for functions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolKey {
    pub kind: SymbolKind,
    pub name: SmolStr,
    pub container: Option<SmolStr>,
}

impl SymbolKey {
    pub fn new(kind: SymbolKind, name: impl Into<SmolStr>) -> Self {
        Self {
            kind,
            name: name.into(),
            container: None,
        }
    }

    pub fn with_container(mut self, container: Option<impl Into<SmolStr>>) -> Self {
        self.container = container.map(Into::into);
        self
    }

    pub fn property(name: impl Into<SmolStr>) -> Self {
        Self::new(SymbolKind::Property, name)
    }

    pub fn item(name: impl Into<SmolStr>) -> Self {
        Self::new(SymbolKind::Item, name)
    }

    pub fn metadata(item: Option<&str>, name: impl Into<SmolStr>) -> Self {
        Self::new(SymbolKind::Metadata, name).with_container(item)
    }

    pub fn target(name: impl Into<SmolStr>) -> Self {
        Self::new(SymbolKind::Target, name)
    }

    pub fn task(name: impl Into<SmolStr>) -> Self {
        Self::new(SymbolKind::Task, name)
    }

    pub fn function(static_type: Option<&str>, name: impl Into<SmolStr>) -> Self {
        Self::new(SymbolKind::Function, name).with_container(static_type)
    }

    pub fn element(name: impl Into<SmolStr>) -> Self {
        Self::new(SymbolKind::Element, name)
    }

    pub fn attribute(element: &str, name: impl Into<SmolStr>) -> Self {
        Self::new(SymbolKind::Attribute, name).with_container(Some(element))
    }

    /// Whether two keys denote the same symbol.
    ///
    /// Kinds must be equal and names equal ignoring case. An absent container
    /// on either side matches any container, so `%(Link)` matches
    /// `%(Compile.Link)`.
    pub fn matches(&self, other: &SymbolKey) -> bool {
        if self.kind != other.kind || !self.name.eq_ignore_ascii_case(&other.name) {
            return false;
        }
        match (&self.container, &other.container) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => true,
        }
    }

    /// `Item.Name` for metadata, `Type::Name` for static functions.
    pub fn qualified_name(&self) -> String {
        match (&self.container, self.kind) {
            (Some(c), SymbolKind::Metadata) => format!("{}.{}", c, self.name),
            (Some(c), SymbolKind::Function) => format!("{}::{}", c, self.name),
            _ => self.name.to_string(),
        }
    }
}

/// The declared type of a symbol's value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ValueKind {
    #[default]
    String,
    Bool,
    Int,
    Version,
    Path,
    /// A `;`-separated list.
    List,
    /// A condition expression.
    Condition,
    TargetList,
    /// No value (structural elements).
    None,
}

/// Descriptor for a symbol known to a schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    pub kind: SymbolKind,
    pub name: SmolStr,
    pub value_kind: ValueKind,
    pub description: Option<Arc<str>>,
    /// Set by the engine; project files must not write it.
    pub read_only: bool,
}

impl SymbolInfo {
    pub fn new(kind: SymbolKind, name: impl Into<SmolStr>, value_kind: ValueKind) -> Self {
        Self {
            kind,
            name: name.into(),
            value_kind,
            description: None,
            read_only: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<Arc<str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// How an occurrence uses its symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceUsage {
    /// The occurrence defines the symbol (a property element, an item element).
    Write,
    Read,
}
