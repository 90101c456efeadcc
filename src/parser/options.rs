//! Parse configuration flags.

/// Independent flags that control which reference forms are recognized.
///
/// Resolved once per value from its syntactic role (see
/// [`hir::Binder`](crate::hir::Binder)) and passed to [`parse`](super::parse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParseOptions {
    /// Split top-level text on `;` before parsing each segment.
    pub split: bool,
    /// Recognize `@(...)`; otherwise it stays literal text.
    pub allow_items: bool,
    /// Recognize `%(...)`; otherwise it stays literal text.
    pub allow_metadata: bool,
}

impl ParseOptions {
    /// Property references only.
    pub const NONE: Self = Self {
        split: false,
        allow_items: false,
        allow_metadata: false,
    };

    /// A `;`-separated list with property references only.
    pub const LIST: Self = Self {
        split: true,
        allow_items: false,
        allow_metadata: false,
    };

    /// Item and metadata references, no list splitting.
    pub const ITEMS: Self = Self {
        split: false,
        allow_items: true,
        allow_metadata: true,
    };

    /// A `;`-separated list with item and metadata references.
    pub const ITEM_LIST: Self = Self {
        split: true,
        allow_items: true,
        allow_metadata: true,
    };

    /// Options for the body of an item transform `@(X->'...')`.
    pub const TRANSFORM: Self = Self {
        split: true,
        allow_items: false,
        allow_metadata: true,
    };

    pub fn with_split(mut self, split: bool) -> Self {
        self.split = split;
        self
    }

    pub fn with_items(mut self, allow: bool) -> Self {
        self.allow_items = allow;
        self
    }

    pub fn with_metadata(mut self, allow: bool) -> Self {
        self.allow_metadata = allow;
        self
    }
}
