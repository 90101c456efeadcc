//! Expression front end.
//!
//! Turns one attribute or text value into an ordered sequence of literal runs
//! and typed reference nodes:
//!
//! - `@(Name->'transform', 'separator')` → [`ItemReference`]
//! - `%(Item.Name)` → [`MetadataReference`]
//! - `$(Name)` → [`PropertyReference`]
//! - `$(Name.Method(args).Member)`, `$([Type]::Method(args))` → [`Invocation`]
//! - malformed property syntax → [`ExpressionError`]
//!
//! Invocation arguments keep their raw text and are parsed again on their
//! own, so references nested in a call are part of the tree.
//!
//! The parser is a pure function: no shared mutable state, no I/O.

mod allow_list;
mod ast;
mod errors;
mod expression;
mod invocation;
mod options;
pub mod scanner;
mod unescape;

pub use allow_list::{AllowedType, TypeLookup, allowed_type, lookup_type};
pub use ast::{
    Argument, Expression, ExpressionError, ExpressionNode, ExpressionText, Invocation,
    ItemReference, MetadataReference, PropertyReference, descendants, has_errors, node_at,
};
pub use errors::ExpressionErrorKind;
pub use expression::parse;
pub use invocation::parse_arguments;
pub use options::ParseOptions;
pub use unescape::{escape, unescape};
