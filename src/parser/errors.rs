//! Messages carried by [`ExpressionError`](super::ExpressionError) nodes.
//!
//! Malformed item and metadata syntax never produces one of these: it falls
//! through as literal text. Only property syntax (`$(...)`) is reported.

use smol_str::SmolStr;
use thiserror::Error;

/// Why a property reference or property function failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum ExpressionErrorKind {
    /// `$(` with no matching `)`
    #[error("unterminated property reference")]
    UnterminatedReference,

    /// `$([Type]` not followed by `::`
    #[error("expected ']::' after the static type name")]
    ExpectedStaticMember,

    /// A short type name such as `[String]`
    #[error("the type '{name}' must be specified by its fully qualified name")]
    NeedsFullTypeName {
        name: SmolStr,
        suggestion: Option<&'static str>,
    },

    /// A dotted type name that is not on the allow-list
    #[error("the type '{0}' is not available in property functions")]
    UnknownType(SmolStr),

    /// A member that the type does not expose to property functions
    #[error("the member '{member}' is not available on type '{type_name}'")]
    DisallowedMember { type_name: SmolStr, member: SmolStr },

    /// `.` or `::` followed by nothing usable
    #[error("expected a member name")]
    ExpectedMemberName,

    /// `Method(` with no matching `)`
    #[error("unterminated argument list")]
    UnterminatedArguments,

    /// Anything but `.` or `)` after an argument list
    #[error("unexpected character '{0}' in property function")]
    UnexpectedCharacter(char),

    #[error("'{0}' is not a valid property name")]
    InvalidPropertyName(SmolStr),

    /// `$(Name(` with no receiver
    #[error("'{0}' is called like a function but has no receiver")]
    MissingReceiver(SmolStr),
}

impl ExpressionErrorKind {
    /// A fix suggestion, when one can be derived.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NeedsFullTypeName {
                suggestion: Some(full),
                ..
            } => Some(format!("use '[{full}]'")),
            Self::MissingReceiver(name) => Some(format!("use '$({name}.Method())' or '$({name})'")),
            _ => None,
        }
    }
}
