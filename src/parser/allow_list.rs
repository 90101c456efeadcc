//! Types and members callable from property functions.
//!
//! Both tables are closed, hand-maintained sets: property functions expose a
//! safe subset of the platform to project authors. Lookups are ASCII
//! case-insensitive. The tables are built once and never mutated.

use std::sync::LazyLock;

use rustc_hash::{FxHashMap, FxHashSet};

/// An allow-listed type.
#[derive(Debug)]
pub struct AllowedType {
    /// Canonical spelling of the type name.
    pub name: &'static str,
    /// `None` when every member is callable.
    members: Option<FxHashSet<String>>,
}

impl AllowedType {
    /// Whether `member` may be called on this type.
    pub fn allows(&self, member: &str) -> bool {
        match &self.members {
            None => true,
            Some(members) => members.contains(&member.to_ascii_lowercase()),
        }
    }
}

/// Result of looking up a type name.
#[derive(Debug, Clone, Copy)]
pub enum TypeLookup {
    Allowed(&'static AllowedType),
    /// A short name; carries the full name when exactly one type matches it.
    NeedsFullName(Option<&'static str>),
    Unknown,
}

/// Types whose every public static member is callable.
const UNRESTRICTED_TYPES: &[&str] = &[
    "System.Byte",
    "System.Char",
    "System.Convert",
    "System.DateTime",
    "System.DateTimeOffset",
    "System.Decimal",
    "System.Double",
    "System.Enum",
    "System.Guid",
    "System.Int16",
    "System.Int32",
    "System.Int64",
    "System.IO.Path",
    "System.Math",
    "System.Runtime.InteropServices.OSPlatform",
    "System.Runtime.InteropServices.RuntimeInformation",
    "System.SByte",
    "System.Single",
    "System.String",
    "System.StringComparer",
    "System.TimeSpan",
    "System.Text.RegularExpressions.Regex",
    "System.UInt16",
    "System.UInt32",
    "System.UInt64",
    "System.Uri",
    "System.Version",
    "Microsoft.Build.Utilities.ToolLocationHelper",
];

/// Types that expose only the listed members.
const RESTRICTED_TYPES: &[(&str, &[&str])] = &[
    (
        "MSBuild",
        &[
            "Add",
            "AreFeaturesEnabled",
            "BitwiseAnd",
            "BitwiseNot",
            "BitwiseOr",
            "BitwiseXor",
            "CheckFeatureAvailability",
            "ConvertFromBase64",
            "ConvertToBase64",
            "Divide",
            "DoesTaskHostExist",
            "EnsureTrailingSlash",
            "Escape",
            "GetCurrentToolsDirectory",
            "GetDirectoryNameOfFileAbove",
            "GetMSBuildExtensionsPath",
            "GetMSBuildSDKsPath",
            "GetPathOfFileAbove",
            "GetProgramFiles32",
            "GetRegistryValue",
            "GetRegistryValueFromView",
            "GetTargetFrameworkIdentifier",
            "GetTargetFrameworkVersion",
            "GetTargetPlatformIdentifier",
            "GetTargetPlatformVersion",
            "GetToolsDirectory32",
            "GetToolsDirectory64",
            "GetVsInstallRoot",
            "IsOSPlatform",
            "IsOsUnixLike",
            "IsRunningFromVisualStudio",
            "IsTargetFrameworkCompatible",
            "IsTargetPlatformCompatible",
            "MakeRelative",
            "Modulo",
            "Multiply",
            "NormalizeDirectory",
            "NormalizePath",
            "StableStringHash",
            "SubstringByAsciiChars",
            "Subtract",
            "Unescape",
            "ValueOrDefault",
            "VersionEquals",
            "VersionGreaterThan",
            "VersionGreaterThanOrEquals",
            "VersionLessThan",
            "VersionLessThanOrEquals",
            "VersionNotEquals",
        ],
    ),
    (
        "System.Environment",
        &[
            "CommandLine",
            "ExpandEnvironmentVariables",
            "GetEnvironmentVariable",
            "GetEnvironmentVariables",
            "GetFolderPath",
            "GetLogicalDrives",
            "Is64BitOperatingSystem",
            "Is64BitProcess",
            "MachineName",
            "NewLine",
            "OSVersion",
            "ProcessorCount",
            "StackTrace",
            "SystemDirectory",
            "SystemPageSize",
            "TickCount",
            "UserDomainName",
            "UserInteractive",
            "UserName",
            "Version",
            "WorkingSet",
        ],
    ),
    (
        "System.IO.Directory",
        &[
            "GetDirectories",
            "GetFiles",
            "GetLastAccessTime",
            "GetLastWriteTime",
            "GetParent",
        ],
    ),
    (
        "System.IO.File",
        &[
            "Exists",
            "GetAttributes",
            "GetCreationTime",
            "GetLastAccessTime",
            "GetLastWriteTime",
            "ReadAllText",
        ],
    ),
    (
        "System.Globalization.CultureInfo",
        &["CurrentUICulture", "GetCultureInfo", "new"],
    ),
];

struct Tables {
    types: FxHashMap<String, AllowedType>,
    /// Lowercase short name -> full names ending with it.
    short_names: FxHashMap<String, Vec<&'static str>>,
}

static TABLES: LazyLock<Tables> = LazyLock::new(|| {
    let mut types = FxHashMap::default();
    let mut short_names: FxHashMap<String, Vec<&'static str>> = FxHashMap::default();

    let unrestricted = UNRESTRICTED_TYPES
        .iter()
        .map(|name| (*name, None::<FxHashSet<String>>));
    let restricted = RESTRICTED_TYPES.iter().map(|(name, members)| {
        let members: FxHashSet<String> = members.iter().map(|m| m.to_ascii_lowercase()).collect();
        (*name, Some(members))
    });

    for (name, members) in unrestricted.chain(restricted) {
        if let Some((_, short)) = name.rsplit_once('.') {
            short_names
                .entry(short.to_ascii_lowercase())
                .or_default()
                .push(name);
        }
        types.insert(name.to_ascii_lowercase(), AllowedType { name, members });
    }

    Tables { types, short_names }
});

/// Look up an allow-listed type by name.
pub fn allowed_type(name: &str) -> Option<&'static AllowedType> {
    TABLES.types.get(&name.trim().to_ascii_lowercase())
}

/// Classify a type name written between `[` and `]`.
pub fn lookup_type(name: &str) -> TypeLookup {
    let name = name.trim();
    if let Some(ty) = allowed_type(name) {
        return TypeLookup::Allowed(ty);
    }
    if name.contains('.') {
        return TypeLookup::Unknown;
    }
    let suggestion = TABLES
        .short_names
        .get(&name.to_ascii_lowercase())
        .and_then(|candidates| match candidates.as_slice() {
            [only] => Some(*only),
            _ => None,
        });
    TypeLookup::NeedsFullName(suggestion)
}
