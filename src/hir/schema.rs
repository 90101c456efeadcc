//! Schema catalogs: what the analyzer knows about names.
//!
//! [`BuiltinSchema`] holds the engine's reserved and well-known names,
//! [`DocumentSchema`] is inferred from what a set of documents defines, and
//! [`LayeredSchema`] consults several catalogs in order.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use text_size::TextRange;

use super::binder::BoundDocument;
use super::symbols::{ReferenceUsage, SymbolInfo, SymbolKey, SymbolKind, ValueKind};
use super::visitor::ResolvingVisitor;
use crate::parser::allowed_type;

/// Looks up symbol descriptors.
pub trait SchemaCatalog: Send + Sync {
    /// Descriptor for `key`, or `None` if the symbol is unknown.
    fn lookup(&self, key: &SymbolKey) -> Option<SymbolInfo>;
}

// ============================================================================
// BUILTIN SCHEMA
// ============================================================================

/// Properties set by the engine. Writing them is an error.
const RESERVED_PROPERTIES: &[(&str, ValueKind, &str)] = &[
    ("MSBuildProjectDirectory", ValueKind::Path, "Directory of the project file."),
    ("MSBuildProjectDirectoryNoRoot", ValueKind::Path, "Project directory without the drive."),
    ("MSBuildProjectExtension", ValueKind::String, "Extension of the project file."),
    ("MSBuildProjectFile", ValueKind::String, "File name of the project file."),
    ("MSBuildProjectFullPath", ValueKind::Path, "Full path of the project file."),
    ("MSBuildProjectName", ValueKind::String, "Project file name without extension."),
    ("MSBuildProjectDefaultTargets", ValueKind::TargetList, "The project's default targets."),
    ("MSBuildThisFile", ValueKind::String, "File name of the file being evaluated."),
    ("MSBuildThisFileDirectory", ValueKind::Path, "Directory of the file being evaluated, with a trailing slash."),
    ("MSBuildThisFileDirectoryNoRoot", ValueKind::Path, "Directory of the file being evaluated without the drive."),
    ("MSBuildThisFileExtension", ValueKind::String, "Extension of the file being evaluated."),
    ("MSBuildThisFileFullPath", ValueKind::Path, "Full path of the file being evaluated."),
    ("MSBuildThisFileName", ValueKind::String, "File name without extension of the file being evaluated."),
    ("MSBuildStartupDirectory", ValueKind::Path, "Directory the build was started from."),
    ("MSBuildBinPath", ValueKind::Path, "Directory of the engine binaries."),
    ("MSBuildToolsPath", ValueKind::Path, "Directory of the engine binaries."),
    ("MSBuildToolsVersion", ValueKind::Version, "Toolset version."),
    ("MSBuildVersion", ValueKind::Version, "Engine version."),
    ("MSBuildAssemblyVersion", ValueKind::Version, "Engine assembly version."),
    ("MSBuildFileVersion", ValueKind::Version, "Engine file version."),
    ("MSBuildSemanticVersion", ValueKind::Version, "Engine semantic version."),
    ("MSBuildNodeCount", ValueKind::Int, "Number of build nodes."),
    ("MSBuildLastTaskResult", ValueKind::Bool, "Result of the last task."),
    ("MSBuildProgramFiles32", ValueKind::Path, "32-bit program files directory."),
    ("MSBuildRuntimeType", ValueKind::String, "Runtime the engine runs on."),
];

/// Properties with a conventional meaning that projects may set.
const WELL_KNOWN_PROPERTIES: &[(&str, ValueKind, &str)] = &[
    ("Configuration", ValueKind::String, "Build configuration, such as Debug or Release."),
    ("Platform", ValueKind::String, "Target platform."),
    ("OutputPath", ValueKind::Path, "Output directory."),
    ("OutDir", ValueKind::Path, "Final output directory."),
    ("BaseOutputPath", ValueKind::Path, "Base of the output directory."),
    ("IntermediateOutputPath", ValueKind::Path, "Intermediate output directory."),
    ("BaseIntermediateOutputPath", ValueKind::Path, "Base of the intermediate output directory."),
    ("TargetFramework", ValueKind::String, "Target framework moniker."),
    ("TargetFrameworks", ValueKind::List, "Target framework monikers."),
    ("AssemblyName", ValueKind::String, "Name of the output assembly."),
    ("RootNamespace", ValueKind::String, "Root namespace."),
    ("DefineConstants", ValueKind::List, "Conditional compilation symbols."),
    ("OutputType", ValueKind::String, "Output kind, such as Exe or Library."),
    ("LangVersion", ValueKind::String, "Language version."),
    ("Nullable", ValueKind::String, "Nullable context."),
    ("ImplicitUsings", ValueKind::String, "Implicit global usings."),
    ("Version", ValueKind::Version, "Package and assembly version."),
    ("MSBuildExtensionsPath", ValueKind::Path, "Root of engine extensions."),
    ("MSBuildAllProjects", ValueKind::List, "Files that affect incremental builds."),
];

/// Metadata every item has.
const WELL_KNOWN_METADATA: &[(&str, ValueKind, &str)] = &[
    ("Identity", ValueKind::String, "The item as specified in Include."),
    ("FullPath", ValueKind::Path, "Full path of the item."),
    ("RootDir", ValueKind::Path, "Root directory of the item."),
    ("Filename", ValueKind::String, "File name without extension."),
    ("Extension", ValueKind::String, "File name extension."),
    ("RelativeDir", ValueKind::Path, "Path as specified in Include, up to the final slash."),
    ("Directory", ValueKind::Path, "Directory of the item, without the root."),
    ("RecursiveDir", ValueKind::Path, "Part of the path matched by a ** wildcard."),
    ("ModifiedTime", ValueKind::String, "Last modification time."),
    ("CreatedTime", ValueKind::String, "Creation time."),
    ("AccessedTime", ValueKind::String, "Last access time."),
    ("DefiningProjectFullPath", ValueKind::Path, "Full path of the project that defined the item."),
    ("DefiningProjectDirectory", ValueKind::Path, "Directory of the project that defined the item."),
    ("DefiningProjectName", ValueKind::String, "Name of the project that defined the item."),
    ("DefiningProjectExtension", ValueKind::String, "Extension of the project that defined the item."),
];

const COMMON_ITEMS: &[(&str, &str)] = &[
    ("Compile", "Source files for the compiler."),
    ("Content", "Files that are not compiled but published."),
    ("None", "Files with no build action."),
    ("EmbeddedResource", "Resources embedded in the output."),
    ("Reference", "Assembly references."),
    ("ProjectReference", "References to other projects."),
    ("PackageReference", "Package dependencies."),
    ("FrameworkReference", "Shared framework references."),
    ("Folder", "Folders shown in the project."),
    ("Using", "Global using directives."),
];

const COMMON_TASKS: &[(&str, &str)] = &[
    ("Message", "Logs a message."),
    ("Warning", "Logs a warning."),
    ("Error", "Stops the build with an error."),
    ("Exec", "Runs a command."),
    ("Copy", "Copies files."),
    ("Delete", "Deletes files."),
    ("MakeDir", "Creates directories."),
    ("RemoveDir", "Removes directories."),
    ("Touch", "Updates file timestamps."),
    ("ReadLinesFromFile", "Reads items from a text file."),
    ("WriteLinesToFile", "Writes items to a text file."),
    ("CallTarget", "Invokes targets of the current project."),
    ("MSBuild", "Builds other projects."),
    ("CreateProperty", "Populates a property."),
    ("CreateItem", "Populates an item list."),
];

const COMMON_TARGETS: &[(&str, &str)] = &[
    ("Build", "Builds the project."),
    ("Rebuild", "Cleans, then builds the project."),
    ("Clean", "Deletes build outputs."),
    ("Restore", "Restores package dependencies."),
    ("Publish", "Publishes the project."),
    ("Pack", "Creates a package."),
    ("BeforeBuild", "Runs before Build."),
    ("AfterBuild", "Runs after Build."),
    ("CoreCompile", "Invokes the compiler."),
];

const STRUCTURAL_ELEMENTS: &[&str] = &[
    "Project",
    "PropertyGroup",
    "ItemGroup",
    "ItemDefinitionGroup",
    "Target",
    "Output",
    "OnError",
    "Import",
    "ImportGroup",
    "Choose",
    "When",
    "Otherwise",
    "UsingTask",
    "ProjectExtensions",
    "Sdk",
];

/// The engine's reserved and well-known names.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinSchema;

impl BuiltinSchema {
    /// Whether `name` is set by the engine and may not be written.
    pub fn is_reserved_property(name: &str) -> bool {
        RESERVED_PROPERTIES
            .iter()
            .any(|(n, _, _)| n.eq_ignore_ascii_case(name))
    }
}

fn find_described<'a>(
    table: &'a [(&'static str, ValueKind, &'static str)],
    name: &str,
) -> Option<&'a (&'static str, ValueKind, &'static str)> {
    table.iter().find(|(n, _, _)| n.eq_ignore_ascii_case(name))
}

fn find_named<'a>(
    table: &'a [(&'static str, &'static str)],
    name: &str,
) -> Option<&'a (&'static str, &'static str)> {
    table.iter().find(|(n, _)| n.eq_ignore_ascii_case(name))
}

impl SchemaCatalog for BuiltinSchema {
    fn lookup(&self, key: &SymbolKey) -> Option<SymbolInfo> {
        let name = key.name.as_str();
        match key.kind {
            SymbolKind::Property => {
                if let Some((n, value_kind, doc)) = find_described(RESERVED_PROPERTIES, name) {
                    return Some(
                        SymbolInfo::new(key.kind, *n, *value_kind)
                            .with_description(*doc)
                            .read_only(),
                    );
                }
                find_described(WELL_KNOWN_PROPERTIES, name).map(|(n, value_kind, doc)| {
                    SymbolInfo::new(key.kind, *n, *value_kind).with_description(*doc)
                })
            }
            SymbolKind::Metadata => {
                find_described(WELL_KNOWN_METADATA, name).map(|(n, value_kind, doc)| {
                    SymbolInfo::new(key.kind, *n, *value_kind)
                        .with_description(*doc)
                        .read_only()
                })
            }
            SymbolKind::Item => find_named(COMMON_ITEMS, name)
                .map(|(n, doc)| SymbolInfo::new(key.kind, *n, ValueKind::List).with_description(*doc)),
            SymbolKind::Task => find_named(COMMON_TASKS, name)
                .map(|(n, doc)| SymbolInfo::new(key.kind, *n, ValueKind::None).with_description(*doc)),
            SymbolKind::Target => find_named(COMMON_TARGETS, name)
                .map(|(n, doc)| SymbolInfo::new(key.kind, *n, ValueKind::None).with_description(*doc)),
            SymbolKind::Element => STRUCTURAL_ELEMENTS
                .iter()
                .find(|n| **n == name)
                .map(|n| SymbolInfo::new(key.kind, *n, ValueKind::None)),
            SymbolKind::Function => match key.container.as_deref() {
                // Static members are known exactly when they are allow-listed.
                Some(type_name) => allowed_type(type_name)
                    .filter(|ty| ty.allows(name))
                    .map(|ty| {
                        SymbolInfo::new(key.kind, name, ValueKind::String)
                            .with_description(format!("{}::{}", ty.name, name))
                    }),
                // Instance members depend on the receiver's runtime type.
                None => Some(SymbolInfo::new(key.kind, name, ValueKind::String)),
            },
            SymbolKind::Attribute => None,
        }
    }
}

// ============================================================================
// DOCUMENT SCHEMA
// ============================================================================

/// Symbols defined by a set of documents.
///
/// Built from every Write occurrence: property and item elements, metadata,
/// target names and task outputs.
#[derive(Clone, Debug, Default)]
pub struct DocumentSchema {
    /// (kind, lowercase name) -> definitions with their containers.
    symbols: FxHashMap<(SymbolKind, String), Vec<(Option<String>, SymbolInfo)>>,
}

impl DocumentSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a BoundDocument>) -> Self {
        let mut schema = Self::new();
        for document in documents {
            schema.add_document(document);
        }
        schema
    }

    /// Record every symbol `document` writes.
    pub fn add_document(&mut self, document: &BoundDocument) {
        let mut writes: Vec<SymbolKey> = Vec::new();
        let mut collect = |key: &SymbolKey, _range: TextRange, usage: ReferenceUsage| {
            if usage == ReferenceUsage::Write {
                writes.push(key.clone());
            }
        };
        ResolvingVisitor::new(document, &BuiltinSchema)
            .with_collector(&mut collect)
            .run();

        for key in writes {
            self.define(&key);
        }
    }

    pub fn define(&mut self, key: &SymbolKey) {
        let container = key.container.as_ref().map(|c| c.to_ascii_lowercase());
        let entry = self
            .symbols
            .entry((key.kind, key.name.to_ascii_lowercase()))
            .or_default();
        if !entry.iter().any(|(c, _)| *c == container) {
            let info = SymbolInfo::new(key.kind, key.name.clone(), ValueKind::default())
                .with_description(format!("Defined in project: {}", key.qualified_name()));
            entry.push((container, info));
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl SchemaCatalog for DocumentSchema {
    fn lookup(&self, key: &SymbolKey) -> Option<SymbolInfo> {
        let definitions = self
            .symbols
            .get(&(key.kind, key.name.to_ascii_lowercase()))?;
        let wanted = key.container.as_ref().map(|c| c.to_ascii_lowercase());
        definitions
            .iter()
            .find(|(container, _)| match (&wanted, container) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            })
            .map(|(_, info)| info.clone())
    }
}

// ============================================================================
// LAYERED SCHEMA
// ============================================================================

/// Consults catalogs in order; the first hit wins.
#[derive(Clone, Default)]
pub struct LayeredSchema {
    layers: Vec<Arc<dyn SchemaCatalog>>,
}

impl LayeredSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: Arc<dyn SchemaCatalog>) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn push(&mut self, layer: Arc<dyn SchemaCatalog>) {
        self.layers.push(layer);
    }
}

impl SchemaCatalog for LayeredSchema {
    fn lookup(&self, key: &SymbolKey) -> Option<SymbolInfo> {
        self.layers.iter().find_map(|layer| layer.lookup(key))
    }
}
