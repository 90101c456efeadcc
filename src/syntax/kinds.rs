//! Syntactic roles of elements and attributes.
//!
//! A role depends on where an element sits: `<Foo>` is a property inside a
//! `PropertyGroup`, an item inside an `ItemGroup`, metadata inside an item and
//! a task inside a `Target`. Element names are matched exactly; attribute
//! names ignore ASCII case.

/// Role of an element in a project file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Project,
    PropertyGroup,
    /// A child of `PropertyGroup`; its name is the property name.
    Property,
    ItemGroup,
    /// A child of `ItemGroup`; its name is the item type.
    Item,
    ItemDefinitionGroup,
    /// A child of `ItemDefinitionGroup`; default metadata for an item type.
    ItemDefinition,
    /// A child of an item or item definition.
    Metadata,
    Target,
    /// A child of `Target` that is not a group or `OnError`.
    Task,
    Output,
    OnError,
    Import,
    ImportGroup,
    Choose,
    When,
    Otherwise,
    UsingTask,
    ProjectExtensions,
    Sdk,
    Unknown,
}

impl ElementKind {
    /// Classify an element from its name and its parent's role.
    pub fn classify(parent: Option<ElementKind>, name: &str) -> ElementKind {
        use ElementKind::*;

        let Some(parent) = parent else {
            return if name == "Project" { Project } else { Unknown };
        };

        match parent {
            Project => match name {
                "PropertyGroup" => PropertyGroup,
                "ItemGroup" => ItemGroup,
                "ItemDefinitionGroup" => ItemDefinitionGroup,
                "Target" => Target,
                "Import" => Import,
                "ImportGroup" => ImportGroup,
                "Choose" => Choose,
                "UsingTask" => UsingTask,
                "ProjectExtensions" => ProjectExtensions,
                "Sdk" => Sdk,
                _ => Unknown,
            },
            PropertyGroup => Property,
            ItemGroup => Item,
            ItemDefinitionGroup => ItemDefinition,
            Item | ItemDefinition => Metadata,
            Target => match name {
                "PropertyGroup" => PropertyGroup,
                "ItemGroup" => ItemGroup,
                "OnError" => OnError,
                _ => Task,
            },
            Task => match name {
                "Output" => Output,
                _ => Unknown,
            },
            ImportGroup => match name {
                "Import" => Import,
                _ => Unknown,
            },
            Choose => match name {
                "When" => When,
                "Otherwise" => Otherwise,
                _ => Unknown,
            },
            When | Otherwise => match name {
                "PropertyGroup" => PropertyGroup,
                "ItemGroup" => ItemGroup,
                "Choose" => Choose,
                _ => Unknown,
            },
            Property | Metadata | Output | OnError | Import | UsingTask | ProjectExtensions
            | Sdk | Unknown => Unknown,
        }
    }

    /// Elements whose children are free-form and never classified.
    pub fn has_opaque_content(self) -> bool {
        matches!(self, ElementKind::ProjectExtensions | ElementKind::UsingTask)
    }

    /// Elements whose own name is a symbol (property, item, metadata, task).
    pub fn is_named_by_tag(self) -> bool {
        matches!(
            self,
            ElementKind::Property
                | ElementKind::Item
                | ElementKind::ItemDefinition
                | ElementKind::Metadata
                | ElementKind::Task
        )
    }
}

/// Role of an attribute, given the role of its element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Condition,
    Label,
    Xmlns,
    // Project
    Sdk,
    DefaultTargets,
    InitialTargets,
    TreatAsLocalProperty,
    ToolsVersion,
    // Items
    Include,
    Exclude,
    Remove,
    Update,
    KeepMetadata,
    RemoveMetadata,
    KeepDuplicates,
    MatchOnMetadata,
    MatchOnMetadataOptions,
    /// Any other item attribute: metadata written as an attribute.
    Metadata,
    // Targets
    Name,
    DependsOnTargets,
    BeforeTargets,
    AfterTargets,
    Inputs,
    Outputs,
    Returns,
    KeepDuplicateOutputs,
    // Tasks
    ContinueOnError,
    Runtime,
    Architecture,
    /// Any other task attribute: a task parameter.
    TaskParameter,
    // Output
    PropertyName,
    ItemName,
    // OnError
    ExecuteTargets,
    // Import / Sdk
    Project,
    Version,
    MinimumVersion,
    // UsingTask
    TaskName,
    AssemblyFile,
    AssemblyName,
    TaskFactory,
    Unknown,
}

impl AttributeKind {
    /// Classify attribute `name` on an element of role `element`.
    pub fn classify(element: ElementKind, name: &str) -> AttributeKind {
        use AttributeKind as A;

        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "condition" => return A::Condition,
            "label" => return A::Label,
            _ => {}
        }
        if lower == "xmlns" || lower.starts_with("xmlns:") {
            return A::Xmlns;
        }

        match element {
            ElementKind::Project => match lower.as_str() {
                "sdk" => A::Sdk,
                "defaulttargets" => A::DefaultTargets,
                "initialtargets" => A::InitialTargets,
                "treataslocalproperty" => A::TreatAsLocalProperty,
                "toolsversion" => A::ToolsVersion,
                _ => A::Unknown,
            },
            ElementKind::Item | ElementKind::ItemDefinition => match lower.as_str() {
                "include" => A::Include,
                "exclude" => A::Exclude,
                "remove" => A::Remove,
                "update" => A::Update,
                "keepmetadata" => A::KeepMetadata,
                "removemetadata" => A::RemoveMetadata,
                "keepduplicates" => A::KeepDuplicates,
                "matchonmetadata" => A::MatchOnMetadata,
                "matchonmetadataoptions" => A::MatchOnMetadataOptions,
                _ => A::Metadata,
            },
            ElementKind::Target => match lower.as_str() {
                "name" => A::Name,
                "dependsontargets" => A::DependsOnTargets,
                "beforetargets" => A::BeforeTargets,
                "aftertargets" => A::AfterTargets,
                "inputs" => A::Inputs,
                "outputs" => A::Outputs,
                "returns" => A::Returns,
                "keepduplicateoutputs" => A::KeepDuplicateOutputs,
                _ => A::Unknown,
            },
            ElementKind::Task => match lower.as_str() {
                "continueonerror" => A::ContinueOnError,
                "msbuildruntime" => A::Runtime,
                "msbuildarchitecture" => A::Architecture,
                _ => A::TaskParameter,
            },
            ElementKind::Output => match lower.as_str() {
                "taskparameter" => A::TaskParameter,
                "propertyname" => A::PropertyName,
                "itemname" => A::ItemName,
                _ => A::Unknown,
            },
            ElementKind::OnError => match lower.as_str() {
                "executetargets" => A::ExecuteTargets,
                _ => A::Unknown,
            },
            ElementKind::Import => match lower.as_str() {
                "project" => A::Project,
                "sdk" => A::Sdk,
                "version" => A::Version,
                "minimumversion" => A::MinimumVersion,
                _ => A::Unknown,
            },
            ElementKind::Sdk => match lower.as_str() {
                "name" => A::Name,
                "version" => A::Version,
                "minimumversion" => A::MinimumVersion,
                _ => A::Unknown,
            },
            ElementKind::UsingTask => match lower.as_str() {
                "taskname" => A::TaskName,
                "assemblyfile" => A::AssemblyFile,
                "assemblyname" => A::AssemblyName,
                "taskfactory" => A::TaskFactory,
                "runtime" => A::Runtime,
                "architecture" => A::Architecture,
                _ => A::Unknown,
            },
            _ => A::Unknown,
        }
    }

    /// Attributes holding `;`-separated target names.
    pub fn is_target_list(self) -> bool {
        matches!(
            self,
            AttributeKind::DependsOnTargets
                | AttributeKind::BeforeTargets
                | AttributeKind::AfterTargets
                | AttributeKind::DefaultTargets
                | AttributeKind::InitialTargets
                | AttributeKind::ExecuteTargets
        )
    }
}
