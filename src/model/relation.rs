use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelType {
    Composition,
    Dependency,
    Inheritance,
    Reference,
}

impl RelType {
    /// PlantUML arrow drawn between source and target.
    pub fn symbol(self) -> &'static str {
        match self {
            RelType::Composition => "*--",
            RelType::Dependency => "..>",
            RelType::Inheritance => "<|--",
            RelType::Reference => "-->",
        }
    }
}

/// Directed relation between two items, keyed by fqn.
///
/// For inheritance the source is the parent and the target the child,
/// matching the `Parent <|-- Child` arrow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UmlRelation {
    pub source_fqn: String,
    pub target_fqn: String,
    pub rel_type: RelType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_cardinality: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target_cardinality: String,
}

impl UmlRelation {
    pub fn new(source: impl Into<String>, target: impl Into<String>, rel_type: RelType) -> Self {
        Self {
            source_fqn: source.into(),
            target_fqn: target.into(),
            rel_type,
            label: String::new(),
            source_cardinality: String::new(),
            target_cardinality: String::new(),
        }
    }

    pub fn inheritance(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::new(parent, child, RelType::Inheritance)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn is_inheritance(&self) -> bool {
        self.rel_type == RelType::Inheritance
    }

    /// Label suffix as written after the arrow, e.g. ` : submodel:ref`.
    pub fn label_suffix(&self) -> String {
        if self.label.is_empty() {
            String::new()
        } else {
            format!(" : {}", self.label)
        }
    }
}
