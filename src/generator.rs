//! The diagram generator: one collection pass, any number of diagrams.

use crate::api::Aas2PumlError;
use crate::model::Domain;
use crate::output::PumlOutput;
use crate::parser::{AnnotationSource, Collected, Collector};
use crate::transform::normalize::{
    annotate_cardinalities, dedupe_relations, demote_compositions, enum_values_as_names,
    mark_abstract_classes, rename_to_camel_case, singularize_plural_attributes,
};
use crate::transform::{
    ReferenceSettings, SubstitutionTable, TransformError, add_reference_relations, dedupe_lines,
    include_parent_members, retain, retain_submodules, snake_to_camel,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Decorator marking a class as abstract in the domain package.
pub const ABSTRACT_DECORATOR: &str = "abstract";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub domain_path: PathBuf,
    /// Package name, e.g. `aas_core_meta`.
    pub domain_module: String,
    /// Only items from these submodules are kept; empty keeps everything.
    pub domain_submodules: Vec<String>,
    pub references: ReferenceSettings,
}

impl GeneratorSettings {
    pub fn new(domain_path: impl Into<PathBuf>, domain_module: impl Into<String>) -> Self {
        Self {
            domain_path: domain_path.into(),
            domain_module: domain_module.into(),
            ..Self::default()
        }
    }

    pub fn with_submodules(mut self, submodules: Vec<String>) -> Self {
        self.domain_submodules = submodules;
        self
    }

    pub fn with_references(mut self, references: ReferenceSettings) -> Self {
        self.references = references;
        self
    }
}

/// Per-diagram knobs of [`AasPumlGenerator::generate_puml`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramOptions {
    /// Fqns to draw, in this order. `None` or empty draws every item.
    pub keep: Option<Vec<String>>,
    pub include_parent_members: bool,
    pub sort_members: bool,
}

impl DiagramOptions {
    pub fn only(keep: Vec<String>) -> Self {
        Self {
            keep: Some(keep),
            ..Self::default()
        }
    }

    pub fn with_parent_members(mut self, include: bool) -> Self {
        self.include_parent_members = include;
        self
    }

    pub fn with_sorted_members(mut self, sort: bool) -> Self {
        self.sort_members = sort;
        self
    }
}

pub struct AasPumlGenerator {
    settings: GeneratorSettings,
    domain: Domain,
    substitutions: SubstitutionTable,
}

impl AasPumlGenerator {
    /// Collect the package and bring it into display shape.
    pub fn new(
        settings: GeneratorSettings,
        collector: &dyn Collector,
    ) -> Result<Self, Aas2PumlError> {
        let Collected {
            mut domain,
            annotations,
        } = collector.collect(&settings.domain_path, &settings.domain_module)?;
        info!(
            items = domain.items.len(),
            relations = domain.relations.len(),
            annotated = annotations.len(),
            "collected {}",
            settings.domain_module
        );
        if annotations.is_empty() {
            debug!("no decorators found; abstract and reference passes have nothing to do");
        }

        prepare(&mut domain, &annotations, &settings)?;
        Self::from_domain(settings, domain)
    }

    /// Wrap an already prepared domain; no construction pass runs.
    pub fn from_domain(settings: GeneratorSettings, domain: Domain) -> Result<Self, Aas2PumlError> {
        let substitutions =
            SubstitutionTable::for_domain(&settings.domain_module, &settings.domain_submodules)
                .map_err(TransformError::from)?;
        Ok(Self {
            settings,
            domain,
            substitutions,
        })
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn into_domain(self) -> Domain {
        self.domain
    }

    /// Render one diagram. The generator's own domain is left untouched, so
    /// calls are independent of each other.
    pub fn generate_puml(&self, options: &DiagramOptions) -> Result<String, Aas2PumlError> {
        let mut domain = self.diagram_domain(options)?;
        annotate_cardinalities(&mut domain);

        let rendered = PumlOutput::new(options.sort_members).render(&domain);
        let text = rendered.strip_suffix('\n').unwrap_or(&rendered);
        let text = self.substitutions.apply(text);
        Ok(dedupe_lines(&text))
    }

    /// The copy of the domain a diagram is drawn from, before cardinalities
    /// are annotated.
    pub fn diagram_domain(&self, options: &DiagramOptions) -> Result<Domain, Aas2PumlError> {
        let mut domain = self.domain.clone();
        if options.include_parent_members {
            include_parent_members(&mut domain)?;
        }
        if let Some(keep) = options.keep.as_deref().filter(|keep| !keep.is_empty()) {
            retain(&mut domain, keep);
        }
        Ok(domain)
    }

    /// Map user-facing class names to fqns.
    ///
    /// Accepts fqns, bare names and module-qualified names, in snake_case or
    /// camelCase. Names that match nothing are passed through unchanged and
    /// later ignored by the filter.
    pub fn resolve_names(&self, names: &[String]) -> Vec<String> {
        names
            .iter()
            .map(|name| match self.resolve_name(name) {
                Some(fqn) => fqn,
                None => {
                    warn!("no item named {}", name);
                    name.clone()
                }
            })
            .collect()
    }

    pub fn resolve_name(&self, name: &str) -> Option<String> {
        if self.domain.contains(name) {
            return Some(name.to_string());
        }
        let camel = snake_to_camel(name.trim());
        if self.domain.contains(&camel) {
            return Some(camel);
        }

        let suffix = format!(".{}", camel);
        self.domain
            .items
            .values()
            .find(|item| {
                if camel.contains('.') {
                    item.fqn().ends_with(&suffix)
                } else {
                    item.name() == camel
                }
            })
            .map(|item| item.fqn().to_string())
    }
}

/// Construction passes, in order.
fn prepare(
    domain: &mut Domain,
    annotations: &dyn AnnotationSource,
    settings: &GeneratorSettings,
) -> Result<(), TransformError> {
    if !settings.domain_submodules.is_empty() {
        retain_submodules(domain, &settings.domain_module, &settings.domain_submodules);
        debug!(
            items = domain.items.len(),
            "restricted to submodules {:?}", settings.domain_submodules
        );
    }

    dedupe_relations(domain);
    let references = add_reference_relations(domain, annotations, &settings.references)?;
    demote_compositions(domain);
    let abstracts = mark_abstract_classes(domain, annotations, ABSTRACT_DECORATOR);
    enum_values_as_names(domain);
    rename_to_camel_case(domain);
    singularize_plural_attributes(domain);

    info!(
        items = domain.items.len(),
        relations = domain.relations.len(),
        references,
        abstracts,
        "prepared domain"
    );
    Ok(())
}
