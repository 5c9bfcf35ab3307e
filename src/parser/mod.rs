mod common;
mod python;
mod resolve;

use crate::model::Domain;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use common::{last_segment, normalize_annotation, unquote};
pub use python::PythonCollector;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Domain path not found: {0}")]
    PathNotFound(PathBuf),
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("No Python modules found under {0}")]
    NoModules(PathBuf),
}

/// Everything one collection pass yields: the raw domain and the decorator
/// text needed later by annotation-driven passes.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub domain: Domain,
    pub annotations: AnnotationIndex,
}

/// Produces the raw item/relation snapshot of a domain package.
pub trait Collector: Send + Sync {
    fn collect(&self, path: &Path, module: &str) -> Result<Collected, CollectError>;
}

/// Read access to the decorator source text of a declaration.
pub trait AnnotationSource {
    /// Decorators of the declaration keyed by `origin`, without the leading
    /// `@`, in source order.
    fn decorators(&self, origin: &str) -> &[String];

    fn has_decorator(&self, origin: &str, name: &str) -> bool {
        self.decorators(origin)
            .iter()
            .any(|d| decorator_name(d) == name)
    }

    /// Full text of every decorator called `name`.
    fn decorators_named<'a>(&'a self, origin: &str, name: &'a str) -> Vec<&'a str> {
        self.decorators(origin)
            .iter()
            .filter(|d| decorator_name(d) == name)
            .map(String::as_str)
            .collect()
    }
}

/// Callee part of a decorator, e.g. `invariant` for `invariant(lambda self: …)`.
pub fn decorator_name(decorator: &str) -> &str {
    decorator
        .split('(')
        .next()
        .unwrap_or(decorator)
        .trim()
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    decorators: HashMap<String, Vec<String>>,
}

impl AnnotationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, origin: impl Into<String>, decorators: Vec<String>) {
        if !decorators.is_empty() {
            self.decorators.insert(origin.into(), decorators);
        }
    }

    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }
}

impl AnnotationSource for AnnotationIndex {
    fn decorators(&self, origin: &str) -> &[String] {
        self.decorators
            .get(origin)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
