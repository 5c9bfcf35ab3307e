//! Graph rewrites applied to a collected [`Domain`](crate::model::Domain)
//! before it is rendered.

pub mod filter;
pub mod flatten;
pub mod naming;
pub mod normalize;
pub mod substitute;
pub mod synthesize;

pub use filter::{prune_relations, retain, retain_submodules};
pub use flatten::include_parent_members;
pub use naming::{singularize, snake_to_camel};
pub use substitute::{Substitution, SubstitutionTable, dedupe_lines};
pub use synthesize::{ReferenceSettings, add_reference_relations};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("cyclic inheritance: {}", .cycle.join(" -> "))]
    CyclicInheritance { cycle: Vec<String> },

    #[error("unknown item '{fqn}' referenced by {context}")]
    UnknownItem { fqn: String, context: String },

    #[error("unsupported invariant in {class}: {text}")]
    UnsupportedInvariant { class: String, text: String },

    #[error("invalid substitution pattern: {0}")]
    Pattern(#[from] regex::Error),
}
