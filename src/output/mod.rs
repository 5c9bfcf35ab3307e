mod json;
mod puml;

pub use json::JsonOutput;
pub use puml::PumlOutput;

use crate::model::Domain;
use std::io::Write;

pub trait OutputFormatter {
    fn format<W: Write>(&self, domain: &Domain, writer: &mut W) -> std::io::Result<()>;
}
