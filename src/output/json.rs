use crate::model::{Domain, UmlItem, UmlRelation};
use crate::output::OutputFormatter;
use serde::Serialize;
use std::io::Write;

/// Dumps the domain model, items in output order.
pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonDomain<'a> {
    items: Vec<&'a UmlItem>,
    relations: &'a [UmlRelation],
}

impl OutputFormatter for JsonOutput {
    fn format<W: Write>(&self, domain: &Domain, writer: &mut W) -> std::io::Result<()> {
        let json_domain = JsonDomain {
            items: domain.items.values().collect(),
            relations: &domain.relations,
        };

        let json = serde_json::to_string_pretty(&json_domain)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        writeln!(writer, "{}", json)
    }
}
