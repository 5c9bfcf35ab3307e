use crate::model::{Domain, UmlAttribute, UmlClass, UmlEnum, UmlItem, UmlRelation};
use crate::output::OutputFormatter;
use std::io::Write;
use std::iter;

static HEADER: [&str; 4] = [
    "@startuml",
    "skinparam classAttributeIconSize 0",
    "hide methods",
    "",
];
const FOOTER: &str = "@enduml";
const STATIC_MARKER: &str = " {static}";

/// PlantUML class-diagram writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PumlOutput {
    /// Emit members alphabetically (case-insensitive) instead of in
    /// declaration order.
    pub sort_members: bool,
}

impl PumlOutput {
    pub fn new(sort_members: bool) -> Self {
        Self { sort_members }
    }

    /// Diagram lines, produced lazily item by item.
    pub fn lines<'a>(&'a self, domain: &'a Domain) -> impl Iterator<Item = String> + 'a {
        HEADER
            .iter()
            .map(|line| line.to_string())
            .chain(domain.items.values().flat_map(move |item| self.item_lines(item)))
            .chain(domain.relations.iter().map(relation_line))
            .chain(iter::once(FOOTER.to_string()))
    }

    /// Whole diagram, newline-terminated.
    pub fn render(&self, domain: &Domain) -> String {
        let mut text = self.lines(domain).collect::<Vec<_>>().join("\n");
        text.push('\n');
        text
    }

    fn item_lines(&self, item: &UmlItem) -> Vec<String> {
        match item {
            UmlItem::Class(class) => self.class_lines(class),
            UmlItem::Enum(item) => self.enum_lines(item),
        }
    }

    fn class_lines(&self, class: &UmlClass) -> Vec<String> {
        let kind = if class.is_abstract {
            "abstract class"
        } else {
            "class"
        };

        let mut attributes = without_shadowed_instances(&class.attributes);
        if self.sort_members {
            attributes.sort_by_key(|a| a.name.to_lowercase());
        }

        let mut lines = Vec::with_capacity(attributes.len() + 2);
        lines.push(opening_line(kind, &class.fqn, &class.generics));
        for attribute in attributes {
            lines.push(member_line(
                attribute.visibility().marker(),
                &attribute.name,
                &attribute.type_expr,
                attribute.is_static,
            ));
        }
        lines.push("}".to_string());
        lines
    }

    fn enum_lines(&self, item: &UmlEnum) -> Vec<String> {
        let mut members: Vec<_> = item.members.iter().collect();
        if self.sort_members {
            members.sort_by_key(|m| m.name.to_lowercase());
        }

        let mut lines = Vec::with_capacity(members.len() + 2);
        lines.push(opening_line("enum", &item.fqn, &item.generics));
        for member in members {
            lines.push(member_line("", &member.name, &member.value, true));
        }
        lines.push("}".to_string());
        lines
    }
}

impl OutputFormatter for PumlOutput {
    fn format<W: Write>(&self, domain: &Domain, writer: &mut W) -> std::io::Result<()> {
        for line in self.lines(domain) {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }
}

/// Instance attributes named like a static attribute of the same class are
/// dropped; the class-level declaration is the one drawn.
fn without_shadowed_instances(attributes: &[UmlAttribute]) -> Vec<&UmlAttribute> {
    attributes
        .iter()
        .filter(|a| {
            a.is_static
                || !attributes
                    .iter()
                    .any(|other| other.is_static && other.name == a.name)
        })
        .collect()
}

fn opening_line(kind: &str, fqn: &str, generics: &str) -> String {
    if generics.is_empty() {
        format!("{} {} {{", kind, fqn)
    } else {
        format!("{} {}<{}> {{", kind, fqn, generics)
    }
}

fn member_line(visibility: &str, name: &str, type_expr: &str, is_static: bool) -> String {
    let marker = if is_static { STATIC_MARKER } else { "" };
    format!("  {}{}: {}{}", visibility, name, type_expr, marker)
}

fn relation_line(relation: &UmlRelation) -> String {
    format!(
        "{}{} {}{} {}{}",
        relation.source_fqn,
        quoted(&relation.source_cardinality),
        relation.rel_type.symbol(),
        quoted(&relation.target_cardinality),
        relation.target_fqn,
        relation.label_suffix()
    )
}

/// ` "card"` multiplicity prefix, or nothing when unset.
fn quoted(cardinality: &str) -> String {
    if cardinality.is_empty() {
        String::new()
    } else {
        format!(" \"{}\"", cardinality)
    }
}
