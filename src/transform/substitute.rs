//! Ordered text substitutions applied to rendered PlantUML, and the
//! line deduplication that follows them.
//!
//! Entry order is part of the contract: `Optional[List[X]]` must be rewritten
//! before `List[X]` and `Optional[X]` get a chance to match its inner parts.

use crate::transform::naming::snake_to_camel;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Lines kept even when repeated.
const STRUCTURAL_LINES: &[&str] = &["{", "}", ""];

#[derive(Debug, Clone)]
pub struct Substitution {
    pattern: Regex,
    replacement: String,
    rationale: &'static str,
}

impl Substitution {
    pub fn new(
        pattern: &str,
        replacement: &str,
        rationale: &'static str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.to_string(),
            rationale,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn rationale(&self) -> &'static str {
        self.rationale
    }

    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement.as_str())
            .into_owned()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubstitutionTable {
    entries: Vec<Substitution>,
}

static CARDINALITY: LazyLock<SubstitutionTable> = LazyLock::new(|| {
    let mut table = SubstitutionTable::default();
    table
        .push_cardinality()
        .expect("cardinality patterns are valid");
    table
});

impl SubstitutionTable {
    /// Table applied to the final diagram text of a domain rooted at
    /// `module`, with `submodules` prefixes stripped as well.
    pub fn for_domain(module: &str, submodules: &[String]) -> Result<Self, regex::Error> {
        let mut table = Self::default();
        table.push(r"\{static\}", "", "static markers are not drawn")?;
        table.push(":  \n", "\n", "enum members carry no type")?;
        table.push(
            &format!(r"{}\.", regex::escape(&snake_to_camel(module))),
            "",
            "package prefix of qualified names",
        )?;
        table.push(r"\+ID:", "+id:", "identifier attribute is lowercase")?;
        table.push_cardinality()?;
        table.push(
            r"abstract class (.+?) \{",
            "abstract class ${1} <<abstract>> {",
            "abstract stereotype",
        )?;
        table.push(
            r"enum (.+?) \{",
            "enum ${1} <<enumeration>> {",
            "enumeration stereotype",
        )?;
        for submodule in submodules {
            table.push(
                &format!(r"{}\.", regex::escape(&snake_to_camel(submodule))),
                "",
                "submodule prefix of qualified names",
            )?;
        }
        Ok(table)
    }

    fn push(
        &mut self,
        pattern: &str,
        replacement: &str,
        rationale: &'static str,
    ) -> Result<&mut Self, regex::Error> {
        self.entries
            .push(Substitution::new(pattern, replacement, rationale)?);
        Ok(self)
    }

    fn push_cardinality(&mut self) -> Result<&mut Self, regex::Error> {
        self.push(
            r"Optional\[List\[(.+?)\]\]",
            "${1}[0..*]",
            "optional collection: zero or more",
        )?;
        self.push(r"List\[(.+?)\]", "${1}[1..*]", "collection: one or more")?;
        self.push(r"Optional\[(.+?)\]", "${1}[0..1]", "optional: zero or one")
    }

    pub fn entries(&self) -> &[Substitution] {
        &self.entries
    }

    pub fn apply(&self, text: &str) -> String {
        self.entries
            .iter()
            .fold(text.to_string(), |acc, entry| entry.apply(&acc))
    }
}

/// Rewrite `Optional`/`List` wrappers into UML multiplicities.
pub fn annotate_cardinality(type_expr: &str) -> String {
    CARDINALITY.apply(type_expr)
}

/// Drop repeated lines, except structural delimiters.
///
/// Repetition is judged within one block: the seen-set starts over at every
/// line opening a block, so two classes may share an attribute line.
pub fn dedupe_lines(text: &str) -> String {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut kept: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.ends_with('{') {
            seen.clear();
        }
        if STRUCTURAL_LINES.contains(&line) || seen.insert(line) {
            kept.push(line);
        }
    }

    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_rewrites() {
        assert_eq!(annotate_cardinality("Optional[List[Foo]]"), "Foo[0..*]");
        assert_eq!(annotate_cardinality("List[Foo]"), "Foo[1..*]");
        assert_eq!(annotate_cardinality("Optional[Foo]"), "Foo[0..1]");
        assert_eq!(annotate_cardinality("Foo"), "Foo");
    }

    #[test]
    fn test_double_wrapper_matched_first() {
        // Single-wrapper rules alone would leave `Foo[1..*][0..1]`
        let table = SubstitutionTable::for_domain("pkg", &[]).unwrap();
        assert_eq!(table.apply("  +keys: Optional[List[Foo]]"), "  +keys: Foo[0..*]");
    }

    #[test]
    fn test_table_order() {
        let table = SubstitutionTable::for_domain("aas_core_meta", &["v3".to_string()]).unwrap();
        let patterns: Vec<_> = table.entries().iter().map(|e| e.pattern()).collect();
        assert_eq!(
            patterns,
            vec![
                r"\{static\}",
                ":  \n",
                r"aasCoreMeta\.",
                r"\+ID:",
                r"Optional\[List\[(.+?)\]\]",
                r"List\[(.+?)\]",
                r"Optional\[(.+?)\]",
                r"abstract class (.+?) \{",
                r"enum (.+?) \{",
                r"v3\.",
            ]
        );
        assert!(table.entries().iter().all(|e| !e.rationale().is_empty()));
    }

    #[test]
    fn test_golden_substitution() {
        let rendered = "\
@startuml
skinparam classAttributeIconSize 0
hide methods

abstract class aasCoreMeta.v3.HasSemantics {
  +semanticId: Optional[aasCoreMeta.v3.Reference]
  +supplementalSemanticId: Optional[List[aasCoreMeta.v3.Reference]]
}
enum aasCoreMeta.v3.AssetKind {
  Type:  {static}
  Instance:  {static}
}
class aasCoreMeta.v3.Key {
  +ID: str
}
aasCoreMeta.v3.HasSemantics ..> aasCoreMeta.v3.Reference
@enduml";

        let table = SubstitutionTable::for_domain("aas_core_meta", &["v3".to_string()]).unwrap();
        let expected = "\
@startuml
skinparam classAttributeIconSize 0
hide methods

abstract class HasSemantics <<abstract>> {
  +semanticId: Reference[0..1]
  +supplementalSemanticId: Reference[0..*]
}
enum AssetKind <<enumeration>> {
  Type
  Instance
}
class Key {
  +id: str
}
HasSemantics ..> Reference
@enduml";
        assert_eq!(table.apply(rendered), expected);
        assert_eq!(table.apply("  +value: int {static}"), "  +value: int ");
    }

    #[test]
    fn test_dedupe_keeps_structure() {
        let text = "class A {\n  +x: int\n  +x: int\n}\n\nclass B {\n  +x: int\n}\n";
        assert_eq!(
            dedupe_lines(text),
            "class A {\n  +x: int\n}\n\nclass B {\n  +x: int\n}"
        );
    }

    #[test]
    fn test_dedupe_scattered_lines_in_block() {
        let text = "class A {\n  +x: int\n  +y: str\n  +x: int\n}\nA --> B\nA --> B";
        assert_eq!(dedupe_lines(text), "class A {\n  +x: int\n  +y: str\n}\nA --> B");
    }
}
