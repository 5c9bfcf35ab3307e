use crate::define_parser;
use crate::fs::{FileSystem, default_fs};
use crate::model::Member;
use crate::parser::common::{last_segment, node_text, normalize_annotation, unquote};
use crate::parser::resolve::build_domain;
use crate::parser::{CollectError, Collected, Collector};
use ignore::WalkBuilder;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tree_sitter::Node;

define_parser!(PYTHON_PARSER, tree_sitter_python::LANGUAGE);

const ENUM_BASES: &[&str] = &["Enum", "IntEnum", "StrEnum", "Flag", "IntFlag"];

/// One parsed `.py` file, before names are resolved across the package.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedModule {
    pub fqn: String,
    /// Local alias -> qualified name, from `import` / `from … import`.
    pub imports: HashMap<String, String>,
    /// Modules pulled in with `from X import *`.
    pub wildcard_imports: Vec<String>,
    pub classes: Vec<ParsedClass>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedClass {
    pub name: String,
    pub decorators: Vec<String>,
    pub bases: Vec<String>,
    pub metaclass: Option<String>,
    pub type_params: Vec<String>,
    pub attributes: Vec<ParsedAttribute>,
    pub members: Vec<Member>,
    pub is_enum: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedAttribute {
    pub name: String,
    pub type_text: String,
    pub is_static: bool,
}

/// Collects classes and enums from a Python package by parsing its sources
/// with tree-sitter; nothing is imported or executed.
pub struct PythonCollector;

impl PythonCollector {
    pub fn new() -> Self {
        Self
    }

    pub fn collect_with_fs(
        &self,
        path: &Path,
        module: &str,
        fs: &dyn FileSystem,
    ) -> Result<Collected, CollectError> {
        if !fs.exists(path) {
            return Err(CollectError::PathNotFound(path.to_path_buf()));
        }

        let walker = WalkBuilder::new(path)
            .hidden(true)
            .git_ignore(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut files = Vec::new();
        for entry in walker.flatten() {
            let file_path = entry.path();
            if !file_path.is_file() || file_path.extension().is_none_or(|ext| ext != "py") {
                continue;
            }
            let relative = file_path.strip_prefix(path).unwrap_or(file_path);
            let source = fs.read_to_string(file_path)?;
            files.push((relative.to_path_buf(), source));
        }

        if files.is_empty() {
            return Err(CollectError::NoModules(path.to_path_buf()));
        }

        self.collect_sources(module, files)
    }

    /// Collect from in-memory `(path relative to the package, source)` pairs.
    pub fn collect_sources<I>(&self, module: &str, files: I) -> Result<Collected, CollectError>
    where
        I: IntoIterator<Item = (PathBuf, String)>,
    {
        let mut modules = Vec::new();
        for (relative, source) in files {
            let (fqn, is_package) = module_fqn(module, &relative);
            debug!(module = %fqn, "parsing python module");
            let parsed = Self::parse_module(&fqn, is_package, &source).map_err(|message| {
                CollectError::Parse {
                    path: relative.clone(),
                    message,
                }
            })?;
            modules.push(parsed);
        }

        let collected = build_domain(&modules);
        debug!(
            items = collected.domain.items.len(),
            relations = collected.domain.relations.len(),
            "collected domain"
        );
        Ok(collected)
    }

    pub(crate) fn parse_module(
        fqn: &str,
        is_package: bool,
        source: &str,
    ) -> Result<ParsedModule, String> {
        let tree = PYTHON_PARSER
            .with(|parser| parser.borrow_mut().parse(source, None))
            .ok_or_else(|| "Failed to parse file".to_string())?;

        let root = tree.root_node();
        if root.has_error() {
            warn!(module = %fqn, "syntax errors in module, collecting what parsed");
        }

        let mut module = ParsedModule {
            fqn: fqn.to_string(),
            ..Default::default()
        };

        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "import_statement" => Self::handle_import(&node, source, &mut module),
                "import_from_statement" => {
                    Self::handle_import_from(&node, source, is_package, &mut module)
                }
                "class_definition" => {
                    if let Some(class) = Self::handle_class(&node, Vec::new(), source) {
                        module.classes.push(class);
                    }
                }
                "decorated_definition" => {
                    let decorators = Self::decorators(&node, source);
                    if let Some(definition) = node.child_by_field_name("definition") {
                        if definition.kind() == "class_definition" {
                            if let Some(class) = Self::handle_class(&definition, decorators, source)
                            {
                                module.classes.push(class);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(module)
    }

    /// `import a.b` / `import a.b as c`
    fn handle_import(node: &Node, source: &str, module: &mut ParsedModule) {
        let mut cursor = node.walk();
        for child in node.children_by_field_name("name", &mut cursor) {
            match child.kind() {
                "dotted_name" => {
                    let name = node_text(&child, source);
                    module.imports.insert(name.to_string(), name.to_string());
                }
                "aliased_import" => {
                    if let (Some(name), Some(alias)) = (
                        child.child_by_field_name("name"),
                        child.child_by_field_name("alias"),
                    ) {
                        module.imports.insert(
                            node_text(&alias, source).to_string(),
                            node_text(&name, source).to_string(),
                        );
                    }
                }
                _ => {}
            }
        }
    }

    /// `from x import a, b as c` / `from . import a` / `from x import *`
    fn handle_import_from(
        node: &Node,
        source: &str,
        is_package: bool,
        module: &mut ParsedModule,
    ) {
        let Some(module_node) = node.child_by_field_name("module_name") else {
            return;
        };

        let from = if module_node.kind() == "relative_import" {
            let text = node_text(&module_node, source);
            let dots = text.chars().take_while(|c| *c == '.').count();
            let rest = text[dots..].trim();
            absolute_module(&module.fqn, is_package, dots, rest)
        } else {
            node_text(&module_node, source).to_string()
        };

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "wildcard_import" {
                module.wildcard_imports.push(from.clone());
            }
        }

        let mut cursor = node.walk();
        for child in node.children_by_field_name("name", &mut cursor) {
            let (name, alias) = match child.kind() {
                "aliased_import" => match (
                    child.child_by_field_name("name"),
                    child.child_by_field_name("alias"),
                ) {
                    (Some(name), Some(alias)) => (
                        node_text(&name, source).to_string(),
                        node_text(&alias, source).to_string(),
                    ),
                    _ => continue,
                },
                _ => {
                    let name = node_text(&child, source).to_string();
                    (name.clone(), name)
                }
            };
            let qualified = if from.is_empty() {
                name
            } else {
                format!("{}.{}", from, name)
            };
            module.imports.insert(alias, qualified);
        }
    }

    fn decorators(node: &Node, source: &str) -> Vec<String> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| child.kind() == "decorator")
            .map(|child| {
                node_text(&child, source)
                    .trim()
                    .trim_start_matches('@')
                    .trim()
                    .to_string()
            })
            .collect()
    }

    fn handle_class(node: &Node, decorators: Vec<String>, source: &str) -> Option<ParsedClass> {
        let name = node_text(&node.child_by_field_name("name")?, source).to_string();
        let mut class = ParsedClass {
            name,
            decorators,
            ..Default::default()
        };

        if let Some(arguments) = node.child_by_field_name("superclasses") {
            let mut cursor = arguments.walk();
            for argument in arguments.named_children(&mut cursor) {
                match argument.kind() {
                    "keyword_argument" => {
                        let key = argument.child_by_field_name("name");
                        let value = argument.child_by_field_name("value");
                        if let (Some(key), Some(value)) = (key, value) {
                            if node_text(&key, source) == "metaclass" {
                                class.metaclass = Some(node_text(&value, source).to_string());
                            }
                        }
                    }
                    "comment" => {}
                    "subscript" => {
                        // Generic[T, U] contributes type parameters, not a base
                        let base = argument
                            .child_by_field_name("value")
                            .map(|v| node_text(&v, source).to_string())
                            .unwrap_or_default();
                        if last_segment(&base) == "Generic" {
                            let mut sub_cursor = argument.walk();
                            class.type_params.extend(
                                argument
                                    .children_by_field_name("subscript", &mut sub_cursor)
                                    .map(|p| node_text(&p, source).to_string()),
                            );
                        } else {
                            class.bases.push(base);
                        }
                    }
                    _ => class.bases.push(node_text(&argument, source).to_string()),
                }
            }
        }

        class.is_enum = class
            .bases
            .iter()
            .any(|base| ENUM_BASES.contains(&last_segment(base)));

        let body = node.child_by_field_name("body")?;
        let mut cursor = body.walk();
        for statement in body.named_children(&mut cursor) {
            match statement.kind() {
                "expression_statement" => {
                    let mut inner = statement.walk();
                    for expression in statement.named_children(&mut inner) {
                        if expression.kind() == "assignment" {
                            Self::handle_class_assignment(&expression, source, &mut class);
                        }
                    }
                }
                "function_definition" => Self::handle_method(&statement, source, &mut class),
                "decorated_definition" => {
                    if let Some(definition) = statement.child_by_field_name("definition") {
                        if definition.kind() == "function_definition" {
                            Self::handle_method(&definition, source, &mut class);
                        }
                    }
                }
                _ => {}
            }
        }

        Some(class)
    }

    fn handle_class_assignment(node: &Node, source: &str, class: &mut ParsedClass) {
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        if left.kind() != "identifier" {
            return;
        }
        let name = node_text(&left, source).to_string();
        let annotation = node.child_by_field_name("type");
        let value = node.child_by_field_name("right");

        if class.is_enum {
            if let (None, Some(value)) = (annotation, value) {
                if !name.starts_with('_') {
                    class.members.push(Member::new(name, literal_value(&value, source)));
                }
            }
            return;
        }

        if is_dunder(&name) {
            return;
        }

        let attribute = match (annotation, value) {
            (Some(annotation), _) => {
                let type_text = normalize_annotation(node_text(&annotation, source));
                match class_var_inner(&type_text) {
                    Some(inner) => ParsedAttribute {
                        name,
                        type_text: inner.to_string(),
                        is_static: true,
                    },
                    None => ParsedAttribute {
                        name,
                        type_text,
                        is_static: false,
                    },
                }
            }
            (None, Some(value)) => match literal_type(&value) {
                Some(type_text) => ParsedAttribute {
                    name,
                    type_text: type_text.to_string(),
                    is_static: true,
                },
                None => return,
            },
            (None, None) => return,
        };
        push_attribute(class, attribute);
    }

    /// Only `__init__` contributes attributes, through `self.x` assignments.
    fn handle_method(node: &Node, source: &str, class: &mut ParsedClass) {
        if class.is_enum {
            return;
        }
        let is_init = node
            .child_by_field_name("name")
            .is_some_and(|n| node_text(&n, source) == "__init__");
        if !is_init {
            return;
        }

        let mut parameters: HashMap<String, String> = HashMap::new();
        if let Some(params) = node.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            for param in params.named_children(&mut cursor) {
                let name = match param.kind() {
                    "typed_parameter" => param.named_child(0),
                    "typed_default_parameter" => param.child_by_field_name("name"),
                    _ => None,
                };
                if let (Some(name), Some(annotation)) = (name, param.child_by_field_name("type")) {
                    parameters.insert(
                        node_text(&name, source).to_string(),
                        normalize_annotation(node_text(&annotation, source)),
                    );
                }
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            Self::collect_self_assignments(&body, source, &parameters, class);
        }
    }

    fn collect_self_assignments(
        node: &Node,
        source: &str,
        parameters: &HashMap<String, String>,
        class: &mut ParsedClass,
    ) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "function_definition" | "class_definition" | "lambda" => continue,
                "assignment" => {
                    if let Some(attribute) = self_assignment(&child, source, parameters) {
                        push_attribute(class, attribute);
                    }
                }
                _ => Self::collect_self_assignments(&child, source, parameters, class),
            }
        }
    }
}

impl Collector for PythonCollector {
    fn collect(&self, path: &Path, module: &str) -> Result<Collected, CollectError> {
        self.collect_with_fs(path, module, default_fs())
    }
}

impl Default for PythonCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// `self.x: T = …` or `self.x = param` inside `__init__`.
fn self_assignment(
    node: &Node,
    source: &str,
    parameters: &HashMap<String, String>,
) -> Option<ParsedAttribute> {
    let left = node.child_by_field_name("left")?;
    if left.kind() != "attribute" {
        return None;
    }
    let object = left.child_by_field_name("object")?;
    if node_text(&object, source) != "self" {
        return None;
    }
    let name = node_text(&left.child_by_field_name("attribute")?, source).to_string();
    if is_dunder(&name) {
        return None;
    }

    let type_text = match node.child_by_field_name("type") {
        Some(annotation) => normalize_annotation(node_text(&annotation, source)),
        None => {
            let value = node.child_by_field_name("right")?;
            if value.kind() != "identifier" {
                return None;
            }
            parameters.get(node_text(&value, source))?.clone()
        }
    };

    Some(ParsedAttribute {
        name,
        type_text,
        is_static: false,
    })
}

fn push_attribute(class: &mut ParsedClass, attribute: ParsedAttribute) {
    let exists = class
        .attributes
        .iter()
        .any(|a| a.name == attribute.name && a.is_static == attribute.is_static);
    if !exists {
        class.attributes.push(attribute);
    }
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

fn class_var_inner(type_text: &str) -> Option<&str> {
    type_text
        .strip_prefix("ClassVar[")
        .and_then(|rest| rest.strip_suffix(']'))
}

fn literal_type(node: &Node) -> Option<&'static str> {
    match node.kind() {
        "integer" => Some("int"),
        "float" => Some("float"),
        "string" | "concatenated_string" => Some("str"),
        "true" | "false" => Some("bool"),
        _ => None,
    }
}

fn literal_value(node: &Node, source: &str) -> String {
    let text = node_text(node, source);
    match node.kind() {
        "string" => unquote(text),
        _ => text.to_string(),
    }
}

/// Module fqn for a file relative to the package root, and whether the file
/// is a package initializer.
pub(crate) fn module_fqn(module: &str, relative: &Path) -> (String, bool) {
    let mut segments: Vec<String> = vec![module.to_string()];
    let components: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();

    let Some((file, dirs)) = components.split_last() else {
        return (module.to_string(), true);
    };
    segments.extend(dirs.iter().cloned());

    let stem = file.strip_suffix(".py").unwrap_or(file);
    if stem == "__init__" {
        (segments.join("."), true)
    } else {
        segments.push(stem.to_string());
        (segments.join("."), false)
    }
}

/// Resolve `from ..x import y` against the importing module.
pub(crate) fn absolute_module(current: &str, is_package: bool, dots: usize, rest: &str) -> String {
    let mut parts: Vec<&str> = current.split('.').collect();
    if !is_package {
        parts.pop();
    }
    for _ in 1..dots {
        parts.pop();
    }
    let mut base = parts.join(".");
    if !rest.is_empty() {
        if !base.is_empty() {
            base.push('.');
        }
        base.push_str(rest);
    }
    base
}
