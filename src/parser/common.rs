use regex::Regex;
use std::sync::LazyLock;
use tree_sitter::Node;

/// Macro to define a thread-local parser with a given language.
/// Usage: `define_parser!(PARSER_NAME, language_fn)`
#[macro_export]
macro_rules! define_parser {
    ($name:ident, $language:expr) => {
        thread_local! {
            static $name: std::cell::RefCell<tree_sitter::Parser> = std::cell::RefCell::new({
                let mut parser = tree_sitter::Parser::new();
                parser.set_language(&$language.into()).expect(concat!("Failed to set ", stringify!($name), " language"));
                parser
            });
        }
    };
}

/// Source text covered by a node.
pub fn node_text<'s>(node: &Node, source: &'s str) -> &'s str {
    &source[node.start_byte()..node.end_byte()]
}

/// Last dotted segment, e.g. `enum.Enum` -> `Enum`.
pub fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Strip string prefixes and quotes from a Python string literal.
pub fn unquote(literal: &str) -> String {
    let body = literal.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = body
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    body.to_string()
}

static LOWER_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\blist\[").expect("valid regex"));

/// Bring a type annotation into the canonical single-line form used in
/// attribute types: quotes removed, whitespace collapsed, `typing.` dropped,
/// `list[` spelled `List[` and `X | None` written as `Optional[X]`.
pub fn normalize_annotation(text: &str) -> String {
    let unquoted: String = text.chars().filter(|c| *c != '"' && *c != '\'').collect();
    let collapsed = unquoted
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("[ ", "[")
        .replace(" ]", "]")
        .replace(" ,", ",")
        .replace("typing.", "");
    let collapsed = LOWER_LIST.replace_all(&collapsed, "List[").into_owned();

    let parts = split_top_level(&collapsed, '|');
    if parts.len() > 1 && parts.iter().any(|p| p == "None") {
        let rest: Vec<_> = parts.into_iter().filter(|p| p != "None").collect();
        return format!("Optional[{}]", rest.join(" | "));
    }
    collapsed
}

/// Split on `sep` outside of brackets, trimming each part.
fn split_top_level(text: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for c in text.chars() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if c == sep && depth == 0 {
            parts.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    parts.push(current.trim().to_string());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"red\""), "red");
        assert_eq!(unquote("'red'"), "red");
        assert_eq!(unquote("r\"xs:anyURI\""), "xs:anyURI");
        assert_eq!(unquote("\"\"\"doc\"\"\""), "doc");
        assert_eq!(unquote("42"), "42");
    }

    #[test]
    fn test_normalize_annotation() {
        assert_eq!(
            normalize_annotation("Optional[\n    List[\"Lang_string\"]\n]"),
            "Optional[List[Lang_string]]"
        );
        assert_eq!(normalize_annotation("typing.Optional[int]"), "Optional[int]");
        assert_eq!(normalize_annotation("list[str]"), "List[str]");
        assert_eq!(normalize_annotation("Dict[str, int]"), "Dict[str, int]");
    }

    #[test]
    fn test_union_with_none_becomes_optional() {
        assert_eq!(normalize_annotation("int | None"), "Optional[int]");
        assert_eq!(normalize_annotation("None | list[Key]"), "Optional[List[Key]]");
        assert_eq!(normalize_annotation("int | str"), "int | str");
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("enum.Enum"), "Enum");
        assert_eq!(last_segment("Enum"), "Enum");
    }
}
