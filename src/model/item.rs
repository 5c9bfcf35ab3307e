use serde::{Deserialize, Serialize};

/// A class or enum extracted from the domain package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UmlItem {
    Class(UmlClass),
    Enum(UmlEnum),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UmlClass {
    pub name: String,
    pub fqn: String,
    pub attributes: Vec<UmlAttribute>,
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub generics: String,
    /// Key of the originating declaration in the annotation source.
    /// Unlike `fqn`, it is never renamed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UmlEnum {
    pub name: String,
    pub fqn: String,
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub generics: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UmlAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub type_expr: String,
    pub is_static: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl UmlItem {
    pub fn name(&self) -> &str {
        match self {
            UmlItem::Class(c) => &c.name,
            UmlItem::Enum(e) => &e.name,
        }
    }

    pub fn fqn(&self) -> &str {
        match self {
            UmlItem::Class(c) => &c.fqn,
            UmlItem::Enum(e) => &e.fqn,
        }
    }

    pub fn generics(&self) -> &str {
        match self {
            UmlItem::Class(c) => &c.generics,
            UmlItem::Enum(e) => &e.generics,
        }
    }

    pub fn generics_mut(&mut self) -> &mut String {
        match self {
            UmlItem::Class(c) => &mut c.generics,
            UmlItem::Enum(e) => &mut e.generics,
        }
    }

    pub fn set_names(&mut self, name: String, fqn: String) {
        match self {
            UmlItem::Class(c) => {
                c.name = name;
                c.fqn = fqn;
            }
            UmlItem::Enum(e) => {
                e.name = name;
                e.fqn = fqn;
            }
        }
    }

    pub fn as_class(&self) -> Option<&UmlClass> {
        match self {
            UmlItem::Class(c) => Some(c),
            UmlItem::Enum(_) => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut UmlClass> {
        match self {
            UmlItem::Class(c) => Some(c),
            UmlItem::Enum(_) => None,
        }
    }
}

impl UmlClass {
    pub fn new(name: impl Into<String>, fqn: impl Into<String>) -> Self {
        let fqn = fqn.into();
        Self {
            name: name.into(),
            origin: Some(fqn.clone()),
            fqn,
            attributes: Vec::new(),
            is_abstract: false,
            generics: String::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: UmlAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Lookup key for annotation text, falling back to the current fqn.
    pub fn origin_key(&self) -> &str {
        self.origin.as_deref().unwrap_or(&self.fqn)
    }
}

impl UmlEnum {
    pub fn new(name: impl Into<String>, fqn: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            name: name.into(),
            fqn: fqn.into(),
            members,
            generics: String::new(),
        }
    }
}

impl Member {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl UmlAttribute {
    pub fn new(name: impl Into<String>, type_expr: impl Into<String>, is_static: bool) -> Self {
        Self {
            name: name.into(),
            type_expr: type_expr.into(),
            is_static,
        }
    }

    pub fn visibility(&self) -> Visibility {
        if self.name.starts_with("__") {
            Visibility::Private
        } else if self.name.starts_with('_') {
            Visibility::Protected
        } else {
            Visibility::Public
        }
    }
}

impl Visibility {
    /// PlantUML member marker.
    pub fn marker(self) -> &'static str {
        match self {
            Visibility::Public => "+",
            Visibility::Protected => "#",
            Visibility::Private => "-",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_from_prefix() {
        assert_eq!(UmlAttribute::new("x", "int", false).visibility(), Visibility::Public);
        assert_eq!(UmlAttribute::new("_x", "int", false).visibility(), Visibility::Protected);
        assert_eq!(UmlAttribute::new("__x", "int", false).visibility(), Visibility::Private);
    }

    #[test]
    fn test_attribute_equality_is_structural() {
        let a = UmlAttribute::new("value", "str", false);
        assert_eq!(a, UmlAttribute::new("value", "str", false));
        assert_ne!(a, UmlAttribute::new("value", "str", true));
        assert_ne!(a, UmlAttribute::new("value", "int", false));
    }

    #[test]
    fn test_origin_survives_rename() {
        let mut item = UmlItem::Class(UmlClass::new("Asset_kind", "pkg.Asset_kind"));
        item.set_names("AssetKind".into(), "pkg.AssetKind".into());

        let class = item.as_class().unwrap();
        assert_eq!(class.fqn, "pkg.AssetKind");
        assert_eq!(class.origin_key(), "pkg.Asset_kind");
    }
}
