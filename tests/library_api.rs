//! Integration tests for the aas2puml library API.

use aas2puml::parser::CollectError;
use aas2puml::transform::TransformError;
use aas2puml::{
    Aas2PumlError, AasPumlGenerator, DiagramOptions, GeneratorSettings, PythonCollector, aas2puml,
    generator_for,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const V3: &str = r#"
from enum import Enum
from typing import List, Optional

from aas_core_meta.marker import abstract, invariant


class Key_types(Enum):
    Submodel = "Submodel"
    Asset_administration_shell = "AssetAdministrationShell"


class Color(Enum):
    RED = "red"


@abstract
class Referable:
    ID_short: Optional[str]


class Key:
    kind: Key_types
    value: str


class Reference:
    keys: List["Key"]


class Submodel(Referable):
    pass


@invariant(
    lambda self:
    not (self.submodels is not None)
    or (
        all(
            is_model_reference_to(reference, Key_types.Submodel)
            for reference in self.submodels
        )
    ),
    "Submodels must be model references to a submodel."
)
class Asset_administration_shell(Referable):
    def __init__(
        self,
        derived_from: Optional["Reference"] = None,
        submodels: Optional[List["Reference"]] = None,
    ) -> None:
        self.derived_from = derived_from
        self.submodels = submodels
"#;

fn package(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::Builder::new()
        .prefix("aas2puml")
        .tempdir()
        .unwrap();
    for (name, source) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, source).unwrap();
    }
    dir
}

fn aas_package() -> TempDir {
    package(&[
        ("__init__.py", ""),
        ("v3.py", V3),
        (".aas2puml.toml", "submodules = [\"v3\"]\n"),
    ])
}

#[test]
fn test_minimal_class() {
    let dir = package(&[(
        "Pkg.py",
        "from typing import List, Optional\n\nclass Cls:\n    x: Optional[int]\n    ys: List[str]\n",
    )]);

    let puml = aas2puml(dir.path(), "root").unwrap();

    assert_eq!(
        puml,
        "@startuml\nskinparam classAttributeIconSize 0\nhide methods\n\n\
         class Pkg.Cls {\n  +x: int[0..1]\n  +ys: str[1..*]\n}\n@enduml"
    );
}

#[test]
fn test_aas_package_diagram() {
    let dir = aas_package();
    let generator = generator_for(dir.path(), "aas_core_meta").unwrap();
    let puml = generator.generate_puml(&DiagramOptions::default()).unwrap();

    assert!(puml.contains("enum KeyTypes <<enumeration>> {\n  Submodel\n  AssetAdministrationShell\n}"));
    assert!(puml.contains("enum Color <<enumeration>> {\n  red\n}"));
    assert!(puml.contains("abstract class Referable <<abstract>> {\n  +idShort: str[0..1]\n}"));
    assert!(puml.contains("class Key {\n  +kind: KeyTypes\n  +value: str\n}"));
    assert!(puml.contains("class Reference {\n  +key: Key[1..*]\n}"));
    assert!(puml.contains(
        "class AssetAdministrationShell {\n  +derivedFrom: Reference[0..1]\n  +submodel: Reference[0..*]\n}"
    ));

    assert!(puml.contains("\nReferable <|-- Submodel\n"));
    assert!(puml.contains("\nReferable <|-- AssetAdministrationShell\n"));
    assert!(puml.contains("\nKey ..> KeyTypes\n"));
    assert!(puml.contains("\nReference ..> Key\n"));
    assert!(puml.contains("\nAssetAdministrationShell --> Submodel : submodel:ref\n"));
    assert_eq!(
        puml.matches("AssetAdministrationShell ..> Reference").count(),
        1
    );
    assert!(!puml.contains("aasCoreMeta."));
    assert!(!puml.contains("v3."));
}

#[test]
fn test_filtered_diagram_with_parent_members() {
    let dir = aas_package();
    let generator = generator_for(dir.path(), "aas_core_meta").unwrap();
    let keep = generator.resolve_names(&["Asset_administration_shell".to_string()]);

    let puml = generator
        .generate_puml(&DiagramOptions::only(keep).with_parent_members(true))
        .unwrap();

    assert_eq!(
        puml,
        "@startuml\nskinparam classAttributeIconSize 0\nhide methods\n\n\
         class AssetAdministrationShell<Referable> {\n\
         \x20 +derivedFrom: Reference[0..1]\n\
         \x20 +submodel: Reference[0..*]\n\
         \x20 +idShort: str[0..1]\n\
         }\n@enduml"
    );
}

#[test]
fn test_precomputed_domain_reuse() {
    let dir = aas_package();
    let generator = generator_for(dir.path(), "aas_core_meta").unwrap();
    let settings = generator.settings().clone();
    let domain = generator.into_domain();

    let first = AasPumlGenerator::from_domain(settings.clone(), domain.clone()).unwrap();
    let second = AasPumlGenerator::from_domain(settings, domain).unwrap();

    let keep = first.resolve_names(&["Submodel".to_string()]);
    let narrow = first.generate_puml(&DiagramOptions::only(keep)).unwrap();
    let full = second.generate_puml(&DiagramOptions::default()).unwrap();

    assert!(!narrow.contains("class Reference"));
    assert!(full.contains("class Reference"));
    assert_eq!(first.domain(), second.domain());
}

#[test]
fn test_cyclic_inheritance_is_rejected() {
    let dir = package(&[("shapes.py", "class A(B):\n    x: int\n\nclass B(A):\n    y: int\n")]);
    let generator = AasPumlGenerator::new(
        GeneratorSettings::new(dir.path(), "pkg"),
        &PythonCollector,
    )
    .unwrap();

    assert!(generator.generate_puml(&DiagramOptions::default()).is_ok());

    let result = generator.generate_puml(&DiagramOptions::default().with_parent_members(true));
    match result {
        Err(Aas2PumlError::Transform(TransformError::CyclicInheritance { cycle })) => {
            assert_eq!(cycle, vec!["pkg.shapes.A", "pkg.shapes.B"]);
        }
        other => panic!("expected cyclic inheritance error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unsupported_invariant_is_fatal() {
    let dir = package(&[(
        "model.py",
        "class Referable:\n    pass\n\n@invariant(lambda self: is_model_reference_to_referable(value))\nclass Holder:\n    pass\n",
    )]);

    let result = aas2puml(dir.path(), "pkg");
    assert!(matches!(
        result,
        Err(Aas2PumlError::Transform(TransformError::UnsupportedInvariant { .. }))
    ));
}

#[test]
fn test_missing_path() {
    let result = aas2puml(Path::new("/nonexistent/aas_core_meta"), "aas_core_meta");

    match result {
        Err(Aas2PumlError::Collect(CollectError::PathNotFound(_))) => {}
        Err(e) => panic!("Expected PathNotFound error, got: {:?}", e),
        Ok(_) => panic!("Expected error for invalid path"),
    }
}
