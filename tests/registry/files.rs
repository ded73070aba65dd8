//! Integration tests for writing model files to disk

use std::fs;

use taxon_model::builder::{ClassBuilder, ModelBuilder, PropertyBuilder};
use taxon_model::{Model, ModelManager};

fn model(namespace: &str) -> Model {
    ModelBuilder::new(namespace)
        .declaration(
            ClassBuilder::asset("Widget")
                .identified()
                .property(PropertyBuilder::string("label"))
                .build(),
        )
        .build()
}

#[test]
fn writes_source_text_under_its_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let text = serde_json::to_string(&model("org.widgets@1.0.0")).unwrap();
    let mut manager = ModelManager::new();
    manager
        .add_model_text(&text, Some("models/widgets.json"))
        .unwrap();

    let written = manager.write_model_files(dir.path(), false).unwrap();
    assert_eq!(written, vec![dir.path().join("widgets.json")]);
    assert_eq!(fs::read_to_string(&written[0]).unwrap(), text);
}

#[test]
fn writes_ast_when_no_source() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = ModelManager::new();
    manager.add_model(model("org.gadgets@2.0.0"), None).unwrap();

    let written = manager.write_model_files(dir.path(), false).unwrap();
    assert_eq!(written, vec![dir.path().join("org.gadgets@2.0.0.cto")]);

    let reread: Model = serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert_eq!(reread, manager.get_ast(false).models[0]);
}

#[test]
fn root_model_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ModelManager::new();
    assert!(manager.write_model_files(dir.path(), true).unwrap().is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("out").join("models");
    let mut manager = ModelManager::new();
    manager.add_model(model("org.widgets@1.0.0"), None).unwrap();
    manager.write_model_files(&nested, false).unwrap();
    assert!(nested.join("org.widgets@1.0.0.cto").exists());
}
