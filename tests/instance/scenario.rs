//! End-to-end: load a model, build a resource, serialize it.

use serde_json::json;
use taxon_foundation::ErrorKind;
use taxon_instance::{Resource, Serializer};
use taxon_model::ModelManager;

const MODEL: &str = r#"{
    "$class": "concerto.metamodel@1.0.0.Model",
    "namespace": "org.acme.assets@1.0.0",
    "imports": [],
    "declarations": [
        {
            "$class": "concerto.metamodel@1.0.0.AssetDeclaration",
            "name": "MyAsset",
            "isAbstract": false,
            "identified": {
                "$class": "concerto.metamodel@1.0.0.IdentifiedBy",
                "name": "assetId"
            },
            "properties": [
                {
                    "$class": "concerto.metamodel@1.0.0.StringProperty",
                    "name": "assetId",
                    "isArray": false,
                    "isOptional": false
                },
                {
                    "$class": "concerto.metamodel@1.0.0.StringProperty",
                    "name": "value",
                    "isArray": false,
                    "isOptional": false
                }
            ]
        }
    ]
}"#;

const FQN: &str = "org.acme.assets@1.0.0.MyAsset";

fn manager() -> ModelManager {
    let mut manager = ModelManager::new();
    manager
        .add_models_text(&[(MODEL, Some("assets.json"))])
        .unwrap();
    manager
}

#[test]
fn serializes_valid_asset() {
    let manager = manager();
    let asset = Resource::new(FQN)
        .with_identifier("1")
        .with("assetId", "1")
        .with("value", "");

    let serializer = Serializer::new(&manager);
    let text = serializer.to_string(&asset, None).unwrap();
    assert_eq!(
        text,
        r#"{"$class":"org.acme.assets@1.0.0.MyAsset","$identifier":"1","assetId":"1","value":""}"#
    );

    let back = serializer.from_str(&text, None).unwrap();
    assert_eq!(back, asset);
}

#[test]
fn missing_field_names_field_and_identifier() {
    let manager = manager();
    let asset = Resource::new(FQN).with_identifier("1").with("assetId", "1");

    let err = Serializer::new(&manager).to_json(&asset, None).unwrap_err();
    match err.kind {
        ErrorKind::MissingRequiredField {
            field, identifier, ..
        } => {
            assert_eq!(field, "value");
            assert_eq!(identifier, "1");
        }
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn reading_fills_identifier_from_field() {
    let manager = manager();
    let json = json!({ "$class": FQN, "assetId": "7", "value": "x" });
    let asset = Serializer::new(&manager).from_json(&json, None).unwrap();
    assert_eq!(asset.identifier(), Some("7"));
}
