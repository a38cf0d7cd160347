//! 自定义来源、内存目录、标识前缀与流水线模型
use component_common::{
    CatalogEntry, Operation, OperationDefinition, Pipeline, RegistryResult, ValidationError,
    KFP_PROCESSOR_TYPE,
};
use registry_abstractions::{ComponentSource, FetchedDefinition};
use registry_composition::{ComponentRegistry, RegistryBuilder};
use registry_impl::InMemoryCatalog;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// 从内存映射读取定义的来源
#[derive(Debug, Default)]
struct InlineSource {
    documents: HashMap<String, String>,
}

impl InlineSource {
    fn with(mut self, location: &str, content: &str) -> Self {
        self.documents
            .insert(location.to_string(), content.to_string());
        self
    }
}

impl ComponentSource for InlineSource {
    fn source_type(&self) -> &str {
        "inline"
    }

    fn fetch(&self, location: &str) -> RegistryResult<FetchedDefinition> {
        let content = self.documents.get(location).ok_or_else(|| {
            component_common::RegistryError::SourceFetch {
                location: location.to_string(),
                message: "not registered".to_string(),
            }
        })?;
        FetchedDefinition::decode(location, location, content)
    }
}

const UPPER_YAML: &str = r#"
name: Upper Case
inputs:
  - {name: Text}
implementation:
  container:
    image: "upper:1"
    args: [{inputValue: Text}]
"#;

fn infrastructure() -> registry_composition::RegistryInfrastructure {
    let source = InlineSource::default().with("upper.yaml", UPPER_YAML);
    let catalog = InMemoryCatalog::with_entries(
        "memory",
        vec![CatalogEntry::new("upper", "Upper", "inline", "upper.yaml")],
    );
    RegistryBuilder::new()
        .enable_url_source(false)
        .with_source(Arc::new(source))
        .with_catalog(KFP_PROCESSOR_TYPE, Arc::new(catalog))
        .with_id_prefix(KFP_PROCESSOR_TYPE, "team-")
        .build()
        .unwrap()
}

#[test]
fn test_custom_source_and_prefixed_ids() {
    let infrastructure = infrastructure();
    let registry = infrastructure.registry();

    let listed = registry.list_components(KFP_PROCESSOR_TYPE).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "team-upper");
    assert_eq!(listed[0].op, "execute-team-upper-node");

    let component = registry
        .get_component(KFP_PROCESSOR_TYPE, "team-upper")
        .unwrap();
    assert_eq!(component.id, "team-upper");
    assert_eq!(component.name, "Upper Case");
    assert_eq!(component.property("component_source").unwrap().value, json!("upper.yaml"));
    assert_eq!(
        component.property("component_source_type").unwrap().value,
        json!("inline")
    );

    let status = infrastructure.status();
    assert!(status.source_types.contains(&"inline".to_string()));
    assert_eq!(
        status.catalogs,
        vec![(KFP_PROCESSOR_TYPE.to_string(), "memory".to_string())]
    );
}

fn elyra_operation(params: serde_json::Value) -> OperationDefinition {
    serde_json::from_value(json!({
        "id": "op-1",
        "type": "execution_node",
        "classifier": "execute-notebook-node",
        "name": "train.ipynb",
        "parent_operation_ids": [],
        "component_source": "elyra",
        "component_params": params,
    }))
    .unwrap()
}

#[test]
fn test_operation_resource_validation() {
    let err = Operation::new(elyra_operation(json!({
        "filename": "notebooks/train.ipynb",
        "runtime_image": "tensorflow/tensorflow:2.0.0",
        "cpu": 0,
    })))
    .unwrap_err();
    assert!(matches!(err, ValidationError::ValueOutOfRange { .. }));

    let op = Operation::new(elyra_operation(json!({
        "filename": "notebooks/train.ipynb",
        "runtime_image": "tensorflow/tensorflow:2.0.0",
        "cpu": "2",
        "memory": 4,
        "env_vars": ["TOKEN=abc", "EMPTY=", "broken"],
    })))
    .unwrap();
    assert_eq!(op.cpu().and_then(|n| n.as_i64()), Some(2));
    assert_eq!(op.memory().and_then(|n| n.as_i64()), Some(4));
    assert_eq!(op.gpu(), None);
    assert_eq!(op.name(), "train");
    assert_eq!(op.env_vars_as_map().get("TOKEN").map(String::as_str), Some("abc"));
    assert_eq!(op.env_vars_as_map().len(), 1);
}

#[test]
fn test_pipeline_tracks_parent_operations() {
    let mut pipeline = Pipeline::new("p-1", "training", "kfp", "local-kfp", None).unwrap();

    let first = Operation::new(elyra_operation(json!({
        "filename": "prepare.ipynb",
        "runtime_image": "python:3.11",
    })))
    .unwrap();

    let mut child = elyra_operation(json!({
        "filename": "train.ipynb",
        "runtime_image": "python:3.11",
    }));
    child.id = "op-2".to_string();
    child.parent_operation_ids = vec!["op-1".to_string()];

    pipeline.add_operation(first).unwrap();
    pipeline.add_operation(Operation::new(child).unwrap()).unwrap();

    let parents: Vec<&str> = pipeline
        .parent_operations("op-2")
        .into_iter()
        .map(Operation::id)
        .collect();
    assert_eq!(parents, vec!["op-1"]);

    assert!(Pipeline::new("p-2", "", "kfp", "local-kfp", None).is_err());
}
