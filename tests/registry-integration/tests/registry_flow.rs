//! 组件注册表端到端测试：磁盘上的目录文件、组件定义和配置文件
use component_common::{
    AddComponentRequest, PropertyControl, RegistryError, AIRFLOW_PROCESSOR_TYPE,
    GENERIC_PROCESSOR_TYPE, KFP_PROCESSOR_TYPE,
};
use registry_composition::{ComponentRegistry, RegistryBuilder, SettingsLoader};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const A_YAML: &str = r#"
name: A
description: "x  y"
inputs:
  - {name: In 1}
implementation:
  container:
    image: "img:1"
"#;

const B_YAML: &str = r#"
name: Filter Text
description: Filters rows of text.
inputs:
  - {name: Text, type: String}
  - {name: Pattern, type: String, default: ".*"}
outputs:
  - {name: Text}
implementation:
  container:
    image: "filter:0.3"
    command: [python, filter.py]
    args: [--in, {inputPath: Text}, --pattern, {inputValue: Pattern}, --out, {outputPath: Text}]
"#;

const BASH_OPERATOR: &str = r#"
from airflow.models import BaseOperator


class BashOperator(BaseOperator):
    """
    Execute a Bash script, command or set of commands.

    :param bash_command: The command to run. (required)
    :type bash_command: str
    :param env: Environment mapping
    :type env: dict
    :param skip_exit_codes: Exit codes treated as skipped
    :type skip_exit_codes: list
    """

    def __init__(self, bash_command: str, env={}, skip_exit_codes=[], *args, **kwargs):
        super().__init__(*args, **kwargs)
"#;

/// 写入组件定义和目录文件，返回临时目录
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.yaml"), A_YAML).unwrap();
    fs::write(dir.path().join("b.yaml"), B_YAML).unwrap();
    fs::write(dir.path().join("bash_operator.py"), BASH_OPERATOR).unwrap();
    write_catalog(
        &dir.path().join("kfp.json"),
        json!({"components": {"a": {"name": "A entry", "location": {"file": "a.yaml"}}}}),
    );
    write_catalog(
        &dir.path().join("airflow.json"),
        json!({"components": {"bash-operator": {"name": "Bash", "path": {"file": "bash_operator.py"}}}}),
    );
    dir
}

fn write_catalog(path: &Path, document: serde_json::Value) {
    fs::write(path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
}

fn builder(dir: &TempDir) -> RegistryBuilder {
    RegistryBuilder::new()
        .with_component_root(dir.path())
        .with_catalog_file(KFP_PROCESSOR_TYPE, dir.path().join("kfp.json"))
        .with_catalog_file(AIRFLOW_PROCESSOR_TYPE, dir.path().join("airflow.json"))
        .enable_url_source(false)
}

#[test]
fn test_list_single_container_component() {
    let dir = workspace();
    let infrastructure = builder(&dir).build().unwrap();

    let components = infrastructure
        .registry()
        .list_components(KFP_PROCESSOR_TYPE)
        .unwrap();
    assert_eq!(components.len(), 1);

    let component = &components[0];
    assert_eq!(component.id, "a");
    assert_eq!(component.name, "A");
    assert_eq!(component.description, "x y");
    assert_eq!(component.runtime, KFP_PROCESSOR_TYPE);
    assert_eq!(component.properties.len(), 3 + 1);
    assert!(component.has_unique_refs());

    let input = component.property("in_1").unwrap();
    assert!(input.required);
    assert_eq!(input.value, json!(""));
    assert_eq!(input.property_type, "string");
}

#[test]
fn test_add_component_persists_to_catalog_file() {
    let dir = workspace();
    let infrastructure = builder(&dir).build().unwrap();
    let registry = infrastructure.registry();

    let components = registry
        .add_component(
            KFP_PROCESSOR_TYPE,
            &AddComponentRequest::new("Filter Text", "file", "b.yaml"),
        )
        .unwrap();
    let ids: Vec<&str> = components.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "filter-text"]);

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("kfp.json")).unwrap()).unwrap();
    assert_eq!(
        written["components"]["filter-text"],
        json!({"name": "Filter Text", "id": "filter-text", "path": {"file": "b.yaml"}})
    );
    assert!(written["components"]["filter-text"].get("location").is_none());
    // 整个文件重写后原有条目也使用 path 键
    assert_eq!(written["components"]["a"]["path"], json!({"file": "a.yaml"}));

    // 新的注册表实例从文件读到同样的目录
    let reopened = builder(&dir).build().unwrap();
    let component = reopened
        .registry()
        .get_component(KFP_PROCESSOR_TYPE, "filter-text")
        .unwrap();
    assert_eq!(component.name, "Filter Text");
    assert_eq!(component.properties.len(), 3 + 2);
}

#[test]
fn test_execution_details_disambiguate_outputs() {
    let dir = workspace();
    let infrastructure = builder(&dir).build().unwrap();
    let registry = infrastructure.registry();
    registry
        .add_component(
            KFP_PROCESSOR_TYPE,
            &AddComponentRequest::new("Filter Text", "file", "b.yaml"),
        )
        .unwrap();

    let details = registry
        .get_execution_details(KFP_PROCESSOR_TYPE, "filter-text")
        .unwrap();
    assert_eq!(details.image.as_deref(), Some("filter:0.3"));
    assert_eq!(details.command, vec![json!("python"), json!("filter.py")]);
    assert!(details.properties.iter().any(|p| p.property_ref == "elyra_path_text"));
    assert_eq!(details.outputs.len(), 1);
    assert_eq!(details.outputs[0].property_ref, "output_elyra_path_text");
}

#[test]
fn test_airflow_operator_properties() {
    let dir = workspace();
    let infrastructure = builder(&dir).build().unwrap();

    let properties = infrastructure
        .registry()
        .get_properties(AIRFLOW_PROCESSOR_TYPE, "bash-operator")
        .unwrap();
    let refs: Vec<&str> = properties.iter().map(|p| p.property_ref.as_str()).collect();
    assert_eq!(
        refs,
        vec![
            "bashoperator_bash_command",
            "bashoperator_env",
            "bashoperator_skip_exit_codes"
        ]
    );
    assert!(properties[0].required);
    assert!(!properties[1].required);
    // 空容器默认值视为未设置
    assert_eq!(properties[1].value, json!(""));
    assert_eq!(properties[2].value, json!(""));
    assert_eq!(properties[0].group.as_deref(), Some("BashOperator"));

    let component = infrastructure
        .registry()
        .get_component(AIRFLOW_PROCESSOR_TYPE, "bash-operator")
        .unwrap();
    assert_eq!(component.name, "Bash");
    assert_eq!(
        component.description,
        "Execute a Bash script, command or set of commands."
    );
}

#[test]
fn test_generic_components_need_no_catalog() {
    let dir = workspace();
    let infrastructure = builder(&dir).build().unwrap();
    let registry = infrastructure.registry();

    let ids: Vec<String> = registry
        .list_components(GENERIC_PROCESSOR_TYPE)
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec!["notebooks", "python-script", "r-script"]);

    let mut first = registry
        .get_properties(GENERIC_PROCESSOR_TYPE, "notebooks")
        .unwrap();
    assert_eq!(first[0].property_ref, "filename");
    first[0].description = "changed".to_string();

    // 模板每次返回独立副本
    let second = registry
        .get_properties(GENERIC_PROCESSOR_TYPE, "python-script")
        .unwrap();
    assert_ne!(second[0].description, "changed");

    assert!(matches!(
        registry.add_component(
            GENERIC_PROCESSOR_TYPE,
            &AddComponentRequest::new("X", "file", "a.yaml"),
        ),
        Err(RegistryError::InvalidOperation { .. })
    ));
}

#[test]
fn test_fixed_properties_are_read_only() {
    let dir = workspace();
    let infrastructure = builder(&dir).build().unwrap();

    let properties = infrastructure
        .registry()
        .get_properties(KFP_PROCESSOR_TYPE, "a")
        .unwrap();
    for fixed in &properties[..3] {
        assert_eq!(fixed.control, PropertyControl::ReadOnly);
    }
    assert_eq!(properties[0].value, json!("img:1"));
    assert_eq!(properties[1].value, json!("a.yaml"));
    assert_eq!(properties[2].value, json!("file"));
}

#[test]
fn test_errors_are_classified() {
    let dir = workspace();
    let infrastructure = builder(&dir).build().unwrap();
    let registry = infrastructure.registry();

    let missing = registry.get_component(KFP_PROCESSOR_TYPE, "nope").unwrap_err();
    assert!(missing.is_not_found());

    let unknown = registry.list_components("argo").unwrap_err();
    assert!(unknown.is_unsupported());

    // URL 来源已禁用
    let unsupported = registry
        .add_component(
            KFP_PROCESSOR_TYPE,
            &AddComponentRequest::new("Remote", "url", "https://example.com/c.yaml"),
        )
        .unwrap_err();
    assert!(matches!(unsupported, RegistryError::UnsupportedSourceType { .. }));
    assert_eq!(registry.list_components(KFP_PROCESSOR_TYPE).unwrap().len(), 1);
}

#[test]
fn test_listing_aborts_on_broken_entry() {
    let dir = workspace();
    write_catalog(
        &dir.path().join("kfp.json"),
        json!({"components": {
            "a": {"name": "A", "location": {"file": "a.yaml"}},
            "gone": {"name": "Gone", "location": {"file": "gone.yaml"}},
        }}),
    );
    let infrastructure = builder(&dir).build().unwrap();

    let err = infrastructure
        .registry()
        .list_components(KFP_PROCESSOR_TYPE)
        .unwrap_err();
    assert!(matches!(err, RegistryError::SourceRead { .. }));
}

#[test]
fn test_missing_image_is_structural() {
    let dir = workspace();
    fs::write(
        dir.path().join("a.yaml"),
        "name: A\nimplementation:\n  container:\n    command: [echo]\n",
    )
    .unwrap();
    let infrastructure = builder(&dir).build().unwrap();

    let err = infrastructure
        .registry()
        .get_component(KFP_PROCESSOR_TYPE, "a")
        .unwrap_err();
    assert!(matches!(err, RegistryError::Structural { .. }));
}

#[test]
fn test_cached_listing_is_shared_snapshot() {
    let dir = workspace();
    let infrastructure = builder(&dir)
        .with_cache(KFP_PROCESSOR_TYPE, Duration::from_secs(0))
        .warm_cache_on_build(true)
        .build()
        .unwrap();
    let cache = infrastructure.cache().unwrap();

    let first = cache.components().unwrap();
    let second = infrastructure
        .registry()
        .list_components_shared(KFP_PROCESSOR_TYPE)
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // 快照生成后新增的组件对缓存不可见
    infrastructure
        .registry()
        .add_component(
            KFP_PROCESSOR_TYPE,
            &AddComponentRequest::new("Filter Text", "file", "b.yaml"),
        )
        .unwrap();
    assert_eq!(
        infrastructure
            .registry()
            .list_components(KFP_PROCESSOR_TYPE)
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        infrastructure
            .inner_registry()
            .list_components(KFP_PROCESSOR_TYPE)
            .unwrap()
            .len(),
        2
    );

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert!(stats.hits >= 3);
    assert_eq!(stats.size, 1);
}

#[test]
fn test_build_from_toml_settings() {
    let dir = workspace();
    let config_path = dir.path().join("component-registry.toml");
    fs::write(
        &config_path,
        format!(
            "component_root = {root:?}\nurl_timeout_secs = 5\n\n[catalogs]\nkfp = {kfp:?}\n",
            root = dir.path().display().to_string(),
            kfp = dir.path().join("kfp.json").display().to_string(),
        ),
    )
    .unwrap();

    let loader = SettingsLoader::new().add_file(&config_path, 100).unwrap();
    let infrastructure = RegistryBuilder::new()
        .load_settings(&loader)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(infrastructure.settings().url_timeout_secs, 5);
    let status = infrastructure.status();
    assert_eq!(
        status.catalogs,
        vec![(
            KFP_PROCESSOR_TYPE.to_string(),
            dir.path().join("kfp.json").display().to_string()
        )]
    );
    assert!(status.source_types.contains(&"url".to_string()));
    assert!(status.cache.is_none());

    assert_eq!(
        infrastructure
            .registry()
            .list_components(KFP_PROCESSOR_TYPE)
            .unwrap()[0]
            .id,
        "a"
    );
}

#[test]
fn test_unknown_catalog_processor_type_fails_build() {
    let dir = workspace();
    let result = builder(&dir)
        .with_catalog_file("argo", dir.path().join("kfp.json"))
        .build();
    assert!(result.is_err());
}

#[test]
fn test_reads_stay_consistent_during_concurrent_adds() {
    let dir = workspace();
    let infrastructure = builder(&dir).build().unwrap();
    let registry = infrastructure.registry();
    // 另一个实例不共享进程内的锁，只依赖文件替换的原子性
    let other = builder(&dir).build().unwrap().registry();
    let done = std::sync::atomic::AtomicBool::new(false);

    std::thread::scope(|scope| {
        let shared_reader = scope.spawn(|| {
            let mut failures = Vec::new();
            while !done.load(std::sync::atomic::Ordering::Acquire) {
                if let Err(e) = registry.get_properties(KFP_PROCESSOR_TYPE, "a") {
                    failures.push(e.to_string());
                }
                if let Err(e) = registry.list_components(KFP_PROCESSOR_TYPE) {
                    failures.push(e.to_string());
                }
            }
            failures
        });
        let separate_reader = scope.spawn(|| {
            let mut failures = Vec::new();
            while !done.load(std::sync::atomic::Ordering::Acquire) {
                if let Err(e) = other.get_component(KFP_PROCESSOR_TYPE, "a") {
                    failures.push(e.to_string());
                }
            }
            failures
        });

        for i in 0..100 {
            registry
                .add_component(
                    KFP_PROCESSOR_TYPE,
                    &AddComponentRequest::new(format!("Filter {}", i), "file", "b.yaml"),
                )
                .unwrap();
        }
        done.store(true, std::sync::atomic::Ordering::Release);

        assert_eq!(shared_reader.join().unwrap(), Vec::<String>::new());
        assert_eq!(separate_reader.join().unwrap(), Vec::<String>::new());
    });

    assert_eq!(registry.list_components(KFP_PROCESSOR_TYPE).unwrap().len(), 101);
    assert!(!dir.path().join("kfp.json.tmp").exists());
}
