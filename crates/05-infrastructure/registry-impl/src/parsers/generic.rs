//! 通用（内置）组件解析器

use component_common::{
    CatalogEntry, Component, ComponentProperty, ControlKind, RegistryError, RegistryResult,
    GENERIC_PROCESSOR_TYPE,
};
use once_cell::sync::Lazy;
use registry_abstractions::{ComponentParser, FetchedDefinition};
use serde_json::json;

/// 内置组件标识
pub const BUILTIN_COMPONENT_IDS: [&str; 3] = ["notebooks", "python-script", "r-script"];

/// 内置组件共用的属性模板，只读，读取时复制
static GENERIC_PROPERTY_TEMPLATE: Lazy<Vec<ComponentProperty>> = Lazy::new(|| {
    vec![
        ComponentProperty::new("filename", "File")
            .with_description("The path to the notebook or script file.")
            .with_required(true),
        ComponentProperty::new("runtime_image", "Runtime Image")
            .with_description("Docker image used as execution environment.")
            .with_required(true),
        ComponentProperty::new("dependencies", "File Dependencies")
            .with_type("array")
            .with_control_id(ControlKind::StringArrayControl)
            .with_value(json!([]))
            .with_description(
                "Local file dependencies that need to be copied to remote execution environment.",
            ),
        ComponentProperty::new("include_subdirectories", "Include Subdirectories")
            .with_type("boolean")
            .with_value(false)
            .with_description("Whether to include recursive subdirectories of the dependencies."),
        ComponentProperty::new("env_vars", "Environment Variables")
            .with_type("array")
            .with_control_id(ControlKind::StringArrayControl)
            .with_value(json!([]))
            .with_description("Environment variables to be set on the execution environment."),
        ComponentProperty::new("outputs", "Output Files")
            .with_type("array")
            .with_control_id(ControlKind::StringArrayControl)
            .with_value(json!([]))
            .with_description("Files generated during execution that will become available to all subsequent pipeline steps."),
        ComponentProperty::new("cpu", "CPU")
            .with_type("number")
            .with_description("For CPU-intensive workloads, you can choose more than 1 CPU (e.g. 1.5)."),
        ComponentProperty::new("gpu", "GPU")
            .with_type("number")
            .with_description("For GPU-intensive workloads, you can choose more than 1 GPU. Must be an integer."),
        ComponentProperty::new("memory", "RAM(GB)")
            .with_type("number")
            .with_description("The total amount of RAM specified."),
    ]
});

/// 返回通用属性模板的独立副本
pub fn generic_properties() -> Vec<ComponentProperty> {
    GENERIC_PROPERTY_TEMPLATE.clone()
}

/// 是否为内置组件标识
pub fn is_builtin_component(component_id: &str) -> bool {
    BUILTIN_COMPONENT_IDS.contains(&component_id)
}

/// 通用处理器的解析器
///
/// 只提供三个内置组件，不读取目录，也不解析外部定义。
#[derive(Debug, Default, Clone)]
pub struct GenericComponentParser;

impl GenericComponentParser {
    /// 创建解析器
    pub fn new() -> Self {
        Self
    }

    fn builtin(id: &str, name: &str, description: &str, op: &str) -> Component {
        Component::new(id, name, GENERIC_PROCESSOR_TYPE)
            .with_description(description)
            .with_op(op)
            .with_properties(generic_properties())
    }

    fn unsupported(operation: &str) -> RegistryError {
        RegistryError::InvalidOperation {
            processor_type: GENERIC_PROCESSOR_TYPE.to_string(),
            message: format!("通用处理器不支持 {}", operation),
        }
    }
}

impl ComponentParser for GenericComponentParser {
    fn processor_type(&self) -> &str {
        GENERIC_PROCESSOR_TYPE
    }

    fn is_generic(&self) -> bool {
        true
    }

    fn builtin_components(&self) -> Vec<Component> {
        vec![
            Self::builtin("notebooks", "Notebook", "Notebook file", "execute-notebook-node"),
            Self::builtin("python-script", "Python", "Python Script", "execute-python-node"),
            Self::builtin("r-script", "R", "R Script", "execute-r-node"),
        ]
    }

    fn builtin_properties(&self) -> Vec<ComponentProperty> {
        generic_properties()
    }

    fn parse_details(
        &self,
        _entry: &CatalogEntry,
        _definition: &FetchedDefinition,
        _properties: Vec<ComponentProperty>,
    ) -> RegistryResult<Component> {
        Err(Self::unsupported("parse_details"))
    }

    fn parse_properties(
        &self,
        _entry: &CatalogEntry,
        _definition: &FetchedDefinition,
    ) -> RegistryResult<Vec<ComponentProperty>> {
        Err(Self::unsupported("parse_properties"))
    }
}
