//! 容器组件参数构建
//!
//! 负责把 `inputs` / `outputs` 声明转换为属性，并根据命令模板决定参数 ref。

use component_common::{
    normalize_description, parameter_ref, path_parameter_ref, ComponentProperty, RegistryError,
    RegistryResult, OUTPUT_COLLISION_PREFIX,
};
use serde_json::Value;
use serde_yaml::Value as YamlValue;
use std::collections::HashSet;
use tracing::debug;

/// 参数方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterDirection {
    /// 输入参数
    Input,
    /// 输出参数
    Output,
}

impl ParameterDirection {
    /// 命令模板中标记路径参数的键
    pub fn path_key(self) -> &'static str {
        match self {
            Self::Input => "inputPath",
            Self::Output => "outputPath",
        }
    }

    /// 属性组名
    pub fn group(self) -> &'static str {
        match self {
            Self::Input => "inputs",
            Self::Output => "outputs",
        }
    }
}

/// 参数是否在 `command` 或 `args` 中以 `{inputPath|outputPath: 名称}` 形式出现
pub fn is_path_parameter(container: &YamlValue, name: &str, direction: ParameterDirection) -> bool {
    ["command", "args"]
        .iter()
        .filter_map(|key| container.get(*key).and_then(YamlValue::as_sequence))
        .flatten()
        .filter_map(YamlValue::as_mapping)
        .filter(|mapping| mapping.len() == 1)
        .filter_map(|mapping| mapping.iter().next())
        .any(|(key, value)| {
            key.as_str() == Some(direction.path_key()) && value.as_str() == Some(name)
        })
}

/// 解析参数 ref
///
/// 路径参数加 `elyra_path_` 前缀，其余参数使用规范化后的名称。
pub fn resolve_parameter_ref(
    container: &YamlValue,
    name: &str,
    direction: ParameterDirection,
) -> String {
    let base_ref = parameter_ref(name);
    if is_path_parameter(container, name, direction) {
        path_parameter_ref(&base_ref)
    } else {
        base_ref
    }
}

/// 由一条 `inputs` / `outputs` 声明构建属性
pub fn property_from_declaration(
    declaration: &YamlValue,
    container: &YamlValue,
    direction: ParameterDirection,
    origin: &str,
) -> RegistryResult<ComponentProperty> {
    let name = declaration
        .get("name")
        .and_then(YamlValue::as_str)
        .ok_or_else(|| {
            RegistryError::structural(origin, format!("{} 参数缺少 name", direction.group()))
        })?;

    let description = declaration
        .get("description")
        .and_then(YamlValue::as_str)
        .map(normalize_description)
        .unwrap_or_default();

    let value = match declaration.get("default") {
        None | Some(YamlValue::Null) => Value::String(String::new()),
        Some(default) => yaml_to_json(default),
    };

    let required = match direction {
        ParameterDirection::Input => {
            declaration.get("optional").and_then(YamlValue::as_bool) != Some(true)
        }
        ParameterDirection::Output => false,
    };

    Ok(
        ComponentProperty::new(resolve_parameter_ref(container, name, direction), name)
            .with_type(declared_type(declaration.get("type")))
            .with_value(value)
            .with_description(description)
            .with_required(required)
            .with_group(direction.group()),
    )
}

/// 声明类型，映射类型取第一个键，未声明时为 `string`
pub fn declared_type(declared: Option<&YamlValue>) -> String {
    match declared {
        Some(YamlValue::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(YamlValue::Mapping(mapping)) => mapping
            .keys()
            .next()
            .and_then(YamlValue::as_str)
            .unwrap_or("string")
            .to_string(),
        _ => "string".to_string(),
    }
}

/// YAML 值转换为 JSON 值
pub fn yaml_to_json(value: &YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        YamlValue::String(s) => Value::String(s.clone()),
        YamlValue::Sequence(seq) => Value::Array(seq.iter().map(yaml_to_json).collect()),
        YamlValue::Mapping(mapping) => Value::Object(
            mapping
                .iter()
                .map(|(k, v)| (mapping_key(k), yaml_to_json(v)))
                .collect(),
        ),
        YamlValue::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

fn mapping_key(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        other => match yaml_to_json(other) {
            Value::String(s) => s,
            converted => converted.to_string(),
        },
    }
}

/// ref 两两不同的属性集合
#[derive(Debug, Default)]
pub struct ParameterSet {
    properties: Vec<ComponentProperty>,
    refs: HashSet<String>,
}

impl ParameterSet {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加属性，ref 重复时报告结构错误
    pub fn push(&mut self, property: ComponentProperty, origin: &str) -> RegistryResult<()> {
        if !self.refs.insert(property.property_ref.clone()) {
            return Err(RegistryError::structural(
                origin,
                format!("参数 ref 重复: {}", property.property_ref),
            ));
        }
        self.properties.push(property);
        Ok(())
    }

    /// 是否已包含 ref
    pub fn contains(&self, property_ref: &str) -> bool {
        self.refs.contains(property_ref)
    }

    /// 属性数量
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// 按追加顺序返回属性
    pub fn into_properties(self) -> Vec<ComponentProperty> {
        self.properties
    }
}

/// 输出参数 ref 与输入冲突时加 `output_` 前缀，输入保持不变
pub fn disambiguate_output(mut output: ComponentProperty, inputs: &ParameterSet) -> ComponentProperty {
    if inputs.contains(&output.property_ref) {
        let renamed = format!("{}{}", OUTPUT_COLLISION_PREFIX, output.property_ref);
        debug!("输出参数 ref 与输入冲突: {} -> {}", output.property_ref, renamed);
        output.property_ref = renamed;
    }
    output
}
