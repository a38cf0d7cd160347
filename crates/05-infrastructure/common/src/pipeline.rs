//! 流水线与操作模型
//!
//! 所有校验都在构造时完成，[`Operation`] 与 [`Pipeline`] 不会处于无效状态。

use crate::errors::{ValidationError, ValidationResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::path::Path;
use tracing::{info, warn};

/// 内置通用组件的组件来源
pub const ELYRA_COMPONENT_SOURCE: &str = "elyra";

/// 操作的原始定义
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub op_type: String,
    pub classifier: String,
    pub name: String,
    #[serde(default)]
    pub parent_operation_ids: Vec<String>,
    #[serde(default)]
    pub component_source: Option<String>,
    #[serde(default)]
    pub component_source_type: Option<String>,
    #[serde(default)]
    pub component_params: IndexMap<String, Value>,
}

/// 通用组件操作的参数，缺省字段已填充默认值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericOperationParameters {
    pub filename: String,
    pub runtime_image: String,
    pub dependencies: Vec<String>,
    pub include_subdirectories: bool,
    pub env_vars: Vec<String>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    /// 资源数值保留原值，整数部分参与范围校验
    pub cpu: Option<Number>,
    pub gpu: Option<Number>,
    pub memory: Option<Number>,
}

/// 操作参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperationParameters {
    /// 内置通用组件
    Generic(GenericOperationParameters),
    /// 其它组件来源，参数原样保留
    Custom(IndexMap<String, Value>),
}

/// 流水线中的一个操作
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    id: String,
    #[serde(rename = "type")]
    op_type: String,
    classifier: String,
    name: String,
    parent_operation_ids: Vec<String>,
    component_source: Option<String>,
    component_source_type: Option<String>,
    parameters: OperationParameters,
}

impl Operation {
    /// 校验并创建操作
    pub fn new(definition: OperationDefinition) -> ValidationResult<Self> {
        require_non_empty("operation id", &definition.id)?;
        require_non_empty("operation type", &definition.op_type)?;
        require_non_empty("operation classifier", &definition.classifier)?;
        require_non_empty("operation name", &definition.name)?;

        let is_generic =
            definition.component_source.as_deref() == Some(ELYRA_COMPONENT_SOURCE);

        let mut name = definition.name;
        let parameters = if is_generic {
            let generic = build_generic_parameters(&definition.component_params)?;
            if Path::new(&generic.filename)
                .file_name()
                .is_some_and(|base| base.to_string_lossy() == name)
            {
                name = name.split('.').next().unwrap_or_default().to_string();
            }
            OperationParameters::Generic(generic)
        } else {
            OperationParameters::Custom(definition.component_params)
        };

        Ok(Self {
            id: definition.id,
            op_type: definition.op_type,
            classifier: definition.classifier,
            name,
            parent_operation_ids: definition.parent_operation_ids,
            component_source: definition.component_source,
            component_source_type: definition.component_source_type,
            parameters,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn op_type(&self) -> &str {
        &self.op_type
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    /// 显示名称
    ///
    /// 通用组件的名称与文件名相同时，去掉扩展名。
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_operation_ids(&self) -> &[String] {
        &self.parent_operation_ids
    }

    pub fn component_source(&self) -> Option<&str> {
        self.component_source.as_deref()
    }

    pub fn component_source_type(&self) -> Option<&str> {
        self.component_source_type.as_deref()
    }

    pub fn parameters(&self) -> &OperationParameters {
        &self.parameters
    }

    /// 通用组件参数
    pub fn generic_parameters(&self) -> Option<&GenericOperationParameters> {
        match &self.parameters {
            OperationParameters::Generic(params) => Some(params),
            OperationParameters::Custom(_) => None,
        }
    }

    pub fn cpu(&self) -> Option<&Number> {
        self.generic_parameters().and_then(|p| p.cpu.as_ref())
    }

    pub fn gpu(&self) -> Option<&Number> {
        self.generic_parameters().and_then(|p| p.gpu.as_ref())
    }

    pub fn memory(&self) -> Option<&Number> {
        self.generic_parameters().and_then(|p| p.memory.as_ref())
    }

    /// 将 `NAME=value` 形式的环境变量转换为映射
    ///
    /// 值为空的条目和格式错误的条目会被跳过。
    pub fn env_vars_as_map(&self) -> IndexMap<String, String> {
        let mut envs = IndexMap::new();
        let Some(params) = self.generic_parameters() else {
            return envs;
        };

        for entry in params.env_vars.iter().filter(|e| !e.is_empty()) {
            match entry.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    if value.is_empty() {
                        info!("跳过环境变量 `{}`: 没有值", key);
                    } else {
                        envs.insert(key.to_string(), value.to_string());
                    }
                }
                _ => warn!("无法处理环境变量条目 `{}`，已跳过", entry),
            }
        }
        envs
    }
}

/// 流水线
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pipeline {
    id: String,
    name: String,
    runtime: String,
    runtime_config: String,
    source: Option<String>,
    operations: IndexMap<String, Operation>,
}

impl Pipeline {
    /// 校验并创建流水线
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        runtime: impl Into<String>,
        runtime_config: impl Into<String>,
        source: Option<String>,
    ) -> ValidationResult<Self> {
        let name = name.into();
        let runtime = runtime.into();
        let runtime_config = runtime_config.into();

        require_non_empty("pipeline name", &name)?;
        require_non_empty("pipeline runtime", &runtime)?;
        require_non_empty("pipeline runtime configuration", &runtime_config)?;

        Ok(Self {
            id: id.into(),
            name,
            runtime,
            runtime_config,
            source,
            operations: IndexMap::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn runtime(&self) -> &str {
        &self.runtime
    }

    pub fn runtime_config(&self) -> &str {
        &self.runtime_config
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// 添加操作，操作标识必须唯一
    pub fn add_operation(&mut self, operation: Operation) -> ValidationResult<()> {
        if self.operations.contains_key(operation.id()) {
            return Err(ValidationError::duplicate_key(operation.id()));
        }
        self.operations.insert(operation.id.clone(), operation);
        Ok(())
    }

    /// 按插入顺序返回所有操作
    pub fn operations(&self) -> &IndexMap<String, Operation> {
        &self.operations
    }

    pub fn operation(&self, id: &str) -> Option<&Operation> {
        self.operations.get(id)
    }

    /// 通过本流水线查找操作的父操作，不存在的标识被忽略
    pub fn parent_operations(&self, id: &str) -> Vec<&Operation> {
        self.operation(id)
            .map(|op| {
                op.parent_operation_ids
                    .iter()
                    .filter_map(|parent| self.operations.get(parent))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn require_non_empty(field_name: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        Err(ValidationError::required_field_missing(field_name))
    } else {
        Ok(())
    }
}

fn build_generic_parameters(
    params: &IndexMap<String, Value>,
) -> ValidationResult<GenericOperationParameters> {
    let filename = string_param(params, "filename");
    let runtime_image = string_param(params, "runtime_image");
    require_non_empty("operation filename", &filename)?;
    require_non_empty("operation runtime image", &runtime_image)?;

    Ok(GenericOperationParameters {
        filename,
        runtime_image,
        dependencies: string_list_param(params, "dependencies"),
        include_subdirectories: params
            .get("include_subdirectories")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        env_vars: string_list_param(params, "env_vars"),
        inputs: string_list_param(params, "inputs"),
        outputs: string_list_param(params, "outputs"),
        cpu: resource_param(params, "cpu", 1)?,
        gpu: resource_param(params, "gpu", 0)?,
        memory: resource_param(params, "memory", 1)?,
    })
}

fn string_param(params: &IndexMap<String, Value>, key: &str) -> String {
    match params.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn string_list_param(params: &IndexMap<String, Value>, key: &str) -> Vec<String> {
    match params.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// 解析资源数值，缺省或为空时为 `None`
///
/// 数值原样保留，小数只在校验时取整数部分，整数部分必须不小于 `min_value`。
/// 字符串必须是整数。
fn resource_param(
    params: &IndexMap<String, Value>,
    key: &str,
    min_value: i64,
) -> ValidationResult<Option<Number>> {
    let invalid = |value: &Value| {
        ValidationError::invalid_field_value(key, value.to_string(), "不是整数")
    };

    let number = match params.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::Number(n)) => n.clone(),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Number::from)
            .map_err(|_| invalid(&Value::String(s.clone())))?,
        Some(other) => return Err(invalid(other)),
    };

    let whole = number
        .as_i64()
        .or_else(|| number.as_f64().map(|f| f.trunc() as i64))
        .ok_or_else(|| invalid(&Value::Number(number.clone())))?;
    if whole < min_value {
        return Err(ValidationError::value_out_of_range(
            key,
            number.to_string(),
            format!(">= {}", min_value),
        ));
    }
    Ok(Some(number))
}
