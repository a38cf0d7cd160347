//! 组件规范模型
//!
//! 所有格式（容器组件、脚本算子、内置通用组件）解析后都统一为 [`Component`]
//! 与 [`ComponentProperty`]。这两个类型是面板与属性渲染的唯一输入，
//! 序列化时所有字段都会输出，缺省值为空串、`string` 或 `false`。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// 通用（内置）组件的处理器类型
pub const GENERIC_PROCESSOR_TYPE: &str = "generic";
/// 容器组件（KFP 风格）的处理器类型
pub const KFP_PROCESSOR_TYPE: &str = "kfp";
/// 脚本算子（Airflow 风格）的处理器类型
pub const AIRFLOW_PROCESSOR_TYPE: &str = "airflow";

/// 属性控件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PropertyControl {
    /// 系统注入，只读
    #[serde(rename = "readonly")]
    ReadOnly,
    /// 用户可编辑
    #[default]
    Custom,
}

/// 界面控件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ControlKind {
    #[default]
    StringControl,
    NumberControl,
    BooleanControl,
    StringArrayControl,
}

impl ControlKind {
    /// 根据声明的类型推断控件种类
    ///
    /// 大小写不敏感，按单词匹配，无法识别时为字符串控件。
    pub fn from_declared_type(declared: &str) -> Self {
        let declared = declared.to_lowercase();
        // 按单词匹配，`Pointer`、`Constraint` 之类含 `int` 的名称仍是字符串
        let words: Vec<&str> = declared
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        if words.iter().any(|w| w.ends_with("array") || w.ends_with("list")) {
            Self::StringArrayControl
        } else if words
            .iter()
            .any(|w| matches!(*w, "dict" | "mapping" | "map" | "object" | "str" | "string"))
        {
            // `Dict[str, int]` 的值类型不决定控件
            Self::StringControl
        } else if words.iter().any(|w| matches!(*w, "bool" | "boolean")) {
            Self::BooleanControl
        } else if words.iter().any(|w| is_numeric_word(w)) {
            Self::NumberControl
        } else {
            Self::StringControl
        }
    }
}

fn is_numeric_word(word: &str) -> bool {
    let base = word.trim_end_matches(|c: char| c.is_ascii_digit());
    matches!(
        base,
        "int" | "integer" | "uint" | "long" | "float" | "double" | "number" | "decimal"
    )
}

/// 组件的一个可配置参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentProperty {
    /// 组件内唯一的内部键
    #[serde(rename = "ref")]
    pub property_ref: String,
    /// 显示名称
    pub name: String,
    /// 声明类型，未声明时为 `string`
    #[serde(rename = "type")]
    pub property_type: String,
    /// 默认值，未声明时为空串
    pub value: Value,
    /// 描述
    pub description: String,
    /// 是否必填
    pub required: bool,
    /// 控件类型
    pub control: PropertyControl,
    /// 界面控件种类
    pub control_id: ControlKind,
    /// 所属属性组
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl ComponentProperty {
    /// 创建新的可编辑字符串属性
    pub fn new(property_ref: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            property_ref: property_ref.into(),
            name: name.into(),
            property_type: "string".to_string(),
            value: Value::String(String::new()),
            description: String::new(),
            required: false,
            control: PropertyControl::Custom,
            control_id: ControlKind::StringControl,
            group: None,
        }
    }

    /// 设置类型，同时推断控件种类
    pub fn with_type(mut self, property_type: impl Into<String>) -> Self {
        self.property_type = property_type.into();
        self.control_id = ControlKind::from_declared_type(&self.property_type);
        self
    }

    /// 设置默认值
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// 设置描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 设置是否必填
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// 设置为只读
    pub fn read_only(mut self) -> Self {
        self.control = PropertyControl::ReadOnly;
        self
    }

    /// 设置控件种类
    pub fn with_control_id(mut self, control_id: ControlKind) -> Self {
        self.control_id = control_id;
        self
    }

    /// 设置所属属性组
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// 规范化后的组件描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// 在处理器类型命名空间内唯一的标识
    pub id: String,
    /// 显示名称
    pub name: String,
    /// 单行描述，可能为空
    pub description: String,
    /// 生成该组件的处理器类型
    pub runtime: String,
    /// 节点操作码
    pub op: String,
    /// 按声明顺序排列的属性
    pub properties: Vec<ComponentProperty>,
}

impl Component {
    /// 创建新的组件，操作码默认为 `execute-{id}-node`
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        runtime: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            op: format!("execute-{}-node", id),
            id,
            name: name.into(),
            description: String::new(),
            runtime: runtime.into(),
            properties: Vec::new(),
        }
    }

    /// 设置描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 设置操作码
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = op.into();
        self
    }

    /// 设置属性列表
    pub fn with_properties(mut self, properties: Vec<ComponentProperty>) -> Self {
        self.properties = properties;
        self
    }

    /// 按 ref 查找属性
    pub fn property(&self, property_ref: &str) -> Option<&ComponentProperty> {
        self.properties
            .iter()
            .find(|p| p.property_ref == property_ref)
    }

    /// 属性 ref 是否两两不同
    pub fn has_unique_refs(&self) -> bool {
        has_unique_refs(&self.properties)
    }
}

/// 检查属性列表中的 ref 是否两两不同
pub fn has_unique_refs(properties: &[ComponentProperty]) -> bool {
    let mut seen = HashSet::with_capacity(properties.len());
    properties.iter().all(|p| seen.insert(p.property_ref.as_str()))
}

/// 执行说明
///
/// 容器组件会带上镜像、命令与输出参数；脚本算子只有解析出的属性。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionInstructions {
    /// 组件标识
    pub component_id: String,
    /// 处理器类型
    pub runtime: String,
    /// 运行镜像
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// 容器命令
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<Value>,
    /// 容器参数
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    /// 输入属性
    pub properties: Vec<ComponentProperty>,
    /// 输出参数，ref 已与输入去重
    #[serde(default)]
    pub outputs: Vec<ComponentProperty>,
}

impl ExecutionInstructions {
    /// 只包含属性的执行说明
    pub fn from_properties(
        component_id: impl Into<String>,
        runtime: impl Into<String>,
        properties: Vec<ComponentProperty>,
    ) -> Self {
        Self {
            component_id: component_id.into(),
            runtime: runtime.into(),
            image: None,
            command: Vec::new(),
            args: Vec::new(),
            properties,
            outputs: Vec::new(),
        }
    }
}
