//! 脚本算子（Airflow Python 源码）解析器
//!
//! 只做基于正则的文本匹配：类头、`__init__` 签名与文档字符串中的
//! `:param name:` / `:type name:` 标记。匹配不到时退化为默认值，不报错。

use super::IdPrefix;
use crate::parameter::ParameterSet;
use component_common::{
    display_name_from_file_stem, normalize_description, parameter_ref, CatalogEntry, Component,
    ComponentProperty, RegistryError, RegistryResult, AIRFLOW_PROCESSOR_TYPE,
};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use registry_abstractions::{ComponentParser, FetchedDefinition};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

static CLASS_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*class\s+(\w+)\s*(?:\([^)]*\))?\s*:").expect("类头正则无效")
});

static INIT_SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)def\s+__init__\s*\((.*?)\)\s*(?:->\s*[^:]+)?:").expect("构造签名正则无效")
});

static DOC_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":(param|type)\s+(\w+)\s*:([^\n]*)").expect("文档标记正则无效")
});

static CLASS_DOCSTRING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\A[^\n]*\n\s*[rRuU]?(?:"""(.*?)"""|'''(.*?)''')"#).expect("文档字符串正则无效")
});

/// 类定义块：类名 -> 源码（含类头）
///
/// 第一个类之前的行不属于任何块，直接忽略。同名类以后出现的为准。
fn partition_classes(lines: &[String]) -> IndexMap<String, String> {
    let mut classes: IndexMap<String, String> = IndexMap::new();
    let mut current: Option<String> = None;

    for line in lines {
        if let Some(captures) = CLASS_HEADER.captures(line) {
            let name = captures[1].to_string();
            classes.insert(name.clone(), String::new());
            current = Some(name);
        }
        if let Some(body) = current.as_ref().and_then(|name| classes.get_mut(name)) {
            body.push_str(line);
            body.push('\n');
        }
    }
    classes
}

/// 按顶层逗号拆分参数列表，括号与引号内的逗号不拆分
fn split_arguments(signature: &str) -> Vec<String> {
    let mut arguments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for ch in signature.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                current.push(ch);
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    current.push(ch);
                }
                ')' | ']' | '}' => {
                    depth = depth.saturating_sub(1);
                    current.push(ch);
                }
                ',' if depth == 0 => arguments.push(std::mem::take(&mut current)),
                _ => current.push(ch),
            },
        }
    }
    arguments.push(current);

    arguments
        .into_iter()
        .map(|argument| argument.trim().to_string())
        .filter(|argument| !argument.is_empty())
        .collect()
}

/// `__init__` 的一个参数
#[derive(Debug, Clone, PartialEq)]
struct InitArgument {
    name: String,
    default: Option<String>,
}

impl InitArgument {
    /// 解析 `name: Type = default`，跳过 `self` 与可变参数标记
    fn parse(raw: &str) -> Option<Self> {
        if raw == "self" || raw == "/" || raw.starts_with('*') {
            return None;
        }
        let (declaration, default) = match raw.split_once('=') {
            Some((declaration, default)) => (declaration, Some(default.trim().to_string())),
            None => (raw, None),
        };
        let name = declaration.split(':').next().unwrap_or_default().trim();
        if name.is_empty() || name == "self" {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            default,
        })
    }
}

/// Python 字面量转换为默认值
fn python_literal(raw: &str) -> Value {
    let raw = raw.trim();
    match raw {
        // 空容器与 None 一样视为没有默认值
        "None" | "[]" | "{}" | "()" => return Value::String(String::new()),
        "True" => return Value::Bool(true),
        "False" => return Value::Bool(false),
        _ => {}
    }
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return Value::String(raw[1..raw.len() - 1].to_string());
        }
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Some(n) = raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}

/// 描述中声明必填时为 `true`
fn is_required(description: &str) -> bool {
    let lower = description.to_lowercase();
    let declared_required = lower.contains("required")
        && !lower.contains("not required")
        && !lower.contains("n't required");
    declared_required || lower.contains("not optional")
}

/// 类文档中的 `:param` 与 `:type` 标记
#[derive(Debug, Default)]
struct DocTags {
    params: IndexMap<String, String>,
    types: IndexMap<String, String>,
}

impl DocTags {
    fn scan(class_body: &str) -> Self {
        let mut tags = Self::default();
        for captures in DOC_TAG.captures_iter(class_body) {
            let target = match &captures[1] {
                "param" => &mut tags.params,
                _ => &mut tags.types,
            };
            target
                .entry(captures[2].to_string())
                .or_insert_with(|| normalize_description(&captures[3]));
        }
        tags
    }
}

/// 类文档字符串的第一段
fn first_docstring_paragraph(class_body: &str) -> String {
    let Some(captures) = CLASS_DOCSTRING.captures(class_body) else {
        return String::new();
    };
    let docstring = captures
        .get(1)
        .or_else(|| captures.get(2))
        .map_or("", |m| m.as_str());

    let paragraph: Vec<&str> = docstring
        .lines()
        .skip_while(|line| line.trim().is_empty())
        .take_while(|line| !line.trim().is_empty())
        .collect();
    normalize_description(&paragraph.join(" "))
}

/// 脚本算子解析器
///
/// 每个类的 `__init__` 参数生成一个属性，属性组为类名。
#[derive(Debug, Clone, Default)]
pub struct AirflowComponentParser {
    id_prefix: IdPrefix,
}

impl AirflowComponentParser {
    /// 创建解析器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置组件标识前缀
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = IdPrefix::new(prefix);
        self
    }

    fn lines(definition: &FetchedDefinition) -> RegistryResult<&[String]> {
        definition.lines().ok_or_else(|| {
            RegistryError::structural(&definition.location, "脚本算子定义必须是 Python 源码")
        })
    }

    fn class_properties(class_name: &str, class_body: &str) -> Vec<ComponentProperty> {
        let Some(signature) = INIT_SIGNATURE.captures(class_body) else {
            debug!("类 {} 没有 __init__ 签名", class_name);
            return Vec::new();
        };
        let tags = DocTags::scan(class_body);

        split_arguments(&signature[1])
            .iter()
            .filter_map(|raw| InitArgument::parse(raw))
            .map(|argument| {
                let description = tags
                    .params
                    .get(&argument.name)
                    .cloned()
                    .unwrap_or_default();
                let declared_type = tags
                    .types
                    .get(&argument.name)
                    .filter(|t| !t.is_empty())
                    .cloned()
                    .unwrap_or_else(|| "string".to_string());
                let value = argument
                    .default
                    .as_deref()
                    .map_or_else(|| Value::String(String::new()), python_literal);

                ComponentProperty::new(
                    parameter_ref(&format!("{}_{}", class_name, argument.name)),
                    argument.name.as_str(),
                )
                .with_type(declared_type)
                .with_value(value)
                .with_required(is_required(&description))
                .with_description(description)
                .with_group(class_name)
            })
            .collect()
    }
}

impl ComponentParser for AirflowComponentParser {
    fn processor_type(&self) -> &str {
        AIRFLOW_PROCESSOR_TYPE
    }

    fn parse_details(
        &self,
        entry: &CatalogEntry,
        definition: &FetchedDefinition,
        properties: Vec<ComponentProperty>,
    ) -> RegistryResult<Component> {
        let classes = partition_classes(Self::lines(definition)?);
        let description = classes
            .values()
            .next()
            .map(|body| first_docstring_paragraph(body))
            .unwrap_or_default();

        let name = if entry.name.trim().is_empty() {
            display_name_from_file_stem(&definition.name)
        } else {
            entry.name.trim().to_string()
        };

        Ok(
            Component::new(self.listed_component_id(entry), name, AIRFLOW_PROCESSOR_TYPE)
                .with_description(description)
                .with_properties(properties),
        )
    }

    fn parse_properties(
        &self,
        entry: &CatalogEntry,
        definition: &FetchedDefinition,
    ) -> RegistryResult<Vec<ComponentProperty>> {
        let origin = definition.location.as_str();
        let classes = partition_classes(Self::lines(definition)?);

        let mut parameters = ParameterSet::new();
        for (class_name, class_body) in &classes {
            for property in Self::class_properties(class_name, class_body) {
                parameters.push(property, origin)?;
            }
        }
        debug!(
            "解析脚本算子属性: {} ({} 个类, {} 个属性)",
            entry.id,
            classes.len(),
            parameters.len()
        );
        Ok(parameters.into_properties())
    }

    fn listed_component_id(&self, entry: &CatalogEntry) -> String {
        self.id_prefix.apply(entry)
    }

    fn adjusted_component_id(&self, component_id: &str) -> String {
        self.id_prefix.strip(component_id)
    }
}
