//! 容器组件（KFP YAML 定义）解析器

use super::IdPrefix;
use crate::parameter::{
    disambiguate_output, property_from_declaration, yaml_to_json, ParameterDirection,
    ParameterSet,
};
use component_common::{
    normalize_description, CatalogEntry, Component, ComponentProperty, ExecutionInstructions,
    RegistryError, RegistryResult, KFP_PROCESSOR_TYPE,
};
use registry_abstractions::{ComponentParser, FetchedDefinition};
use serde_yaml::Value as YamlValue;
use tracing::debug;

/// 容器组件解析器
///
/// 定义必须包含 `implementation.container.image`。属性依次为运行镜像、
/// 组件来源、来源类型三个只读属性，然后按声明顺序排列每个输入。
#[derive(Debug, Clone, Default)]
pub struct KfpComponentParser {
    id_prefix: IdPrefix,
}

impl KfpComponentParser {
    /// 创建解析器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置组件标识前缀
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = IdPrefix::new(prefix);
        self
    }

    fn document(definition: &FetchedDefinition) -> RegistryResult<&YamlValue> {
        definition
            .document()
            .filter(|document| document.is_mapping())
            .ok_or_else(|| RegistryError::structural(&definition.location, "组件定义必须是 YAML 映射"))
    }

    fn container<'a>(document: &'a YamlValue, origin: &str) -> RegistryResult<&'a YamlValue> {
        document
            .get("implementation")
            .and_then(|implementation| implementation.get("container"))
            .filter(|container| container.is_mapping())
            .ok_or_else(|| RegistryError::structural(origin, "缺少 implementation.container"))
    }

    fn image<'a>(container: &'a YamlValue, origin: &str) -> RegistryResult<&'a str> {
        container
            .get("image")
            .and_then(YamlValue::as_str)
            .filter(|image| !image.trim().is_empty())
            .ok_or_else(|| {
                RegistryError::structural(origin, "缺少 implementation.container.image")
            })
    }

    fn declarations<'a>(
        document: &'a YamlValue,
        key: &str,
        origin: &str,
    ) -> RegistryResult<&'a [YamlValue]> {
        match document.get(key) {
            None | Some(YamlValue::Null) => Ok(&[]),
            Some(YamlValue::Sequence(declarations)) => Ok(declarations.as_slice()),
            Some(_) => Err(RegistryError::structural(
                origin,
                format!("{} 必须是列表", key),
            )),
        }
    }

    fn fixed_properties(entry: &CatalogEntry, image: &str) -> Vec<ComponentProperty> {
        vec![
            ComponentProperty::new("runtime_image", "Runtime Image")
                .with_value(image)
                .with_description("Docker image used as execution environment.")
                .with_required(true)
                .read_only(),
            ComponentProperty::new("component_source", "Component Source")
                .with_value(entry.location.as_str())
                .with_description("The path to the component specification file.")
                .with_required(true)
                .read_only(),
            ComponentProperty::new("component_source_type", "Component Source Type")
                .with_value(entry.source_type.as_str())
                .with_required(true)
                .read_only(),
        ]
    }

    /// 固定属性与输入属性
    fn input_parameters(
        entry: &CatalogEntry,
        document: &YamlValue,
        origin: &str,
    ) -> RegistryResult<ParameterSet> {
        let container = Self::container(document, origin)?;
        let image = Self::image(container, origin)?;

        let mut parameters = ParameterSet::new();
        for property in Self::fixed_properties(entry, image) {
            parameters.push(property, origin)?;
        }
        for declaration in Self::declarations(document, "inputs", origin)? {
            let property = property_from_declaration(
                declaration,
                container,
                ParameterDirection::Input,
                origin,
            )?;
            parameters.push(property, origin)?;
        }
        Ok(parameters)
    }

    /// 输出属性，ref 已与输入去重
    fn output_parameters(
        document: &YamlValue,
        inputs: &ParameterSet,
        origin: &str,
    ) -> RegistryResult<Vec<ComponentProperty>> {
        let container = Self::container(document, origin)?;

        let mut outputs = ParameterSet::new();
        for declaration in Self::declarations(document, "outputs", origin)? {
            let property = property_from_declaration(
                declaration,
                container,
                ParameterDirection::Output,
                origin,
            )?;
            outputs.push(disambiguate_output(property, inputs), origin)?;
        }
        Ok(outputs.into_properties())
    }

    fn template_values(container: &YamlValue, key: &str) -> Vec<serde_json::Value> {
        container
            .get(key)
            .and_then(YamlValue::as_sequence)
            .map(|values| values.iter().map(yaml_to_json).collect())
            .unwrap_or_default()
    }
}

impl ComponentParser for KfpComponentParser {
    fn processor_type(&self) -> &str {
        KFP_PROCESSOR_TYPE
    }

    fn parse_details(
        &self,
        entry: &CatalogEntry,
        definition: &FetchedDefinition,
        properties: Vec<ComponentProperty>,
    ) -> RegistryResult<Component> {
        let origin = definition.location.as_str();
        let document = Self::document(definition)?;
        Self::image(Self::container(document, origin)?, origin)?;

        let name = document
            .get("name")
            .and_then(YamlValue::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(entry.name.as_str());
        let description = document
            .get("description")
            .and_then(YamlValue::as_str)
            .map(normalize_description)
            .unwrap_or_default();

        Ok(
            Component::new(self.listed_component_id(entry), name, KFP_PROCESSOR_TYPE)
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
        let document = Self::document(definition)?;
        let properties = Self::input_parameters(entry, document, origin)?.into_properties();
        debug!("解析容器组件属性: {} ({} 个)", entry.id, properties.len());
        Ok(properties)
    }

    fn parse_execution_instructions(
        &self,
        entry: &CatalogEntry,
        definition: &FetchedDefinition,
    ) -> RegistryResult<ExecutionInstructions> {
        let origin = definition.location.as_str();
        let document = Self::document(definition)?;
        let container = Self::container(document, origin)?;
        let image = Self::image(container, origin)?.to_string();

        let inputs = Self::input_parameters(entry, document, origin)?;
        let outputs = Self::output_parameters(document, &inputs, origin)?;

        let mut instructions = ExecutionInstructions::from_properties(
            self.listed_component_id(entry),
            KFP_PROCESSOR_TYPE,
            inputs.into_properties(),
        );
        instructions.image = Some(image);
        instructions.command = Self::template_values(container, "command");
        instructions.args = Self::template_values(container, "args");
        instructions.outputs = outputs;
        Ok(instructions)
    }

    fn listed_component_id(&self, entry: &CatalogEntry) -> String {
        self.id_prefix.apply(entry)
    }

    fn adjusted_component_id(&self, component_id: &str) -> String {
        self.id_prefix.strip(component_id)
    }
}
