//! 组件解析器抽象接口

use crate::source::FetchedDefinition;
use component_common::{
    CatalogEntry, Component, ComponentProperty, ExecutionInstructions, RegistryResult,
};
use std::fmt::Debug;

/// 组件解析器 trait
///
/// 每种定义格式一个实现，由注册表按处理器类型选择。解析器不持有可变状态。
pub trait ComponentParser: Send + Sync + Debug {
    /// 处理器类型
    fn processor_type(&self) -> &str;

    /// 是否为通用（内置组件）解析器，通用解析器不读取目录
    fn is_generic(&self) -> bool {
        false
    }

    /// 内置组件列表
    fn builtin_components(&self) -> Vec<Component> {
        Vec::new()
    }

    /// 内置组件共用的属性模板，每次调用返回新的副本
    fn builtin_properties(&self) -> Vec<ComponentProperty> {
        Vec::new()
    }

    /// 解析组件标识、名称与描述
    ///
    /// `properties` 是事先解析好的属性列表，原样放入组件。
    fn parse_details(
        &self,
        entry: &CatalogEntry,
        definition: &FetchedDefinition,
        properties: Vec<ComponentProperty>,
    ) -> RegistryResult<Component>;

    /// 解析属性列表
    fn parse_properties(
        &self,
        entry: &CatalogEntry,
        definition: &FetchedDefinition,
    ) -> RegistryResult<Vec<ComponentProperty>>;

    /// 解析执行说明，默认只包含属性
    fn parse_execution_instructions(
        &self,
        entry: &CatalogEntry,
        definition: &FetchedDefinition,
    ) -> RegistryResult<ExecutionInstructions> {
        let properties = self.parse_properties(entry, definition)?;
        Ok(ExecutionInstructions::from_properties(
            self.listed_component_id(entry),
            self.processor_type(),
            properties,
        ))
    }

    /// 列表中展示的组件标识
    ///
    /// 优先使用调用方请求的标识，否则使用目录标识。
    fn listed_component_id(&self, entry: &CatalogEntry) -> String {
        entry.adjusted_id.clone().unwrap_or_else(|| entry.id.clone())
    }

    /// 将调用方传入的组件标识还原为目录标识
    fn adjusted_component_id(&self, component_id: &str) -> String {
        component_id.to_string()
    }
}
