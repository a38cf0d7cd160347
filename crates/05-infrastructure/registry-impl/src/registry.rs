//! 组件注册表实现

use crate::parsers::{generic_properties, is_builtin_component};
use component_common::{
    AddComponentRequest, CatalogEntry, Component, ComponentProperty, ExecutionInstructions,
    RegistryError, RegistryResult,
};
use parking_lot::Mutex;
use registry_abstractions::{
    ComponentCatalog, ComponentParser, ComponentRegistry, ComponentSource, FetchedDefinition,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// 组件注册表
///
/// 显式构造，持有解析器、定义来源和目录三张映射表：
/// 解析器与目录按处理器类型索引，来源按来源类型索引。
/// 内部互斥锁串行化目录写入与目录读取（列表和按标识查找）。
#[derive(Debug, Default)]
pub struct ComponentRegistryImpl {
    parsers: HashMap<String, Arc<dyn ComponentParser>>,
    sources: HashMap<String, Arc<dyn ComponentSource>>,
    catalogs: HashMap<String, Arc<dyn ComponentCatalog>>,
    catalog_lock: Mutex<()>,
}

impl ComponentRegistryImpl {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册解析器，按其处理器类型索引
    pub fn with_parser(mut self, parser: Arc<dyn ComponentParser>) -> Self {
        self.register_parser(parser);
        self
    }

    /// 注册定义来源，按其来源类型索引
    pub fn with_source(mut self, source: Arc<dyn ComponentSource>) -> Self {
        self.register_source(source);
        self
    }

    /// 为处理器类型注册目录
    pub fn with_catalog(
        mut self,
        processor_type: impl Into<String>,
        catalog: Arc<dyn ComponentCatalog>,
    ) -> Self {
        self.register_catalog(processor_type, catalog);
        self
    }

    /// 注册解析器，同类型的已有解析器被替换
    pub fn register_parser(&mut self, parser: Arc<dyn ComponentParser>) {
        debug!("注册解析器: {}", parser.processor_type());
        self.parsers
            .insert(parser.processor_type().to_string(), parser);
    }

    /// 注册定义来源
    pub fn register_source(&mut self, source: Arc<dyn ComponentSource>) {
        debug!("注册组件来源: {}", source.source_type());
        self.sources.insert(source.source_type().to_string(), source);
    }

    /// 注册目录
    pub fn register_catalog(
        &mut self,
        processor_type: impl Into<String>,
        catalog: Arc<dyn ComponentCatalog>,
    ) {
        let processor_type = processor_type.into();
        debug!("注册组件目录: {} -> {}", processor_type, catalog.name());
        self.catalogs.insert(processor_type, catalog);
    }

    /// 已注册的处理器类型（排序后）
    pub fn processor_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.parsers.keys().cloned().collect();
        types.sort();
        types
    }

    /// 已注册的目录：处理器类型 -> 目录名称（按处理器类型排序）
    pub fn catalog_names(&self) -> Vec<(String, String)> {
        let mut names: Vec<(String, String)> = self
            .catalogs
            .iter()
            .map(|(processor_type, catalog)| (processor_type.clone(), catalog.name().to_string()))
            .collect();
        names.sort();
        names
    }

    /// 已注册的来源类型（排序后）
    pub fn source_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.sources.keys().cloned().collect();
        types.sort();
        types
    }

    fn parser(&self, processor_type: &str) -> RegistryResult<&Arc<dyn ComponentParser>> {
        self.parsers
            .get(processor_type)
            .ok_or_else(|| RegistryError::UnsupportedProcessorType {
                processor_type: processor_type.to_string(),
            })
    }

    fn catalog(&self, processor_type: &str) -> RegistryResult<&Arc<dyn ComponentCatalog>> {
        self.catalogs
            .get(processor_type)
            .ok_or_else(|| RegistryError::InvalidOperation {
                processor_type: processor_type.to_string(),
                message: "未配置组件目录".to_string(),
            })
    }

    fn source(&self, entry: &CatalogEntry) -> RegistryResult<&Arc<dyn ComponentSource>> {
        self.sources
            .get(&entry.source_type)
            .ok_or_else(|| RegistryError::UnsupportedSourceType {
                source_type: entry.source_type.clone(),
                component_id: entry.id.clone(),
            })
    }

    fn fetch(&self, entry: &CatalogEntry) -> RegistryResult<FetchedDefinition> {
        self.source(entry)?.fetch(&entry.location)
    }

    fn parse_entry(
        parser: &dyn ComponentParser,
        entry: &CatalogEntry,
        definition: &FetchedDefinition,
    ) -> RegistryResult<Component> {
        let properties = parser.parse_properties(entry, definition)?;
        parser.parse_details(entry, definition, properties)
    }

    /// 查找目录条目，调用方标识与目录标识不同时记录在 `adjusted_id`
    fn resolve_entry(
        &self,
        parser: &dyn ComponentParser,
        processor_type: &str,
        component_id: &str,
    ) -> RegistryResult<CatalogEntry> {
        let catalog_id = parser.adjusted_component_id(component_id);
        let catalog = self.catalog(processor_type)?;
        let mut entry = {
            let _guard = self.catalog_lock.lock();
            catalog.find_by_id(&catalog_id)?
        };
        if catalog_id != component_id {
            entry.adjusted_id = Some(component_id.to_string());
        }
        Ok(entry)
    }

    /// 不加锁的列表实现，调用方负责持有目录锁
    fn list_unlocked(&self, processor_type: &str) -> RegistryResult<Vec<Component>> {
        let parser = self.parser(processor_type)?;
        if parser.is_generic() {
            return Ok(parser.builtin_components());
        }

        let entries = self.catalog(processor_type)?.load()?;
        let mut components = Vec::with_capacity(entries.len());
        for entry in &entries {
            let definition = self.fetch(entry)?;
            let component = Self::parse_entry(parser.as_ref(), entry, &definition)?;
            debug!("解析组件: {} ({})", component.id, entry.location);
            components.push(component);
        }

        info!(
            "组件列表: {} 个 {} 组件",
            components.len(),
            processor_type
        );
        Ok(components)
    }
}

impl ComponentRegistry for ComponentRegistryImpl {
    fn list_components(&self, processor_type: &str) -> RegistryResult<Vec<Component>> {
        let _guard = self.catalog_lock.lock();
        self.list_unlocked(processor_type)
    }

    fn get_component(&self, processor_type: &str, component_id: &str) -> RegistryResult<Component> {
        let parser = self.parser(processor_type)?;
        if parser.is_generic() {
            return parser
                .builtin_components()
                .into_iter()
                .find(|component| component.id == component_id)
                .ok_or_else(|| RegistryError::not_found(component_id, processor_type));
        }

        let entry = self.resolve_entry(parser.as_ref(), processor_type, component_id)?;
        let definition = self.fetch(&entry)?;
        Self::parse_entry(parser.as_ref(), &entry, &definition)
    }

    fn get_properties(
        &self,
        processor_type: &str,
        component_id: &str,
    ) -> RegistryResult<Vec<ComponentProperty>> {
        let parser = self.parser(processor_type)?;
        if parser.is_generic() || is_builtin_component(component_id) {
            debug!("返回通用属性模板: {}", component_id);
            return Ok(generic_properties());
        }

        let entry = self.resolve_entry(parser.as_ref(), processor_type, component_id)?;
        let definition = self.fetch(&entry)?;
        parser.parse_properties(&entry, &definition)
    }

    fn add_component(
        &self,
        processor_type: &str,
        request: &AddComponentRequest,
    ) -> RegistryResult<Vec<Component>> {
        let parser = self.parser(processor_type)?;
        if parser.is_generic() {
            return Err(RegistryError::InvalidOperation {
                processor_type: processor_type.to_string(),
                message: "内置组件不能追加".to_string(),
            });
        }

        let entry = request.to_entry();
        self.source(&entry)?;
        let catalog = self.catalog(processor_type)?;

        let _guard = self.catalog_lock.lock();
        info!("新增组件: {} ({})", entry.id, entry.name);
        catalog.append(entry)?;
        self.list_unlocked(processor_type)
    }

    fn get_execution_details(
        &self,
        processor_type: &str,
        component_id: &str,
    ) -> RegistryResult<ExecutionInstructions> {
        let parser = self.parser(processor_type)?;
        if parser.is_generic() {
            return Err(RegistryError::InvalidOperation {
                processor_type: processor_type.to_string(),
                message: "内置组件没有执行说明".to_string(),
            });
        }

        let entry = self.resolve_entry(parser.as_ref(), processor_type, component_id)?;
        let definition = self.fetch(&entry)?;
        parser.parse_execution_instructions(&entry, &definition)
    }
}
