//! 注册表主入口

use crate::builder::RegistryBuilder;
use component_common::RegistrySettings;
use registry_abstractions::ComponentRegistry;
use registry_impl::{CacheStats, CachedComponentRegistry, ComponentRegistryImpl};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 组件注册表实例
///
/// 持有构建好的注册表、可选的列表缓存以及生效的配置
pub struct RegistryInfrastructure {
    /// 注册表
    registry: Arc<ComponentRegistryImpl>,
    /// 列表缓存
    cache: Option<Arc<CachedComponentRegistry>>,
    /// 生效的配置
    settings: RegistrySettings,
}

impl RegistryInfrastructure {
    /// 创建注册表构建器
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// 内部构造函数
    pub(crate) fn new(
        registry: Arc<ComponentRegistryImpl>,
        cache: Option<Arc<CachedComponentRegistry>>,
        settings: RegistrySettings,
    ) -> Self {
        Self {
            registry,
            cache,
            settings,
        }
    }

    /// 对外使用的注册表，启用缓存时返回带缓存的注册表
    pub fn registry(&self) -> Arc<dyn ComponentRegistry> {
        match &self.cache {
            Some(cache) => Arc::clone(cache) as Arc<dyn ComponentRegistry>,
            None => Arc::clone(&self.registry) as Arc<dyn ComponentRegistry>,
        }
    }

    /// 不带缓存的注册表
    pub fn inner_registry(&self) -> &Arc<ComponentRegistryImpl> {
        &self.registry
    }

    /// 列表缓存
    pub fn cache(&self) -> Option<&Arc<CachedComponentRegistry>> {
        self.cache.as_ref()
    }

    /// 生效的配置
    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// 已注册的处理器类型
    pub fn processor_types(&self) -> Vec<String> {
        self.registry.processor_types()
    }

    /// 注册表状态
    pub fn status(&self) -> RegistryStatus {
        RegistryStatus {
            processor_types: self.registry.processor_types(),
            source_types: self.registry.source_types(),
            catalogs: self.registry.catalog_names(),
            cache: self.cache.as_ref().map(|cache| cache.stats()),
        }
    }
}

/// 注册表状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryStatus {
    /// 处理器类型
    pub processor_types: Vec<String>,
    /// 来源类型
    pub source_types: Vec<String>,
    /// 处理器类型 -> 目录名称
    pub catalogs: Vec<(String, String)>,
    /// 缓存统计
    pub cache: Option<CacheStats>,
}
