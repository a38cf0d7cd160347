//! 注册表构建器

use crate::config_sources::SettingsLoader;
use crate::error::BootstrapError;
use crate::infrastructure::RegistryInfrastructure;
use component_common::{
    RegistrySettings, AIRFLOW_PROCESSOR_TYPE, KFP_PROCESSOR_TYPE,
};
use registry_abstractions::{ComponentCatalog, ComponentRegistry, ComponentSource};
use registry_impl::{
    AirflowComponentParser, CachedComponentRegistry, ComponentRegistryImpl,
    FilesystemComponentSource, GenericComponentParser, JsonFileCatalog, KfpComponentParser,
    UrlComponentSource,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// 注册表构建器
///
/// 使用建造者模式组装解析器、定义来源、目录与缓存
pub struct RegistryBuilder {
    /// 注册表配置
    settings: RegistrySettings,
    /// 处理器类型 -> 组件标识前缀
    id_prefixes: HashMap<String, String>,
    /// 额外的定义来源，覆盖同类型的默认来源
    extra_sources: Vec<Arc<dyn ComponentSource>>,
    /// 额外的目录，覆盖配置中的目录文件
    extra_catalogs: Vec<(String, Arc<dyn ComponentCatalog>)>,
    /// 是否注册网络来源
    url_source_enabled: bool,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl RegistryBuilder {
    /// 创建新的注册表构建器
    pub fn new() -> Self {
        Self {
            settings: RegistrySettings::default(),
            id_prefixes: HashMap::new(),
            extra_sources: Vec::new(),
            extra_catalogs: Vec::new(),
            url_source_enabled: true,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 使用已有配置
    pub fn with_settings(mut self, settings: RegistrySettings) -> Self {
        self.settings = settings;
        self
    }

    /// 通过配置加载器加载配置
    pub fn load_settings(mut self, loader: &SettingsLoader) -> Result<Self, BootstrapError> {
        self.settings = loader.load()?;
        Ok(self)
    }

    /// 设置组件根目录
    pub fn with_component_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.settings.component_root = root.into();
        self
    }

    /// 为处理器类型指定目录文件
    pub fn with_catalog_file(
        mut self,
        processor_type: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.settings
            .catalogs
            .insert(processor_type.into(), path.into());
        self
    }

    /// 为处理器类型注册自定义目录
    pub fn with_catalog(
        mut self,
        processor_type: impl Into<String>,
        catalog: Arc<dyn ComponentCatalog>,
    ) -> Self {
        self.extra_catalogs.push((processor_type.into(), catalog));
        self
    }

    /// 注册自定义定义来源
    pub fn with_source(mut self, source: Arc<dyn ComponentSource>) -> Self {
        debug!("添加组件来源: {}", source.source_type());
        self.extra_sources.push(source);
        self
    }

    /// 为处理器类型设置组件标识前缀
    pub fn with_id_prefix(
        mut self,
        processor_type: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        self.id_prefixes
            .insert(processor_type.into(), prefix.into());
        self
    }

    /// 启用列表缓存
    pub fn with_cache(mut self, processor_type: impl Into<String>, ttl: Duration) -> Self {
        self.settings.cache.enabled = true;
        self.settings.cache.processor_type = Some(processor_type.into());
        self.settings.cache.ttl_secs = ttl.as_secs();
        self
    }

    /// 构建时预热缓存
    pub fn warm_cache_on_build(mut self, enabled: bool) -> Self {
        self.settings.cache.warm_on_build = enabled;
        self
    }

    /// 启用或禁用网络来源
    pub fn enable_url_source(mut self, enabled: bool) -> Self {
        self.url_source_enabled = enabled;
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true; // 启用日志初始化
        self
    }

    /// 构建注册表实例
    pub fn build(self) -> Result<RegistryInfrastructure, BootstrapError> {
        // 只有在明确配置了日志时才初始化日志，避免在测试环境中重复初始化
        if self.logging_enabled {
            self.logging_config.try_init()?;
        }
        info!("开始构建组件注册表");

        let prefix = |processor_type: &str| {
            self.id_prefixes
                .get(processor_type)
                .cloned()
                .unwrap_or_default()
        };

        let mut registry = ComponentRegistryImpl::new()
            .with_parser(Arc::new(GenericComponentParser::new()))
            .with_parser(Arc::new(
                KfpComponentParser::new().with_id_prefix(prefix(KFP_PROCESSOR_TYPE)),
            ))
            .with_parser(Arc::new(
                AirflowComponentParser::new().with_id_prefix(prefix(AIRFLOW_PROCESSOR_TYPE)),
            ))
            .with_source(Arc::new(FilesystemComponentSource::new(
                self.settings.component_root.clone(),
            )));

        if self.url_source_enabled {
            let timeout = Duration::from_secs(self.settings.url_timeout_secs);
            registry.register_source(Arc::new(UrlComponentSource::new(timeout)?));
        }
        for source in &self.extra_sources {
            registry.register_source(Arc::clone(source));
        }

        let known_types = registry.processor_types();
        for (processor_type, path) in &self.settings.catalogs {
            if !known_types.contains(processor_type) {
                return Err(BootstrapError::BootstrapFailed {
                    message: format!("目录配置了未知的处理器类型: {}", processor_type),
                });
            }
            registry.register_catalog(processor_type.clone(), Arc::new(JsonFileCatalog::new(path)));
        }
        for (processor_type, catalog) in &self.extra_catalogs {
            registry.register_catalog(processor_type.clone(), Arc::clone(catalog));
        }

        let registry = Arc::new(registry);
        let cache = self.build_cache(&registry)?;

        info!("组件注册表构建完成");
        Ok(RegistryInfrastructure::new(registry, cache, self.settings))
    }

    fn build_cache(
        &self,
        registry: &Arc<ComponentRegistryImpl>,
    ) -> Result<Option<Arc<CachedComponentRegistry>>, BootstrapError> {
        let settings = &self.settings.cache;
        if !settings.enabled {
            return Ok(None);
        }
        let Some(processor_type) = settings.processor_type.clone() else {
            return Err(BootstrapError::BootstrapFailed {
                message: "启用缓存时必须指定处理器类型".to_string(),
            });
        };

        let inner: Arc<dyn ComponentRegistry> = registry.clone();
        let cache = Arc::new(CachedComponentRegistry::new(
            inner,
            processor_type,
            Duration::from_secs(settings.ttl_secs),
        ));
        if settings.ttl_secs > 0 {
            warn!("缓存存活时间只做记录，快照不会自动过期");
        }
        if settings.warm_on_build {
            let size = cache.warm_up()?;
            info!("缓存预热完成: {} 个组件", size);
        }
        Ok(Some(cache))
    }

}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
///
/// 默认写到标准错误，标准输出留给命令结果。
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: tracing::Level,
    pub show_target: bool,
    /// 显示源文件与行号
    pub show_source_location: bool,
    pub json_format: bool,
    pub to_stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_source_location: false,
            json_format: false,
            to_stderr: true,
        }
    }
}

impl LoggingConfig {
    /// 排查问题用：调试级别，带目标与源码位置
    pub fn verbose() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_source_location: true,
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    /// 按名称设置级别（大小写不敏感），无法识别时保持原级别
    pub fn with_level_name(self, name: &str) -> Self {
        match name.trim().parse::<tracing::Level>() {
            Ok(level) => self.with_level(level),
            Err(_) => self,
        }
    }

    pub fn with_json(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    /// 安装全局日志订阅者，已安装过时返回错误
    pub fn try_init(&self) -> Result<(), BootstrapError> {
        let writer = if self.to_stderr {
            BoxMakeWriter::new(std::io::stderr)
        } else {
            BoxMakeWriter::new(std::io::stdout)
        };
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.level)
            .with_target(self.show_target)
            .with_file(self.show_source_location)
            .with_line_number(self.show_source_location)
            .with_writer(writer);

        if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| BootstrapError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        debug!("日志系统初始化完成: {}", self.level);
        Ok(())
    }
}
