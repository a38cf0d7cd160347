//! 配置源
//!
//! 通过 `config` crate 从 TOML、JSON、YAML 文件和环境变量加载 [`RegistrySettings`]，按优先级叠加。

use component_common::{ConfigError, ConfigResult, RegistrySettings};
use config::{Config, Environment, File, FileFormat};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// 默认环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "COMPONENT_REGISTRY";
/// 默认环境变量层级分隔符
pub const DEFAULT_ENV_SEPARATOR: &str = "__";

/// 配置源类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSourceType {
    /// TOML 文件
    Toml,
    /// JSON 文件
    Json,
    /// YAML 文件
    Yaml,
    /// 环境变量
    Environment,
}

impl ConfigSourceType {
    /// 按扩展名判断文件类型
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(ConfigError::UnsupportedFormat { extension }),
        }
    }

    fn file_format(&self) -> Option<FileFormat> {
        match self {
            Self::Toml => Some(FileFormat::Toml),
            Self::Json => Some(FileFormat::Json),
            Self::Yaml => Some(FileFormat::Yaml),
            Self::Environment => None,
        }
    }
}

/// 配置源描述
#[derive(Debug, Clone)]
pub struct ConfigSourceDescriptor {
    /// 配置源类型
    pub source_type: ConfigSourceType,
    /// 文件路径或环境变量前缀
    pub location: String,
    /// 优先级（数字越小优先级越高）
    pub priority: u32,
    /// 文件不存在时是否跳过
    pub optional: bool,
}

/// 配置加载器
///
/// 优先级数字大的先应用，数字小的后应用并覆盖前者。
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    sources: Vec<ConfigSourceDescriptor>,
    env_separator: String,
    validation_enabled: bool,
}

impl SettingsLoader {
    /// 创建空加载器
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            env_separator: DEFAULT_ENV_SEPARATOR.to_string(),
            validation_enabled: true,
        }
    }

    /// 添加配置文件，类型按扩展名判断
    pub fn add_file<P: AsRef<Path>>(mut self, path: P, priority: u32) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source_type = ConfigSourceType::from_path(path)?;
        debug!("添加 {:?} 配置源: {}", source_type, path.display());
        self.sources.push(ConfigSourceDescriptor {
            source_type,
            location: path.display().to_string(),
            priority,
            optional: false,
        });
        Ok(self)
    }

    /// 添加可选配置文件，不存在时跳过
    pub fn add_optional_file<P: AsRef<Path>>(self, path: P, priority: u32) -> ConfigResult<Self> {
        let mut loader = self.add_file(path, priority)?;
        if let Some(last) = loader.sources.last_mut() {
            last.optional = true;
        }
        Ok(loader)
    }

    /// 添加环境变量配置源
    pub fn add_environment(mut self, prefix: impl Into<String>, priority: u32) -> Self {
        let prefix = prefix.into();
        debug!("添加环境变量配置源，前缀: {}", prefix);
        self.sources.push(ConfigSourceDescriptor {
            source_type: ConfigSourceType::Environment,
            location: prefix,
            priority,
            optional: true,
        });
        self
    }

    /// 设置环境变量层级分隔符
    pub fn with_env_separator(mut self, separator: impl Into<String>) -> Self {
        self.env_separator = separator.into();
        self
    }

    /// 启用或禁用配置验证
    pub fn enable_validation(mut self, enabled: bool) -> Self {
        self.validation_enabled = enabled;
        self
    }

    /// 从当前目录自动发现配置文件，并添加默认前缀的环境变量
    pub fn auto_discover(mut self) -> Self {
        let common_paths = [
            "./component-registry.toml",
            "./component-registry.json",
            "./component-registry.yaml",
        ];
        for path in common_paths {
            if Path::new(path).exists() {
                info!("自动发现配置文件: {}", path);
                match self.clone().add_file(path, 100) {
                    Ok(loader) => self = loader,
                    Err(e) => warn!("忽略配置文件 {}: {}", path, e),
                }
            }
        }
        self.add_environment(DEFAULT_ENV_PREFIX, 50)
    }

    /// 配置源描述列表
    pub fn sources(&self) -> &[ConfigSourceDescriptor] {
        &self.sources
    }

    /// 加载并合并配置
    pub fn load(&self) -> ConfigResult<RegistrySettings> {
        self.load_with_env(std::env::vars())
    }

    /// 使用给定的环境变量加载配置
    ///
    /// 环境变量 `COMPONENT_REGISTRY_CACHE__TTL_SECS=30` 对应 `cache.ttl_secs`。
    pub fn load_with_env<I>(&self, vars: I) -> ConfigResult<RegistrySettings>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: config::Map<String, String> = vars.into_iter().collect();
        let mut sources = self.sources.clone();
        sources.sort_by(|a, b| b.priority.cmp(&a.priority));

        // 后添加的配置源覆盖先添加的
        let mut builder = Config::builder();
        for source in &sources {
            match source.source_type.file_format() {
                None => {
                    debug!("添加环境变量配置源: {}", source.location);
                    builder = builder.add_source(
                        Environment::with_prefix(source.location.trim_end_matches('_'))
                            .prefix_separator("_")
                            .separator(&self.env_separator)
                            .try_parsing(true)
                            .source(Some(vars.clone())),
                    );
                }
                Some(format) => {
                    if !source.optional && !Path::new(&source.location).exists() {
                        return Err(ConfigError::FileNotFound {
                            path: source.location.clone(),
                        });
                    }
                    builder = builder.add_source(
                        File::new(&source.location, format).required(!source.optional),
                    );
                }
            }
        }

        let settings: RegistrySettings = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| {
                error!("配置绑定失败: {}", e);
                ConfigError::ParseError {
                    source: Box::new(e),
                }
            })?;
        if self.validation_enabled {
            validate_settings(&settings)?;
        }
        info!("配置加载完成，共 {} 个配置源", sources.len());
        Ok(settings)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// 校验配置
pub fn validate_settings(settings: &RegistrySettings) -> ConfigResult<()> {
    if settings.url_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            message: "url_timeout_secs 必须大于 0".to_string(),
        });
    }
    if settings.catalogs.keys().any(|key| key.trim().is_empty()) {
        return Err(ConfigError::ValidationError {
            message: "catalogs 的处理器类型不能为空".to_string(),
        });
    }
    if settings.cache.enabled && settings.cache.processor_type.is_none() {
        return Err(ConfigError::ValidationError {
            message: "启用缓存时必须指定 cache.processor_type".to_string(),
        });
    }
    Ok(())
}
