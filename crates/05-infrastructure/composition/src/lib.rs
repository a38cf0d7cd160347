//! # 注册表组合层
//!
//! 负责把配置、日志、解析器、定义来源、目录和缓存组合成一个可用的组件注册表。
//!
//! ## 主要功能
//!
//! - **注册表构建器**: 使用构建者模式组装注册表
//! - **配置源管理**: 从 TOML / JSON / YAML 文件和环境变量加载配置
//! - **日志初始化**: 日志写到标准错误，可切换 JSON 格式
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use registry_composition::{ComponentRegistry, LoggingConfig, RegistryBuilder, SettingsLoader};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let infrastructure = RegistryBuilder::new()
//!         .load_settings(&SettingsLoader::new().auto_discover())?
//!         .with_logging(LoggingConfig::default().with_level_name("debug"))
//!         .build()?;
//!
//!     for component in infrastructure.registry().list_components("kfp")? {
//!         println!("{}: {}", component.id, component.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config_sources;
pub mod error;
pub mod infrastructure;

// 重新导出主要类型
pub use builder::{LoggingConfig, RegistryBuilder};
pub use config_sources::{
    ConfigSourceDescriptor, ConfigSourceType, SettingsLoader, DEFAULT_ENV_PREFIX,
    DEFAULT_ENV_SEPARATOR,
};
pub use error::BootstrapError;
pub use infrastructure::{RegistryInfrastructure, RegistryStatus};

// 重新导出注册表接口与错误类型
pub use component_common::{ConfigError, RegistryError};
pub use registry_abstractions::ComponentRegistry;
