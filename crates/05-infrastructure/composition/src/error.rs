//! 组合层错误

use component_common::{ConfigError, RegistryError};
use thiserror::Error;

/// 注册表启动错误
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("配置错误: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("注册表错误: {source}")]
    Registry {
        #[from]
        source: RegistryError,
    },

    #[error("启动失败: {message}")]
    BootstrapFailed { message: String },
}
