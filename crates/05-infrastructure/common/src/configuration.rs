//! 注册表配置

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// 注册表配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// 相对文件路径的根目录
    pub component_root: PathBuf,
    /// 处理器类型 -> 目录文件路径
    pub catalogs: BTreeMap<String, PathBuf>,
    /// 网络来源超时（秒）
    pub url_timeout_secs: u64,
    /// 缓存配置
    pub cache: CacheSettings,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            component_root: PathBuf::from("."),
            catalogs: BTreeMap::new(),
            url_timeout_secs: 30,
            cache: CacheSettings::default(),
        }
    }
}

/// 缓存配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// 是否启用缓存
    pub enabled: bool,
    /// 缓存的处理器类型
    pub processor_type: Option<String>,
    /// 缓存过期时间（秒），目前只记录不生效
    pub ttl_secs: u64,
    /// 构建时是否预热
    pub warm_on_build: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            processor_type: None,
            ttl_secs: 60,
            warm_on_build: false,
        }
    }
}
