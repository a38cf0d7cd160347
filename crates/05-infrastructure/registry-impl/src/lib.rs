//! # Registry Implementation
//!
//! 组件注册表的具体实现：
//!
//! - [`parsers`] - 通用、容器组件与脚本算子解析器
//! - [`sources`] - 本地文件与网络地址来源
//! - [`catalog`] - JSON 文件目录与内存目录
//! - [`registry`] - 组件注册表
//! - [`cache`] - 组件列表缓存

pub mod cache;
pub mod catalog;
pub mod parameter;
pub mod parsers;
pub mod registry;
pub mod sources;

pub use cache::{CacheStats, CachedComponentRegistry};
pub use catalog::{InMemoryCatalog, JsonFileCatalog};
pub use parsers::{
    generic_properties, AirflowComponentParser, GenericComponentParser, IdPrefix,
    KfpComponentParser,
};
pub use registry::ComponentRegistryImpl;
pub use sources::{FilesystemComponentSource, UrlComponentSource};
