//! # Component Common
//!
//! 组件注册表的公共模型、命名约定和错误类型。
//!
//! ## 核心类型
//!
//! - [`Component`] / [`ComponentProperty`] - 规范化组件模型
//! - [`CatalogEntry`] - 组件目录条目
//! - [`Operation`] / [`Pipeline`] - 流水线模型
//! - [`RegistryError`] - 注册表错误分类
//! - [`RegistrySettings`] - 注册表配置

pub mod catalog;
pub mod component;
pub mod configuration;
pub mod conventions;
pub mod errors;
pub mod pipeline;

pub use catalog::*;
pub use component::*;
pub use configuration::*;
pub use conventions::*;
pub use errors::*;
pub use pipeline::*;
