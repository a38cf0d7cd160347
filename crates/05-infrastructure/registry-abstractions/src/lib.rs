//! # Registry Abstractions
//!
//! 组件注册表抽象层，定义解析器、定义来源和组件目录的核心接口。
//!
//! ## 核心接口
//!
//! - [`ComponentParser`] - 组件定义解析器接口
//! - [`ComponentSource`] - 组件定义来源接口
//! - [`ComponentCatalog`] - 组件目录接口
//! - [`ComponentRegistry`] - 组件注册表接口

pub mod catalog;
pub mod parser;
pub mod registry;
pub mod source;

pub use catalog::*;
pub use parser::*;
pub use registry::*;
pub use source::*;
