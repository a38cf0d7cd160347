//! 错误类型定义

use thiserror::Error;

/// 组件注册表错误类型
///
/// 所有错误都只尝试一次，直接返回给调用方，由调用方决定恢复策略。
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("组件定义结构错误: {origin}, 原因: {message}")]
    Structural { origin: String, message: String },

    #[error("组件定义语法错误: {origin}, 原因: {source}")]
    DocumentSyntax {
        origin: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("不支持的文件类型: {extension} ({location})")]
    UnsupportedFileType { extension: String, location: String },

    #[error("不支持的处理器类型: {processor_type}")]
    UnsupportedProcessorType { processor_type: String },

    #[error("不支持的组件来源类型: {source_type} (组件 {component_id})")]
    UnsupportedSourceType {
        source_type: String,
        component_id: String,
    },

    #[error("组件 '{component_id}' 在目录 {catalog} 中不存在")]
    NotFound {
        component_id: String,
        catalog: String,
    },

    #[error("操作不适用于处理器类型 {processor_type}: {message}")]
    InvalidOperation {
        processor_type: String,
        message: String,
    },

    #[error("组件定义读取失败: {location}, 原因: {source}")]
    SourceRead {
        location: String,
        source: std::io::Error,
    },

    #[error("组件定义下载失败: {location}, 原因: {message}")]
    SourceFetch { location: String, message: String },

    #[error("组件目录读写失败: {catalog}, 原因: {source}")]
    CatalogPersistence {
        catalog: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("验证错误: {source}")]
    Validation {
        #[from]
        source: ValidationError,
    },
}

impl RegistryError {
    /// 创建结构错误
    pub fn structural(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structural {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// 创建语法错误，保留底层解析错误
    pub fn document_syntax<E>(origin: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DocumentSyntax {
            origin: origin.into(),
            source: Box::new(source),
        }
    }

    /// 创建组件不存在错误
    pub fn not_found(component_id: impl Into<String>, catalog: impl Into<String>) -> Self {
        Self::NotFound {
            component_id: component_id.into(),
            catalog: catalog.into(),
        }
    }

    /// 是否为组件不存在错误
    ///
    /// 调用方可以把它当作“组件不存在”处理，其它错误都应视为致命错误。
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// 是否为不支持的格式类错误（文件类型、处理器类型、来源类型）
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFileType { .. }
                | Self::UnsupportedProcessorType { .. }
                | Self::UnsupportedSourceType { .. }
        )
    }
}

/// 验证错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("必需字段缺失: {field_name}")]
    RequiredFieldMissing { field_name: String },

    #[error("字段值无效: {field_name}, 值: {value}, 原因: {reason}")]
    InvalidFieldValue {
        field_name: String,
        value: String,
        reason: String,
    },

    #[error("字段值超出范围: {field_name}, 值: {value}, 范围: {range}")]
    ValueOutOfRange {
        field_name: String,
        value: String,
        range: String,
    },

    #[error("键重复: {key}")]
    DuplicateKey { key: String },
}

impl ValidationError {
    /// 创建必需字段缺失错误
    pub fn required_field_missing(field_name: impl Into<String>) -> Self {
        Self::RequiredFieldMissing {
            field_name: field_name.into(),
        }
    }

    /// 创建字段值无效错误
    pub fn invalid_field_value(
        field_name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFieldValue {
            field_name: field_name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 创建值超出范围错误
    pub fn value_out_of_range(
        field_name: impl Into<String>,
        value: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        Self::ValueOutOfRange {
            field_name: field_name.into(),
            value: value.into(),
            range: range.into(),
        }
    }

    /// 创建键重复错误
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Self::DuplicateKey { key: key.into() }
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("不支持的配置文件格式: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 结果类型别名
pub type RegistryResult<T> = Result<T, RegistryError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
