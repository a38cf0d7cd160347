//! 组件定义来源抽象接口

use component_common::{RegistryError, RegistryResult};
use std::fmt::Debug;
use std::path::Path;
use tracing::debug;

/// 组件定义内容
#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionBody {
    /// `.yaml` 文件解析后的文档
    Document(serde_yaml::Value),
    /// `.py` 文件的文本行
    Lines(Vec<String>),
}

/// 已读取的组件定义
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDefinition {
    /// 定义内容
    pub body: DefinitionBody,
    /// 由文件名推导的名称（不含扩展名）
    pub name: String,
    /// 扩展名，包含前导点，例如 `.yaml`
    pub extension: String,
    /// 读取位置
    pub location: String,
}

impl FetchedDefinition {
    /// 根据扩展名解码原始文本
    ///
    /// `path` 用于推导名称和扩展名，对网络来源应传入地址中的路径部分。
    pub fn decode(location: &str, path: &str, content: &str) -> RegistryResult<Self> {
        let (name, extension) = split_name_and_extension(path);
        debug!("解码组件定义: {} ({})", location, extension);

        let body = match extension.as_str() {
            ".yaml" | ".yml" => DefinitionBody::Document(
                serde_yaml::from_str(content)
                    .map_err(|e| RegistryError::document_syntax(location, e))?,
            ),
            ".py" => DefinitionBody::Lines(content.lines().map(str::to_string).collect()),
            _ => {
                return Err(RegistryError::UnsupportedFileType {
                    extension,
                    location: location.to_string(),
                })
            }
        };

        Ok(Self {
            body,
            name,
            extension,
            location: location.to_string(),
        })
    }

    /// 结构化文档内容
    pub fn document(&self) -> Option<&serde_yaml::Value> {
        match &self.body {
            DefinitionBody::Document(document) => Some(document),
            DefinitionBody::Lines(_) => None,
        }
    }

    /// 文本行内容
    pub fn lines(&self) -> Option<&[String]> {
        match &self.body {
            DefinitionBody::Lines(lines) => Some(lines),
            DefinitionBody::Document(_) => None,
        }
    }
}

/// 拆分文件名与扩展名
fn split_name_and_extension(path: &str) -> (String, String) {
    let path = Path::new(path);
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (name, extension)
}

/// 组件定义来源 trait
///
/// 每种来源类型（`file`、`url`）一个实现，读取是阻塞的，不做重试。
pub trait ComponentSource: Send + Sync + Debug {
    /// 来源类型，对应目录条目位置映射的键
    fn source_type(&self) -> &str;

    /// 读取并解码组件定义
    fn fetch(&self, location: &str) -> RegistryResult<FetchedDefinition>;
}
