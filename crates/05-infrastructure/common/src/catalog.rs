//! 组件目录条目

use crate::conventions::id_from_name;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 本地文件来源
pub const FILE_SOURCE_TYPE: &str = "file";
/// 网络地址来源
pub const URL_SOURCE_TYPE: &str = "url";

/// 目录中的一个组件条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// 组件标识
    pub id: String,
    /// 显示名称
    pub name: String,
    /// 来源类型（`file` 或 `url`），取自位置映射的第一个键
    pub source_type: String,
    /// 路径或地址
    pub location: String,
    /// 解析器应用了标识前缀时，记录调用方请求的原始标识
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_id: Option<String>,
}

impl CatalogEntry {
    /// 创建新的目录条目
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        source_type: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source_type: source_type.into(),
            location: location.into(),
            adjusted_id: None,
        }
    }

    /// 从持久化记录转换
    ///
    /// 来源类型取位置映射的第一个键；映射为空时来源类型为空串，
    /// 由注册表在解析来源时报告不支持的来源类型。
    pub fn from_record(id: impl Into<String>, record: &CatalogRecord) -> Self {
        let (source_type, location) = record
            .location
            .first()
            .map(|(k, v)| (k.clone(), v.clone()))
            .unwrap_or_default();

        Self {
            id: id.into(),
            name: record.name.clone(),
            source_type,
            location,
            adjusted_id: None,
        }
    }

    /// 转换为持久化记录
    pub fn to_record(&self) -> CatalogRecord {
        let mut location = IndexMap::new();
        location.insert(self.source_type.clone(), self.location.clone());
        CatalogRecord {
            name: self.name.clone(),
            id: Some(self.id.clone()),
            location,
        }
    }
}

/// 目录文件中的一条记录
///
/// 读取时接受 `location` 或 `path` 两种键名，写出时使用 `path`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// 显示名称
    pub name: String,
    /// 组件标识，读取时以外层映射的键为准
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 来源类型 -> 路径
    #[serde(rename(serialize = "path"), alias = "path")]
    pub location: IndexMap<String, String>,
}

/// 目录文件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// 组件标识 -> 记录
    #[serde(default)]
    pub components: IndexMap<String, CatalogRecord>,
}

impl CatalogDocument {
    /// 按文件顺序返回目录条目
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.components
            .iter()
            .map(|(id, record)| CatalogEntry::from_record(id.clone(), record))
            .collect()
    }
}

/// 新增组件请求
///
/// 格式为 `{"name": "显示名称", "path": {"file|url": "路径或地址"}}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddComponentRequest {
    /// 显示名称
    pub name: String,
    /// 来源类型 -> 路径
    #[serde(alias = "location")]
    pub path: IndexMap<String, String>,
}

impl AddComponentRequest {
    /// 创建新增请求
    pub fn new(
        name: impl Into<String>,
        source_type: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        let mut path = IndexMap::new();
        path.insert(source_type.into(), location.into());
        Self {
            name: name.into(),
            path,
        }
    }

    /// 生成目录条目，标识由显示名称推导
    pub fn to_entry(&self) -> CatalogEntry {
        let record = CatalogRecord {
            name: self.name.clone(),
            id: None,
            location: self.path.clone(),
        };
        CatalogEntry::from_record(id_from_name(&self.name), &record)
    }
}
