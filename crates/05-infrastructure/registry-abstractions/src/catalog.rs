//! 组件目录抽象接口

use component_common::{CatalogEntry, RegistryError, RegistryResult};
use std::fmt::Debug;

/// 组件目录 trait
///
/// 目录只支持追加，不检查标识是否重复。
pub trait ComponentCatalog: Send + Sync + Debug {
    /// 目录名称，用于日志与错误信息
    fn name(&self) -> &str;

    /// 按目录顺序返回所有条目
    fn load(&self) -> RegistryResult<Vec<CatalogEntry>>;

    /// 追加一个条目
    fn append(&self, entry: CatalogEntry) -> RegistryResult<()>;

    /// 按标识精确查找（区分大小写）
    ///
    /// 存在重复标识时返回最后追加的条目。
    fn find_by_id(&self, id: &str) -> RegistryResult<CatalogEntry> {
        self.load()?
            .into_iter()
            .rev()
            .find(|entry| entry.id == id)
            .ok_or_else(|| RegistryError::not_found(id, self.name()))
    }
}
