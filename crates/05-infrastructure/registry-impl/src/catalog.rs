//! 组件目录实现

use component_common::{CatalogDocument, CatalogEntry, RegistryError, RegistryResult};
use parking_lot::{Mutex, RwLock};
use registry_abstractions::ComponentCatalog;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// JSON 文件目录
///
/// 文件格式为 `{"components": {"<id>": {"name": ..., "path": {"<来源类型>": "<路径>"}}}}`，
/// 读取时 `path` 也可写作 `location`。
/// 文件不存在时视为空目录，首次追加时创建。
#[derive(Debug)]
pub struct JsonFileCatalog {
    path: PathBuf,
    name: String,
    write_lock: Mutex<()>,
}

impl JsonFileCatalog {
    /// 创建文件目录
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// 目录文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persistence_error<E>(&self, source: E) -> RegistryError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RegistryError::CatalogPersistence {
            catalog: self.name.clone(),
            source: Box::new(source),
        }
    }

    fn read_document(&self) -> RegistryResult<CatalogDocument> {
        if !self.path.exists() {
            debug!("目录文件不存在，按空目录处理: {}", self.name);
            return Ok(CatalogDocument::default());
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|e| self.persistence_error(e))?;
        if content.trim().is_empty() {
            return Ok(CatalogDocument::default());
        }
        serde_json::from_str(&content).map_err(|e| self.persistence_error(e))
    }

    fn write_document(&self, document: &CatalogDocument) -> RegistryResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.persistence_error(e))?;
        }
        let content =
            serde_json::to_string_pretty(document).map_err(|e| self.persistence_error(e))?;

        // 先写同目录临时文件再改名，读者只会看到完整的旧文件或新文件
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        std::fs::write(&staging, content).map_err(|e| self.persistence_error(e))?;
        std::fs::rename(&staging, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&staging);
            self.persistence_error(e)
        })
    }
}

impl ComponentCatalog for JsonFileCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> RegistryResult<Vec<CatalogEntry>> {
        let entries = self.read_document()?.entries();
        debug!("加载组件目录: {} ({} 个条目)", self.name, entries.len());
        Ok(entries)
    }

    /// 以标识为键写入文件，已有同名键时原位覆盖
    fn append(&self, entry: CatalogEntry) -> RegistryResult<()> {
        let _guard = self.write_lock.lock();

        let mut document = self.read_document()?;
        if document.components.contains_key(&entry.id) {
            warn!("组件标识重复，覆盖已有条目: {} ({})", entry.id, self.name);
        }
        info!("追加组件到目录: {} -> {}", entry.id, self.name);
        document.components.insert(entry.id.clone(), entry.to_record());
        self.write_document(&document)
    }
}

/// 内存目录
///
/// 条目保存在进程内，重复标识的条目并存，查找时以最后追加的为准。
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    name: String,
    entries: RwLock<Vec<CatalogEntry>>,
}

impl InMemoryCatalog {
    /// 创建空目录
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// 使用已有条目创建目录
    pub fn with_entries(name: impl Into<String>, entries: Vec<CatalogEntry>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(entries),
        }
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ComponentCatalog for InMemoryCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> RegistryResult<Vec<CatalogEntry>> {
        Ok(self.entries.read().clone())
    }

    fn append(&self, entry: CatalogEntry) -> RegistryResult<()> {
        let mut entries = self.entries.write();
        if entries.iter().any(|existing| existing.id == entry.id) {
            warn!("组件标识重复: {} ({})", entry.id, self.name);
        }
        entries.push(entry);
        Ok(())
    }
}
