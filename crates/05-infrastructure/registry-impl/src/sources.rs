//! 组件定义来源实现

use component_common::{RegistryError, RegistryResult, FILE_SOURCE_TYPE, URL_SOURCE_TYPE};
use registry_abstractions::{ComponentSource, FetchedDefinition};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// 本地文件来源
///
/// 相对路径基于组件根目录解析。
#[derive(Debug, Clone)]
pub struct FilesystemComponentSource {
    root: PathBuf,
}

impl FilesystemComponentSource {
    /// 创建文件来源
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 组件根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ComponentSource for FilesystemComponentSource {
    fn source_type(&self) -> &str {
        FILE_SOURCE_TYPE
    }

    fn fetch(&self, location: &str) -> RegistryResult<FetchedDefinition> {
        let path = self.resolve(location);
        debug!("读取组件定义文件: {}", path.display());

        let content = std::fs::read_to_string(&path).map_err(|e| RegistryError::SourceRead {
            location: path.display().to_string(),
            source: e,
        })?;
        FetchedDefinition::decode(location, location, &content)
    }
}

/// 网络地址来源
///
/// 使用阻塞客户端，超时由构造时指定，不重试。
#[derive(Debug, Clone)]
pub struct UrlComponentSource {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl UrlComponentSource {
    /// 创建网络来源
    pub fn new(timeout: Duration) -> RegistryResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::SourceFetch {
                location: String::new(),
                message: format!("创建 HTTP 客户端失败: {}", e),
            })?;
        Ok(Self { client, timeout })
    }

    /// 请求超时
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn fetch_error(location: &str, message: impl std::fmt::Display) -> RegistryError {
        RegistryError::SourceFetch {
            location: location.to_string(),
            message: message.to_string(),
        }
    }
}

impl ComponentSource for UrlComponentSource {
    fn source_type(&self) -> &str {
        URL_SOURCE_TYPE
    }

    fn fetch(&self, location: &str) -> RegistryResult<FetchedDefinition> {
        let url = url::Url::parse(location).map_err(|e| Self::fetch_error(location, e))?;
        debug!("下载组件定义: {}", url);

        let content = self
            .client
            .get(url.clone())
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::text)
            .map_err(|e| Self::fetch_error(location, e))?;

        FetchedDefinition::decode(location, url.path(), &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_filesystem_source_resolves_relative_paths() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("a.yaml"), "name: A\n").unwrap();

        let source = FilesystemComponentSource::new(root.path());
        let definition = source.fetch("a.yaml").unwrap();

        assert_eq!(definition.name, "a");
        assert_eq!(definition.extension, ".yaml");
        assert_eq!(definition.location, "a.yaml");
        assert!(definition.document().is_some());
    }

    #[test]
    fn test_filesystem_source_accepts_absolute_paths() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("op.py");
        std::fs::write(&path, "class Op:\n    pass\n").unwrap();

        let source = FilesystemComponentSource::new("/nonexistent");
        let definition = source.fetch(path.to_str().unwrap()).unwrap();
        assert_eq!(definition.lines().map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_missing_file_is_source_read_error() {
        let root = TempDir::new().unwrap();
        let source = FilesystemComponentSource::new(root.path());
        assert!(matches!(
            source.fetch("missing.yaml"),
            Err(RegistryError::SourceRead { .. })
        ));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("notes.txt"), "hello").unwrap();

        let source = FilesystemComponentSource::new(root.path());
        assert!(matches!(
            source.fetch("notes.txt"),
            Err(RegistryError::UnsupportedFileType { .. })
        ));
    }

    #[test]
    fn test_invalid_url_is_fetch_error() {
        let source = UrlComponentSource::new(Duration::from_secs(1)).unwrap();
        assert_eq!(source.source_type(), "url");
        assert!(matches!(
            source.fetch("not a url"),
            Err(RegistryError::SourceFetch { .. })
        ));
    }
}
