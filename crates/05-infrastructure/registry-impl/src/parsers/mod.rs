//! 组件解析器实现
//!
//! - [`GenericComponentParser`] - 内置组件
//! - [`KfpComponentParser`] - 容器组件（YAML）
//! - [`AirflowComponentParser`] - 脚本算子（Python 源码）

pub mod airflow;
pub mod generic;
pub mod kfp;

pub use airflow::AirflowComponentParser;
pub use generic::{generic_properties, is_builtin_component, GenericComponentParser};
pub use kfp::KfpComponentParser;

use component_common::CatalogEntry;

/// 组件标识前缀
///
/// 设置后，列表中的组件标识为 `前缀 + 目录标识`，查找时先去掉前缀。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdPrefix(Option<String>);

impl IdPrefix {
    /// 带前缀的方案，空串视为不加前缀
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if prefix.is_empty() {
            Self(None)
        } else {
            Self(Some(prefix))
        }
    }

    /// 列表中展示的标识
    pub fn apply(&self, entry: &CatalogEntry) -> String {
        if let Some(adjusted) = &entry.adjusted_id {
            return adjusted.clone();
        }
        match &self.0 {
            Some(prefix) => format!("{}{}", prefix, entry.id),
            None => entry.id.clone(),
        }
    }

    /// 去掉前缀得到目录标识
    pub fn strip(&self, component_id: &str) -> String {
        self.0
            .as_deref()
            .and_then(|prefix| component_id.strip_prefix(prefix))
            .unwrap_or(component_id)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_prefix_round_trip() {
        let prefix = IdPrefix::new("kfp-");
        let entry = CatalogEntry::new("filter", "Filter", "file", "filter.yaml");

        assert_eq!(prefix.apply(&entry), "kfp-filter");
        assert_eq!(prefix.strip("kfp-filter"), "filter");
        assert_eq!(prefix.strip("filter"), "filter");
    }

    #[test]
    fn test_adjusted_id_wins() {
        let mut entry = CatalogEntry::new("filter", "Filter", "file", "filter.yaml");
        entry.adjusted_id = Some("kfp-filter".to_string());

        assert_eq!(IdPrefix::default().apply(&entry), "kfp-filter");
        assert_eq!(IdPrefix::new("").strip("kfp-filter"), "kfp-filter");
    }
}
