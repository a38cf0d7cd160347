//! 组件列表缓存

use chrono::{DateTime, Utc};
use component_common::{
    AddComponentRequest, Component, ComponentProperty, ExecutionInstructions, RegistryResult,
};
use parking_lot::Mutex;
use registry_abstractions::ComponentRegistry;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// 缓存统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// 命中次数
    pub hits: u64,
    /// 未命中次数
    pub misses: u64,
    /// 快照中的组件数量
    pub size: usize,
    /// 快照生成时间
    pub last_updated: Option<DateTime<Utc>>,
    /// 配置的存活时间（秒），仅用于报告
    pub ttl_secs: u64,
}

impl CacheStats {
    /// 计算命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct Snapshot {
    components: Arc<Vec<Component>>,
    populated_at: DateTime<Utc>,
}

/// 带缓存的组件注册表
///
/// 只缓存一个处理器类型的组件列表。首次调用时计算并保存快照，之后无条件返回同一快照；
/// 通过注册表做的修改不会反映到已生成的快照。存活时间只记录不生效。
pub struct CachedComponentRegistry {
    inner: Arc<dyn ComponentRegistry>,
    processor_type: String,
    ttl: Duration,
    snapshot: Mutex<Option<Snapshot>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedComponentRegistry {
    /// 包装注册表，缓存指定处理器类型的列表
    pub fn new(
        inner: Arc<dyn ComponentRegistry>,
        processor_type: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            inner,
            processor_type: processor_type.into(),
            ttl,
            snapshot: Mutex::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// 缓存的处理器类型
    pub fn processor_type(&self) -> &str {
        &self.processor_type
    }

    /// 配置的存活时间
    pub fn cache_ttl(&self) -> Duration {
        self.ttl
    }

    /// 缓存的组件列表，多次调用返回同一个 `Arc`
    ///
    /// 计算失败时不保存快照，下次调用重新计算。
    pub fn components(&self) -> RegistryResult<Arc<Vec<Component>>> {
        let mut snapshot = self.snapshot.lock();
        if let Some(existing) = snapshot.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("组件列表缓存命中: {}", self.processor_type);
            return Ok(Arc::clone(&existing.components));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let components = Arc::new(self.inner.list_components(&self.processor_type)?);
        info!(
            "生成组件列表快照: {} ({} 个组件)",
            self.processor_type,
            components.len()
        );
        *snapshot = Some(Snapshot {
            components: Arc::clone(&components),
            populated_at: Utc::now(),
        });
        Ok(components)
    }

    /// 预先生成快照
    pub fn warm_up(&self) -> RegistryResult<usize> {
        Ok(self.components()?.len())
    }

    /// 丢弃快照，下次调用重新计算
    pub fn invalidate(&self) {
        if self.snapshot.lock().take().is_some() {
            debug!("丢弃组件列表快照: {}", self.processor_type);
        }
    }

    /// 获取缓存统计
    pub fn stats(&self) -> CacheStats {
        let snapshot = self.snapshot.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: snapshot.as_ref().map_or(0, |s| s.components.len()),
            last_updated: snapshot.as_ref().map(|s| s.populated_at),
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

impl std::fmt::Debug for CachedComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedComponentRegistry")
            .field("processor_type", &self.processor_type)
            .field("ttl", &self.ttl)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl ComponentRegistry for CachedComponentRegistry {
    /// 返回快照的副本，需要共享快照时使用 `list_components_shared`
    fn list_components(&self, processor_type: &str) -> RegistryResult<Vec<Component>> {
        if processor_type == self.processor_type {
            Ok(self.components()?.as_ref().clone())
        } else {
            self.inner.list_components(processor_type)
        }
    }

    fn list_components_shared(&self, processor_type: &str) -> RegistryResult<Arc<Vec<Component>>> {
        if processor_type == self.processor_type {
            self.components()
        } else {
            self.inner.list_components_shared(processor_type)
        }
    }

    fn get_component(&self, processor_type: &str, component_id: &str) -> RegistryResult<Component> {
        self.inner.get_component(processor_type, component_id)
    }

    fn get_properties(
        &self,
        processor_type: &str,
        component_id: &str,
    ) -> RegistryResult<Vec<ComponentProperty>> {
        self.inner.get_properties(processor_type, component_id)
    }

    fn add_component(
        &self,
        processor_type: &str,
        request: &AddComponentRequest,
    ) -> RegistryResult<Vec<Component>> {
        self.inner.add_component(processor_type, request)
    }

    fn get_execution_details(
        &self,
        processor_type: &str,
        component_id: &str,
    ) -> RegistryResult<ExecutionInstructions> {
        self.inner.get_execution_details(processor_type, component_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_common::{RegistryError, KFP_PROCESSOR_TYPE};
    use std::sync::atomic::AtomicUsize;

    /// 记录列表调用次数的注册表
    #[derive(Default)]
    struct CountingRegistry {
        listings: AtomicUsize,
        fail: bool,
    }

    impl ComponentRegistry for CountingRegistry {
        fn list_components(&self, processor_type: &str) -> RegistryResult<Vec<Component>> {
            self.listings.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RegistryError::structural("a.yaml", "broken"));
            }
            Ok(vec![Component::new("a", "A", processor_type)])
        }

        fn get_component(&self, processor_type: &str, id: &str) -> RegistryResult<Component> {
            Err(RegistryError::not_found(id, processor_type))
        }

        fn get_properties(
            &self,
            processor_type: &str,
            id: &str,
        ) -> RegistryResult<Vec<ComponentProperty>> {
            Err(RegistryError::not_found(id, processor_type))
        }

        fn add_component(
            &self,
            processor_type: &str,
            _request: &AddComponentRequest,
        ) -> RegistryResult<Vec<Component>> {
            self.list_components(processor_type)
        }

        fn get_execution_details(
            &self,
            processor_type: &str,
            id: &str,
        ) -> RegistryResult<ExecutionInstructions> {
            Err(RegistryError::not_found(id, processor_type))
        }
    }

    #[test]
    fn test_second_call_returns_same_snapshot() {
        let inner = Arc::new(CountingRegistry::default());
        let cache = CachedComponentRegistry::new(
            inner.clone(),
            KFP_PROCESSOR_TYPE,
            Duration::from_secs(60),
        );

        let first = cache.components().unwrap();
        let second = cache.components().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(inner.listings.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert!(stats.last_updated.is_some());
        assert_eq!(stats.ttl_secs, 60);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shared_listing_through_trait_object() {
        let inner = Arc::new(CountingRegistry::default());
        let cache: Arc<dyn ComponentRegistry> = Arc::new(CachedComponentRegistry::new(
            inner.clone(),
            KFP_PROCESSOR_TYPE,
            Duration::ZERO,
        ));

        let first = cache.list_components_shared(KFP_PROCESSOR_TYPE).unwrap();
        let second = cache.list_components_shared(KFP_PROCESSOR_TYPE).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.list_components(KFP_PROCESSOR_TYPE).unwrap(), *first);
        assert_eq!(inner.listings.load(Ordering::SeqCst), 1);

        // 未缓存的处理器类型每次生成新的列表
        let a = cache.list_components_shared("airflow").unwrap();
        let b = cache.list_components_shared("airflow").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_other_processor_types_pass_through() {
        let inner = Arc::new(CountingRegistry::default());
        let cache = CachedComponentRegistry::new(inner.clone(), KFP_PROCESSOR_TYPE, Duration::ZERO);

        cache.list_components("airflow").unwrap();
        cache.list_components("airflow").unwrap();
        assert_eq!(inner.listings.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().misses, 0);
    }

    #[test]
    fn test_ttl_is_not_enforced() {
        let inner = Arc::new(CountingRegistry::default());
        let cache = CachedComponentRegistry::new(inner.clone(), KFP_PROCESSOR_TYPE, Duration::ZERO);

        assert_eq!(cache.warm_up().unwrap(), 1);
        std::thread::sleep(Duration::from_millis(5));
        cache.list_components(KFP_PROCESSOR_TYPE).unwrap();

        assert_eq!(inner.listings.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cache_ttl(), Duration::ZERO);
    }

    #[test]
    fn test_add_does_not_refresh_snapshot() {
        let inner = Arc::new(CountingRegistry::default());
        let cache = CachedComponentRegistry::new(inner.clone(), KFP_PROCESSOR_TYPE, Duration::ZERO);

        let before = cache.components().unwrap();
        cache
            .add_component(KFP_PROCESSOR_TYPE, &AddComponentRequest::new("B", "file", "b.yaml"))
            .unwrap();
        let after = cache.components().unwrap();
        assert!(Arc::ptr_eq(&before, &after));

        cache.invalidate();
        let rebuilt = cache.components().unwrap();
        assert!(!Arc::ptr_eq(&before, &rebuilt));
    }

    #[test]
    fn test_failed_listing_is_not_cached() {
        let inner = Arc::new(CountingRegistry {
            fail: true,
            ..Default::default()
        });
        let cache = CachedComponentRegistry::new(inner.clone(), KFP_PROCESSOR_TYPE, Duration::ZERO);

        assert!(cache.components().is_err());
        assert!(cache.components().is_err());
        assert_eq!(inner.listings.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().size, 0);
    }
}
