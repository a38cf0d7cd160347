//! 组件注册表抽象接口

use component_common::{
    AddComponentRequest, Component, ComponentProperty, ExecutionInstructions, RegistryResult,
};
use std::sync::Arc;

/// 组件注册表 trait
///
/// 按处理器类型选择解析器，按目录条目的来源类型选择定义来源。
/// 所有操作都是同步阻塞的，在调用方线程上完成。
pub trait ComponentRegistry: Send + Sync {
    /// 列出处理器类型下的所有组件
    ///
    /// 任意一个目录条目解析失败都会使整个列表操作失败。
    fn list_components(&self, processor_type: &str) -> RegistryResult<Vec<Component>>;

    /// 列出组件，结果可在调用方之间共享
    ///
    /// 带快照的实现直接返回快照本身，不复制组件。
    fn list_components_shared(&self, processor_type: &str) -> RegistryResult<Arc<Vec<Component>>> {
        self.list_components(processor_type).map(Arc::new)
    }

    /// 获取单个组件（含属性）
    fn get_component(&self, processor_type: &str, component_id: &str)
        -> RegistryResult<Component>;

    /// 获取组件属性列表
    fn get_properties(
        &self,
        processor_type: &str,
        component_id: &str,
    ) -> RegistryResult<Vec<ComponentProperty>>;

    /// 追加组件到目录，返回刷新后的组件列表
    fn add_component(
        &self,
        processor_type: &str,
        request: &AddComponentRequest,
    ) -> RegistryResult<Vec<Component>>;

    /// 获取组件执行说明，仅适用于非通用处理器类型
    fn get_execution_details(
        &self,
        processor_type: &str,
        component_id: &str,
    ) -> RegistryResult<ExecutionInstructions>;
}
