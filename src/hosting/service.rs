//! 托管服务抽象
//!
//! 生命周期钩子均为可选实现；宿主按注册顺序逐个等待钩子完成，
//! 钩子内部的并发由服务自行负责。

use async_trait::async_trait;

use crate::errors::BoxError;

/// 由宿主托管并按序调度生命周期的服务单元
///
/// 服务实例经注入器解析获得，依赖在 `initialize` 之前即已注入完成。
#[async_trait]
pub trait Service: Send + Sync {
    /// 初始化钩子，在依赖图构建完成后按注册顺序调用
    async fn initialize(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// 启动钩子，按注册顺序调用
    async fn start(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// 停止钩子，按注册逆序调用
    async fn stop(&self) -> Result<(), BoxError> {
        Ok(())
    }
}
