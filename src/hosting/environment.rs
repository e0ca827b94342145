//! 宿主环境
//!
//! 保存环境名、内容根目录、关闭超时与关闭信号，并承载
//! starting/started/stopping/stopped 四组阶段钩子。
//! 句柄可克隆共享，构建时会作为实例绑定注入注入器。

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::errors::BoxError;
use crate::hosting::logging::{LogLevel, LogSink};

type PhaseHook = Box<dyn Fn() -> Result<(), BoxError> + Send + Sync>;

/// 宿主环境句柄
#[derive(Clone)]
pub struct HostEnvironment {
    inner: Arc<EnvironmentInner>,
}

struct EnvironmentInner {
    environment_name: Mutex<String>,
    content_root: Mutex<PathBuf>,
    shutdown_timeout: Mutex<Duration>,
    starting_hooks: Mutex<Vec<PhaseHook>>,
    started_hooks: Mutex<Vec<PhaseHook>>,
    stopping_hooks: Mutex<Vec<PhaseHook>>,
    stopped_hooks: Mutex<Vec<PhaseHook>>,
    shutdown_tx: watch::Sender<bool>,
    /// 常驻接收端，保证关闭信号在无等待者时也能写入
    shutdown_rx: watch::Receiver<bool>,
}

impl HostEnvironment {
    pub fn new() -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            inner: Arc::new(EnvironmentInner {
                environment_name: Mutex::new("Development".to_string()),
                content_root: Mutex::new(
                    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
                ),
                shutdown_timeout: Mutex::new(Duration::ZERO),
                starting_hooks: Mutex::new(Vec::new()),
                started_hooks: Mutex::new(Vec::new()),
                stopping_hooks: Mutex::new(Vec::new()),
                stopped_hooks: Mutex::new(Vec::new()),
                shutdown_tx,
                shutdown_rx,
            }),
        }
    }

    pub fn environment_name(&self) -> String {
        self.inner.environment_name.lock().clone()
    }

    pub fn set_environment_name(&self, name: impl Into<String>) {
        *self.inner.environment_name.lock() = name.into();
    }

    pub fn content_root(&self) -> PathBuf {
        self.inner.content_root.lock().clone()
    }

    pub fn set_content_root(&self, path: impl Into<PathBuf>) {
        *self.inner.content_root.lock() = path.into();
    }

    pub fn shutdown_timeout(&self) -> Duration {
        *self.inner.shutdown_timeout.lock()
    }

    pub fn set_shutdown_timeout(&self, timeout: Duration) {
        *self.inner.shutdown_timeout.lock() = timeout;
    }

    /// 注册启动前钩子
    pub fn on_starting(&self, hook: impl Fn() -> Result<(), BoxError> + Send + Sync + 'static) {
        self.inner.starting_hooks.lock().push(Box::new(hook));
    }

    /// 注册启动完成钩子
    pub fn on_started(&self, hook: impl Fn() -> Result<(), BoxError> + Send + Sync + 'static) {
        self.inner.started_hooks.lock().push(Box::new(hook));
    }

    /// 注册停止前钩子
    pub fn on_stopping(&self, hook: impl Fn() -> Result<(), BoxError> + Send + Sync + 'static) {
        self.inner.stopping_hooks.lock().push(Box::new(hook));
    }

    /// 注册停止完成钩子
    pub fn on_stopped(&self, hook: impl Fn() -> Result<(), BoxError> + Send + Sync + 'static) {
        self.inner.stopped_hooks.lock().push(Box::new(hook));
    }

    /// 触发关闭信号，唤醒所有 [`HostEnvironment::wait_for_shutdown`] 等待者
    pub fn shutdown(&self) {
        let _ = self.inner.shutdown_tx.send(true);
    }

    /// 挂起当前任务直至关闭信号触发；信号已触发时立即返回
    pub async fn wait_for_shutdown(&self) {
        let mut receiver = self.inner.shutdown_rx.clone();
        let _ = receiver.wait_for(|requested| *requested).await;
    }

    pub(crate) fn run_starting_hooks(&self, sink: &dyn LogSink) {
        run_hooks(&self.inner.starting_hooks, "starting", sink);
    }

    pub(crate) fn run_started_hooks(&self, sink: &dyn LogSink) {
        run_hooks(&self.inner.started_hooks, "started", sink);
    }

    pub(crate) fn run_stopping_hooks(&self, sink: &dyn LogSink) {
        run_hooks(&self.inner.stopping_hooks, "stopping", sink);
    }

    pub(crate) fn run_stopped_hooks(&self, sink: &dyn LogSink) {
        run_hooks(&self.inner.stopped_hooks, "stopped", sink);
    }
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// 阶段钩子失败只记录不传播，宿主的状态迁移不因钩子失败而中断
fn run_hooks(hooks: &Mutex<Vec<PhaseHook>>, phase: &str, sink: &dyn LogSink) {
    for hook in hooks.lock().iter() {
        if let Err(error) = hook() {
            let error: &(dyn std::error::Error + 'static) = error.as_ref();
            sink.log(
                LogLevel::Error,
                &format!("environment {} hook failed", phase),
                Some(error),
            );
        }
    }
}
