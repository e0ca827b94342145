//! 宿主生命周期引擎
//!
//! 管理托管服务的 构造 → 初始化 → 启动 → 停止 流程：
//! - 服务实例在初始化阶段经注入器解析，依赖图随之构建
//! - 初始化与启动按注册顺序，停止按严格逆序
//! - 启动失败时对已启动服务做尽力回滚，回滚错误只记录不传播
//! - 停止阶段逐个尝试全部钩子，错误收集后统一上报
//!
//! 生命周期方法要求 `&mut self`，迁移的串行化由借用规则保证。

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::errors::{HostError, InjectError};
use crate::hosting::environment::HostEnvironment;
use crate::hosting::logging::{LogLevel, LogSink};
use crate::hosting::service::Service;
use crate::inject::injector::Injector;
use crate::inject::key::Key;

/// 宿主状态机，`Stopped` 与 `Failed` 均为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Created,
    Initialized,
    Started,
    Stopped,
    Failed,
}

/// 生命周期阶段，用于错误归因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Initialize,
    Start,
    Stop,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePhase::Initialize => write!(f, "initialize"),
            LifecyclePhase::Start => write!(f, "start"),
            LifecyclePhase::Stop => write!(f, "stop"),
        }
    }
}

type ResolveServiceFn =
    Box<dyn Fn(&Injector) -> Result<Arc<dyn Service>, InjectError> + Send + Sync>;

/// 注册的服务定义：标识 Key 与解析入口
struct ServiceEntry {
    key: Key,
    resolve: ResolveServiceFn,
}

/// 服务宿主
pub struct Host {
    injector: Injector,
    environment: HostEnvironment,
    log: Arc<dyn LogSink>,
    services: Vec<ServiceEntry>,
    /// 初始化阶段解析出的实例，保持注册顺序
    resolved: Vec<(Key, Arc<dyn Service>)>,
    state: HostState,
}

impl Host {
    /// 创建宿主构建器
    pub fn builder() -> crate::hosting::builder::HostBuilder {
        crate::hosting::builder::HostBuilder::new()
    }

    pub(crate) fn new(
        injector: Injector,
        environment: HostEnvironment,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            injector,
            environment,
            log,
            services: Vec::new(),
            resolved: Vec::new(),
            state: HostState::Created,
        }
    }

    /// 宿主的注入器
    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    /// 宿主环境句柄
    pub fn environment(&self) -> &HostEnvironment {
        &self.environment
    }

    /// 当前状态
    pub fn state(&self) -> HostState {
        self.state
    }

    pub(crate) fn set_log_sink(&mut self, sink: Arc<dyn LogSink>) {
        self.log = sink;
    }

    /// 注册一个服务定义
    ///
    /// 服务类型须已在注入器中绑定；仅在 `Created` 状态下合法，
    /// 同一 Key 重复注册立即失败且不产生副作用。
    pub fn register_service<S>(&mut self) -> Result<(), HostError>
    where
        S: Service + Send + Sync + 'static,
    {
        self.register_entry(
            Key::of::<S>(),
            Box::new(|injector| {
                let service: Arc<dyn Service> = injector.resolve::<S>()?;
                Ok(service)
            }),
        )
    }

    /// 注册带限定名的服务定义
    pub fn register_service_named<S>(
        &mut self,
        qualifier: impl Into<Cow<'static, str>>,
    ) -> Result<(), HostError>
    where
        S: Service + Send + Sync + 'static,
    {
        let key = Key::named::<S>(qualifier);
        let resolve_key = key.clone();
        self.register_entry(
            key,
            Box::new(move |injector| {
                let service: Arc<dyn Service> = injector.resolve_key::<S>(resolve_key.clone())?;
                Ok(service)
            }),
        )
    }

    fn register_entry(&mut self, key: Key, resolve: ResolveServiceFn) -> Result<(), HostError> {
        if self.state != HostState::Created {
            return Err(HostError::InvalidTransition {
                state: self.state,
                operation: "register_service",
            });
        }
        if self.services.iter().any(|entry| entry.key == key) {
            return Err(HostError::DuplicateService { key });
        }
        self.services.push(ServiceEntry { key, resolve });
        Ok(())
    }

    /// 初始化：解析每个服务的完整依赖图并调用其 initialize 钩子
    ///
    /// 任一失败中止序列并进入 `Failed` 终态，已初始化的服务保持原样。
    pub async fn initialize(&mut self) -> Result<(), HostError> {
        if self.state != HostState::Created {
            return Err(HostError::InvalidTransition {
                state: self.state,
                operation: "initialize",
            });
        }

        self.log(LogLevel::Debug, "host initializing", None);

        for index in 0..self.services.len() {
            let key = self.services[index].key.clone();
            let instance = match (self.services[index].resolve)(&self.injector) {
                Ok(instance) => instance,
                Err(source) => {
                    self.state = HostState::Failed;
                    let error = HostError::ServiceResolution { key, source };
                    self.log(LogLevel::Error, "service resolution failed", Some(&error));
                    return Err(error);
                }
            };
            self.resolved.push((key.clone(), instance.clone()));

            if let Err(source) = instance.initialize().await {
                self.state = HostState::Failed;
                let error = HostError::ServiceHook {
                    key,
                    phase: LifecyclePhase::Initialize,
                    source,
                };
                self.log(LogLevel::Error, "service initialization failed", Some(&error));
                return Err(error);
            }
            self.log(
                LogLevel::Debug,
                &format!("service {} initialized", self.resolved[index].0),
                None,
            );
        }

        self.state = HostState::Initialized;
        self.log(LogLevel::Debug, "host initialized", None);
        Ok(())
    }

    /// 启动：按注册顺序调用 start 钩子
    ///
    /// 失败时对已启动服务按逆序尽力回滚，回滚中的 stop 错误只记录；
    /// 原始错误归因到失败的服务并返回。
    pub async fn start(&mut self) -> Result<(), HostError> {
        if self.state != HostState::Initialized {
            return Err(HostError::InvalidTransition {
                state: self.state,
                operation: "start",
            });
        }

        self.log(LogLevel::Debug, "host starting", None);
        self.environment.run_starting_hooks(self.log.as_ref());

        for index in 0..self.resolved.len() {
            let (key, instance) = {
                let entry = &self.resolved[index];
                (entry.0.clone(), entry.1.clone())
            };
            if let Err(source) = instance.start().await {
                let error = HostError::ServiceHook {
                    key,
                    phase: LifecyclePhase::Start,
                    source,
                };
                self.log(
                    LogLevel::Error,
                    "service start failed, rolling back started services",
                    Some(&error),
                );
                self.rollback_started(index).await;
                self.state = HostState::Failed;
                return Err(error);
            }
            self.log(
                LogLevel::Debug,
                &format!("service {} started", self.resolved[index].0),
                None,
            );
        }

        self.environment.run_started_hooks(self.log.as_ref());
        self.state = HostState::Started;
        self.log(LogLevel::Debug, "host started", None);
        Ok(())
    }

    /// 逆序停止 `resolved[..started]`，失败只记录
    async fn rollback_started(&self, started: usize) {
        for index in (0..started).rev() {
            let (key, instance) = {
                let entry = &self.resolved[index];
                (entry.0.clone(), entry.1.clone())
            };
            if let Err(source) = instance.stop().await {
                let error = HostError::ServiceHook {
                    key,
                    phase: LifecyclePhase::Stop,
                    source,
                };
                self.log(
                    LogLevel::Error,
                    "service stop failed during rollback",
                    Some(&error),
                );
            }
        }
    }

    /// 停止：按严格逆序调用 stop 钩子
    ///
    /// 每个钩子都会被尝试，失败收集后以聚合错误统一上报；
    /// 无论个别钩子成败，宿主最终进入 `Stopped`。
    pub async fn stop(&mut self) -> Result<(), HostError> {
        if self.state != HostState::Started {
            return Err(HostError::InvalidTransition {
                state: self.state,
                operation: "stop",
            });
        }

        self.log(LogLevel::Debug, "host stopping", None);
        self.environment.run_stopping_hooks(self.log.as_ref());

        let mut failures = Vec::new();
        for index in (0..self.resolved.len()).rev() {
            let (key, instance) = {
                let entry = &self.resolved[index];
                (entry.0.clone(), entry.1.clone())
            };
            if let Err(source) = instance.stop().await {
                let error = HostError::ServiceHook {
                    key,
                    phase: LifecyclePhase::Stop,
                    source,
                };
                self.log(LogLevel::Error, "service stop failed", Some(&error));
                failures.push(error);
            } else {
                self.log(
                    LogLevel::Debug,
                    &format!("service {} stopped", self.resolved[index].0),
                    None,
                );
            }
        }

        self.environment.run_stopped_hooks(self.log.as_ref());
        self.state = HostState::Stopped;

        if failures.is_empty() {
            self.log(LogLevel::Debug, "host stopped", None);
            Ok(())
        } else {
            Err(HostError::Shutdown { failures })
        }
    }

    /// 便捷驱动：初始化 → 启动 → 等待关闭信号 → 停止
    pub async fn run(&mut self) -> Result<(), HostError> {
        self.initialize().await?;
        self.start().await?;
        self.wait_for_shutdown().await;
        self.stop().await
    }

    /// 挂起当前任务直至环境的关闭信号触发
    pub async fn wait_for_shutdown(&self) {
        self.environment.wait_for_shutdown().await;
    }

    fn log(&self, level: LogLevel, message: &str, error: Option<&HostError>) {
        let error = error.map(|error| error as &(dyn std::error::Error + 'static));
        self.log.log(level, message, error);
    }
}
