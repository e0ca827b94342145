//! 宿主构建器
//!
//! 配置期入口：装配环境、注入器与服务注册表，`build` 产出处于
//! `Created` 状态的宿主。环境句柄在创建时即作为实例绑定注入，
//! 服务可直接声明对 [`HostEnvironment`] 的依赖。

use std::borrow::Cow;
use std::sync::Arc;

use crate::errors::{HostError, InjectError};
use crate::hosting::environment::HostEnvironment;
use crate::hosting::host::Host;
use crate::hosting::logging::{FacadeLogSink, LogSink};
use crate::hosting::service::Service;
use crate::inject::injector::Injector;
use crate::inject::module::Module;

pub struct HostBuilder {
    host: Host,
}

impl HostBuilder {
    pub fn new() -> Self {
        let injector = Injector::new();
        let environment = HostEnvironment::new();
        // 空注入器上绑定环境句柄不会与既有绑定冲突
        let _ = injector
            .bind::<HostEnvironment>()
            .to_instance(Arc::new(environment.clone()));
        Self {
            host: Host::new(injector, environment, Arc::new(FacadeLogSink)),
        }
    }

    /// 调整宿主环境（环境名、内容根目录、阶段钩子等）
    pub fn configure_environment(self, configure: impl FnOnce(&HostEnvironment)) -> Self {
        configure(self.host.environment());
        self
    }

    /// 应用一个模块的绑定注册
    pub fn install<M: Module + ?Sized>(self, module: &M) -> Result<Self, InjectError> {
        self.host.injector().install(module)?;
        Ok(self)
    }

    /// 直接操作注入器的配置脚本
    pub fn configure_injector(
        self,
        configure: impl FnOnce(&Injector) -> Result<(), InjectError>,
    ) -> Result<Self, InjectError> {
        configure(self.host.injector())?;
        Ok(self)
    }

    /// 注册一个服务定义
    pub fn register_service<S>(mut self) -> Result<Self, HostError>
    where
        S: Service + Send + Sync + 'static,
    {
        self.host.register_service::<S>()?;
        Ok(self)
    }

    /// 注册带限定名的服务定义
    pub fn register_service_named<S>(
        mut self,
        qualifier: impl Into<Cow<'static, str>>,
    ) -> Result<Self, HostError>
    where
        S: Service + Send + Sync + 'static,
    {
        self.host.register_service_named::<S>(qualifier)?;
        Ok(self)
    }

    /// 替换日志接收器（默认转发到 `log` 门面）
    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.host.set_log_sink(sink);
        self
    }

    /// 产出处于 `Created` 状态的宿主
    pub fn build(self) -> Host {
        self.host
    }
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self::new()
    }
}
