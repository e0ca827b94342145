//! 模块抽象
//!
//! 以声明方式向注入器批量注册绑定；模块本身无运行时状态，
//! 可安全地应用到多个不同的注入器，但不会对同一注入器重复应用。

use crate::errors::InjectError;
use crate::inject::injector::Injector;

/// 配置期的注册脚本
pub trait Module {
    /// 向目标注入器注册零或多条绑定
    fn configure(&self, injector: &Injector) -> Result<(), InjectError>;
}

/// 为闭包实现 Module - 简化一次性配置脚本的书写
impl<F> Module for F
where
    F: Fn(&Injector) -> Result<(), InjectError>,
{
    fn configure(&self, injector: &Injector) -> Result<(), InjectError> {
        self(injector)
    }
}
