//! 绑定与生产策略
//!
//! 将 Key 映射到实例的生产方式，支持：
//! - 实例绑定（预构建值，构造上即为单例）
//! - 提供者绑定（闭包工厂，未限定作用域时每次调用）
//! - 实现类型绑定（声明依赖元数据并通过指定构造函数注入）

use std::any::Any;
use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::errors::{BoxError, InjectError};
use crate::inject::injector::{Injector, Resolver};
use crate::inject::key::Key;
use crate::inject::Scope;

/// 类型擦除后的共享实例，内部保存一个 `Arc<T>`
pub(crate) type SharedInstance = Arc<dyn Any + Send + Sync>;

/// 类型擦除后的生产函数
pub(crate) type ProduceFn =
    Arc<dyn Fn(&mut Resolver<'_>) -> Result<SharedInstance, InjectError> + Send + Sync>;

/// 可注入的实现类型
///
/// 声明依赖元数据（按需求顺序排列的 Key 列表）并提供指定构造函数，
/// 构造函数中的嵌套解析与外层调用共享同一解析栈。
pub trait Injectable: Sized + Send + Sync + 'static {
    /// 声明的依赖 Key 列表
    fn dependencies() -> Vec<Key> {
        Vec::new()
    }

    /// 指定构造函数，依赖通过 resolver 递归解析
    fn construct(resolver: &mut Resolver<'_>) -> Result<Self, InjectError>;
}

/// 生产策略
#[derive(Clone)]
pub(crate) enum Strategy {
    /// 预构建实例，直接返回存储值
    Instance(SharedInstance),
    /// 调用提供者闭包
    Provider(ProduceFn),
    /// 实现类型：核对声明的依赖后调用指定构造函数
    Implementation {
        dependencies: Vec<Key>,
        construct: ProduceFn,
    },
}

/// 一条注册完成的绑定
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) key: Key,
    pub(crate) scope: Scope,
    pub(crate) strategy: Strategy,
}

/// 绑定声明的流式构建器
///
/// 由 [`Injector::bind`] 创建，终结方法向注入器注册绑定；
/// 重复的 Key 返回 [`InjectError::DuplicateBinding`] 且不产生任何副作用。
pub struct BindingBuilder<'a, T: ?Sized + Send + Sync + 'static> {
    injector: &'a Injector,
    key: Key,
    scope: Scope,
    _marker: PhantomData<fn(&T)>,
}

impl<'a, T: ?Sized + Send + Sync + 'static> BindingBuilder<'a, T> {
    pub(crate) fn new(injector: &'a Injector) -> Self {
        Self {
            injector,
            key: Key::of::<T>(),
            scope: Scope::Unscoped,
            _marker: PhantomData,
        }
    }

    /// 附加限定名，允许同一能力类型注册多条绑定
    pub fn named(mut self, qualifier: impl Into<Cow<'static, str>>) -> Self {
        self.key = Key::named::<T>(qualifier);
        self
    }

    /// 指定作用域
    pub fn in_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// 单例作用域的便捷方法
    pub fn singleton(self) -> Self {
        self.in_scope(Scope::Singleton)
    }

    /// 绑定到预构建实例
    ///
    /// 实例绑定天然具备单例语义，忽略先前设定的作用域。
    pub fn to_instance(self, instance: Arc<T>) -> Result<(), InjectError> {
        let strategy = Strategy::Instance(Arc::new(instance) as SharedInstance);
        self.injector.register(Binding {
            key: self.key,
            scope: Scope::Singleton,
            strategy,
        })
    }

    /// 绑定到提供者闭包
    ///
    /// 闭包可通过传入的 resolver 解析自身依赖，嵌套解析共享外层解析栈。
    pub fn to_provider<F>(self, provider: F) -> Result<(), InjectError>
    where
        F: Fn(&mut Resolver<'_>) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        let key = self.key.clone();
        let produce: ProduceFn = Arc::new(move |resolver| match provider(resolver) {
            Ok(instance) => Ok(Arc::new(instance) as SharedInstance),
            Err(source) => Err(InjectError::production(key.clone(), source)),
        });
        self.injector.register(Binding {
            key: self.key,
            scope: self.scope,
            strategy: Strategy::Provider(produce),
        })
    }

    /// 绑定到实现类型
    ///
    /// `coerce` 在绑定处完成 `Arc<I>` 到 `Arc<T>` 的转换（trait 能力
    /// 的 unsize 转换只能在具体类型可见处表达）。
    pub fn to_implementation<I, F>(self, coerce: F) -> Result<(), InjectError>
    where
        I: Injectable,
        F: Fn(I) -> Arc<T> + Send + Sync + 'static,
    {
        let construct: ProduceFn = Arc::new(move |resolver| {
            let implementation = I::construct(resolver)?;
            Ok(Arc::new(coerce(implementation)) as SharedInstance)
        });
        self.injector.register(Binding {
            key: self.key,
            scope: self.scope,
            strategy: Strategy::Implementation {
                dependencies: I::dependencies(),
                construct,
            },
        })
    }

    /// 能力类型与实现类型一致时的便捷绑定
    pub fn to_self(self) -> Result<(), InjectError>
    where
        T: Injectable + Sized,
    {
        self.to_implementation::<T, _>(Arc::new)
    }
}
