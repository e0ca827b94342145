//! 依赖注入器实现
//!
//! 提供类型安全的绑定注册与图解析，支持：
//! - 单例与非作用域两种生命周期
//! - 循环依赖检测（每次顶层解析持有独立的解析栈）
//! - 父子注入器（绑定回退查找、遮蔽与独立单例缓存）
//!
//! 注册阶段必须在并发解析开始前完成（先单写、后多读）；
//! 解析阶段可从任意线程并发调用。

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::InjectError;
use crate::inject::binding::{Binding, BindingBuilder, SharedInstance, Strategy};
use crate::inject::key::Key;
use crate::inject::module::Module;
use crate::inject::Scope;

/// 依赖注入器
///
/// 句柄可廉价克隆，克隆体共享同一份绑定表与单例缓存。
#[derive(Clone)]
pub struct Injector {
    inner: Arc<InjectorInner>,
}

struct InjectorInner {
    /// 父注入器，绑定查找未命中时回退
    parent: Option<Injector>,
    /// 绑定表
    bindings: RwLock<HashMap<Key, Binding>>,
    /// 单例缓存，每个 Key 对应一个至多初始化一次的存储单元
    singletons: DashMap<Key, Arc<OnceCell<SharedInstance>>>,
}

impl Injector {
    /// 创建空的注入器
    pub fn new() -> Self {
        Self {
            inner: Arc::new(InjectorInner {
                parent: None,
                bindings: RwLock::new(HashMap::new()),
                singletons: DashMap::new(),
            }),
        }
    }

    /// 创建子注入器
    ///
    /// 子注入器可遮蔽父级绑定而不影响父级；单例缓存相互独立，
    /// 绑定在子级的单例与父级同 Key 单例互不相同。
    pub fn child(&self) -> Injector {
        Self {
            inner: Arc::new(InjectorInner {
                parent: Some(self.clone()),
                bindings: RwLock::new(HashMap::new()),
                singletons: DashMap::new(),
            }),
        }
    }

    /// 应用一个模块的全部绑定注册
    pub fn install<M: Module + ?Sized>(&self, module: &M) -> Result<(), InjectError> {
        module.configure(self)
    }

    /// 开始声明一条绑定
    pub fn bind<T: ?Sized + Send + Sync + 'static>(&self) -> BindingBuilder<'_, T> {
        BindingBuilder::new(self)
    }

    /// 注册绑定，重复的 Key 立即失败且不产生副作用
    pub(crate) fn register(&self, binding: Binding) -> Result<(), InjectError> {
        let mut bindings = self.inner.bindings.write();
        if bindings.contains_key(&binding.key) {
            return Err(InjectError::DuplicateBinding { key: binding.key });
        }
        bindings.insert(binding.key.clone(), binding);
        Ok(())
    }

    /// 检查 Key 是否已有绑定（含父级）
    pub fn contains(&self, key: &Key) -> bool {
        if self.inner.bindings.read().contains_key(key) {
            return true;
        }
        self.inner
            .parent
            .as_ref()
            .is_some_and(|parent| parent.contains(key))
    }

    /// 检查能力类型是否已有绑定（含父级）
    pub fn is_bound<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        self.contains(&Key::of::<T>())
    }

    /// 解析能力类型对应的实例
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, InjectError> {
        self.resolve_key(Key::of::<T>())
    }

    /// 解析带限定名的能力类型
    pub fn resolve_named<T: ?Sized + Send + Sync + 'static>(
        &self,
        qualifier: &str,
    ) -> Result<Arc<T>, InjectError> {
        self.resolve_key(Key::named::<T>(qualifier.to_string()))
    }

    /// 按 Key 解析，每次调用构成一次独立的顶层解析
    pub fn resolve_key<T: ?Sized + Send + Sync + 'static>(
        &self,
        key: Key,
    ) -> Result<Arc<T>, InjectError> {
        Resolver::root(self).resolve_key(key)
    }

    /// 解析实例，Key 未绑定时返回 `Ok(None)` 而非错误
    ///
    /// 其余失败（循环依赖、生产失败等）仍按错误上报。
    pub fn try_resolve<T: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> Result<Option<Arc<T>>, InjectError> {
        self.try_resolve_key(Key::of::<T>())
    }

    /// 按 Key 的 [`Injector::try_resolve`]
    pub fn try_resolve_key<T: ?Sized + Send + Sync + 'static>(
        &self,
        key: Key,
    ) -> Result<Option<Arc<T>>, InjectError> {
        match self.resolve_key::<T>(key.clone()) {
            Ok(instance) => Ok(Some(instance)),
            Err(InjectError::UnboundKey {
                key: missing,
                chain,
            }) if chain.is_empty() && missing == key => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// 沿父链查找绑定，返回绑定与持有它的注入器
    fn find_binding(&self, key: &Key) -> Option<(Binding, Injector)> {
        if let Some(binding) = self.inner.bindings.read().get(key) {
            return Some((binding.clone(), self.clone()));
        }
        self.inner
            .parent
            .as_ref()
            .and_then(|parent| parent.find_binding(key))
    }

    /// 读取已发布的单例
    fn cached_singleton(&self, key: &Key) -> Option<SharedInstance> {
        self.inner
            .singletons
            .get(key)
            .and_then(|cell| cell.get().cloned())
    }

    /// 获取或创建 Key 对应的单例存储单元
    fn singleton_cell(&self, key: &Key) -> Arc<OnceCell<SharedInstance>> {
        self.inner
            .singletons
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

/// 单次顶层解析的上下文：注入器句柄加解析栈
///
/// 提供者闭包与实现类型构造函数通过它解析自身依赖，
/// 嵌套解析共享同一解析栈，因此跨层级的循环依赖可被发现；
/// 并发的独立解析各持一栈，互不误报。
pub struct Resolver<'a> {
    injector: &'a Injector,
    stack: Vec<Key>,
}

impl<'a> Resolver<'a> {
    fn root(injector: &'a Injector) -> Self {
        Self {
            injector,
            stack: Vec::new(),
        }
    }

    /// 本次解析所针对的注入器
    pub fn injector(&self) -> &Injector {
        self.injector
    }

    /// 解析能力类型对应的实例
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>, InjectError> {
        self.resolve_key(Key::of::<T>())
    }

    /// 解析带限定名的能力类型
    pub fn resolve_named<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        qualifier: &str,
    ) -> Result<Arc<T>, InjectError> {
        self.resolve_key(Key::named::<T>(qualifier.to_string()))
    }

    /// 按 Key 解析
    pub fn resolve_key<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        key: Key,
    ) -> Result<Arc<T>, InjectError> {
        // 注入器自解析：无需绑定即可注入注入器本身
        if key == Key::of::<Injector>() {
            let shared: SharedInstance = Arc::new(Arc::new(self.injector.clone()));
            return downcast::<T>(&shared, &key);
        }

        let Some((binding, owner)) = self.injector.find_binding(&key) else {
            return Err(InjectError::UnboundKey {
                key,
                chain: self.stack.clone(),
            });
        };

        // 单例缓存命中时直接返回，不做任何栈操作
        if binding.scope == Scope::Singleton {
            if let Some(cached) = owner.cached_singleton(&key) {
                return downcast::<T>(&cached, &key);
            }
        }

        if let Some(position) = self.stack.iter().position(|in_flight| in_flight == &key) {
            let mut cycle: Vec<Key> = self.stack[position..].to_vec();
            cycle.push(key);
            return Err(InjectError::CircularDependency { cycle });
        }

        // 入栈后无论成败都必须出栈
        self.stack.push(key.clone());
        let produced = self.produce(&key, &binding, &owner);
        self.stack.pop();

        let shared = produced?;
        downcast::<T>(&shared, &key)
    }

    fn produce(
        &mut self,
        key: &Key,
        binding: &Binding,
        owner: &Injector,
    ) -> Result<SharedInstance, InjectError> {
        match (&binding.strategy, binding.scope) {
            // 实例绑定直接返回存储值
            (Strategy::Instance(shared), _) => Ok(shared.clone()),
            // 单例经由持有绑定的注入器的存储单元发布，生产至多执行一次；
            // 竞争到同一 Key 的其它线程阻塞至胜者发布后读取缓存值
            (strategy, Scope::Singleton) => {
                let cell = owner.singleton_cell(key);
                let shared = cell.get_or_try_init(|| self.run_strategy(key, strategy))?;
                Ok(shared.clone())
            }
            (strategy, Scope::Unscoped) => self.run_strategy(key, strategy),
        }
    }

    fn run_strategy(
        &mut self,
        key: &Key,
        strategy: &Strategy,
    ) -> Result<SharedInstance, InjectError> {
        match strategy {
            Strategy::Instance(shared) => Ok(shared.clone()),
            Strategy::Provider(produce) => produce(self),
            Strategy::Implementation {
                dependencies,
                construct,
            } => {
                // 进入构造函数前核对声明的依赖元数据，缺失的依赖提前报告
                for dependency in dependencies {
                    if dependency == &Key::of::<Injector>() {
                        continue;
                    }
                    if !self.injector.contains(dependency) {
                        return Err(InjectError::UnboundKey {
                            key: dependency.clone(),
                            chain: self.stack.clone(),
                        });
                    }
                }
                construct(self)
            }
        }
    }
}

fn downcast<T: ?Sized + Send + Sync + 'static>(
    shared: &SharedInstance,
    key: &Key,
) -> Result<Arc<T>, InjectError> {
    shared
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| InjectError::TypeMismatch { key: key.clone() })
}

/// 为 trait 能力绑定实现类型的便捷宏
///
/// `Arc<I>` 到 `Arc<dyn Capability>` 的 unsize 转换在宏展开处完成。
#[macro_export]
macro_rules! bind_implementation {
    ($injector:expr, $capability:ty, $implementation:ty) => {
        $injector
            .bind::<$capability>()
            .to_implementation::<$implementation, _>(|implementation| {
                ::std::sync::Arc::new(implementation)
            })
    };
    ($injector:expr, $capability:ty, $implementation:ty, singleton) => {
        $injector
            .bind::<$capability>()
            .singleton()
            .to_implementation::<$implementation, _>(|implementation| {
                ::std::sync::Arc::new(implementation)
            })
    };
}
