//! 注入器解析路径的性能基准测试

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use svckit::{InjectError, Injectable, Injector, Key, Resolver};

/// 测试用的简单服务
#[derive(Clone)]
struct SimpleService {
    value: i32,
}

struct LayerOne {
    service: Arc<SimpleService>,
}

struct LayerTwo {
    layer: Arc<LayerOne>,
}

struct LayerThree {
    layer: Arc<LayerTwo>,
}

impl Injectable for LayerOne {
    fn dependencies() -> Vec<Key> {
        vec![Key::of::<SimpleService>()]
    }

    fn construct(resolver: &mut Resolver<'_>) -> Result<Self, InjectError> {
        Ok(Self {
            service: resolver.resolve::<SimpleService>()?,
        })
    }
}

impl Injectable for LayerTwo {
    fn dependencies() -> Vec<Key> {
        vec![Key::of::<LayerOne>()]
    }

    fn construct(resolver: &mut Resolver<'_>) -> Result<Self, InjectError> {
        Ok(Self {
            layer: resolver.resolve::<LayerOne>()?,
        })
    }
}

impl Injectable for LayerThree {
    fn dependencies() -> Vec<Key> {
        vec![Key::of::<LayerTwo>()]
    }

    fn construct(resolver: &mut Resolver<'_>) -> Result<Self, InjectError> {
        Ok(Self {
            layer: resolver.resolve::<LayerTwo>()?,
        })
    }
}

/// 基准测试：单例缓存命中路径
fn bench_singleton_hit(c: &mut Criterion) {
    let injector = Injector::new();
    injector
        .bind::<SimpleService>()
        .singleton()
        .to_provider(|_| Ok(Arc::new(SimpleService { value: 42 })))
        .unwrap();
    // 预热缓存
    let _ = injector.resolve::<SimpleService>().unwrap();

    c.bench_function("singleton_hit", |b| {
        b.iter(|| black_box(injector.resolve::<SimpleService>().unwrap()))
    });
}

/// 基准测试：非作用域解析（每次调用提供者）
fn bench_unscoped_resolution(c: &mut Criterion) {
    let injector = Injector::new();
    injector
        .bind::<SimpleService>()
        .to_provider(|_| Ok(Arc::new(SimpleService { value: 42 })))
        .unwrap();

    c.bench_function("unscoped_resolution", |b| {
        b.iter(|| black_box(injector.resolve::<SimpleService>().unwrap()))
    });
}

/// 基准测试：多层依赖图的非作用域解析
fn bench_deep_graph_resolution(c: &mut Criterion) {
    let injector = Injector::new();
    injector
        .bind::<SimpleService>()
        .to_provider(|_| Ok(Arc::new(SimpleService { value: 42 })))
        .unwrap();
    injector.bind::<LayerOne>().to_self().unwrap();
    injector.bind::<LayerTwo>().to_self().unwrap();
    injector.bind::<LayerThree>().to_self().unwrap();

    c.bench_function("deep_graph_resolution", |b| {
        b.iter(|| {
            let resolved = injector.resolve::<LayerThree>().unwrap();
            black_box(resolved.layer.layer.service.value)
        })
    });
}

/// 基准测试：经子注入器回退到父级绑定
fn bench_child_fallthrough(c: &mut Criterion) {
    let parent = Injector::new();
    parent
        .bind::<SimpleService>()
        .singleton()
        .to_provider(|_| Ok(Arc::new(SimpleService { value: 42 })))
        .unwrap();
    let child = parent.child();
    let _ = child.resolve::<SimpleService>().unwrap();

    c.bench_function("child_fallthrough", |b| {
        b.iter(|| black_box(child.resolve::<SimpleService>().unwrap()))
    });
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_unscoped_resolution,
    bench_deep_graph_resolution,
    bench_child_fallthrough
);
criterion_main!(benches);
