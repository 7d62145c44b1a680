//! Concurrent resolution against one sealed container.
//!
//! These tests run on a multi-threaded runtime so first resolutions genuinely
//! race across worker threads.

use quarry::{BoxError, RegisterOptions, Registry};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Pool {
    id: u32,
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_resolution_constructs_once() {
    let constructed = Arc::new(AtomicU32::new(0));
    let counter = constructed.clone();

    let mut registry = Registry::new();
    registry
        .register_async_factory("Pool", RegisterOptions::singleton(), move |_| {
            let counter = counter.clone();
            async move {
                // suspend mid-construction so later callers find it in flight
                tokio::time::sleep(Duration::from_millis(20)).await;
                let id = counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BoxError>(Pool { id })
            }
        })
        .unwrap();
    let container = registry.seal().unwrap();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let container = container.clone();
            tokio::spawn(async move { container.resolve_as::<Pool>("Pool").await })
        })
        .collect();

    let mut pools = Vec::new();
    for handle in handles {
        pools.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert!(pools.iter().all(|p| Arc::ptr_eq(p, &pools[0])));
    assert_eq!(pools[0].id, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transients_share_singleton_dependency() {
    struct Service;
    struct Controller {
        service: Arc<Service>,
    }

    let built = Arc::new(AtomicU32::new(0));
    let counter = built.clone();

    let mut registry = Registry::new();
    registry
        .register_async_factory("Service", RegisterOptions::singleton(), move |_| {
            let counter = counter.clone();
            async move {
                tokio::task::yield_now().await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BoxError>(Service)
            }
        })
        .unwrap();
    registry
        .register_factory(
            "Controller",
            RegisterOptions::transient().depends_on(["Service"]),
            |deps| Ok(Controller { service: deps.get::<Service>(0)? }),
        )
        .unwrap();
    let container = registry.seal().unwrap();

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let container = container.clone();
            tokio::spawn(async move { container.resolve_as::<Controller>("Controller").await })
        })
        .collect();

    let mut controllers = Vec::new();
    for handle in handles {
        controllers.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(built.load(Ordering::SeqCst), 1);
    let first = &controllers[0];
    for controller in &controllers[1..] {
        assert!(!Arc::ptr_eq(controller, first));
        assert!(Arc::ptr_eq(&controller.service, &first.service));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_construction_is_retried() {
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();

    let mut registry = Registry::new();
    registry
        .register_factory("Flaky", RegisterOptions::singleton(), move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("first attempt fails".into())
            } else {
                Ok(7u32)
            }
        })
        .unwrap();
    let container = registry.seal().unwrap();

    assert!(container.resolve("Flaky").await.is_err());
    assert_eq!(container.cached_singletons(), 0);

    let a = container.resolve_as::<u32>("Flaky").await.unwrap();
    let b = container.resolve_as::<u32>("Flaky").await.unwrap();
    assert_eq!(*a, 7);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_singletons_resolve_in_parallel() {
    let mut registry = Registry::new();
    for i in 0..8 {
        registry
            .register_async_factory(format!("S{}", i), RegisterOptions::singleton(), move |_| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<_, BoxError>(i)
            })
            .unwrap();
    }
    let container = registry.seal().unwrap();

    let handles: Vec<_> = (0..8)
        .flat_map(|i| std::iter::repeat(i).take(4))
        .map(|i| {
            let container = container.clone();
            tokio::spawn(async move { container.resolve_as::<i32>(&format!("S{}", i)).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(container.cached_singletons(), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dropped_resolver_does_not_restart_construction() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    let mut registry = Registry::new();
    registry
        .register_async_factory("Pool", RegisterOptions::singleton(), move |_| {
            let counter = counter.clone();
            async move {
                let id = counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok::<_, BoxError>(Pool { id })
            }
        })
        .unwrap();
    let container = registry.seal().unwrap();

    let abandoned = tokio::time::timeout(Duration::from_millis(20), container.resolve("Pool")).await;
    assert!(abandoned.is_err());

    let pool = container.resolve_as::<Pool>("Pool").await.unwrap();
    assert_eq!(pool.id, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(container.cached_singletons(), 1);
}
