//! Service registry tests.
//!
//! These tests build registries from hand-written fakes, so they need no
//! database or Redis connection.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use serde_json::json;

use digger_core::errors::AppError;
use digger_core::registry::{ServiceName, ServiceRegistry};
use digger_core::services::{CacheService, InMemoryCache, Service, TaskService};

/// Stand-in task service
struct FakeTaskService;

impl Service for FakeTaskService {
    fn name(&self) -> ServiceName {
        ServiceName::Task
    }
}

impl TaskService for FakeTaskService {}

fn counting_cache(allocations: Arc<AtomicUsize>) -> ServiceRegistry {
    ServiceRegistry::builder()
        .cache(move || {
            allocations.fetch_add(1, Ordering::SeqCst);
            // Widen the window in which racing callers find the slot empty.
            thread::sleep(Duration::from_millis(10));
            Ok(Arc::new(InMemoryCache::new()) as Arc<dyn CacheService>)
        })
        .build()
}

#[test]
fn test_cold_cache_accessor_allocates_once_for_100_callers() {
    let allocations = Arc::new(AtomicUsize::new(0));
    let registry = counting_cache(allocations.clone());
    let barrier = Barrier::new(100);

    let handles: Vec<Arc<dyn CacheService>> = thread::scope(|s| {
        let workers: Vec<_> = (0..100)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    registry.cache().unwrap()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(allocations.load(Ordering::SeqCst), 1);
    assert_eq!(handles.len(), 100);
    assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));

    // Same map behind every handle.
    handles[17].set("proxy:last", json!("10.0.0.8:3128"));
    assert_eq!(handles[83].get("proxy:last"), Some(json!("10.0.0.8:3128")));
}

#[test]
fn test_unrelated_services_construct_concurrently() {
    // Both factories wait for each other; a registry-wide construction lock
    // would deadlock here.
    let rendezvous = Arc::new(Barrier::new(2));
    let cache_gate = rendezvous.clone();
    let task_gate = rendezvous.clone();

    let registry = ServiceRegistry::builder()
        .cache(move || {
            cache_gate.wait();
            Ok(Arc::new(InMemoryCache::new()) as Arc<dyn CacheService>)
        })
        .task(move || {
            task_gate.wait();
            Ok(Arc::new(FakeTaskService) as Arc<dyn TaskService>)
        })
        .build();

    thread::scope(|s| {
        let cache = s.spawn(|| registry.cache().unwrap());
        let task = s.spawn(|| registry.task().unwrap());
        cache.join().unwrap();
        assert_eq!(task.join().unwrap().name(), ServiceName::Task);
    });

    assert!(registry.is_initialized(ServiceName::Cache));
    assert!(registry.is_initialized(ServiceName::Task));
}

#[test]
fn test_cached_service_readable_while_another_builds() {
    let (started_tx, started_rx) = std::sync::mpsc::channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let release_rx = std::sync::Mutex::new(release_rx);

    let registry = ServiceRegistry::builder()
        .cache(|| Ok(Arc::new(InMemoryCache::new()) as Arc<dyn CacheService>))
        .task(move || {
            started_tx.send(()).ok();
            release_rx.lock().unwrap().recv().ok();
            Ok(Arc::new(FakeTaskService) as Arc<dyn TaskService>)
        })
        .build();

    let warm = registry.cache().unwrap();

    thread::scope(|s| {
        let slow = s.spawn(|| registry.task().unwrap());
        started_rx.recv().unwrap();

        // Task construction is parked; the built cache slot still answers.
        let again = registry.cache().unwrap();
        assert!(Arc::ptr_eq(&warm, &again));
        assert!(!registry.is_initialized(ServiceName::Task));

        release_tx.send(()).unwrap();
        slow.join().unwrap();
    });

    assert!(registry.is_initialized(ServiceName::Task));
}

#[test]
fn test_failed_construction_is_not_cached() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let registry = ServiceRegistry::builder()
        .task(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::internal("task table not migrated"))
            } else {
                Ok(Arc::new(FakeTaskService) as Arc<dyn TaskService>)
            }
        })
        .build();

    assert!(matches!(registry.task(), Err(AppError::Internal(_))));
    assert!(!registry.is_initialized(ServiceName::Task));

    let first = registry.task().unwrap();
    let second = registry.task().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_panicking_factory_is_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let registry = ServiceRegistry::builder()
        .cache(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("cache warm-up hit a corrupt snapshot");
            }
            Ok(Arc::new(InMemoryCache::new()) as Arc<dyn CacheService>)
        })
        .build();

    let first = panic::catch_unwind(AssertUnwindSafe(|| registry.cache()));
    assert!(first.is_err());
    assert!(!registry.is_initialized(ServiceName::Cache));

    let a = registry.cache().unwrap();
    let b = registry.cache().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unregistered_service_fails_with_construction_error() {
    let registry = ServiceRegistry::builder().build();

    for name in ServiceName::ALL {
        assert!(!registry.is_initialized(name));
    }

    match registry.proxy() {
        Err(AppError::Construction(msg)) => assert!(msg.contains("proxy")),
        Err(other) => panic!("expected a construction error, got {:?}", other),
        Ok(_) => panic!("proxy has no factory"),
    }
    assert!(matches!(registry.warm_up(), Err(AppError::Construction(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_accessor_from_many_tasks() {
    let allocations = Arc::new(AtomicUsize::new(0));
    let registry = Arc::new(counting_cache(allocations.clone()));

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let registry = registry.clone();
            tokio::task::spawn_blocking(move || registry.cache().unwrap())
        })
        .collect();

    let mut handles = Vec::new();
    for task in tasks {
        handles.push(task.await.unwrap());
    }

    assert_eq!(allocations.load(Ordering::SeqCst), 1);
    assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
}
