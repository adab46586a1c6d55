use resource_handles::{
    LoadError, ResourceGuid, ResourceHandle, ResourceManager, ResourceManagerConfig,
    ResourcePayload, ResourceType, StoreInspector,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const THREADS: usize = 8;
const ROUNDS: usize = 500;

struct Counters {
    loads: AtomicUsize,
    unloads: AtomicUsize,
}

fn counting_manager(loader_delay: Option<Duration>) -> (ResourceManager, Arc<Counters>) {
    let counters = Arc::new(Counters {
        loads: AtomicUsize::new(0),
        unloads: AtomicUsize::new(0),
    });
    let on_load = Arc::clone(&counters);
    let on_unload = Arc::clone(&counters);

    let manager = ResourceManager::with_config(
        ResourceManagerConfig::new().with_slot_capacity(64),
        move |_: ResourceType, guid: ResourceGuid| -> Result<ResourcePayload, LoadError> {
            on_load.loads.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = loader_delay {
                thread::sleep(delay);
            }
            Ok(Arc::new(guid))
        },
        move |_: ResourceType, _: ResourceGuid, _: ResourcePayload| {
            on_unload.unloads.fetch_add(1, Ordering::SeqCst);
        },
    )
    .unwrap();

    (manager, counters)
}

#[test]
fn test_parallel_clone_drop_keeps_count() {
    let (manager, counters) = counting_manager(None);
    let root = manager.get_handle(ResourceType::TextureAlbedo, 9).unwrap();

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..ROUNDS {
                    let copies: Vec<ResourceHandle> = (0..4).map(|_| root.clone()).collect();
                    assert!(copies.iter().all(|h| *h.get_data_as::<u32>().unwrap() == 9));
                }
            });
        }
    });

    assert_eq!(root.ref_count(), 1);
    assert_eq!(counters.loads.load(Ordering::SeqCst), 1);
    assert_eq!(counters.unloads.load(Ordering::SeqCst), 0);

    drop(root);
    assert_eq!(counters.unloads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_parallel_requests_share_one_slot() {
    let (manager, counters) = counting_manager(Some(Duration::from_millis(2)));

    let handles: Vec<ResourceHandle> = thread::scope(|s| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| s.spawn(|| manager.get_handle(ResourceType::Scene, 77).unwrap()))
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    // Racing loads may run the loader more than once, but only one result
    // is stored and the rest are handed back to the unloader.
    let stats = manager.stats();
    let loads = counters.loads.load(Ordering::SeqCst);
    assert_eq!(stats.loads, 1);
    assert_eq!(stats.discarded_loads as usize, loads - 1);
    assert_eq!(counters.unloads.load(Ordering::SeqCst), loads - 1);

    let slot = handles[0].slot();
    assert!(handles.iter().all(|h| h.slot() == slot));
    assert_eq!(manager.ref_count(ResourceType::Scene, 77), THREADS as u32);
    assert_eq!(manager.loaded_count(ResourceType::Scene), 1);

    drop(handles);
    assert_eq!(counters.unloads.load(Ordering::SeqCst), loads);
    assert_eq!(manager.total_loaded(), 0);
}

#[test]
fn test_parallel_churn_balances() {
    let (manager, counters) = counting_manager(None);

    thread::scope(|s| {
        for worker in 0..THREADS {
            let manager = &manager;
            s.spawn(move || {
                for round in 0..ROUNDS {
                    let guid = ((worker + round) % 16 + 1) as ResourceGuid;
                    let handle = manager.get_handle(ResourceType::Audio, guid).unwrap();
                    let copy = handle.clone();
                    assert_eq!(*copy.get_data_as::<u32>().unwrap(), guid);
                    assert_eq!(copy.guid().unwrap(), guid);
                }
            });
        }
    });

    assert_eq!(manager.total_loaded(), 0);
    assert!(StoreInspector::slot_summary(&manager).is_empty());

    let stats = manager.stats();
    assert_eq!(stats.loads, stats.unloads);
    assert_eq!(
        counters.loads.load(Ordering::SeqCst),
        counters.unloads.load(Ordering::SeqCst)
    );
}

#[test]
fn test_handles_cross_threads() {
    let (manager, counters) = counting_manager(None);
    let handle = manager.get_handle(ResourceType::FontTtf, 3).unwrap();

    let worker = thread::spawn(move || {
        let copy = handle.clone();
        drop(handle);
        copy.ref_count()
    });

    assert_eq!(worker.join().unwrap(), 1);
    assert_eq!(counters.unloads.load(Ordering::SeqCst), 1);
    assert!(!manager.is_loaded(ResourceType::FontTtf, 3));
}
