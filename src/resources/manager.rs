// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::config::{ResourceManagerConfig, UnderflowPolicy};
use crate::error::{ResourceError, Result};
use crate::resources::{
    DropUnloader, ResourceGuid, ResourceHandle, ResourceLoader, ResourcePayload, ResourceStats,
    ResourceStore, ResourceType, ResourceUnloader, SlotKey, EMPTY_GUID,
};

/// Everything guarded by the manager's lock
pub(crate) struct ManagerState {
    pub(crate) store: ResourceStore,
    pub(crate) stats: ResourceStats,
}

/// State shared by a manager and every handle it issued
pub(crate) struct ManagerShared {
    pub(crate) state: Mutex<ManagerState>,
    pub(crate) config: ResourceManagerConfig,
    loader: Box<dyn ResourceLoader>,
    unloader: Box<dyn ResourceUnloader>,
}

impl ManagerShared {
    /// Count one more reference to `key` for a handle of `generation`.
    ///
    /// Bookkeeping violations go through the configured [`UnderflowPolicy`].
    pub(crate) fn retain_handle(&self, key: SlotKey, generation: u16) {
        let retained = self.state.lock().store.retain(key, generation);
        match retained {
            Ok(count) => {
                trace!(resource_type = %key.resource_type, slot = key.slot, count, "handle cloned");
            }
            Err(err) => self.on_violation(err),
        }
    }

    /// Drop one reference to `key`, freeing the slot on the last one.
    ///
    /// A handle whose slot has moved on to a newer occupant leaves that
    /// occupant's count alone. The unloader runs after the lock is released
    /// so that a payload may itself own handles.
    pub(crate) fn release_handle(&self, key: SlotKey, generation: u16) {
        let mut state = self.state.lock();
        let remaining = match state.store.release(key, generation) {
            Ok(remaining) => remaining,
            Err(err) => {
                drop(state);
                self.on_violation(err);
                return;
            }
        };
        if remaining > 0 {
            trace!(resource_type = %key.resource_type, slot = key.slot, remaining, "handle released");
            return;
        }

        let removed = state.store.remove(key.resource_type, key.slot);
        if removed.is_ok() {
            state.stats.unloads += 1;
        }
        drop(state);

        match removed {
            Ok((guid, payload)) => {
                debug!(resource_type = %key.resource_type, guid, slot = key.slot, "unloading resource");
                self.unloader.unload(key.resource_type, guid, payload);
            }
            Err(err) => fail_fast(err),
        }
    }

    fn on_violation(&self, err: ResourceError) {
        match self.config.underflow_policy {
            UnderflowPolicy::Panic => fail_fast(err),
            UnderflowPolicy::SaturateAndLog => {
                error!(error = %err, "ref count left untouched");
            }
        }
    }
}

// Never panic while already unwinding; that would abort the process.
fn fail_fast(err: ResourceError) {
    if std::thread::panicking() {
        error!(error = %err, "resource invariant violated during unwind");
    } else {
        panic!("{err}");
    }
}

/// Issues ref-counted handles to loaded resources.
///
/// Looks a `(type, guid)` pair up in its [`ResourceStore`], calls the loader
/// on a miss, and returns a [`ResourceHandle`]. When the last handle to a
/// slot drops, the slot is cleared and the unloader receives the payload.
///
/// Cloning the manager is cheap; clones share the same store.
#[derive(Clone)]
pub struct ResourceManager {
    shared: Arc<ManagerShared>,
}

impl ResourceManager {
    /// Manager with default sizing whose unloader just drops payloads
    pub fn new(loader: impl ResourceLoader + 'static) -> Self {
        Self::build(ResourceManagerConfig::default(), loader, DropUnloader)
    }

    pub fn with_unloader(
        loader: impl ResourceLoader + 'static,
        unloader: impl ResourceUnloader + 'static,
    ) -> Self {
        Self::build(ResourceManagerConfig::default(), loader, unloader)
    }

    pub fn with_config(
        config: ResourceManagerConfig,
        loader: impl ResourceLoader + 'static,
        unloader: impl ResourceUnloader + 'static,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, loader, unloader))
    }

    fn build(
        config: ResourceManagerConfig,
        loader: impl ResourceLoader + 'static,
        unloader: impl ResourceUnloader + 'static,
    ) -> Self {
        let store = ResourceStore::new(|ty| config.capacity_for(ty), config.validate_generations);
        Self {
            shared: Arc::new(ManagerShared {
                state: Mutex::new(ManagerState {
                    store,
                    stats: ResourceStats::new(),
                }),
                config,
                loader: Box::new(loader),
                unloader: Box::new(unloader),
            }),
        }
    }

    /// Get a handle to `(resource_type, guid)`, loading it on first use.
    ///
    /// A full table fails with [`ResourceError::CapacityExhausted`] before
    /// the loader is called. Loader errors come back as
    /// [`ResourceError::LoadFailure`] and are not retried.
    pub fn get_handle(&self, resource_type: ResourceType, guid: ResourceGuid) -> Result<ResourceHandle> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("resource_manager.get_handle", resource_type = %resource_type, guid).entered();

        if guid == EMPTY_GUID {
            return Err(ResourceError::InvalidGuid);
        }

        {
            let mut state = self.shared.state.lock();
            if let Some(slot) = state.store.resolve(resource_type, guid)? {
                state.stats.cache_hits += 1;
                trace!(%resource_type, guid, slot, "resource cache hit");
                return ResourceHandle::new(
                    Arc::clone(&self.shared),
                    &mut state.store,
                    SlotKey::new(resource_type, slot),
                );
            }

            let table = state.store.table(resource_type)?;
            if table.is_full() {
                let err = ResourceError::CapacityExhausted {
                    resource_type,
                    capacity: table.capacity(),
                };
                drop(state);
                warn!(%resource_type, guid, error = %err, "resource store full");
                return Err(err);
            }
            state.stats.cache_misses += 1;
        }

        let payload = match self.shared.loader.load(resource_type, guid) {
            Ok(payload) => payload,
            Err(err) => {
                self.shared.state.lock().stats.load_failures += 1;
                warn!(%resource_type, guid, error = %err, "resource load failed");
                return Err(ResourceError::LoadFailure {
                    resource_type,
                    guid,
                    reason: err.0,
                });
            }
        };

        let mut state = self.shared.state.lock();

        // Another caller may have stored this guid while the loader ran.
        if let Some(slot) = state.store.resolve(resource_type, guid)? {
            state.stats.discarded_loads += 1;
            let handle = ResourceHandle::new(
                Arc::clone(&self.shared),
                &mut state.store,
                SlotKey::new(resource_type, slot),
            );
            drop(state);
            debug!(%resource_type, guid, slot, "discarding duplicate load");
            self.shared.unloader.unload(resource_type, guid, payload);
            return handle;
        }

        match state.store.insert(resource_type, guid, Arc::clone(&payload)) {
            Ok(slot) => {
                state.stats.loads += 1;
                debug!(%resource_type, guid, slot, "resource loaded");
                ResourceHandle::new(
                    Arc::clone(&self.shared),
                    &mut state.store,
                    SlotKey::new(resource_type, slot),
                )
            }
            Err(err) => {
                state.stats.discarded_loads += 1;
                drop(state);
                warn!(%resource_type, guid, error = %err, "resource store rejected payload");
                self.shared.unloader.unload(resource_type, guid, payload);
                Err(err)
            }
        }
    }

    /// [`get_handle`](Self::get_handle) with the type given by its
    /// [`type_hash`](ResourceType::type_hash), as stored in asset metadata
    pub fn get_handle_by_type_hash(&self, type_hash: u32, guid: ResourceGuid) -> Result<ResourceHandle> {
        self.get_handle(ResourceType::from_hash(type_hash)?, guid)
    }

    /// Swap the payload behind `handle`, returning the previous one.
    ///
    /// Slot, GUID and generation are unchanged, so every live handle sees the
    /// new data.
    pub fn set_resource_data(&self, handle: &ResourceHandle, payload: ResourcePayload) -> Result<ResourcePayload> {
        if !self.owns(handle) {
            return Err(ResourceError::ForeignHandle);
        }
        let key = handle.key();
        let mut state = self.shared.state.lock();
        if self.shared.config.validate_generations {
            state.store.check_generation(key, handle.generation())?;
        }
        let previous = state.store.set_payload(key.resource_type, key.slot, payload)?;
        debug!(resource_type = %key.resource_type, slot = key.slot, "resource data replaced");
        Ok(previous)
    }

    /// Whether `handle` was issued by this manager (or a clone of it)
    pub fn owns(&self, handle: &ResourceHandle) -> bool {
        Arc::ptr_eq(&self.shared, handle.shared())
    }

    pub fn is_loaded(&self, resource_type: ResourceType, guid: ResourceGuid) -> bool {
        matches!(self.shared.state.lock().store.resolve(resource_type, guid), Ok(Some(_)))
    }

    /// Live handles to `(resource_type, guid)`; 0 when not loaded
    pub fn ref_count(&self, resource_type: ResourceType, guid: ResourceGuid) -> u32 {
        let state = self.shared.state.lock();
        match state.store.resolve(resource_type, guid) {
            Ok(Some(slot)) => state.store.ref_count(SlotKey::new(resource_type, slot)),
            _ => 0,
        }
    }

    /// Occupied slots of one type
    pub fn loaded_count(&self, resource_type: ResourceType) -> usize {
        self.shared
            .state
            .lock()
            .store
            .table(resource_type)
            .map(|table| table.len())
            .unwrap_or(0)
    }

    pub fn total_loaded(&self) -> usize {
        self.shared.state.lock().store.total_len()
    }

    pub fn capacity(&self, resource_type: ResourceType) -> usize {
        self.shared.config.capacity_for(resource_type)
    }

    pub fn stats(&self) -> ResourceStats {
        self.shared.state.lock().stats.clone()
    }

    pub fn config(&self) -> &ResourceManagerConfig {
        &self.shared.config
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, ManagerState> {
        self.shared.state.lock()
    }
}
