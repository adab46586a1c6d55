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

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::trace;

use crate::error::{ResourceError, Result};
use crate::resources::manager::ManagerShared;
use crate::resources::{ResourceGuid, ResourcePayload, ResourceStore, ResourceType, SlotIndex, SlotKey};

/// Shared, ref-counted reference to one occupied slot.
///
/// Only a [`ResourceManager`](crate::ResourceManager) can create one. Every
/// clone counts as a live reference; dropping the last one frees the slot and
/// hands its payload to the unloader. Moving a handle does not touch the
/// count.
pub struct ResourceHandle {
    shared: Arc<ManagerShared>,
    key: SlotKey,
    generation: u16,
}

impl ResourceHandle {
    /// Count a new reference to `key` and wrap it.
    ///
    /// Takes the already-locked store so the lookup that produced `key` and
    /// the increment happen in one critical section.
    pub(crate) fn new(shared: Arc<ManagerShared>, store: &mut ResourceStore, key: SlotKey) -> Result<Self> {
        let generation = store.generation(key.resource_type, key.slot)?;
        let count = store.retain(key, generation)?;
        trace!(resource_type = %key.resource_type, slot = key.slot, count, "handle created");
        Ok(Self {
            shared,
            key,
            generation,
        })
    }

    pub fn resource_type(&self) -> ResourceType {
        self.key.resource_type
    }

    pub fn slot(&self) -> SlotIndex {
        self.key.slot
    }

    /// Generation of the slot occupant this handle was issued for
    pub fn generation(&self) -> u16 {
        self.generation
    }

    pub fn key(&self) -> SlotKey {
        self.key
    }

    /// The loaded payload.
    ///
    /// With generation validation on, a handle whose slot was recycled fails
    /// with [`ResourceError::StaleHandle`] instead of returning the new
    /// occupant's data.
    pub fn get_data(&self) -> Result<ResourcePayload> {
        let state = self.shared.state.lock();
        if self.shared.config.validate_generations {
            state.store.check_generation(self.key, self.generation)?;
        }
        let payload = state.store.payload(self.key.resource_type, self.key.slot)?;
        Ok(Arc::clone(payload))
    }

    /// [`get_data`](Self::get_data) downcast to the loader's concrete type
    pub fn get_data_as<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.get_data()?
            .downcast::<T>()
            .map_err(|_| ResourceError::PayloadTypeMismatch {
                resource_type: self.key.resource_type,
                expected: std::any::type_name::<T>(),
            })
    }

    /// GUID of the asset behind this handle
    pub fn guid(&self) -> Result<ResourceGuid> {
        let state = self.shared.state.lock();
        if self.shared.config.validate_generations {
            state.store.check_generation(self.key, self.generation)?;
        }
        state.store.guid(self.key.resource_type, self.key.slot)
    }

    /// Live handles on this slot, this one included
    pub fn ref_count(&self) -> u32 {
        self.shared.state.lock().store.ref_count(self.key)
    }

    /// Whether the slot still holds the occupant this handle was issued for
    pub fn is_valid(&self) -> bool {
        self.shared
            .state
            .lock()
            .store
            .check_generation(self.key, self.generation)
            .is_ok()
    }

    pub(crate) fn shared(&self) -> &Arc<ManagerShared> {
        &self.shared
    }
}

impl Clone for ResourceHandle {
    fn clone(&self) -> Self {
        self.shared.retain_handle(self.key, self.generation);
        Self {
            shared: Arc::clone(&self.shared),
            key: self.key,
            generation: self.generation,
        }
    }

    /// Assignment: the new target is retained before the old one is
    /// released, each exactly once.
    fn clone_from(&mut self, source: &Self) {
        if *self == *source {
            return;
        }
        *self = source.clone();
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        self.shared.release_handle(self.key, self.generation);
    }
}

impl PartialEq for ResourceHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
            && self.key == other.key
            && self.generation == other.generation
    }
}

impl Eq for ResourceHandle {}

impl Hash for ResourceHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.generation.hash(state);
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("resource_type", &self.key.resource_type)
            .field("slot", &self.key.slot)
            .field("generation", &self.generation)
            .finish()
    }
}
