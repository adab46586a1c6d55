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

use ahash::AHashMap;

use crate::error::{ResourceError, Result};
use crate::resources::slot::{ResourceGuid, ResourcePayload, SlotIndex, SlotKey, SlotTable};
use crate::resources::ResourceType;

/// One [`SlotTable`] per [`ResourceType`] plus the live-handle count of every
/// occupied slot.
///
/// Does not manage payload lifetime: removing an entry hands the payload
/// back to the caller.
pub struct ResourceStore {
    tables: Vec<SlotTable>,
    ref_counts: AHashMap<SlotKey, u32>,
}

impl ResourceStore {
    /// Build a store with a table per type. `capacity_for` gives each
    /// type's slot count.
    pub fn new(capacity_for: impl Fn(ResourceType) -> usize, check_duplicates: bool) -> Self {
        let tables = ResourceType::ALL
            .iter()
            .map(|&ty| SlotTable::new(ty, capacity_for(ty), check_duplicates))
            .collect();
        Self {
            tables,
            ref_counts: AHashMap::new(),
        }
    }

    /// Store with the same capacity for every type
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(|_| capacity, true)
    }

    pub fn table(&self, resource_type: ResourceType) -> Result<&SlotTable> {
        let index = resource_type.index();
        self.tables
            .get(index)
            .ok_or(ResourceError::InvalidResourceType(index as u32))
    }

    fn table_mut(&mut self, resource_type: ResourceType) -> Result<&mut SlotTable> {
        let index = resource_type.index();
        self.tables
            .get_mut(index)
            .ok_or(ResourceError::InvalidResourceType(index as u32))
    }

    pub fn resolve(&self, resource_type: ResourceType, guid: ResourceGuid) -> Result<Option<SlotIndex>> {
        Ok(self.table(resource_type)?.find_slot_by_guid(guid))
    }

    pub fn insert(
        &mut self,
        resource_type: ResourceType,
        guid: ResourceGuid,
        payload: ResourcePayload,
    ) -> Result<SlotIndex> {
        self.table_mut(resource_type)?.allocate_slot(guid, payload)
    }

    /// Clear a slot and forget its ref count
    pub fn remove(&mut self, resource_type: ResourceType, slot: SlotIndex) -> Result<(ResourceGuid, ResourcePayload)> {
        let released = self.table_mut(resource_type)?.release_slot(slot)?;
        self.ref_counts.remove(&SlotKey::new(resource_type, slot));
        Ok(released)
    }

    pub fn payload(&self, resource_type: ResourceType, slot: SlotIndex) -> Result<&ResourcePayload> {
        self.table(resource_type)?.get_payload(slot)
    }

    pub fn set_payload(
        &mut self,
        resource_type: ResourceType,
        slot: SlotIndex,
        payload: ResourcePayload,
    ) -> Result<ResourcePayload> {
        self.table_mut(resource_type)?.set_payload(slot, payload)
    }

    pub fn guid(&self, resource_type: ResourceType, slot: SlotIndex) -> Result<ResourceGuid> {
        self.table(resource_type)?.get_guid(slot)
    }

    pub fn generation(&self, resource_type: ResourceType, slot: SlotIndex) -> Result<u16> {
        self.table(resource_type)?.get_generation(slot)
    }

    /// Fails with [`ResourceError::StaleHandle`] unless the slot is occupied
    /// by the tenant that was issued `generation`.
    pub fn check_generation(&self, key: SlotKey, generation: u16) -> Result<()> {
        let table = self.table(key.resource_type)?;
        let found = table.get_generation(key.slot)?;
        if found != generation || !table.is_occupied(key.slot) {
            return Err(ResourceError::StaleHandle {
                resource_type: key.resource_type,
                slot: key.slot,
                expected: generation,
                found,
            });
        }
        Ok(())
    }

    /// Count one more live handle on an occupied slot.
    ///
    /// `generation` is the one the handle was issued for; a handle from a
    /// previous occupant gets [`ResourceError::StaleHandle`] and the current
    /// occupant's count is left alone.
    pub fn retain(&mut self, key: SlotKey, generation: u16) -> Result<u32> {
        if !self.table(key.resource_type)?.is_occupied(key.slot) {
            return Err(ResourceError::SlotCorruption {
                resource_type: key.resource_type,
                slot: key.slot,
                reason: "retaining an unoccupied slot",
            });
        }
        self.check_tenant(key, generation)?;
        let count = self.ref_counts.entry(key).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    /// Count one fewer live handle, returning what remains.
    ///
    /// The entry is left at zero; the caller removes the slot. Same
    /// generation rule as [`retain`](Self::retain).
    pub fn release(&mut self, key: SlotKey, generation: u16) -> Result<u32> {
        self.check_tenant(key, generation)?;
        match self.ref_counts.get_mut(&key) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Ok(*count)
            }
            _ => Err(ResourceError::RefCountUnderflow {
                resource_type: key.resource_type,
                slot: key.slot,
            }),
        }
    }

    // Refcount changes must target the occupant the handle was issued for.
    fn check_tenant(&self, key: SlotKey, generation: u16) -> Result<()> {
        let found = self.generation(key.resource_type, key.slot)?;
        if found != generation {
            return Err(ResourceError::StaleHandle {
                resource_type: key.resource_type,
                slot: key.slot,
                expected: generation,
                found,
            });
        }
        Ok(())
    }

    pub fn ref_count(&self, key: SlotKey) -> u32 {
        self.ref_counts.get(&key).copied().unwrap_or(0)
    }

    /// Occupied slots across all types
    pub fn total_len(&self) -> usize {
        self.tables.iter().map(SlotTable::len).sum()
    }

    pub fn tables(&self) -> impl Iterator<Item = &SlotTable> {
        self.tables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn payload(value: &'static str) -> ResourcePayload {
        Arc::new(value)
    }

    #[test]
    fn test_routes_by_type() {
        let mut store = ResourceStore::with_capacity(8);
        let a = store.insert(ResourceType::Audio, 42, payload("a")).unwrap();
        let b = store.insert(ResourceType::FontTtf, 42, payload("b")).unwrap();
        assert_eq!(a, 0);
        assert_eq!(b, 0);

        assert_eq!(store.resolve(ResourceType::Audio, 42).unwrap(), Some(0));
        assert_eq!(store.resolve(ResourceType::Scene, 42).unwrap(), None);
        let data = store.payload(ResourceType::FontTtf, b).unwrap().clone();
        assert_eq!(*data.downcast::<&'static str>().unwrap(), "b");
        assert_eq!(store.total_len(), 2);
    }

    #[test]
    fn test_per_type_capacity() {
        let mut store = ResourceStore::new(
            |ty| if ty == ResourceType::Scene { 1 } else { 4 },
            true,
        );
        assert_eq!(store.table(ResourceType::Scene).unwrap().capacity(), 1);
        assert_eq!(store.table(ResourceType::Audio).unwrap().capacity(), 4);

        store.insert(ResourceType::Scene, 1, payload("s")).unwrap();
        assert!(matches!(
            store.insert(ResourceType::Scene, 2, payload("t")),
            Err(ResourceError::CapacityExhausted { capacity: 1, .. })
        ));
    }

    #[test]
    fn test_ref_counting() {
        let mut store = ResourceStore::with_capacity(4);
        let slot = store.insert(ResourceType::Audio, 9, payload("x")).unwrap();
        let key = SlotKey::new(ResourceType::Audio, slot);
        let generation = store.generation(ResourceType::Audio, slot).unwrap();

        assert_eq!(store.retain(key, generation).unwrap(), 1);
        assert_eq!(store.retain(key, generation).unwrap(), 2);
        assert_eq!(store.release(key, generation).unwrap(), 1);
        assert_eq!(store.release(key, generation).unwrap(), 0);
        assert_eq!(store.ref_count(key), 0);

        assert_eq!(
            store.release(key, generation),
            Err(ResourceError::RefCountUnderflow {
                resource_type: ResourceType::Audio,
                slot,
            })
        );
        assert_eq!(store.ref_count(key), 0);
    }

    #[test]
    fn test_retain_unoccupied_fails() {
        let mut store = ResourceStore::with_capacity(4);
        let key = SlotKey::new(ResourceType::Audio, 3);
        assert!(matches!(
            store.retain(key, 0),
            Err(ResourceError::SlotCorruption { .. })
        ));
    }

    #[test]
    fn test_remove_forgets_ref_count() {
        let mut store = ResourceStore::with_capacity(4);
        let slot = store.insert(ResourceType::Scene, 5, payload("scene")).unwrap();
        let key = SlotKey::new(ResourceType::Scene, slot);
        let generation = store.generation(ResourceType::Scene, slot).unwrap();
        store.retain(key, generation).unwrap();
        store.release(key, generation).unwrap();

        let (guid, _) = store.remove(ResourceType::Scene, slot).unwrap();
        assert_eq!(guid, 5);
        assert_eq!(store.ref_count(key), 0);
        assert!(matches!(
            store.release(key, generation),
            Err(ResourceError::RefCountUnderflow { .. })
        ));
        assert!(matches!(
            store.remove(ResourceType::Scene, slot),
            Err(ResourceError::SlotCorruption { .. })
        ));
    }

    #[test]
    fn test_previous_tenant_cannot_touch_ref_count() {
        let mut store = ResourceStore::with_capacity(4);
        let slot = store.insert(ResourceType::Audio, 1, payload("old")).unwrap();
        let key = SlotKey::new(ResourceType::Audio, slot);
        let old = store.generation(ResourceType::Audio, slot).unwrap();
        store.retain(key, old).unwrap();
        store.remove(ResourceType::Audio, slot).unwrap();

        assert_eq!(store.insert(ResourceType::Audio, 2, payload("new")).unwrap(), slot);
        let new = store.generation(ResourceType::Audio, slot).unwrap();
        store.retain(key, new).unwrap();

        let stale = ResourceError::StaleHandle {
            resource_type: ResourceType::Audio,
            slot,
            expected: old,
            found: new,
        };
        assert_eq!(store.retain(key, old), Err(stale.clone()));
        assert_eq!(store.release(key, old), Err(stale));
        assert_eq!(store.ref_count(key), 1);
    }

    #[test]
    fn test_check_generation() {
        let mut store = ResourceStore::with_capacity(1);
        let slot = store.insert(ResourceType::Audio, 1, payload("one")).unwrap();
        let key = SlotKey::new(ResourceType::Audio, slot);
        let generation = store.generation(ResourceType::Audio, slot).unwrap();
        assert!(store.check_generation(key, generation).is_ok());

        store.remove(ResourceType::Audio, slot).unwrap();
        assert!(matches!(
            store.check_generation(key, generation),
            Err(ResourceError::StaleHandle { .. })
        ));

        store.insert(ResourceType::Audio, 2, payload("two")).unwrap();
        assert_eq!(
            store.check_generation(key, generation),
            Err(ResourceError::StaleHandle {
                resource_type: ResourceType::Audio,
                slot,
                expected: generation,
                found: generation + 1,
            })
        );
    }
}
