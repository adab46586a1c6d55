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

use crate::error::{ResourceError, Result};
use crate::resources::ResourceType;
use std::any::Any;
use std::sync::Arc;

/// Stable identifier of one logical asset. `0` marks an empty slot.
pub type ResourceGuid = u32;

/// Position of a slot within its type's table
pub type SlotIndex = u32;

/// Opaque loaded asset data.
///
/// The store keeps a shared reference only; the asset's memory belongs to the
/// loader and is torn down by the unloader.
pub type ResourcePayload = Arc<dyn Any + Send + Sync>;

/// Sentinel GUID of an unoccupied slot
pub const EMPTY_GUID: ResourceGuid = 0;

/// Default slots per type (10-bit slot index)
pub const DEFAULT_SLOT_CAPACITY: usize = 1024;

/// Largest table a single type may be configured with
pub const MAX_SLOT_CAPACITY: usize = 1 << 16;

/// Identifies one slot across all tables
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub resource_type: ResourceType,
    pub slot: SlotIndex,
}

impl SlotKey {
    pub fn new(resource_type: ResourceType, slot: SlotIndex) -> Self {
        Self {
            resource_type,
            slot,
        }
    }
}

/// One storage cell.
///
/// `payload.is_none()` iff `guid == EMPTY_GUID`. The generation survives
/// release so the next occupant can be told apart from this one.
#[derive(Default)]
struct Slot {
    guid: ResourceGuid,
    payload: Option<ResourcePayload>,
    generation: u16,
}

impl Slot {
    #[inline]
    fn occupied(&self) -> bool {
        self.payload.is_some()
    }
}

/// Fixed-capacity slot array for one resource type
pub struct SlotTable {
    resource_type: ResourceType,
    slots: Vec<Slot>,
    occupied: usize,
    check_duplicates: bool,
}

impl SlotTable {
    /// Create a table with `capacity` empty slots.
    ///
    /// `check_duplicates` enables the O(capacity) duplicate-GUID scan on
    /// every allocation.
    pub fn new(resource_type: ResourceType, capacity: usize, check_duplicates: bool) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, Slot::default);
        Self {
            resource_type,
            slots,
            occupied: 0,
            check_duplicates,
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    pub fn is_full(&self) -> bool {
        self.occupied == self.slots.len()
    }

    /// Linear scan for the occupied slot holding `guid`
    pub fn find_slot_by_guid(&self, guid: ResourceGuid) -> Option<SlotIndex> {
        if guid == EMPTY_GUID {
            return None;
        }
        self.slots
            .iter()
            .position(|slot| slot.occupied() && slot.guid == guid)
            .map(|index| index as SlotIndex)
    }

    /// Store `payload` under `guid` in the lowest free slot.
    ///
    /// Bumps the slot's generation. A full table is reported as
    /// [`ResourceError::CapacityExhausted`] and left untouched.
    pub fn allocate_slot(&mut self, guid: ResourceGuid, payload: ResourcePayload) -> Result<SlotIndex> {
        if guid == EMPTY_GUID {
            return Err(ResourceError::InvalidGuid);
        }
        if self.check_duplicates && self.find_slot_by_guid(guid).is_some() {
            return Err(ResourceError::DuplicateGuid {
                resource_type: self.resource_type,
                guid,
            });
        }

        let index = self
            .slots
            .iter()
            .position(|slot| !slot.occupied())
            .ok_or(ResourceError::CapacityExhausted {
                resource_type: self.resource_type,
                capacity: self.slots.len(),
            })?;

        let slot = &mut self.slots[index];
        slot.generation = next_generation(slot.generation);
        slot.guid = guid;
        slot.payload = Some(payload);
        self.occupied += 1;
        Ok(index as SlotIndex)
    }

    /// Clear an occupied slot, handing back what it held.
    ///
    /// The payload is returned, not destroyed.
    pub fn release_slot(&mut self, index: SlotIndex) -> Result<(ResourceGuid, ResourcePayload)> {
        let resource_type = self.resource_type;
        let slot = self.occupied_slot_mut(index)?;
        let guid = std::mem::replace(&mut slot.guid, EMPTY_GUID);
        let payload = slot.payload.take().ok_or(ResourceError::SlotCorruption {
            resource_type,
            slot: index,
            reason: "occupied slot without payload",
        })?;
        self.occupied -= 1;
        Ok((guid, payload))
    }

    pub fn get_payload(&self, index: SlotIndex) -> Result<&ResourcePayload> {
        let slot = self.occupied_slot(index)?;
        slot.payload.as_ref().ok_or(ResourceError::SlotCorruption {
            resource_type: self.resource_type,
            slot: index,
            reason: "occupied slot without payload",
        })
    }

    /// Replace the payload of an occupied slot, returning the previous one.
    ///
    /// GUID and generation are left as they are.
    pub fn set_payload(&mut self, index: SlotIndex, payload: ResourcePayload) -> Result<ResourcePayload> {
        let resource_type = self.resource_type;
        let slot = self.occupied_slot_mut(index)?;
        slot.payload
            .replace(payload)
            .ok_or(ResourceError::SlotCorruption {
                resource_type,
                slot: index,
                reason: "occupied slot without payload",
            })
    }

    pub fn get_guid(&self, index: SlotIndex) -> Result<ResourceGuid> {
        Ok(self.occupied_slot(index)?.guid)
    }

    /// Generation of the slot's current (or most recent) occupant
    pub fn get_generation(&self, index: SlotIndex) -> Result<u16> {
        Ok(self.slot(index)?.generation)
    }

    pub fn is_occupied(&self, index: SlotIndex) -> bool {
        self.slots
            .get(index as usize)
            .is_some_and(|slot| slot.occupied())
    }

    /// `(slot, guid, generation)` of every occupied slot, in index order
    pub fn iter_occupied(&self) -> impl Iterator<Item = (SlotIndex, ResourceGuid, u16)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.occupied())
            .map(|(index, slot)| (index as SlotIndex, slot.guid, slot.generation))
    }

    fn slot(&self, index: SlotIndex) -> Result<&Slot> {
        self.slots
            .get(index as usize)
            .ok_or(ResourceError::SlotCorruption {
                resource_type: self.resource_type,
                slot: index,
                reason: "slot index out of range",
            })
    }

    fn occupied_slot(&self, index: SlotIndex) -> Result<&Slot> {
        let slot = self.slot(index)?;
        if !slot.occupied() {
            return Err(ResourceError::SlotCorruption {
                resource_type: self.resource_type,
                slot: index,
                reason: "slot is not occupied",
            });
        }
        Ok(slot)
    }

    fn occupied_slot_mut(&mut self, index: SlotIndex) -> Result<&mut Slot> {
        let resource_type = self.resource_type;
        let slot = self
            .slots
            .get_mut(index as usize)
            .ok_or(ResourceError::SlotCorruption {
                resource_type,
                slot: index,
                reason: "slot index out of range",
            })?;
        if !slot.occupied() {
            return Err(ResourceError::SlotCorruption {
                resource_type,
                slot: index,
                reason: "slot is not occupied",
            });
        }
        Ok(slot)
    }
}

// Generation 0 is never handed out, so a zeroed handle can't match a slot.
#[inline]
fn next_generation(current: u16) -> u16 {
    match current.wrapping_add(1) {
        0 => 1,
        next => next,
    }
}
