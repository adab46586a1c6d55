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

//! Slot-based resource store and its ref-counted handles.
//!
//! A [`ResourceManager`] owns one [`ResourceStore`], which holds a
//! [`SlotTable`] per [`ResourceType`]. Handles count live references per
//! slot and carry the slot's generation so a recycled slot is detected.

pub mod handle;
pub mod loader;
pub mod manager;
pub mod resource_type;
pub mod slot;
pub mod stats;
pub mod store;

pub use handle::ResourceHandle;
pub use loader::{DropUnloader, LoadError, ResourceLoader, ResourceUnloader};
pub use manager::ResourceManager;
pub use resource_type::{ResourceType, MAX_RESOURCE_TYPES};
pub use slot::{
    ResourceGuid, ResourcePayload, SlotIndex, SlotKey, SlotTable, DEFAULT_SLOT_CAPACITY,
    EMPTY_GUID, MAX_SLOT_CAPACITY,
};
pub use stats::ResourceStats;
pub use store::ResourceStore;
