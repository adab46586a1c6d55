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

use serde::Serialize;

use crate::error::{ResourceError, Result};
use crate::resources::{ResourceGuid, ResourceManager, ResourceType, SlotIndex, SlotKey};

/// Resource store inspector for debugging
pub struct StoreInspector;

impl StoreInspector {
    /// Every occupied slot, grouped by type in index order
    pub fn slot_summary(manager: &ResourceManager) -> Vec<SlotInfo> {
        let state = manager.lock_state();
        let mut infos = Vec::new();

        for table in state.store.tables() {
            let resource_type = table.resource_type();
            for (slot, guid, generation) in table.iter_occupied() {
                infos.push(SlotInfo {
                    resource_type,
                    slot,
                    guid,
                    generation,
                    ref_count: state.store.ref_count(SlotKey::new(resource_type, slot)),
                });
            }
        }

        infos
    }

    /// Occupancy per type
    pub fn type_summary(manager: &ResourceManager) -> Vec<TypeInfo> {
        let state = manager.lock_state();
        let types = state
            .store
            .tables()
            .map(|table| TypeInfo {
                resource_type: table.resource_type(),
                occupied: table.len(),
                capacity: table.capacity(),
            })
            .collect();
        types
    }

    /// Slot and type summaries plus the manager's counters, as JSON
    pub fn to_json(manager: &ResourceManager) -> Result<String> {
        let report = Report {
            types: Self::type_summary(manager),
            slots: Self::slot_summary(manager),
            stats: manager.stats(),
        };
        serde_json::to_string_pretty(&report)
            .map_err(ResourceError::from)
    }

    /// Print store summary to console
    pub fn print_summary(manager: &ResourceManager) {
        println!("=== Resource Store ===");
        println!("Loaded: {}", manager.total_loaded());

        println!("\n=== Types ===");
        for info in Self::type_summary(manager) {
            println!(
                "{}: {}/{} slots",
                info.resource_type, info.occupied, info.capacity
            );
        }

        println!("\n=== Slots ===");
        for info in Self::slot_summary(manager) {
            println!(
                "{} slot {}: guid {} gen {} refs {}",
                info.resource_type, info.slot, info.guid, info.generation, info.ref_count
            );
        }
    }
}

/// Snapshot of one occupied slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotInfo {
    pub resource_type: ResourceType,
    pub slot: SlotIndex,
    pub guid: ResourceGuid,
    pub generation: u16,
    pub ref_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeInfo {
    pub resource_type: ResourceType,
    pub occupied: usize,
    pub capacity: usize,
}

#[derive(Serialize)]
struct Report {
    types: Vec<TypeInfo>,
    slots: Vec<SlotInfo>,
    stats: crate::resources::ResourceStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{LoadError, ResourcePayload};
    use std::sync::Arc;

    fn manager() -> ResourceManager {
        ResourceManager::new(|_: ResourceType, guid: ResourceGuid| {
            Ok::<ResourcePayload, LoadError>(Arc::new(guid))
        })
    }

    #[test]
    fn test_slot_summary() {
        let manager = manager();
        let audio = manager.get_handle(ResourceType::Audio, 100).unwrap();
        let _audio_copy = audio.clone();
        let _scene = manager.get_handle(ResourceType::Scene, 200).unwrap();

        let infos = StoreInspector::slot_summary(&manager);
        assert_eq!(
            infos,
            vec![
                SlotInfo {
                    resource_type: ResourceType::Audio,
                    slot: 0,
                    guid: 100,
                    generation: 1,
                    ref_count: 2,
                },
                SlotInfo {
                    resource_type: ResourceType::Scene,
                    slot: 0,
                    guid: 200,
                    generation: 1,
                    ref_count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_type_summary_covers_every_type() {
        let manager = manager();
        let _font = manager.get_handle(ResourceType::FontTtf, 1).unwrap();

        let types = StoreInspector::type_summary(&manager);
        assert_eq!(types.len(), ResourceType::COUNT);
        let font = types
            .iter()
            .find(|info| info.resource_type == ResourceType::FontTtf)
            .unwrap();
        assert_eq!(font.occupied, 1);
        assert_eq!(font.capacity, 1024);
    }

    #[test]
    fn test_json_report() {
        let manager = manager();
        let _handle = manager.get_handle(ResourceType::ShaderVertex, 77).unwrap();

        let json = StoreInspector::to_json(&manager).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["slots"][0]["resource_type"], "SHADER_VERTEX");
        assert_eq!(value["slots"][0]["guid"], 77);
        assert_eq!(value["stats"]["loads"], 1);
    }
}
