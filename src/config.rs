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

//! Resource manager configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{ResourceError, Result};
use crate::resources::{ResourceType, DEFAULT_SLOT_CAPACITY, MAX_SLOT_CAPACITY};

/// What a handle clone or drop does when the ref count bookkeeping is off:
/// the count is already zero, or the slot now holds a newer occupant than
/// the handle was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnderflowPolicy {
    /// Panic with the error
    Panic,
    /// Leave the count untouched and log an error
    SaturateAndLog,
}

impl Default for UnderflowPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            UnderflowPolicy::Panic
        } else {
            UnderflowPolicy::SaturateAndLog
        }
    }
}

/// Sizing and validation settings for a [`ResourceManager`](crate::ResourceManager)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceManagerConfig {
    /// Slots per type unless overridden
    pub slot_capacity: usize,

    /// Per-type slot counts
    pub capacity_overrides: HashMap<ResourceType, usize>,

    /// Check handle generations on every dereference and reject duplicate
    /// GUIDs on insertion
    pub validate_generations: bool,

    pub underflow_policy: UnderflowPolicy,
}

impl Default for ResourceManagerConfig {
    fn default() -> Self {
        Self {
            slot_capacity: DEFAULT_SLOT_CAPACITY,
            capacity_overrides: HashMap::new(),
            validate_generations: true,
            underflow_policy: UnderflowPolicy::default(),
        }
    }
}

impl ResourceManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot_capacity(mut self, capacity: usize) -> Self {
        self.slot_capacity = capacity;
        self
    }

    pub fn with_capacity_for(mut self, resource_type: ResourceType, capacity: usize) -> Self {
        self.capacity_overrides.insert(resource_type, capacity);
        self
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_generations = enabled;
        self
    }

    pub fn with_underflow_policy(mut self, policy: UnderflowPolicy) -> Self {
        self.underflow_policy = policy;
        self
    }

    /// Slot count for one type's table
    pub fn capacity_for(&self, resource_type: ResourceType) -> usize {
        self.capacity_overrides
            .get(&resource_type)
            .copied()
            .unwrap_or(self.slot_capacity)
    }

    /// Every capacity must be a power of two no larger than
    /// [`MAX_SLOT_CAPACITY`]
    pub fn validate(&self) -> Result<()> {
        check_capacity("slot_capacity", self.slot_capacity)?;
        for (resource_type, &capacity) in &self.capacity_overrides {
            check_capacity(resource_type.name(), capacity)?;
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ResourceError::InvalidConfig(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(ResourceError::from)
    }
}

fn check_capacity(name: &str, capacity: usize) -> Result<()> {
    if capacity == 0 || !capacity.is_power_of_two() || capacity > MAX_SLOT_CAPACITY {
        return Err(ResourceError::InvalidConfig(format!(
            "{name} must be a power of two in 1..={MAX_SLOT_CAPACITY}, got {capacity}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResourceManagerConfig::default();
        assert_eq!(config.slot_capacity, 1024);
        assert!(config.validate_generations);
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity_for(ResourceType::Scene), 1024);
    }

    #[test]
    fn test_capacity_override() {
        let config = ResourceManagerConfig::new()
            .with_slot_capacity(256)
            .with_capacity_for(ResourceType::Scene, 8);
        assert_eq!(config.capacity_for(ResourceType::Scene), 8);
        assert_eq!(config.capacity_for(ResourceType::Audio), 256);
    }

    #[test]
    fn test_rejects_bad_capacity() {
        for capacity in [0, 3, 1000, MAX_SLOT_CAPACITY * 2] {
            let config = ResourceManagerConfig::new().with_slot_capacity(capacity);
            assert!(matches!(
                config.validate(),
                Err(ResourceError::InvalidConfig(_))
            ));
        }

        let config = ResourceManagerConfig::new().with_capacity_for(ResourceType::FontTtf, 12);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("FONT_TTF"));
    }

    #[test]
    fn test_from_json() {
        let config = ResourceManagerConfig::from_json_str(
            r#"{
                "slot_capacity": 64,
                "capacity_overrides": { "SCENE": 4 },
                "underflow_policy": "saturate_and_log"
            }"#,
        )
        .unwrap();

        assert_eq!(config.slot_capacity, 64);
        assert_eq!(config.capacity_for(ResourceType::Scene), 4);
        assert!(config.validate_generations);
        assert_eq!(config.underflow_policy, UnderflowPolicy::SaturateAndLog);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            ResourceManagerConfig::from_json_str(r#"{ "slot_capacity": 100 }"#),
            Err(ResourceError::InvalidConfig(_))
        ));
        assert!(matches!(
            ResourceManagerConfig::from_json_str("not json"),
            Err(ResourceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = ResourceManagerConfig::new()
            .with_capacity_for(ResourceType::Audio, 16)
            .with_validation(false);
        let json = config.to_json_string().unwrap();
        assert_eq!(ResourceManagerConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ResourceManagerConfig::from_json_file("does/not/exist.json"),
            Err(ResourceError::IoError(_))
        ));
    }
}
