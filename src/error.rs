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

//! Error types

use std::fmt;

use crate::resources::{ResourceGuid, ResourceType, SlotIndex};

/// Resource subsystem error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// No free slot left in a type's table
    CapacityExhausted {
        resource_type: ResourceType,
        capacity: usize,
    },

    /// External loader could not produce a payload
    LoadFailure {
        resource_type: ResourceType,
        guid: ResourceGuid,
        reason: String,
    },

    /// A handle was released while its slot's refcount was already zero
    RefCountUnderflow {
        resource_type: ResourceType,
        slot: SlotIndex,
    },

    /// Handle generation no longer matches the slot's occupant
    StaleHandle {
        resource_type: ResourceType,
        slot: SlotIndex,
        expected: u16,
        found: u16,
    },

    /// Type index or type hash outside the closed enum
    InvalidResourceType(u32),

    /// Slot index out of range, or slot state contradicts the caller
    SlotCorruption {
        resource_type: ResourceType,
        slot: SlotIndex,
        reason: &'static str,
    },

    /// GUID already occupies a slot of this type
    DuplicateGuid {
        resource_type: ResourceType,
        guid: ResourceGuid,
    },

    /// GUID 0 is the empty-slot sentinel
    InvalidGuid,

    /// Payload is not of the requested concrete type
    PayloadTypeMismatch {
        resource_type: ResourceType,
        expected: &'static str,
    },

    /// Handle was issued by a different manager
    ForeignHandle,

    /// Manager configuration rejected
    InvalidConfig(String),

    /// IO error (config files)
    IoError(String),

    /// JSON encoding of a config or inspector report failed
    SerializationError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::CapacityExhausted {
                resource_type,
                capacity,
            } => write!(
                f,
                "No free slot for {resource_type}: all {capacity} slots occupied"
            ),
            ResourceError::LoadFailure {
                resource_type,
                guid,
                reason,
            } => write!(f, "Failed to load {resource_type} {guid}: {reason}"),
            ResourceError::RefCountUnderflow {
                resource_type,
                slot,
            } => write!(
                f,
                "Ref count underflow on {resource_type} slot {slot}: count is already 0"
            ),
            ResourceError::StaleHandle {
                resource_type,
                slot,
                expected,
                found,
            } => write!(
                f,
                "Stale handle for {resource_type} slot {slot}: generation {expected}, slot is at {found}"
            ),
            ResourceError::InvalidResourceType(value) => {
                write!(f, "Invalid resource type: {value}")
            }
            ResourceError::SlotCorruption {
                resource_type,
                slot,
                reason,
            } => write!(f, "Slot corruption in {resource_type} slot {slot}: {reason}"),
            ResourceError::DuplicateGuid {
                resource_type,
                guid,
            } => write!(f, "{resource_type} {guid} is already in the store"),
            ResourceError::InvalidGuid => write!(f, "GUID 0 is reserved for empty slots"),
            ResourceError::PayloadTypeMismatch {
                resource_type,
                expected,
            } => write!(f, "{resource_type} payload is not a {expected}"),
            ResourceError::ForeignHandle => write!(f, "Handle belongs to another resource manager"),
            ResourceError::InvalidConfig(msg) => write!(f, "Invalid config: {msg}"),
            ResourceError::IoError(msg) => write!(f, "IO error: {msg}"),
            ResourceError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ResourceError {
    fn from(err: serde_json::Error) -> Self {
        ResourceError::SerializationError(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ResourceError>;
