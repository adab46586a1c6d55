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

use crate::resources::{ResourceGuid, ResourcePayload, ResourceType};
use std::fmt;

/// Error reported by a [`ResourceLoader`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadError(pub String);

impl LoadError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for LoadError {}

impl From<String> for LoadError {
    fn from(reason: String) -> Self {
        Self(reason)
    }
}

impl From<&str> for LoadError {
    fn from(reason: &str) -> Self {
        Self(reason.to_string())
    }
}

/// Produces the payload for a resource that is not yet in the store.
///
/// Called without the store lock held, so an implementation may request
/// other handles from the same manager.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, resource_type: ResourceType, guid: ResourceGuid) -> Result<ResourcePayload, LoadError>;
}

impl<F> ResourceLoader for F
where
    F: Fn(ResourceType, ResourceGuid) -> Result<ResourcePayload, LoadError> + Send + Sync,
{
    fn load(&self, resource_type: ResourceType, guid: ResourceGuid) -> Result<ResourcePayload, LoadError> {
        self(resource_type, guid)
    }
}

/// Tears down a payload once no handle refers to it.
///
/// Invoked exactly once per payload that left the store, with the store
/// lock released.
pub trait ResourceUnloader: Send + Sync {
    fn unload(&self, resource_type: ResourceType, guid: ResourceGuid, payload: ResourcePayload);
}

impl<F> ResourceUnloader for F
where
    F: Fn(ResourceType, ResourceGuid, ResourcePayload) + Send + Sync,
{
    fn unload(&self, resource_type: ResourceType, guid: ResourceGuid, payload: ResourcePayload) {
        self(resource_type, guid, payload)
    }
}

/// Unloader that just drops the store's reference
pub struct DropUnloader;

impl ResourceUnloader for DropUnloader {
    fn unload(&self, _resource_type: ResourceType, _guid: ResourceGuid, _payload: ResourcePayload) {}
}
