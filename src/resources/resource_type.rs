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
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on the number of resource types a store can route.
///
/// Matches the 6-bit type field of a packed handle; [`ResourceType::COUNT`]
/// is checked against it at compile time.
pub const MAX_RESOURCE_TYPES: usize = 64;

/// Closed set of asset categories held by the resource store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResourceType {
    #[serde(rename = "SHADER_VERTEX")]
    ShaderVertex,
    #[serde(rename = "SHADER_FRAG")]
    ShaderFrag,
    #[serde(rename = "SHADER_PROGRAM")]
    ShaderProgram,
    #[serde(rename = "TEXTURE_SPRITE")]
    TextureSprite,
    #[serde(rename = "TEXTURE_ALBEDO")]
    TextureAlbedo,
    #[serde(rename = "AUDIO")]
    Audio,
    #[serde(rename = "FONT_TTF")]
    FontTtf,
    #[serde(rename = "SCENE")]
    Scene,
}

const _: () = assert!(
    ResourceType::COUNT <= MAX_RESOURCE_TYPES,
    "ResourceType count exceeds MAX_RESOURCE_TYPES"
);

impl ResourceType {
    /// Every variant, in index order
    pub const ALL: [ResourceType; 8] = [
        ResourceType::ShaderVertex,
        ResourceType::ShaderFrag,
        ResourceType::ShaderProgram,
        ResourceType::TextureSprite,
        ResourceType::TextureAlbedo,
        ResourceType::Audio,
        ResourceType::FontTtf,
        ResourceType::Scene,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Dense index used to route into per-type tables
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(ResourceError::InvalidResourceType(index as u32))
    }

    /// Stable name, as written in asset metadata
    pub const fn name(self) -> &'static str {
        match self {
            ResourceType::ShaderVertex => "SHADER_VERTEX",
            ResourceType::ShaderFrag => "SHADER_FRAG",
            ResourceType::ShaderProgram => "SHADER_PROGRAM",
            ResourceType::TextureSprite => "TEXTURE_SPRITE",
            ResourceType::TextureAlbedo => "TEXTURE_ALBEDO",
            ResourceType::Audio => "AUDIO",
            ResourceType::FontTtf => "FONT_TTF",
            ResourceType::Scene => "SCENE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|ty| ty.name() == name)
    }

    /// 32-bit FNV-1a hash of [`name`](Self::name).
    ///
    /// Asset metadata refers to types by this hash rather than by index so
    /// that reordering the enum does not invalidate packed data.
    pub const fn type_hash(self) -> u32 {
        fnv1a(self.name())
    }

    pub fn from_hash(hash: u32) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.type_hash() == hash)
            .ok_or(ResourceError::InvalidResourceType(hash))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const fn fnv1a(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash: u32 = 0x811c_9dc5;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(0x0100_0193);
        i += 1;
    }
    hash
}
