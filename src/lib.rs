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

//! Resource Handles - slot-based asset store with ref-counted handles
//!
//! Engine assets (shaders, textures, audio, fonts, scenes) live in fixed-size
//! per-type slot tables. A [`ResourceManager`] loads each asset once, hands out
//! [`ResourceHandle`]s that count live references, and unloads the asset when
//! the last handle drops. Handles remember the generation of the slot they
//! were issued for, so a handle that outlives its slot's occupant is caught
//! instead of silently reading the next tenant's data.
//!
//! ```
//! use resource_handles::{LoadError, ResourceManager, ResourcePayload, ResourceType};
//! use std::sync::Arc;
//!
//! let manager = ResourceManager::new(|ty: ResourceType, guid: u32| {
//!     Ok::<ResourcePayload, LoadError>(Arc::new(format!("{ty}#{guid}")))
//! });
//!
//! let texture = manager.get_handle(ResourceType::TextureAlbedo, 42).unwrap();
//! let again = manager.get_handle(ResourceType::TextureAlbedo, 42).unwrap();
//! assert_eq!(texture.ref_count(), 2);
//! assert_eq!(*again.get_data_as::<String>().unwrap(), "TEXTURE_ALBEDO#42");
//!
//! drop(texture);
//! drop(again);
//! assert!(!manager.is_loaded(ResourceType::TextureAlbedo, 42));
//! ```

pub mod config;
pub mod error;
pub mod inspector;
pub mod resources;

pub use config::*;
pub use error::*;
pub use inspector::*;
pub use resources::*;
