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

/// Resource manager counters
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResourceStats {
    /// Payloads inserted into the store
    pub loads: u64,
    /// Requests served from an existing slot
    pub cache_hits: u64,
    /// Requests that had to call the loader
    pub cache_misses: u64,
    /// Slots freed after their last handle dropped
    pub unloads: u64,
    pub load_failures: u64,
    /// Payloads loaded but never stored (lost a race, or the table was full)
    pub discarded_loads: u64,
}

impl ResourceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_hit_ratio(&self) -> f32 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f32 / total as f32
        }
    }
}
