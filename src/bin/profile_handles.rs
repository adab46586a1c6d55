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

#![allow(dead_code, unused_imports)]

use resource_handles::{
    LoadError, ResourceGuid, ResourceHandle, ResourceManager, ResourcePayload, ResourceType,
    StoreInspector,
};
use std::sync::Arc;
use std::{fs::File, time::Instant};

#[cfg(feature = "profiling")]
use tracing_subscriber::{self, prelude::*};

#[cfg(feature = "profiling")]
#[tracing::instrument(skip(manager))]
fn profile_handles(manager: &ResourceManager, count: u32) {
    let _span = tracing::info_span!("handle_loop", count = count).entered();
    let mut held: Vec<ResourceHandle> = Vec::with_capacity(count as usize);
    for guid in 1..=count {
        if guid % 100 == 0 {
            tracing::info!("Requesting resource {}/{}", guid, count);
        }
        let handle = match manager.get_handle(ResourceType::TextureAlbedo, guid) {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!(error = %err, "stopping early");
                break;
            }
        };
        held.push(handle.clone());
    }
    drop(held);
}

#[cfg(feature = "profiling")]
fn main() {
    // Set up tracing subscriber to write to a file
    let file = match File::create("trace.json") {
        Ok(file) => file,
        Err(err) => {
            eprintln!("cannot create trace.json: {err}");
            return;
        }
    };
    let (non_blocking, _guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .init();

    let manager = ResourceManager::new(|_: ResourceType, guid: ResourceGuid| {
        Ok::<ResourcePayload, LoadError>(Arc::new(vec![guid as u8; 4096]))
    });

    println!("Warming up...");
    {
        let _span = tracing::info_span!("warmup").entered();
        let _resident: Vec<_> = (1..=64)
            .filter_map(|guid| manager.get_handle(ResourceType::Audio, guid).ok())
            .collect();
    }

    println!("Profiling load/clone/unload of 1000 textures...");
    let start = Instant::now();
    profile_handles(&manager, 1_000);
    println!("Cycle complete in: {:?}", start.elapsed());

    StoreInspector::print_summary(&manager);
    println!("{:?}", manager.stats());
}

#[cfg(not(feature = "profiling"))]
fn main() {
    println!("profile_handles binary requires --features profiling");
}
