// Copyright 2025 eraflo
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

use std::collections::{HashMap, HashSet};
use stowage_core::asset::{AssetKey, InstanceId};

/// What a [`MemoryContentDelivery`](super::MemoryContentDelivery) has been
/// asked to do so far.
#[derive(Debug, Default, Clone)]
pub struct DeliveryStats {
    /// Number of successful `initialize` calls.
    pub initializations: usize,
    /// Successful loads, per address.
    pub loads: HashMap<String, usize>,
    /// Successful instantiations, per address.
    pub instantiations: HashMap<String, usize>,
    /// Identity of every asset released, in release order.
    pub released_assets: Vec<AssetKey>,
    /// Every instance released, in release order.
    pub released_instances: Vec<InstanceId>,
    /// Instances created and not released yet.
    pub live_instances: HashSet<InstanceId>,
    /// Number of completed dependency downloads.
    pub downloads: usize,
}

impl DeliveryStats {
    /// How many times `address` was loaded.
    pub fn load_count(&self, address: &str) -> usize {
        self.loads.get(address).copied().unwrap_or(0)
    }

    /// How many times `address` was instantiated.
    pub fn instantiate_count(&self, address: &str) -> usize {
        self.instantiations.get(address).copied().unwrap_or(0)
    }

    /// How many times the asset with `key` was released.
    pub fn release_count_of(&self, key: AssetKey) -> usize {
        self.released_assets.iter().filter(|released| **released == key).count()
    }
}
