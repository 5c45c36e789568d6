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

use dashmap::{mapref::entry::Entry, DashMap};
use stowage_core::{
    asset::{AssetPolicy, ErasedAsset, PolicyId},
    CacheStrategy,
};

/// A strategy that keeps the first value fetched for each policy id.
///
/// Entries are only dropped by [`clear`](CacheStrategy::clear). Concurrent
/// `add` calls for one id race on the map shard: exactly one wins and the
/// others are ignored.
#[derive(Debug, Default)]
pub struct DynamicCache {
    entries: DashMap<PolicyId, ErasedAsset>,
}

impl DynamicCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if an entry exists for `policy`.
    pub fn contains(&self, policy: &AssetPolicy) -> bool {
        self.entries.contains_key(&policy.id())
    }
}

impl CacheStrategy for DynamicCache {
    fn get(&self, policy: &AssetPolicy) -> Option<ErasedAsset> {
        self.entries
            .get(&policy.id())
            .map(|entry| entry.value().clone())
    }

    fn add(&self, policy: &AssetPolicy, asset: ErasedAsset) {
        match self.entries.entry(policy.id()) {
            Entry::Occupied(_) => {
                log::trace!("'{}' is already cached, keeping the first value", policy);
            }
            Entry::Vacant(slot) => {
                slot.insert(asset);
            }
        }
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
