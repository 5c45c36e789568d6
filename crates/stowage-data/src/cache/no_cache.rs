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

use stowage_core::{
    asset::{AssetPolicy, ErasedAsset},
    CacheStrategy,
};

/// A strategy that never retains anything.
///
/// Every request goes to the backend. This is the usual choice for instantiated
/// objects, where each call must produce a fresh instance.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl NoCache {
    /// Creates the strategy.
    pub fn new() -> Self {
        Self
    }
}

impl CacheStrategy for NoCache {
    fn get(&self, _policy: &AssetPolicy) -> Option<ErasedAsset> {
        None
    }

    fn add(&self, _policy: &AssetPolicy, _asset: ErasedAsset) {}

    fn clear(&self) {}

    fn len(&self) -> usize {
        0
    }
}
