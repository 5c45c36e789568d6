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

use std::collections::HashSet;
use stowage_core::delivery::ResourceLocator;

/// Where the loader stands in the catalog lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoaderState {
    /// Nothing has been requested from the backend yet, or initialization failed.
    #[default]
    Uninitialized,
    /// The backend runtime is starting.
    Initializing,
    /// The backend is up; the catalog has not been checked for updates yet.
    CatalogSynced,
    /// Catalogs are up to date and the resolvable addresses are known.
    Ready,
}

/// The loader's knowledge of the backend catalogs.
#[derive(Debug, Default)]
pub(crate) struct CatalogState {
    pub(crate) state: LoaderState,
    locators: Option<Vec<ResourceLocator>>,
    addresses: HashSet<String>,
}

impl CatalogState {
    /// Replaces the known locators and rebuilds the resolvable set.
    pub(crate) fn adopt(&mut self, locators: Vec<ResourceLocator>) {
        self.addresses = locators
            .iter()
            .flat_map(|locator| locator.keys.iter().cloned())
            .collect();
        self.locators = Some(locators);
    }

    pub(crate) fn has_locators(&self) -> bool {
        self.locators.is_some()
    }

    pub(crate) fn locators(&self) -> Vec<ResourceLocator> {
        self.locators.clone().unwrap_or_default()
    }

    pub(crate) fn is_resolvable(&self, address: &str) -> bool {
        self.addresses.contains(address)
    }

    /// Every key of every known locator, each listed once.
    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.addresses.iter().cloned().collect();
        keys.sort_unstable();
        keys
    }

    pub(crate) fn address_count(&self) -> usize {
        self.addresses.len()
    }
}
