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

//! The type-keyed registry of asset contexts owned by the service.

use indexmap::IndexMap;
use std::any::TypeId;
use stowage_core::{asset::ErasedAsset, ContextKind};
use stowage_data::AssetContext;

struct ContextEntry {
    name: &'static str,
    context: AssetContext,
}

/// Maps each [`ContextKind`] to its [`AssetContext`], in registration order.
#[derive(Default)]
pub(crate) struct ContextRegistry {
    contexts: IndexMap<TypeId, ContextEntry>,
}

impl ContextRegistry {
    /// Registers `C`, returning `false` if it already was.
    pub(crate) fn register<C: ContextKind>(&mut self) -> bool {
        if self.contexts.contains_key(&C::key()) {
            return false;
        }
        self.contexts.insert(
            C::key(),
            ContextEntry {
                name: C::name(),
                context: AssetContext::new(),
            },
        );
        true
    }

    pub(crate) fn contains<C: ContextKind>(&self) -> bool {
        self.contexts.contains_key(&C::key())
    }

    pub(crate) fn get<C: ContextKind>(&self) -> Option<&AssetContext> {
        self.contexts.get(&C::key()).map(|entry| &entry.context)
    }

    pub(crate) fn get_mut<C: ContextKind>(&mut self) -> Option<&mut AssetContext> {
        self.contexts.get_mut(&C::key()).map(|entry| &mut entry.context)
    }

    /// Removes `asset` from the first context holding it and returns that
    /// context's name.
    pub(crate) fn unregister_first(&mut self, asset: &ErasedAsset) -> Option<&'static str> {
        self.contexts
            .values_mut()
            .find(|entry| entry.context.has_asset(asset))
            .map(|entry| {
                entry.context.unregister_asset(asset);
                entry.name
            })
    }

    /// Empties every context, in registration order, and returns what each held.
    pub(crate) fn drain_all(&mut self) -> Vec<(&'static str, Vec<ErasedAsset>)> {
        self.contexts
            .values_mut()
            .map(|entry| (entry.name, entry.context.drain()))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.contexts.len()
    }
}
