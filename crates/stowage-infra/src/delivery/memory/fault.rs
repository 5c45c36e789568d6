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

use stowage_core::delivery::Operation;

/// A backend call that can be made to misbehave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryCall {
    /// [`ContentDelivery::initialize`](stowage_core::ContentDelivery::initialize).
    Initialize,
    /// Checking for catalog updates.
    CheckForCatalogUpdates,
    /// Applying catalog updates.
    UpdateCatalogs,
    /// Resolving keys into locations.
    ResolveLocations,
    /// Download size queries.
    DownloadSize,
    /// Dependency downloads.
    DownloadDependencies,
    /// Asset loads.
    LoadAsset,
    /// Instantiations.
    Instantiate,
    /// Loading an external catalog.
    LoadContentCatalog,
}

/// How an injected fault surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The call completes with a failed status.
    Failed(String),
    /// The call returns an invalid handle.
    Invalid,
}

impl Fault {
    pub(crate) fn into_operation<T>(self) -> Operation<T> {
        match self {
            Self::Failed(status) => Operation::Failed(status),
            Self::Invalid => Operation::Invalid,
        }
    }
}
