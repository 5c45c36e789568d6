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

use serde::{Deserialize, Serialize};

/// What the backend hands back once its runtime is up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogHandle {
    /// Identifier of the catalog the backend started from.
    pub catalog_id: String,
}

/// A content catalog as seen by the client: an id and the keys it can
/// resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLocator {
    /// Identifier of the catalog.
    pub id: String,
    /// Every key (address or label) the catalog knows about.
    pub keys: Vec<String>,
}

impl ResourceLocator {
    /// Creates a locator from a list of keys.
    pub fn new<I, S>(id: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

/// A resolved location for one key: where its content physically lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceLocation {
    /// The key that was resolved.
    pub primary_key: String,
    /// Backend-specific identifier of the content (bundle name, URL, ...).
    pub internal_id: String,
}

/// The set of content a size query or download applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    /// An explicit list of resolved locations.
    Locations(Vec<ResourceLocation>),
    /// Everything tagged with a label.
    Label(String),
}
