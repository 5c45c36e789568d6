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
use std::fmt;

/// A stable numeric key derived from an asset address.
///
/// The id is the first eight bytes of the BLAKE3 digest of the address, so it
/// is identical across processes and platforms. Two distinct addresses may in
/// theory share an id; callers that bind strategies per id accept that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolicyId(u64);

impl PolicyId {
    /// Derives the id for `address`.
    pub fn from_address(address: &str) -> Self {
        let digest = blake3::hash(address.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest.as_bytes()[..8]);
        Self(u64::from_le_bytes(bytes))
    }

    /// Returns the raw value of the id.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Identifies an addressable resource.
///
/// A policy is an immutable pair of the address understood by the content
/// delivery backend and the [`PolicyId`] used to look the resource up in cache
/// strategies and strategy bindings.
///
/// Policies serialize as their bare address; the id is recomputed on
/// deserialization so it can never drift from the address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AssetPolicy {
    address: String,
    id: PolicyId,
}

impl AssetPolicy {
    /// Creates a policy for `address`, computing its id.
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        let id = PolicyId::from_address(&address);
        Self { address, id }
    }

    /// The address passed to the backend.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The cache and strategy lookup key.
    pub fn id(&self) -> PolicyId {
        self.id
    }
}

impl From<String> for AssetPolicy {
    fn from(address: String) -> Self {
        Self::new(address)
    }
}

impl From<&str> for AssetPolicy {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<AssetPolicy> for String {
    fn from(policy: AssetPolicy) -> Self {
        policy.address
    }
}

impl fmt::Display for AssetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}
