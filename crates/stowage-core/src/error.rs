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

//! Errors reported to callers of the asset service.
//!
//! Backend failures never show up here: they are logged and degrade into the
//! cache strategy's default value. These variants are caller-side contract
//! violations.

use thiserror::Error;

/// A misuse of the asset service or loader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// A context was requested before being registered while automatic
    /// registration is disabled.
    #[error("context `{context}` must be registered with `register_context` before it is used")]
    ContextNotRegistered {
        /// Name of the context kind.
        context: &'static str,
    },
    /// The object behind an address is not of the requested type.
    #[error("asset `{address}` resolved to a `{found}`, not the requested `{expected}`")]
    TypeMismatch {
        /// Address of the policy that was requested.
        address: String,
        /// The type the caller asked for.
        expected: &'static str,
        /// The type actually held by the cache or returned by the backend.
        found: &'static str,
    },
}

/// A specialized `Result` for asset service operations.
pub type AssetResult<T> = Result<T, AssetError>;
