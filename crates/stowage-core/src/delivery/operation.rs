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

use thiserror::Error;

/// The outcome of one asynchronous backend operation.
///
/// It carries both facts the loader must check before touching the payload:
/// whether the operation handle is valid at all, and whether it succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation<T> {
    /// The operation completed and produced a result.
    Succeeded(T),
    /// The operation ran but failed; the string is the backend's status.
    Failed(String),
    /// The backend could not produce a usable operation handle.
    Invalid,
}

impl<T> Operation<T> {
    /// Shorthand for [`Operation::Failed`].
    pub fn failed(status: impl Into<String>) -> Self {
        Self::Failed(status.into())
    }

    /// Returns `true` unless the handle is invalid.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// Returns `true` if the operation succeeded.
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// Maps the payload of a successful operation.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Operation<U> {
        match self {
            Self::Succeeded(value) => Operation::Succeeded(f(value)),
            Self::Failed(status) => Operation::Failed(status),
            Self::Invalid => Operation::Invalid,
        }
    }

    /// Converts the outcome into a `Result`, naming the operation in the error.
    pub fn into_result(self, operation: &str) -> Result<T, DeliveryError> {
        match self {
            Self::Succeeded(value) => Ok(value),
            Self::Failed(status) => Err(DeliveryError::Failed {
                operation: operation.to_owned(),
                status,
            }),
            Self::Invalid => Err(DeliveryError::InvalidHandle {
                operation: operation.to_owned(),
            }),
        }
    }
}

/// Why a backend operation could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The backend returned no usable handle.
    #[error("{operation} handle is invalid")]
    InvalidHandle {
        /// Human-readable name of the operation.
        operation: String,
    },
    /// The operation completed with a non-success status.
    #[error("{operation} failed with status: {status}")]
    Failed {
        /// Human-readable name of the operation.
        operation: String,
        /// The status reported by the backend.
        status: String,
    },
}
