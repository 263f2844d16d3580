// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compute device handles.

use std::fmt;

/// A compute device an engine can place models and tensors on.
///
/// Handles are plain values; engines hand them out from
/// [`Engine::accelerators`](crate::Engine::accelerators) and callers only
/// compare and select among them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Cpu,
    Gpu(u32),
}

impl Device {
    pub fn is_cpu(self) -> bool {
        matches!(self, Device::Cpu)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu(0)"),
            Device::Gpu(id) => write!(f, "gpu({id})"),
        }
    }
}
