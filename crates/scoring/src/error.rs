// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the scoring harness.

/// Errors that can occur while resolving, timing or sweeping workloads.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    /// A workload description is malformed (e.g. a non-numeric depth
    /// suffix). Aborts only the sweep cell it belongs to.
    #[error("invalid workload '{name}': {detail}")]
    Validation { name: String, detail: String },

    /// The sweep or timing configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// The network could not be built.
    #[error("model error: {0}")]
    Model(#[from] model_zoo::ModelError),

    /// The execution engine failed to bind, initialise or run the model.
    #[error("engine error: {0}")]
    Engine(#[from] engine::EngineError),
}

impl ScoreError {
    /// Whether the error is confined to one sweep cell rather than fatal to
    /// the whole run.
    pub fn is_cell_local(&self) -> bool {
        matches!(self, ScoreError::Validation { .. })
    }
}
