// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for graph construction and architecture lookup.

/// Errors that can occur when building a model graph.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    /// The architecture family is not in the catalog.
    #[error("unknown architecture '{name}'; known families: {known}")]
    UnknownArchitecture { name: String, known: String },

    /// The depth parameter is not one the family defines.
    #[error("no {family} configuration for num_layers = {num_layers}")]
    UnsupportedDepth { family: String, num_layers: usize },

    /// The input image shape is malformed or too small for the network.
    #[error("invalid image shape '{shape}': {detail}")]
    InvalidInputShape { shape: String, detail: String },

    /// A layer definition is invalid (e.g., incompatible input shapes).
    #[error("invalid layer '{layer}': {detail}")]
    InvalidLayer { layer: String, detail: String },

    /// The model graph is malformed.
    #[error("invalid model graph: {0}")]
    InvalidGraph(String),
}
