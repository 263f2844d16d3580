// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-zoo
//!
//! Image-classification CNN topologies expressed in a small graph IR.
//!
//! - [`Op`] — the computation each layer performs.
//! - [`LayerDef`] — a single layer's inputs, parameter shapes and output shape.
//! - [`ModelGraph`] — the full network as a DAG of layers, with a
//!   **type-state pattern** (`Loaded` → `Validated`).
//! - [`GraphBuilder`] — layer-by-layer construction with shape inference.
//! - [`Architecture`] — the closed catalog of network families.
//!
//! # Example
//! ```
//! use model_zoo::Architecture;
//! use tensor_core::DType;
//!
//! let graph = Architecture::lookup("resnet")
//!     .unwrap()
//!     .build(1000, "3,224,224", 50, DType::Float32)
//!     .unwrap();
//! println!("{}", graph.summary());
//! ```

mod architecture;
pub mod builder;
mod error;
pub mod graph;
mod layer;
mod networks;

pub use architecture::Architecture;
pub use builder::{GraphBuilder, NodeId};
pub use error::ModelError;
pub use graph::{Loaded, ModelGraph, Validated};
pub use layer::{LayerDef, Op, ParamDef, ParamKind};
