// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-family network definitions.
//!
//! Each module exposes a `body` function that adds the feature extractor and
//! classifier to a [`GraphBuilder`](crate::GraphBuilder) and returns the
//! logits node; the softmax head is appended by the caller.

pub(crate) mod alexnet;
pub(crate) mod inception_bn;
pub(crate) mod inception_v3;
pub(crate) mod resnet;
pub(crate) mod vgg;
