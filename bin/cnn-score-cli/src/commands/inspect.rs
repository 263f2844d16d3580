// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `cnn-score inspect` command: display a network's layer graph.
//!
//! Resolves the name exactly as the sweep does, builds the graph and prints
//! per-layer output shapes and parameter sizes. Nothing is executed.

use anyhow::Context;
use model_zoo::Architecture;
use scoring::SweepConfig;
use std::path::PathBuf;
use tensor_core::DType;

pub async fn execute(config_path: Option<PathBuf>, network: String, dtype: String) -> anyhow::Result<()> {
    let config = match &config_path {
        Some(path) => SweepConfig::from_file(path)?,
        None => SweepConfig::default(),
    };
    let dtype = DType::from_str_loose(&dtype)
        .ok_or_else(|| anyhow::anyhow!("unknown dtype '{dtype}' (expected float32 or float16)"))?;

    let resolved = scoring::resolve(&network, 1, dtype)?;
    let graph = Architecture::lookup(&resolved.descriptor.family)?
        .build(
            config.num_classes,
            &resolved.image_shape_csv(),
            resolved.descriptor.layer_count,
            dtype,
        )
        .with_context(|| format!("failed to build '{network}'"))?;

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              cnn-score · Network Inspector           ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Summary ────────────────────────────────────────────────
    println!("  Network: {}", graph.name);
    println!("  Family: {}", resolved.descriptor.family);
    println!("  Input: {}", resolved.image_shape);
    println!("  Layers: {}", graph.num_layers());
    println!("  Parameters: {:.2}M", graph.num_params() as f64 / 1e6);
    println!(
        "  Parameter memory: {:.2} MB",
        graph.total_param_bytes() as f64 / (1024.0 * 1024.0),
    );
    println!();

    // ── Per-Layer Detail ───────────────────────────────────────
    println!(
        "  {:<4} {:<34} {:<16} {:<20} {:>12}",
        "Idx", "Name", "Op", "Output", "Params",
    );
    println!("  {}", "-".repeat(90));

    for layer in graph.iter_layers() {
        println!(
            "  {:<4} {:<34} {:<16} {:<20} {:>12}",
            layer.index,
            truncate(&layer.name, 34),
            layer.op.as_str(),
            layer.output_shape.to_string(),
            layer.num_params(),
        );
    }
    println!();
    Ok(())
}

/// Truncates a string to `max_len` with ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("conv1", 10), "conv1");
        assert_eq!(truncate("stage4_unit3_conv3", 10), "stage4_...");
    }
}
