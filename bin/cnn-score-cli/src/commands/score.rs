// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `cnn-score score` command: run the throughput sweep.
//!
//! Starts from the configuration file (or the built-in sweep), narrows it
//! with any command-line overrides, and runs every cell on the host engine.
//! One record per cell is logged as it completes.

use anyhow::Context;
use engine::CpuEngine;
use scoring::SweepConfig;
use std::path::PathBuf;

pub async fn execute(
    config_path: Option<PathBuf>,
    networks: Option<String>,
    batch_sizes: Option<String>,
    num_batches: Option<usize>,
) -> anyhow::Result<()> {
    let mut config = match &config_path {
        Some(path) => SweepConfig::from_file(path)?,
        None => SweepConfig::default(),
    };

    if let Some(raw) = networks {
        config.networks = super::split_list(&raw);
    }
    if let Some(raw) = batch_sizes {
        config.batch_sizes = super::split_list(&raw)
            .iter()
            .map(|s| {
                s.parse::<usize>()
                    .map_err(|e| anyhow::anyhow!("invalid batch size '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
    }
    if let Some(n) = num_batches {
        config.num_batches = n;
    }
    config.validate().context("invalid sweep configuration")?;

    tracing::debug!(
        "sweep: networks {:?}, batch sizes {:?}, dtypes {:?}, {} measured passes",
        config.networks,
        config.batch_sizes,
        config.dtypes,
        config.num_batches
    );

    let config_networks = config.networks.clone();

    // Output handles block on the device worker, so the sweep must not run
    // on a runtime worker thread.
    let report = tokio::task::spawn_blocking(move || {
        let engine = CpuEngine::new(config.seed)?;
        scoring::run_sweep(&engine, &config).map_err(anyhow::Error::from)
    })
    .await
    .context("sweep task panicked")??;

    for network in &config_networks {
        if let Some(best) = report
            .for_network(network)
            .max_by(|a, b| a.images_per_second.total_cmp(&b.images_per_second))
        {
            tracing::info!("{network}: best {:.2} image/sec on {}", best.images_per_second, best.device);
        }
    }

    if let Some(best) = report.fastest() {
        tracing::info!(
            "done: {} cells scored, {} skipped; fastest {} on {} ({best})",
            report.results.len(),
            report.skipped.len(),
            best.workload.architecture,
            best.device
        );
    } else {
        tracing::warn!("done: no cell was scored ({} skipped)", report.skipped.len());
    }
    Ok(())
}
