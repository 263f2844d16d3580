// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # cnn-score
//!
//! Command-line interface for the CNN inference throughput benchmark.
//!
//! ## Usage
//! ```bash
//! # Full default sweep
//! cnn-score
//!
//! # Narrow the sweep
//! cnn-score score --networks resnet-50,vgg-16 --batch-sizes 1,8 --num-batches 20
//!
//! # Inspect a network's layers
//! cnn-score inspect --network inception-v3
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cnn-score",
    about = "Inference throughput of CNN architectures across devices, batch sizes and precisions",
    version,
    author
)]
struct Cli {
    /// Path to a TOML sweep configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the throughput sweep (the default).
    Score {
        /// Comma-separated networks to score (e.g., "resnet-50,vgg-16").
        #[arg(long)]
        networks: Option<String>,

        /// Comma-separated batch sizes (e.g., "1,8,32").
        #[arg(long)]
        batch_sizes: Option<String>,

        /// Measured forward passes per cell.
        #[arg(long)]
        num_batches: Option<usize>,
    },

    /// Print a network's layer graph and parameter estimates.
    Inspect {
        /// Network name, e.g. "resnet-50".
        #[arg(short, long)]
        network: String,

        /// Precision to build the graph in.
        #[arg(short, long, default_value = "float32")]
        dtype: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        None => commands::score::execute(cli.config, None, None, None).await,
        Some(Commands::Score {
            networks,
            batch_sizes,
            num_batches,
        }) => commands::score::execute(cli.config, networks, batch_sizes, num_batches).await,
        Some(Commands::Inspect { network, dtype }) => {
            commands::inspect::execute(cli.config, network, dtype).await
        }
    }
}
