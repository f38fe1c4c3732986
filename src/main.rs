// Copyright 2026 Multicluster Operator Contributors
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

use clap::{Parser, Subcommand};
use multicluster_operator::webhook;
use multicluster_operator::{crd, run};
use shadow_rs::shadow;
use std::net::SocketAddr;
use std::path::PathBuf;

shadow!(build);

#[derive(Parser)]
#[command(name = "multicluster-op")]
#[command(version = build::PKG_VERSION)]
#[command(about = "Multicluster lifecycle operator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Output CRDs in YAML
    Crd {
        /// Optional output path. If not set, the output will be written to stdout.
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Run the claim controller and the admission webhook
    Server {
        /// Address the admission webhook listens on
        #[arg(long, default_value = "0.0.0.0:9443")]
        webhook_addr: SocketAddr,

        /// Path to the webhook serving certificate (PEM)
        #[arg(long, default_value = "/var/run/webhook/tls.crt")]
        tls_cert: PathBuf,

        /// Path to the webhook serving key (PEM)
        #[arg(long, default_value = "/var/run/webhook/tls.key")]
        tls_key: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crd { file } => crd(file).await?,
        Commands::Server {
            webhook_addr,
            tls_cert,
            tls_key,
        } => {
            run(webhook::Options {
                addr: webhook_addr,
                tls_cert,
                tls_key,
            })
            .await?
        }
    }

    Ok(())
}
