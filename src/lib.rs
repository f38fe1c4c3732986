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

use crate::context::Context;
use crate::reconcile::{error_policy, mapper, reconcile_claim};
use crate::types::v1alpha1::cluster_manager::ClusterManager;
use crate::types::v1alpha1::cluster_registration::ClusterRegistration;
use crate::types::v1alpha1::cluster_update_claim::ClusterUpdateClaim;
use futures::StreamExt;
use kube::CustomResourceExt;
use kube::runtime::{Controller, watcher};
use kube::{Api, Client};
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

mod context;
pub mod reconcile;
pub mod types;
pub mod utils;
pub mod webhook;

pub async fn run(webhook_options: webhook::Options) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    // the webhook listener and the kube client both need a process-wide
    // crypto provider; installing twice is harmless but must not panic
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider was already installed");
    }

    let client = Client::try_default().await?;
    let claims = Api::<ClusterUpdateClaim>::all(client.clone());

    let context = Context::new(client.clone());
    let admission_server = tokio::spawn(webhook::serve(webhook_options));

    let controller = Controller::new(claims, watcher::Config::default())
        // changes to a ClusterManager fan out to the claims indexed on it
        .reconcile_on(mapper::cluster_manager_triggers(client.clone()))
        .shutdown_on_signal()
        .run(reconcile_claim, error_policy, Arc::new(context))
        .for_each(|res| async move {
            match res {
                Ok((claim, _)) => info!("reconciled {}", claim.name),
                Err(e) => warn!("reconcile failed: {}", e),
            }
        });

    tokio::select! {
        _ = controller => info!("claim controller stream terminated"),
        served = admission_server => served??,
    }

    Ok(())
}

pub async fn crd(file: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer: Pin<Box<dyn AsyncWrite + Send>> = if let Some(file) = file {
        Box::pin(
            tokio::fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(file)
                .await?,
        )
    } else {
        Box::pin(tokio::io::stdout())
    };

    let documents = [
        serde_yaml_ng::to_string(&ClusterRegistration::crd())?,
        serde_yaml_ng::to_string(&ClusterManager::crd())?,
        serde_yaml_ng::to_string(&ClusterUpdateClaim::crd())?,
    ];

    writer.write_all(documents.join("---\n").as_bytes()).await?;

    Ok(())
}
