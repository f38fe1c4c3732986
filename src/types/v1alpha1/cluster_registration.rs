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

use k8s_openapi::schemars::JsonSchema;
use kube::{CustomResource, KubeSchema};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Request to register an externally-created cluster with the platform.
///
/// `spec.clusterName` becomes the `metadata.name` of the ClusterManager
/// created for the cluster, so it has to satisfy the DNS-1123 subdomain
/// rules enforced by the admission webhook.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq)]
#[kube(
    group = "cluster.multicluster.io",
    version = "v1alpha1",
    kind = "ClusterRegistration",
    namespaced,
    status = "ClusterRegistrationStatus",
    shortname = "clr",
    plural = "clusterregistrations",
    singular = "clusterregistration",
    printcolumn = r#"{"name":"Cluster", "type":"string", "jsonPath":".spec.clusterName"}"#,
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#,
    crates(serde_json = "k8s_openapi::serde_json")
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRegistrationSpec {
    /// Name the registered cluster will be managed under.
    pub cluster_name: String,

    /// Base64-encoded kubeconfig for the cluster being registered.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kube_config: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, KubeSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRegistrationStatus {
    #[serde(default)]
    pub phase: ClusterRegistrationPhase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Registration lifecycle. Once a registration reaches `Success` or
/// `Deleted` its spec is frozen by the admission webhook.
#[derive(Default, Deserialize, Serialize, Clone, Debug, JsonSchema, Display, PartialEq, Eq)]
pub enum ClusterRegistrationPhase {
    #[default]
    Pending,

    Success,

    Failed,

    Deleted,
}

impl ClusterRegistration {
    /// Last persisted phase, `Pending` when the status block is absent.
    pub fn phase(&self) -> ClusterRegistrationPhase {
        self.status
            .as_ref()
            .map(|status| status.phase.clone())
            .unwrap_or_default()
    }
}
