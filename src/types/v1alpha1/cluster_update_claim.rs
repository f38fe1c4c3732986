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

use crate::types;
use crate::types::error::NoNamespaceSnafu;
use k8s_openapi::schemars::JsonSchema;
use kube::{CustomResource, KubeSchema, ResourceExt};
use serde::{Deserialize, Serialize};
use snafu::OptionExt;
use strum::Display;

/// Status reason set when a claim enters the approval queue.
pub const REASON_AWAITING: &str = "Waiting for admin approval";

/// Status reason set once an approved claim has been applied.
pub const REASON_APPLIED: &str = "Requested update applied to cluster manager";

/// A single proposed mutation to a ClusterManager.
///
/// Claims are one-shot request objects: created by a user or automation,
/// approved or rejected by an admin, and applied exactly once. A further
/// change needs a new claim.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, KubeSchema, Default)]
#[kube(
    group = "claim.multicluster.io",
    version = "v1alpha1",
    kind = "ClusterUpdateClaim",
    namespaced,
    status = "ClusterUpdateClaimStatus",
    shortname = "cuc",
    plural = "clusterupdateclaims",
    singular = "clusterupdateclaim",
    printcolumn = r#"{"name":"Cluster", "type":"string", "jsonPath":".spec.clusterName"}"#,
    printcolumn = r#"{"name":"Type", "type":"string", "jsonPath":".spec.updateType"}"#,
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Reason", "type":"string", "jsonPath":".status.reason"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#,
    crates(serde_json = "k8s_openapi::serde_json")
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterUpdateClaimSpec {
    /// Name of the ClusterManager this claim targets.
    pub cluster_name: String,

    /// Kind of change requested.
    pub update_type: ClusterUpdateType,

    /// Requested control-plane node count; 0 means "leave unchanged".
    #[serde(default)]
    pub expected_master_num: i32,

    /// Requested worker node count; 0 means "leave unchanged".
    #[serde(default)]
    pub expected_worker_num: i32,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, KubeSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterUpdateClaimStatus {
    #[serde(default)]
    pub phase: ClusterUpdateClaimPhase,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

#[derive(Default, Deserialize, Serialize, Clone, Debug, JsonSchema, Display, PartialEq, Eq)]
pub enum ClusterUpdateType {
    #[default]
    NodeScale,

    /// Claim types introduced by newer API revisions deserialize here and
    /// are applied as no-ops instead of failing the reconcile.
    #[serde(other)]
    Unknown,
}

/// Workflow phase of a claim. Moves strictly forward:
/// unset -> Awaiting -> Approved | Rejected -> Applied.
/// `Applied` and `Rejected` are terminal.
#[derive(Default, Deserialize, Serialize, Clone, Debug, JsonSchema, Display, PartialEq, Eq)]
pub enum ClusterUpdateClaimPhase {
    /// Not yet touched by the controller; persisted as the empty string.
    #[default]
    #[serde(rename = "")]
    #[strum(to_string = "")]
    Unset,

    Awaiting,

    Approved,

    Rejected,

    Applied,
}

impl ClusterUpdateClaimPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Applied | Self::Rejected)
    }
}

impl ClusterUpdateClaim {
    pub fn namespace(&self) -> Result<String, types::error::Error> {
        ResourceExt::namespace(self).context(NoNamespaceSnafu)
    }

    pub fn name(&self) -> String {
        ResourceExt::name_any(self)
    }

    pub fn phase(&self) -> ClusterUpdateClaimPhase {
        self.status
            .as_ref()
            .map(|status| status.phase.clone())
            .unwrap_or_default()
    }

    pub fn set_phase(&mut self, phase: ClusterUpdateClaimPhase, reason: &str) {
        let status = self.status.get_or_insert_with(Default::default);
        status.phase = phase;
        status.reason = reason.to_owned();
    }
}
