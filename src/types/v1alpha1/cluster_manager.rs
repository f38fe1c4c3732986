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

use kube::{CustomResource, KubeSchema};
use serde::{Deserialize, Serialize};

pub const GROUP: &str = "cluster.multicluster.io";

/// Label on ClusterUpdateClaim objects naming the owning ClusterManager.
///
/// The label is the only cross-resource join key: the claim controller
/// sets it on first reconcile and the dependent mapper selects on it when
/// a manager changes. It is an eventually-consistent index, not a
/// transactional one.
pub const CLUSTER_MANAGER_NAME_LABEL: &str =
    const_str::concat!("clustermanagers.", GROUP, "/cluster-name");

/// Desired-state record for a managed cluster.
///
/// The node counts are the single source of truth the platform reconciles
/// infrastructure toward; approved ClusterUpdateClaims are the only writer
/// of these fields inside this operator.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq)]
#[kube(
    group = "cluster.multicluster.io",
    version = "v1alpha1",
    kind = "ClusterManager",
    namespaced,
    shortname = "clm",
    plural = "clustermanagers",
    singular = "clustermanager",
    printcolumn = r#"{"name":"Provider", "type":"string", "jsonPath":".spec.provider"}"#,
    printcolumn = r#"{"name":"Masters", "type":"integer", "jsonPath":".spec.masterNum"}"#,
    printcolumn = r#"{"name":"Workers", "type":"integer", "jsonPath":".spec.workerNum"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#,
    crates(serde_json = "k8s_openapi::serde_json")
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterManagerSpec {
    /// Infrastructure provider the cluster runs on.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provider: String,

    /// Kubernetes version of the cluster.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Desired number of control-plane nodes.
    #[serde(default)]
    pub master_num: i32,

    /// Desired number of worker nodes.
    #[serde(default)]
    pub worker_num: i32,
}
