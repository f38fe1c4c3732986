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

use crate::context;
use crate::context::Context;
use crate::types::v1alpha1::cluster_manager::{ClusterManager, ClusterManagerSpec};
use crate::types::v1alpha1::cluster_update_claim::{ClusterUpdateClaimSpec, ClusterUpdateType};

/// Compute the field-level delta an approved claim requests.
///
/// Dispatches on the update type; each variant owns its delta function so
/// new claim types slot in without touching existing arms.
pub fn apply_update(manager: &mut ClusterManager, claim: &ClusterUpdateClaimSpec) {
    match claim.update_type {
        ClusterUpdateType::NodeScale => scale_nodes(
            &mut manager.spec,
            claim.expected_master_num,
            claim.expected_worker_num,
        ),
        // Claim types from newer API revisions: accepted, applied as no-ops.
        ClusterUpdateType::Unknown => {}
    }
}

/// Node-scale delta. A requested count of 0 means "no change requested",
/// so an existing count is never overwritten with zero.
fn scale_nodes(spec: &mut ClusterManagerSpec, master_num: i32, worker_num: i32) {
    if master_num != 0 {
        spec.master_num = master_num;
    }

    if worker_num != 0 {
        spec.worker_num = worker_num;
    }
}

/// Apply an approved claim to its target manager and persist the result.
///
/// The replace carries the resource version the manager was read at; a
/// concurrent write surfaces as a Conflict error and the reconcile loop
/// retries from a fresh read. The claim itself is never persisted here;
/// the phase transition to Applied belongs to the caller.
pub async fn apply_claim(
    ctx: &Context,
    mut manager: ClusterManager,
    claim: &ClusterUpdateClaimSpec,
    namespace: &str,
) -> Result<ClusterManager, context::Error> {
    apply_update(&mut manager, claim);
    ctx.update(&manager, namespace).await
}
