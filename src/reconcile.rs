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
use crate::types::v1alpha1::cluster_manager::ClusterManager;
use crate::types::v1alpha1::cluster_update_claim::{
    ClusterUpdateClaim, ClusterUpdateClaimPhase, REASON_APPLIED,
};
use crate::{context, types};
use kube::runtime::controller::Action;
use kube::runtime::events::EventType;
use snafu::Snafu;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

pub mod apply;
pub mod initialize;
pub mod mapper;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(transparent)]
    Context { source: context::Error },

    #[snafu(transparent)]
    Types { source: types::error::Error },
}

/// Drive a ClusterUpdateClaim through its approval workflow.
///
/// The platform serializes reconciles per object, so this function owns
/// the claim for the duration of one attempt and takes no locks. Every
/// attempt starts from a fresh read; a Conflict on any write is retried
/// by the error policy with a new attempt, never by re-sending stale
/// state.
pub async fn reconcile_claim(
    claim: Arc<ClusterUpdateClaim>,
    ctx: Arc<Context>,
) -> Result<Action, Error> {
    let ns = claim.namespace()?;
    let mut latest = ctx.get::<ClusterUpdateClaim>(&claim.name(), &ns).await?;

    if latest.metadata.deletion_timestamp.is_some() {
        debug!(
            "claim {} is terminating, deletion_timestamp is {:?}",
            claim.name(),
            latest.metadata.deletion_timestamp
        );
        return Ok(Action::await_change());
    }

    // claims are one-shot: a terminal claim is never touched again
    if latest.phase().is_terminal() {
        return Ok(Action::await_change());
    }

    // the owning manager must exist before anything else happens
    let manager = ctx
        .get::<ClusterManager>(&latest.spec.cluster_name, &ns)
        .await?;

    if initialize::initialize_claim(&mut latest) {
        let status = latest.status.clone().unwrap_or_default();
        let updated = ctx.update(&latest, &ns).await?;
        ctx.update_claim_status(&updated, &status).await?;
        // our own writes re-trigger the watch, nothing more to do here
        return Ok(Action::await_change());
    }

    match latest.phase() {
        ClusterUpdateClaimPhase::Approved => {
            apply::apply_claim(&ctx, manager, &latest.spec, &ns).await?;

            let mut status = latest.status.clone().unwrap_or_default();
            status.phase = ClusterUpdateClaimPhase::Applied;
            status.reason = REASON_APPLIED.to_owned();
            let applied = ctx.update_claim_status(&latest, &status).await?;

            ctx.record(
                &applied,
                EventType::Normal,
                "ClaimApplied",
                &format!(
                    "cluster manager {} updated by claim {}",
                    latest.spec.cluster_name,
                    latest.name()
                ),
            )
            .await?;

            info!(
                claim = %latest.name(),
                cluster_manager = %latest.spec.cluster_name,
                "approved claim applied"
            );
            Ok(Action::await_change())
        }
        // Awaiting: approval happens outside this controller.
        // Unset/Rejected/Applied: already handled above.
        _ => Ok(Action::await_change()),
    }
}

pub fn error_policy(
    _claim: Arc<ClusterUpdateClaim>,
    error: &Error,
    _ctx: Arc<Context>,
) -> Action {
    if let Error::Context { source } = error {
        if source.is_conflict() {
            // re-read and recompute on the next attempt
            debug!("write conflict, requeueing for a fresh read: {}", source);
            return Action::requeue(Duration::from_secs(1));
        }
        if source.is_not_found() {
            // owning manager not visible yet; the label index catches up
            // eventually and the manager watch requeues us as well
            debug!("dependent object not found, requeueing: {}", source);
            return Action::requeue(Duration::from_secs(30));
        }
    }

    error!("error_policy: {:?}", error);
    Action::requeue(Duration::from_secs(5))
}
