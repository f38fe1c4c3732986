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

use crate::types::v1alpha1::cluster_manager::{CLUSTER_MANAGER_NAME_LABEL, ClusterManager};
use crate::types::v1alpha1::cluster_update_claim::ClusterUpdateClaim;
use async_trait::async_trait;
use futures::{Stream, StreamExt, stream};
use kube::api::ListParams;
use kube::runtime::reflector::ObjectRef;
use kube::runtime::{WatchStreamExt, watcher};
use kube::{Api, Client, ResourceExt};
#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};

/// Listing seam for the trigger mapping.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClaimLister: Send + Sync {
    async fn list_claims(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<ClusterUpdateClaim>, kube::Error>;
}

/// Real lister backed by the API server.
#[derive(Clone)]
pub struct ApiClaimLister {
    client: Client,
}

impl ApiClaimLister {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClaimLister for ApiClaimLister {
    async fn list_claims(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<ClusterUpdateClaim>, kube::Error> {
        let api: Api<ClusterUpdateClaim> = Api::namespaced(self.client.clone(), namespace);
        Ok(api
            .list(&ListParams::default().labels(selector))
            .await?
            .items)
    }
}

/// Trigger stream for the claim controller: every observed change to a
/// ClusterManager fans out to the claims indexed under it, so dependents
/// are re-evaluated when their manager changes or goes away.
pub fn cluster_manager_triggers(
    client: Client,
) -> impl Stream<Item = ObjectRef<ClusterUpdateClaim>> {
    let managers: Api<ClusterManager> = Api::all(client.clone());
    let lister = ApiClaimLister::new(client);

    watcher(managers, watcher::Config::default())
        .default_backoff()
        .touched_objects()
        .then(move |manager| {
            let lister = lister.clone();
            async move {
                match manager {
                    Ok(manager) => claims_for_cluster_manager(&lister, &manager).await,
                    Err(error) => {
                        warn!(%error, "cluster manager watch error");
                        Vec::new()
                    }
                }
            }
        })
        .map(stream::iter)
        .flatten()
}

/// Resolve the claims owned by a manager via the name label index.
///
/// A listing failure is logged and mapped to an empty set instead of
/// tearing down the trigger stream; the missed requeue is recovered the
/// next time the claim itself is reconciled.
pub async fn claims_for_cluster_manager<L>(
    lister: &L,
    manager: &ClusterManager,
) -> Vec<ObjectRef<ClusterUpdateClaim>>
where
    L: ClaimLister + ?Sized,
{
    let Some(namespace) = manager.namespace() else {
        return Vec::new();
    };
    let name = manager.name_any();

    debug!(cluster_manager = %name, "mapping cluster manager to dependent claims");

    let selector = format!("{CLUSTER_MANAGER_NAME_LABEL}={name}");
    match lister.list_claims(&namespace, &selector).await {
        Ok(claims) => claim_refs(&claims),
        Err(error) => {
            warn!(%error, cluster_manager = %name, "failed to list dependent cluster update claims");
            Vec::new()
        }
    }
}

/// Convert listed claims into reconcile keys.
pub fn claim_refs(claims: &[ClusterUpdateClaim]) -> Vec<ObjectRef<ClusterUpdateClaim>> {
    claims.iter().map(ObjectRef::from_obj).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_claim, create_test_manager};
    use crate::types::v1alpha1::cluster_update_claim::ClusterUpdateType;
    use kube::core::{Status, response::StatusSummary};

    #[test]
    fn test_claim_refs_keeps_namespace_and_name() {
        let mut first = create_test_claim(ClusterUpdateType::NodeScale, 5, 0);
        first.metadata.name = Some("scale-up".to_owned());
        let mut second = create_test_claim(ClusterUpdateType::NodeScale, 0, 9);
        second.metadata.name = Some("scale-out".to_owned());

        let refs = claim_refs(&[first, second]);

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name, "scale-up");
        assert_eq!(refs[0].namespace.as_deref(), Some("default"));
        assert_eq!(refs[1].name, "scale-out");
    }

    #[test]
    fn test_claim_refs_of_empty_list_is_empty() {
        assert!(claim_refs(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_lists_claims_by_owning_manager_label() {
        let manager = create_test_manager(3, 2);

        let mut lister = MockClaimLister::new();
        lister
            .expect_list_claims()
            .withf(|namespace, selector| {
                namespace == "default"
                    && selector == format!("{CLUSTER_MANAGER_NAME_LABEL}=test-cluster")
            })
            .return_once(|_, _| {
                let mut claim = create_test_claim(ClusterUpdateType::NodeScale, 5, 0);
                claim.metadata.name = Some("scale-up".to_owned());
                Ok(vec![claim])
            });

        let refs = claims_for_cluster_manager(&lister, &manager).await;

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "scale-up");
        assert_eq!(refs[0].namespace.as_deref(), Some("default"));
    }

    #[tokio::test]
    async fn test_list_failure_maps_to_empty_set() {
        let manager = create_test_manager(3, 2);

        let mut lister = MockClaimLister::new();
        lister.expect_list_claims().return_once(|_, _| {
            Err(kube::Error::Api(Box::new(Status {
                status: Some(StatusSummary::Failure),
                message: "etcdserver: request timed out".to_owned(),
                reason: "InternalError".to_owned(),
                code: 500,
                details: None,
                metadata: None,
            })))
        });

        let refs = claims_for_cluster_manager(&lister, &manager).await;

        assert!(refs.is_empty());
    }

    #[tokio::test]
    async fn test_manager_without_namespace_skips_listing() {
        let mut manager = create_test_manager(3, 2);
        manager.metadata.namespace = None;

        // no expectations: any listing call would panic the mock
        let lister = MockClaimLister::new();

        assert!(claims_for_cluster_manager(&lister, &manager).await.is_empty());
    }
}
