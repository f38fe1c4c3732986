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
use crate::types::v1alpha1::cluster_update_claim::{ClusterUpdateClaim, ClusterUpdateClaimStatus};
use k8s_openapi::NamespaceResourceScope;
use kube::api::PostParams;
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use kube::{Resource, ResourceExt, api::Api};
use serde::Serialize;
use serde::de::DeserializeOwned;
use snafu::Snafu;
use snafu::futures::TryFutureExt;
use std::fmt::Debug;
use tracing::info;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Kubernetes API error: {}", source))]
    Kube { source: kube::Error },

    #[snafu(display("record event error: {}", source))]
    Record { source: kube::Error },

    #[snafu(transparent)]
    Types { source: types::error::Error },

    #[snafu(transparent)]
    Serde { source: serde_json::Error },
}

impl Error {
    fn api_code(&self) -> Option<u16> {
        match self {
            Error::Kube {
                source: kube::Error::Api(response),
            } => Some(response.code),
            _ => None,
        }
    }

    /// Optimistic-concurrency failure: the object changed since it was read.
    pub fn is_conflict(&self) -> bool {
        self.api_code() == Some(409)
    }

    pub fn is_not_found(&self) -> bool {
        self.api_code() == Some(404)
    }
}

pub struct Context {
    pub(crate) client: kube::Client,
    pub(crate) recorder: Recorder,
}

impl Context {
    pub fn new(client: kube::Client) -> Self {
        let reporter = Reporter {
            controller: "multicluster-operator".into(),
            instance: std::env::var("HOSTNAME").ok(),
        };

        let recorder = Recorder::new(client.clone(), reporter);
        Self { client, recorder }
    }

    /// send event
    #[inline]
    pub async fn record<T>(
        &self,
        resource: &T,
        event_type: EventType,
        reason: &str,
        message: &str,
    ) -> Result<(), Error>
    where
        T: Resource<DynamicType = ()>,
    {
        self.recorder
            .publish(
                &Event {
                    type_: event_type,
                    reason: reason.to_owned(),
                    note: Some(message.into()),
                    action: "Reconcile".into(),
                    secondary: None,
                },
                &resource.object_ref(&()),
            )
            .context(RecordSnafu)
            .await
    }

    pub async fn get<T>(&self, name: &str, namespace: &str) -> Result<T, Error>
    where
        T: Clone + DeserializeOwned + Debug + Resource<Scope = NamespaceResourceScope>,
        <T as kube::Resource>::DynamicType: Default,
    {
        let api: Api<T> = Api::namespaced(self.client.clone(), namespace);
        api.get(name).context(KubeSnafu).await
    }

    /// Replace an object. The write carries the resource version last read,
    /// so a stale object fails with 409 Conflict and the caller has to
    /// re-read and recompute before retrying.
    pub async fn update<T>(&self, resource: &T, namespace: &str) -> Result<T, Error>
    where
        T: Clone + Serialize + DeserializeOwned + Debug + Resource<Scope = NamespaceResourceScope>,
        <T as kube::Resource>::DynamicType: Default,
    {
        let api: Api<T> = Api::namespaced(self.client.clone(), namespace);
        api.replace(&resource.name_any(), &PostParams::default(), resource)
            .context(KubeSnafu)
            .await
    }

    pub async fn update_claim_status(
        &self,
        claim: &ClusterUpdateClaim,
        status: &ClusterUpdateClaimStatus,
    ) -> Result<ClusterUpdateClaim, Error> {
        let api: Api<ClusterUpdateClaim> =
            Api::namespaced(self.client.clone(), &claim.namespace()?);
        let name = &claim.name();

        let update_func = async |claim: &ClusterUpdateClaim| {
            let mut latest = claim.clone();
            latest.status = Some(status.clone());

            api.replace_status(name, &PostParams::default(), &latest)
                .context(KubeSnafu)
                .await
        };

        match update_func(claim).await {
            Ok(updated) => return Ok(updated),
            Err(error) if error.is_conflict() => {
                info!(
                    "status update failed due to conflict, retrieve the latest resource and retry: {}",
                    error
                );
            }
            Err(error) => return Err(error),
        }

        let new_one = api.get(name).context(KubeSnafu).await?;
        update_func(&new_one).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::{Status, response::StatusSummary};

    fn api_error(code: u16) -> Error {
        Error::Kube {
            source: kube::Error::Api(Box::new(Status {
                status: Some(StatusSummary::Failure),
                message: "api failure".to_owned(),
                reason: "TestReason".to_owned(),
                code,
                details: None,
                metadata: None,
            })),
        }
    }

    // the status-update retry and the error policy both key off these
    #[test]
    fn test_only_conflict_qualifies_for_status_retry() {
        assert!(api_error(409).is_conflict());
        assert!(!api_error(404).is_conflict());
        assert!(!api_error(500).is_conflict());
    }

    #[test]
    fn test_not_found_detection() {
        assert!(api_error(404).is_not_found());
        assert!(!api_error(409).is_not_found());
    }
}
