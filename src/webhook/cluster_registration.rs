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

use crate::types::v1alpha1::cluster_registration::{
    ClusterRegistration, ClusterRegistrationPhase,
};
use axum::Json;
use kube::api::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use regex::Regex;
use snafu::Snafu;
use std::sync::LazyLock;
use tracing::{error, info, warn};

/// DNS-1123 subdomain grammar; a registration's clusterName becomes the
/// metadata.name of its ClusterManager, so it has to satisfy object-name
/// rules before anything is persisted.
const DNS1123_SUBDOMAIN_PATTERN: &str =
    r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$";

const DNS1123_SUBDOMAIN_DETAIL: &str = "a DNS-1123 subdomain must consist of lower case alphanumeric characters, '-' or '.', and must start and end with an alphanumeric character (e.g. 'example.com', regex used for validation is '[a-z0-9]([-a-z0-9]*[a-z0-9])?(\\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*')";

const MAX_CLUSTER_NAME_LEN: usize = 253;

static DNS1123_SUBDOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(DNS1123_SUBDOMAIN_PATTERN).expect("DNS-1123 subdomain pattern is valid")
});

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("{}: Invalid value: \"{}\": {}", field, value, detail))]
    InvalidField {
        field: String,
        value: String,
        detail: String,
    },

    #[snafu(display("cannot modify ClusterRegistration after approval"))]
    ImmutableField,
}

/// Admission endpoint for ClusterRegistration create/update/delete.
pub async fn validate_handler(
    Json(body): Json<AdmissionReview<ClusterRegistration>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let request: AdmissionRequest<ClusterRegistration> = match body.try_into() {
        Ok(request) => request,
        Err(error) => {
            error!(%error, "failed to parse admission request");
            return Json(AdmissionResponse::invalid(error.to_string()).into_review());
        }
    };

    Json(review(&request).into_review())
}

/// Decide a single admission request. Pure over the request contents.
pub fn review(request: &AdmissionRequest<ClusterRegistration>) -> AdmissionResponse {
    let response = AdmissionResponse::from(request);

    let verdict = match request.operation {
        Operation::Create => match &request.object {
            Some(new) => validate_create(new),
            None => Ok(()),
        },
        Operation::Update => match (&request.object, &request.old_object) {
            (Some(new), Some(old)) => validate_update(new, old),
            _ => Ok(()),
        },
        Operation::Delete => match &request.old_object {
            Some(old) => validate_delete(old),
            None => Ok(()),
        },
        Operation::Connect => Ok(()),
    };

    match verdict {
        Ok(()) => response,
        Err(error) => {
            warn!(name = %request.name, %error, "denying cluster registration request");
            response.deny(error.to_string())
        }
    }
}

pub fn validate_create(new: &ClusterRegistration) -> Result<(), Error> {
    info!(name = %new.spec.cluster_name, "validate cluster registration create");
    validate_cluster_name(&new.spec.cluster_name)
}

/// Name grammar and length bound. The checks are independent; both have
/// to pass, and the first failure is reported.
pub fn validate_cluster_name(name: &str) -> Result<(), Error> {
    if !DNS1123_SUBDOMAIN.is_match(name) {
        return InvalidFieldSnafu {
            field: "spec.clusterName",
            value: name,
            detail: DNS1123_SUBDOMAIN_DETAIL,
        }
        .fail();
    }

    if name.len() > MAX_CLUSTER_NAME_LEN {
        return InvalidFieldSnafu {
            field: "spec.clusterName",
            value: name,
            detail: "must be no more than 253 characters",
        }
        .fail();
    }

    Ok(())
}

/// Post-approval immutability: once a registration reached Success or
/// Deleted its spec is frozen. A terminating object stays mutable so
/// finalizer cleanup can proceed.
pub fn validate_update(new: &ClusterRegistration, old: &ClusterRegistration) -> Result<(), Error> {
    info!(name = %new.spec.cluster_name, "validate cluster registration update");

    if new.metadata.deletion_timestamp.is_some() {
        return Ok(());
    }

    match old.phase() {
        ClusterRegistrationPhase::Success | ClusterRegistrationPhase::Deleted => {
            if old.spec != new.spec {
                return ImmutableFieldSnafu.fail();
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Deletion is always permitted; kept as the hook point for a future
/// deletion policy.
pub fn validate_delete(old: &ClusterRegistration) -> Result<(), Error> {
    info!(name = %old.spec.cluster_name, "validate cluster registration delete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::create_test_registration;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

    fn admission_request(
        operation: &str,
        object: Option<&ClusterRegistration>,
        old_object: Option<&ClusterRegistration>,
    ) -> AdmissionRequest<ClusterRegistration> {
        let review: AdmissionReview<ClusterRegistration> =
            serde_json::from_value(serde_json::json!({
                "apiVersion": "admission.k8s.io/v1",
                "kind": "AdmissionReview",
                "request": {
                    "uid": "test-uid-123",
                    "kind": {
                        "group": "cluster.multicluster.io",
                        "version": "v1alpha1",
                        "kind": "ClusterRegistration"
                    },
                    "resource": {
                        "group": "cluster.multicluster.io",
                        "version": "v1alpha1",
                        "resource": "clusterregistrations"
                    },
                    "name": "test-registration",
                    "namespace": "default",
                    "operation": operation,
                    "userInfo": {},
                    "object": object,
                    "oldObject": old_object,
                    "dryRun": false
                }
            }))
            .expect("valid admission review fixture");
        review.try_into().expect("review carries a request")
    }

    #[test]
    fn test_subdomain_names_are_accepted() {
        assert!(validate_cluster_name("my-cluster.example").is_ok());
        assert!(validate_cluster_name("a").is_ok());
        assert!(validate_cluster_name("cluster-01").is_ok());
        assert!(validate_cluster_name("0leading.digit").is_ok());
    }

    #[test]
    fn test_bad_grammar_is_rejected_with_field_and_detail() {
        let error = validate_cluster_name("-bad-").unwrap_err();
        match &error {
            Error::InvalidField {
                field,
                value,
                detail,
            } => {
                assert_eq!(field, "spec.clusterName");
                assert_eq!(value, "-bad-");
                assert!(detail.contains("DNS-1123"));
            }
            other => panic!("expected InvalidField, got {other:?}"),
        }

        assert!(validate_cluster_name("UpperCase").is_err());
        assert!(validate_cluster_name("trailing.dot.").is_err());
        assert!(validate_cluster_name("under_score").is_err());
        assert!(validate_cluster_name("").is_err());
    }

    #[test]
    fn test_overlong_name_is_rejected() {
        let name = "a".repeat(254);
        let error = validate_cluster_name(&name).unwrap_err();
        match &error {
            Error::InvalidField { detail, .. } => {
                assert_eq!(detail, "must be no more than 253 characters");
            }
            other => panic!("expected InvalidField, got {other:?}"),
        }

        // grammar and length are independent checks
        assert!(validate_cluster_name(&"a".repeat(253)).is_ok());
    }

    #[test]
    fn test_update_frozen_after_success() {
        let old = create_test_registration("a", Some(ClusterRegistrationPhase::Success));
        let mut new = old.clone();
        new.spec.cluster_name = "b".to_owned();

        let error = validate_update(&new, &old).unwrap_err();
        assert!(error.to_string().contains("cannot modify"));
        assert!(error.to_string().contains("after approval"));
    }

    #[test]
    fn test_update_frozen_after_deleted_phase() {
        let old = create_test_registration("a", Some(ClusterRegistrationPhase::Deleted));
        let mut new = old.clone();
        new.spec.kube_config = "bmV3LWNvbmZpZw==".to_owned();

        assert!(validate_update(&new, &old).is_err());
    }

    #[test]
    fn test_update_with_identical_spec_is_allowed() {
        let old = create_test_registration("a", Some(ClusterRegistrationPhase::Success));
        let new = old.clone();

        assert!(validate_update(&new, &old).is_ok());
    }

    #[test]
    fn test_update_before_approval_is_allowed() {
        let old = create_test_registration("a", Some(ClusterRegistrationPhase::Pending));
        let mut new = old.clone();
        new.spec.cluster_name = "b".to_owned();

        assert!(validate_update(&new, &old).is_ok());

        let old = create_test_registration("a", None);
        assert!(validate_update(&new, &old).is_ok());
    }

    #[test]
    fn test_terminating_object_stays_mutable() {
        let old = create_test_registration("a", Some(ClusterRegistrationPhase::Success));
        let mut new = old.clone();
        new.spec.cluster_name = "b".to_owned();
        new.metadata.deletion_timestamp = Some(metav1::Time(k8s_openapi::jiff::Timestamp::now()));

        assert!(validate_update(&new, &old).is_ok());
    }

    #[test]
    fn test_review_allows_valid_create() {
        let registration = create_test_registration("my-cluster.example", None);
        let request = admission_request("CREATE", Some(&registration), None);

        let response = review(&request);
        assert!(response.allowed);
    }

    #[test]
    fn test_review_denies_bad_name_on_create() {
        let registration = create_test_registration("-bad-", None);
        let request = admission_request("CREATE", Some(&registration), None);

        let response = review(&request);
        assert!(!response.allowed);
        assert!(response.result.message.contains("spec.clusterName"));
        assert!(response.result.message.contains("DNS-1123"));
    }

    #[test]
    fn test_review_denies_spec_change_after_approval() {
        let old = create_test_registration("a", Some(ClusterRegistrationPhase::Success));
        let mut new = old.clone();
        new.spec.cluster_name = "b".to_owned();
        let request = admission_request("UPDATE", Some(&new), Some(&old));

        let response = review(&request);
        assert!(!response.allowed);
        assert!(response.result.message.contains("after approval"));
    }

    #[test]
    fn test_review_allows_delete() {
        let registration =
            create_test_registration("my-cluster", Some(ClusterRegistrationPhase::Success));
        let request = admission_request("DELETE", None, Some(&registration));

        let response = review(&request);
        assert!(response.allowed);
    }
}
