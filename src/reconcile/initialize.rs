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

use crate::types::v1alpha1::cluster_manager::CLUSTER_MANAGER_NAME_LABEL;
use crate::types::v1alpha1::cluster_update_claim::{
    ClusterUpdateClaim, ClusterUpdateClaimPhase, REASON_AWAITING,
};
use std::collections::BTreeMap;

/// First-touch setup for a claim: owning-manager label and initial phase.
///
/// Each condition is checked on its own so repeated calls are no-ops once
/// the claim is initialized. Returns whether anything changed, so the
/// reconcile loop only writes back when needed.
pub fn initialize_claim(claim: &mut ClusterUpdateClaim) -> bool {
    let mut changed = false;

    let cluster_name = claim.spec.cluster_name.clone();
    let labels = claim.metadata.labels.get_or_insert_with(BTreeMap::new);
    if !labels.contains_key(CLUSTER_MANAGER_NAME_LABEL) {
        labels.insert(CLUSTER_MANAGER_NAME_LABEL.to_owned(), cluster_name);
        changed = true;
    }

    if claim.phase() == ClusterUpdateClaimPhase::Unset {
        claim.set_phase(ClusterUpdateClaimPhase::Awaiting, REASON_AWAITING);
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::create_test_claim;
    use crate::types::v1alpha1::cluster_update_claim::ClusterUpdateType;

    #[test]
    fn test_sets_label_and_phase_on_first_touch() {
        let mut claim = create_test_claim(ClusterUpdateType::NodeScale, 5, 0);

        assert!(initialize_claim(&mut claim));

        let labels = claim.metadata.labels.as_ref().unwrap();
        assert_eq!(
            labels.get(CLUSTER_MANAGER_NAME_LABEL).map(String::as_str),
            Some("test-cluster")
        );
        assert_eq!(claim.phase(), ClusterUpdateClaimPhase::Awaiting);
        assert_eq!(claim.status.as_ref().unwrap().reason, REASON_AWAITING);
    }

    #[test]
    fn test_idempotent_on_second_touch() {
        let mut claim = create_test_claim(ClusterUpdateType::NodeScale, 5, 0);

        assert!(initialize_claim(&mut claim));
        let labels_after_first = claim.metadata.labels.clone();
        let status_after_first = claim.status.clone();

        assert!(!initialize_claim(&mut claim));
        assert_eq!(claim.metadata.labels, labels_after_first);
        assert_eq!(
            claim.status.as_ref().unwrap().phase,
            status_after_first.as_ref().unwrap().phase
        );
        assert_eq!(
            claim.status.as_ref().unwrap().reason,
            status_after_first.as_ref().unwrap().reason
        );
    }

    #[test]
    fn test_existing_label_is_left_alone() {
        let mut claim = create_test_claim(ClusterUpdateType::NodeScale, 5, 0);
        claim.metadata.labels = Some(
            [(
                CLUSTER_MANAGER_NAME_LABEL.to_owned(),
                "already-set".to_owned(),
            )]
            .into(),
        );

        // phase still gets initialized, but the label is not overwritten
        assert!(initialize_claim(&mut claim));
        assert_eq!(
            claim
                .metadata
                .labels
                .as_ref()
                .unwrap()
                .get(CLUSTER_MANAGER_NAME_LABEL)
                .map(String::as_str),
            Some("already-set")
        );
    }

    #[test]
    fn test_approved_phase_is_not_reset() {
        let mut claim = create_test_claim(ClusterUpdateType::NodeScale, 5, 0);
        claim.set_phase(ClusterUpdateClaimPhase::Approved, "approved by admin");

        assert!(initialize_claim(&mut claim));
        assert_eq!(claim.phase(), ClusterUpdateClaimPhase::Approved);
        assert_eq!(claim.status.as_ref().unwrap().reason, "approved by admin");
    }
}
