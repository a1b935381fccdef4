//! Identity matching between source and target extracts.
//!
//! A source row matches the first target row, in target extract order, for
//! which either its external id or its natural key is equal. The two
//! criteria are alternatives, not a ranking: a natural-key hit on an earlier
//! row wins over an external-id hit further down.

use datasync_core::{
    SourceComponent, SourcePerson, SourceProposal, SourceProposalPerson, SourceSession,
    SourceSessionPerson, SourceSessionType, TargetComponent, TargetPerson, TargetProposal,
    TargetProposalPerson, TargetSession, TargetSessionPerson, TargetSessionType,
};

/// Identity comparison of a source row against target rows of type `T`.
pub trait Matches<T> {
    /// Both rows carry the same durable external identity.
    fn same_external_id(&self, target: &T) -> bool;

    /// Both rows agree on the business key used before the records were linked.
    fn same_natural_key(&self, _target: &T) -> bool {
        false
    }
}

/// Which criterion paired the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    ExternalId,
    NaturalKey,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a, T> {
    pub target: &'a T,
    pub by: MatchedBy,
}

/// Returns the first target row denoting the same entity as `source`.
pub fn find_match<'a, S, T>(source: &S, targets: &'a [T]) -> Option<Match<'a, T>>
where
    S: Matches<T>,
{
    targets.iter().find_map(|target| {
        if source.same_external_id(target) {
            Some(Match {
                target,
                by: MatchedBy::ExternalId,
            })
        } else if source.same_natural_key(target) {
            Some(Match {
                target,
                by: MatchedBy::NaturalKey,
            })
        } else {
            None
        }
    })
}

impl Matches<TargetProposal> for SourceProposal {
    fn same_external_id(&self, target: &TargetProposal) -> bool {
        target.external_id == Some(self.external_id)
    }

    fn same_natural_key(&self, target: &TargetProposal) -> bool {
        self.name == target.name
    }
}

impl Matches<TargetSession> for SourceSession {
    fn same_external_id(&self, target: &TargetSession) -> bool {
        target.external_id == Some(self.external_id)
    }

    fn same_natural_key(&self, target: &TargetSession) -> bool {
        self.visit_id == target.visit_id
    }
}

impl Matches<TargetPerson> for SourcePerson {
    fn same_external_id(&self, target: &TargetPerson) -> bool {
        target.external_id == Some(self.external_id)
    }

    fn same_natural_key(&self, target: &TargetPerson) -> bool {
        self.login.is_some() && self.login == target.login
    }
}

impl Matches<TargetComponent> for SourceComponent {
    fn same_external_id(&self, target: &TargetComponent) -> bool {
        target.external_id == Some(self.external_id)
    }

    /// Only proteins not yet linked to any component are candidates.
    fn same_natural_key(&self, target: &TargetComponent) -> bool {
        target.external_id.is_none()
            && target.proposal_external_id == Some(self.proposal_external_id)
            && target.acronym.as_deref() == Some(self.acronym.as_str())
    }
}

impl Matches<TargetSessionType> for SourceSessionType {
    fn same_external_id(&self, target: &TargetSessionType) -> bool {
        target.session_external_id == Some(self.session_external_id)
            && target.type_name == self.type_name
    }
}

impl Matches<TargetProposalPerson> for SourceProposalPerson {
    fn same_external_id(&self, target: &TargetProposalPerson) -> bool {
        target.proposal_external_id == self.proposal_external_id
            && target.person_external_id == self.person_external_id
    }
}

impl Matches<TargetSessionPerson> for SourceSessionPerson {
    fn same_external_id(&self, target: &TargetSessionPerson) -> bool {
        target.session_external_id == self.session_external_id
            && target.person_external_id == self.person_external_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datasync_core::{ExternalId, LifecycleState};

    fn id(hex: &str) -> ExternalId {
        ExternalId::parse(hex).unwrap()
    }

    const A: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
    const B: &str = "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

    fn source_proposal(name: &str, hex: &str) -> SourceProposal {
        SourceProposal {
            name: name.into(),
            external_id: id(hex),
            title: None,
            state: LifecycleState::Open,
        }
    }

    fn target_proposal(name: &str, hex: Option<&str>, proposal_id: i64) -> TargetProposal {
        TargetProposal {
            name: name.into(),
            external_id: hex.map(id),
            title: None,
            proposal_id,
        }
    }

    #[test]
    fn test_matches_on_external_id_despite_different_name() {
        let targets = vec![target_proposal("mx99", Some(A), 7)];
        let found = find_match(&source_proposal("nt20", A), &targets).unwrap();
        assert_eq!(found.target.proposal_id, 7);
        assert_eq!(found.by, MatchedBy::ExternalId);
    }

    #[test]
    fn test_matches_on_name_despite_different_external_id() {
        let targets = vec![target_proposal("nt20", Some(B), 7)];
        let found = find_match(&source_proposal("nt20", A), &targets).unwrap();
        assert_eq!(found.by, MatchedBy::NaturalKey);
    }

    #[test]
    fn test_first_target_in_extract_order_wins() {
        let targets = vec![
            target_proposal("nt20", None, 1),
            target_proposal("xx1", Some(A), 2),
        ];
        let found = find_match(&source_proposal("nt20", A), &targets).unwrap();
        assert_eq!(found.target.proposal_id, 1);
    }

    #[test]
    fn test_no_match() {
        let targets = vec![target_proposal("mx1", Some(B), 1)];
        assert!(find_match(&source_proposal("nt20", A), &targets).is_none());
    }

    #[test]
    fn test_person_without_login_matches_by_external_id_only() {
        let source = SourcePerson {
            external_id: id(A),
            login: None,
            title: None,
            given_name: None,
            family_name: None,
        };
        let target = TargetPerson {
            external_id: None,
            login: None,
            title: None,
            given_name: None,
            family_name: None,
            person_id: 1,
        };
        assert!(find_match(&source, &[target]).is_none());
    }

    #[test]
    fn test_component_natural_key_requires_unlinked_protein() {
        let source = SourceComponent {
            external_id: id(A),
            proposal_external_id: id(B),
            name: None,
            acronym: "lyso".into(),
            state: LifecycleState::Accepted,
        };
        let unlinked = TargetComponent {
            external_id: None,
            proposal_external_id: Some(id(B)),
            name: None,
            acronym: Some("lyso".into()),
            protein_id: 3,
        };
        let linked_elsewhere = TargetComponent {
            external_id: Some(id("CCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC")),
            ..unlinked.clone()
        };

        assert_eq!(
            find_match(&source, std::slice::from_ref(&unlinked))
                .unwrap()
                .by,
            MatchedBy::NaturalKey
        );
        assert!(find_match(&source, &[linked_elsewhere]).is_none());
    }

    #[test]
    fn test_associations_match_on_the_pair_only() {
        let source = SourceProposalPerson {
            proposal_external_id: id(A),
            person_external_id: id(B),
            role: "TEAM_LEADER".into(),
        };
        let same_pair = TargetProposalPerson {
            proposal_external_id: id(A),
            person_external_id: id(B),
            role: Some("Team Member".into()),
            proposal_id: 1,
            person_id: 2,
        };
        let other_person = TargetProposalPerson {
            person_external_id: id(A),
            ..same_pair.clone()
        };
        assert!(find_match(&source, &[other_person]).is_none());
        assert!(find_match(&source, &[same_pair]).is_some());
    }
}
