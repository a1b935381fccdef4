//! Field-level comparison of matched source and target rows.
//!
//! Each entity kind has a fixed field list. A field that differs lands in a
//! [`Changes`] map unless the field is protected, in which case the target
//! value is authoritative and the difference is dropped.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDateTime, SubsecRound};
use datasync_core::{
    code_prefix, translate_role, ExternalId, RemoteFlag, SourceComponent, SourcePerson,
    SourceProposal, SourceProposalPerson, SourceSession, SourceSessionPerson, TargetComponent,
    TargetPerson, TargetProposal, TargetProposalPerson, TargetRole, TargetSession,
    TargetSessionPerson,
};

/// A comparable column of one entity kind.
pub trait Field: Copy + Ord + fmt::Debug {
    /// Protected fields are never overwritten from the source.
    fn is_protected(&self) -> bool {
        false
    }
}

/// New value for a stale target field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(Option<String>),
    ExternalId(Option<ExternalId>),
    Timestamp(Option<NaiveDateTime>),
    Flag(bool),
    Role(TargetRole),
    Remote(RemoteFlag),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(Some(v)) => write!(f, "{v:?}"),
            FieldValue::ExternalId(Some(v)) => write!(f, "{v}"),
            FieldValue::Timestamp(Some(v)) => write!(f, "{v}"),
            FieldValue::Text(None) | FieldValue::ExternalId(None) | FieldValue::Timestamp(None) => {
                f.write_str("NULL")
            }
            FieldValue::Flag(v) => write!(f, "{v}"),
            FieldValue::Role(v) => write!(f, "{v}"),
            FieldValue::Remote(v) => write!(f, "{v:?}"),
        }
    }
}

/// Stale fields of one matched pair, keyed by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changes<F: Field> {
    values: BTreeMap<F, FieldValue>,
}

impl<F: Field> Default for Changes<F> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<F: Field> Changes<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` for `field` when the two sides differ. Protected
    /// fields are ignored.
    pub fn record(&mut self, field: F, differs: bool, value: FieldValue) {
        if differs && !field.is_protected() {
            self.values.insert(field, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn contains(&self, field: F) -> bool {
        self.values.contains_key(&field)
    }

    pub fn get(&self, field: F) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.values.keys().copied()
    }
}

impl<F: Field> fmt::Display for Changes<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, value) in &self.values {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{field:?}={value}")?;
            first = false;
        }
        Ok(())
    }
}

// ==================== Proposals ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProposalField {
    Title,
    ExternalId,
}

impl Field for ProposalField {}

/// Proposal updates. A code rename is issued as its own call, so it is kept
/// apart from the title and external-id changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProposalDiff {
    pub code_rename: Option<String>,
    pub changes: Changes<ProposalField>,
}

impl ProposalDiff {
    pub fn is_empty(&self) -> bool {
        self.code_rename.is_none() && self.changes.is_empty()
    }
}

pub fn diff_proposal(source: &SourceProposal, target: &TargetProposal) -> ProposalDiff {
    let source_code = code_prefix(&source.name);
    let code_rename =
        (source_code != code_prefix(&target.name)).then(|| source_code.to_string());

    let mut changes = Changes::new();
    changes.record(
        ProposalField::Title,
        source.title != target.title,
        FieldValue::Text(source.title.clone()),
    );
    changes.record(
        ProposalField::ExternalId,
        target.external_id != Some(source.external_id),
        FieldValue::ExternalId(Some(source.external_id)),
    );

    ProposalDiff {
        code_rename,
        changes,
    }
}

// ==================== Sessions ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionField {
    ExternalId,
    VisitId,
    Beamline,
    Comments,
    StartDate,
    EndDate,
    BeamlineOperator,
    Scheduled,
}

impl Field for SessionField {
    /// Comments are edited by hand in the target. The visit id is fixed at
    /// insert time and never rewritten.
    fn is_protected(&self) -> bool {
        matches!(self, SessionField::Comments | SessionField::VisitId)
    }
}

/// Drops fractional seconds. The target stores `DATETIME` columns at
/// second precision, so sub-second source values would never compare equal.
pub fn whole_seconds(value: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    value.map(|ts| ts.trunc_subsecs(0))
}

/// Compares a session, using the scheduled flag derived from the source
/// state rather than the raw state.
pub fn diff_session(source: &SourceSession, target: &TargetSession) -> Changes<SessionField> {
    let scheduled = source.scheduled();
    let mut changes = Changes::new();
    changes.record(
        SessionField::ExternalId,
        target.external_id != Some(source.external_id),
        FieldValue::ExternalId(Some(source.external_id)),
    );
    changes.record(
        SessionField::VisitId,
        source.visit_id != target.visit_id,
        FieldValue::Text(Some(source.visit_id.clone())),
    );
    changes.record(
        SessionField::Beamline,
        source.beamline != target.beamline,
        FieldValue::Text(source.beamline.clone()),
    );
    changes.record(
        SessionField::Comments,
        source.comments != target.comments,
        FieldValue::Text(source.comments.clone()),
    );
    let (start, end) = (whole_seconds(source.start_date), whole_seconds(source.end_date));
    changes.record(
        SessionField::StartDate,
        start != whole_seconds(target.start_date),
        FieldValue::Timestamp(start),
    );
    changes.record(
        SessionField::EndDate,
        end != whole_seconds(target.end_date),
        FieldValue::Timestamp(end),
    );
    changes.record(
        SessionField::BeamlineOperator,
        source.beamline_operator != target.beamline_operator,
        FieldValue::Text(source.beamline_operator.clone()),
    );
    changes.record(
        SessionField::Scheduled,
        target.scheduled != Some(scheduled),
        FieldValue::Flag(scheduled),
    );
    changes
}

// ==================== Persons ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PersonField {
    ExternalId,
    Login,
    Title,
    GivenName,
    FamilyName,
}

impl Field for PersonField {}

pub fn diff_person(source: &SourcePerson, target: &TargetPerson) -> Changes<PersonField> {
    let mut changes = Changes::new();
    changes.record(
        PersonField::ExternalId,
        target.external_id != Some(source.external_id),
        FieldValue::ExternalId(Some(source.external_id)),
    );
    changes.record(
        PersonField::Login,
        source.login != target.login,
        FieldValue::Text(source.login.clone()),
    );
    changes.record(
        PersonField::Title,
        source.title != target.title,
        FieldValue::Text(source.title.clone()),
    );
    changes.record(
        PersonField::GivenName,
        source.given_name != target.given_name,
        FieldValue::Text(source.given_name.clone()),
    );
    changes.record(
        PersonField::FamilyName,
        source.family_name != target.family_name,
        FieldValue::Text(source.family_name.clone()),
    );
    changes
}

// ==================== Components ====================

/// Name to write into a protein whose name is still empty. A populated
/// target name is never replaced.
pub fn fill_empty_name<'a>(
    source: &'a SourceComponent,
    target: &TargetComponent,
) -> Option<&'a str> {
    let name = source.name.as_deref().filter(|n| !n.is_empty())?;
    target
        .name
        .as_deref()
        .is_none_or(str::is_empty)
        .then_some(name)
}

// ==================== Associations ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssociationField {
    Role,
    Remote,
}

impl Field for AssociationField {}

fn record_role(changes: &mut Changes<AssociationField>, token: &str, stored: Option<&str>) {
    let role = translate_role(token);
    changes.record(
        AssociationField::Role,
        role.as_db_value() != stored,
        FieldValue::Role(role),
    );
}

pub fn diff_proposal_person(
    source: &SourceProposalPerson,
    target: &TargetProposalPerson,
) -> Changes<AssociationField> {
    let mut changes = Changes::new();
    record_role(&mut changes, &source.role, target.role.as_deref());
    changes
}

/// Compares role and remote flag. The source stores an on-site flag and the
/// target a remote flag, so both are mapped to [`RemoteFlag`] first.
pub fn diff_session_person(
    source: &SourceSessionPerson,
    target: &TargetSessionPerson,
) -> Changes<AssociationField> {
    let mut changes = Changes::new();
    record_role(&mut changes, &source.role, target.role.as_deref());
    let remote = RemoteFlag::from_source_on_site(source.on_site);
    changes.record(
        AssociationField::Remote,
        remote != RemoteFlag::from_target(target.remote),
        FieldValue::Remote(remote),
    );
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use datasync_core::LifecycleState;

    fn id(hex: &str) -> ExternalId {
        ExternalId::parse(hex).unwrap()
    }

    const A: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
    const B: &str = "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

    fn source_session(state: LifecycleState) -> SourceSession {
        SourceSession {
            external_id: id(A),
            visit_id: "cm12345-1".into(),
            beamline: Some("i03".into()),
            comments: Some("from the proposal system".into()),
            start_date: None,
            end_date: None,
            state,
            beamline_operator: Some("Jane Doe".into()),
        }
    }

    fn target_session() -> TargetSession {
        TargetSession {
            external_id: Some(id(A)),
            visit_id: "cm12345-1".into(),
            beamline: Some("i03".into()),
            comments: Some("edited by staff".into()),
            start_date: None,
            end_date: None,
            session_id: 10,
            beamline_operator: Some("Jane Doe".into()),
            scheduled: Some(true),
        }
    }

    #[test]
    fn test_queued_session_clears_scheduled() {
        let changes = diff_session(&source_session(LifecycleState::Queued), &target_session());
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes.get(SessionField::Scheduled),
            Some(&FieldValue::Flag(false))
        );
    }

    #[test]
    fn test_session_protected_fields_never_reported() {
        let mut target = target_session();
        target.visit_id = "cm12345-9".into();
        target.comments = None;
        target.beamline = Some("i04".into());

        for state in [
            LifecycleState::Open,
            LifecycleState::Queued,
            LifecycleState::Closed,
        ] {
            let changes = diff_session(&source_session(state), &target);
            assert!(!changes.contains(SessionField::Comments));
            assert!(!changes.contains(SessionField::VisitId));
            assert!(changes.contains(SessionField::Beamline));
        }
    }

    #[test]
    fn test_session_dates_compare_at_second_precision() {
        let stored = chrono::NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut source = source_session(LifecycleState::Open);
        source.end_date = Some(stored + chrono::Duration::microseconds(577_270));
        let mut target = target_session();
        target.end_date = Some(stored);
        assert!(diff_session(&source, &target).is_empty());

        target.end_date = Some(stored - chrono::Duration::seconds(1));
        assert_eq!(
            diff_session(&source, &target).get(SessionField::EndDate),
            Some(&FieldValue::Timestamp(Some(stored)))
        );
    }

    #[test]
    fn test_identical_session_is_unchanged() {
        let changes = diff_session(&source_session(LifecycleState::Open), &target_session());
        assert!(changes.is_empty());
    }

    #[test]
    fn test_proposal_code_rename_is_separate() {
        let source = SourceProposal {
            name: "nt20".into(),
            external_id: id(A),
            title: Some("Software testing".into()),
            state: LifecycleState::Open,
        };
        let target = TargetProposal {
            name: "mx20".into(),
            external_id: Some(id(A)),
            title: Some("Software testing".into()),
            proposal_id: 1,
        };
        let diff = diff_proposal(&source, &target);
        assert_eq!(diff.code_rename.as_deref(), Some("nt"));
        assert!(diff.changes.is_empty());
        assert!(!diff.is_empty());
    }

    #[test]
    fn test_proposal_links_missing_external_id() {
        let source = SourceProposal {
            name: "nt20".into(),
            external_id: id(A),
            title: None,
            state: LifecycleState::Open,
        };
        let target = TargetProposal {
            name: "nt20".into(),
            external_id: None,
            title: None,
            proposal_id: 1,
        };
        let diff = diff_proposal(&source, &target);
        assert!(diff.code_rename.is_none());
        assert_eq!(
            diff.changes.fields().collect::<Vec<_>>(),
            vec![ProposalField::ExternalId]
        );
    }

    #[test]
    fn test_person_compares_every_field() {
        let source = SourcePerson {
            external_id: id(A),
            login: Some("abc12345".into()),
            title: Some("Dr".into()),
            given_name: Some("Ada".into()),
            family_name: Some("Lovelace".into()),
        };
        let target = TargetPerson {
            external_id: None,
            login: Some("abc12346".into()),
            title: None,
            given_name: Some("A".into()),
            family_name: None,
            person_id: 4,
        };
        assert_eq!(diff_person(&source, &target).len(), 5);
    }

    #[test]
    fn test_remote_flag_inversion() {
        let source = SourceSessionPerson {
            session_external_id: id(A),
            person_external_id: id(B),
            role: "TEAM_MEMBER".into(),
            on_site: Some(0),
        };
        let mut target = TargetSessionPerson {
            session_external_id: id(A),
            person_external_id: id(B),
            role: Some("Team Member".into()),
            session_id: 1,
            person_id: 2,
            remote: Some(1),
        };
        assert!(diff_session_person(&source, &target).is_empty());

        target.remote = Some(0);
        let changes = diff_session_person(&source, &target);
        assert_eq!(
            changes.get(AssociationField::Remote),
            Some(&FieldValue::Remote(RemoteFlag::Remote))
        );
        assert!(!changes.contains(AssociationField::Role));
    }

    #[test]
    fn test_unknown_role_against_null_is_unchanged() {
        let source = SourceProposalPerson {
            proposal_external_id: id(A),
            person_external_id: id(B),
            role: "MYSTERY_ROLE".into(),
        };
        let mut target = TargetProposalPerson {
            proposal_external_id: id(A),
            person_external_id: id(B),
            role: None,
            proposal_id: 1,
            person_id: 2,
        };
        assert!(diff_proposal_person(&source, &target).is_empty());

        target.role = Some("Team Leader".into());
        assert_eq!(
            diff_proposal_person(&source, &target).get(AssociationField::Role),
            Some(&FieldValue::Role(TargetRole::Unknown))
        );
    }

    #[test]
    fn test_fill_empty_name() {
        let source = SourceComponent {
            external_id: id(A),
            proposal_external_id: id(B),
            name: Some("Lysozyme".into()),
            acronym: "lyso".into(),
            state: LifecycleState::Accepted,
        };
        let mut target = TargetComponent {
            external_id: Some(id(A)),
            proposal_external_id: Some(id(B)),
            name: Some(String::new()),
            acronym: Some("lyso".into()),
            protein_id: 1,
        };
        assert_eq!(fill_empty_name(&source, &target), Some("Lysozyme"));

        target.name = Some("Hen egg lysozyme".into());
        assert_eq!(fill_empty_name(&source, &target), None);
    }
}
