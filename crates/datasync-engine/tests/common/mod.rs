#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDateTime};
use datasync_core::{
    ExternalId, LifecycleState, SourceComponent, SourcePerson, SourceProposal,
    SourceProposalPerson, SourceSession, SourceSessionPerson, SourceSessionType,
};
use datasync_db_memory::{FixtureSource, InMemoryTarget, SourceDataset};
use datasync_engine::Reconciler;
use datasync_storage::{DynSource, DynTarget};

pub const PROPOSAL: &str = "A1017EB35BD34E55E04017AC41627A01";
pub const OTHER_PROPOSAL: &str = "A1017EB35BD34E55E04017AC41627A02";
pub const SESSION_1: &str = "99017EB35BD34E55E04017AC41627AFF";
pub const SESSION_2: &str = "99017EB35BD34E55E04017AC41627B00";
pub const PERSON_1: &str = "E70E7EB35BD34E55E04017AC41627FFB";
pub const PERSON_2: &str = "E70E7EB35BD34E55E04017AC41627FFC";
pub const PERSON_3: &str = "E70E7EB35BD34E55E04017AC41627FFD";
pub const COMPONENT: &str = "C0017EB35BD34E55E04017AC41627C01";

pub fn id(hex: &str) -> ExternalId {
    ExternalId::parse(hex).unwrap()
}

/// Noon of the day `days` before today. Whole-second and stable across
/// calls, so a seeded target row compares equal to the source row.
pub fn days_ago(days: i64) -> NaiveDateTime {
    let noon = Local::now()
        .date_naive()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    noon - Duration::days(days)
}

pub fn proposal(name: &str, hex: &str, state: &str) -> SourceProposal {
    SourceProposal {
        name: name.into(),
        external_id: id(hex),
        title: Some("Software testing".into()),
        state: LifecycleState::from(state),
    }
}

pub fn session(hex: &str, visit: &str, state: &str) -> SourceSession {
    let end = days_ago(5);
    SourceSession {
        external_id: id(hex),
        visit_id: visit.into(),
        beamline: Some("i03".into()),
        comments: Some("Initial comment".into()),
        start_date: Some(end - Duration::days(1)),
        end_date: Some(end),
        state: LifecycleState::from(state),
        beamline_operator: Some("Jane Doe".into()),
    }
}

pub fn person(hex: &str, login: Option<&str>) -> SourcePerson {
    SourcePerson {
        external_id: id(hex),
        login: login.map(str::to_string),
        title: Some("Dr".into()),
        given_name: Some("Ada".into()),
        family_name: Some("Lovelace".into()),
    }
}

pub fn component(hex: &str, acronym: &str, state: &str) -> SourceComponent {
    SourceComponent {
        external_id: id(hex),
        proposal_external_id: id(PROPOSAL),
        name: Some("Lysozyme".into()),
        acronym: acronym.into(),
        state: LifecycleState::from(state),
    }
}

pub fn proposal_person(person: &str, role: &str) -> SourceProposalPerson {
    SourceProposalPerson {
        proposal_external_id: id(PROPOSAL),
        person_external_id: id(person),
        role: role.into(),
    }
}

pub fn session_person(
    session: &str,
    person: &str,
    role: &str,
    on_site: Option<i64>,
) -> SourceSessionPerson {
    SourceSessionPerson {
        session_external_id: id(session),
        person_external_id: id(person),
        role: role.into(),
        on_site,
    }
}

/// A consistent source catalog touching every entity kind.
pub fn full_dataset() -> SourceDataset {
    SourceDataset {
        proposals: vec![proposal("nt20", PROPOSAL, "Open")],
        sessions: vec![
            session(SESSION_1, "nt20-1", "Open"),
            session(SESSION_2, "nt20-2", "Queued"),
        ],
        persons: vec![
            person(PERSON_1, Some("abc12345")),
            person(PERSON_2, Some("xyz98765")),
        ],
        components: vec![component(COMPONENT, "lyso", "Accepted")],
        session_types: vec![SourceSessionType {
            session_external_id: id(SESSION_1),
            type_name: "MX".into(),
            visit_id: "nt20-1".into(),
        }],
        proposal_has_person: vec![
            proposal_person(PERSON_1, "PRINCIPAL_INVESTIGATOR"),
            proposal_person(PERSON_2, "TEAM_MEMBER"),
        ],
        session_has_person: vec![
            session_person(SESSION_1, PERSON_1, "TEAM_LEADER", Some(1)),
            session_person(SESSION_1, PERSON_1, "TEAM_MEMBER", Some(0)),
            session_person(SESSION_1, PERSON_2, "TEAM_MEMBER", Some(0)),
        ],
    }
}

/// Fixture source, journaling target and a reconciler wired to both.
pub struct Harness {
    pub source: Arc<FixtureSource>,
    pub target: Arc<InMemoryTarget>,
    pub reconciler: Reconciler,
}

impl Harness {
    pub fn new(dataset: SourceDataset) -> Self {
        let source = Arc::new(FixtureSource::new(dataset));
        let target = Arc::new(InMemoryTarget::new());
        let dyn_source: DynSource = source.clone();
        let dyn_target: DynTarget = target.clone();
        Self {
            source,
            target,
            reconciler: Reconciler::new(dyn_source, dyn_target),
        }
    }
}
