//! Conversion of raw result tuples into extract records.
//!
//! Identifiers are selected as signed integers and external ids as `hex()`
//! strings, so every row decodes into plain Rust types before it is checked
//! here.

use chrono::NaiveDateTime;
use datasync_core::{
    ExternalId, TargetComponent, TargetPerson, TargetProposal, TargetProposalPerson,
    TargetSession, TargetSessionPerson, TargetSessionType,
};
use datasync_storage::StorageError;

pub(crate) type ProposalRow = (Option<String>, Option<String>, Option<String>, i64);

pub(crate) type SessionRow = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<NaiveDateTime>,
    Option<NaiveDateTime>,
    i64,
    Option<String>,
    Option<i64>,
);

pub(crate) type PersonRow = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    i64,
);

pub(crate) type ComponentRow = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    i64,
);

pub(crate) type SessionTypeRow = (Option<String>, Option<String>);

pub(crate) type ProposalPersonRow = (String, String, Option<String>, i64, i64);

pub(crate) type SessionPersonRow = (String, String, Option<String>, i64, i64, Option<i64>);

fn external_id(entity: &str, value: Option<&str>) -> Result<Option<ExternalId>, StorageError> {
    ExternalId::parse_optional(value).map_err(|e| StorageError::invalid_row(entity, e.to_string()))
}

fn required_id(entity: &str, value: &str) -> Result<ExternalId, StorageError> {
    ExternalId::parse(value).map_err(|e| StorageError::invalid_row(entity, e.to_string()))
}

pub(crate) fn proposal(row: ProposalRow) -> Result<TargetProposal, StorageError> {
    let (name, ext, title, proposal_id) = row;
    Ok(TargetProposal {
        name: name.unwrap_or_default(),
        external_id: external_id("Proposal", ext.as_deref())?,
        title,
        proposal_id,
    })
}

pub(crate) fn session(row: SessionRow) -> Result<TargetSession, StorageError> {
    let (ext, visit_id, beamline, comments, start_date, end_date, session_id, operator, scheduled) =
        row;
    Ok(TargetSession {
        external_id: external_id("BLSession", ext.as_deref())?,
        visit_id: visit_id.unwrap_or_default(),
        beamline,
        comments,
        start_date,
        end_date,
        session_id,
        beamline_operator: operator,
        scheduled: scheduled.map(|flag| flag != 0),
    })
}

pub(crate) fn person(row: PersonRow) -> Result<TargetPerson, StorageError> {
    let (ext, login, title, given_name, family_name, person_id) = row;
    Ok(TargetPerson {
        external_id: external_id("Person", ext.as_deref())?,
        login,
        title,
        given_name,
        family_name,
        person_id,
    })
}

pub(crate) fn component(row: ComponentRow) -> Result<TargetComponent, StorageError> {
    let (ext, proposal_ext, name, acronym, protein_id) = row;
    Ok(TargetComponent {
        external_id: external_id("Protein", ext.as_deref())?,
        proposal_external_id: external_id("Proposal", proposal_ext.as_deref())?,
        name,
        acronym,
        protein_id,
    })
}

pub(crate) fn session_type(row: SessionTypeRow) -> Result<TargetSessionType, StorageError> {
    let (ext, type_name) = row;
    Ok(TargetSessionType {
        session_external_id: external_id("BLSession", ext.as_deref())?,
        type_name: type_name.unwrap_or_default(),
    })
}

pub(crate) fn proposal_person(row: ProposalPersonRow) -> Result<TargetProposalPerson, StorageError> {
    let (proposal_ext, person_ext, role, proposal_id, person_id) = row;
    Ok(TargetProposalPerson {
        proposal_external_id: required_id("ProposalHasPerson", &proposal_ext)?,
        person_external_id: required_id("ProposalHasPerson", &person_ext)?,
        role,
        proposal_id,
        person_id,
    })
}

pub(crate) fn session_person(row: SessionPersonRow) -> Result<TargetSessionPerson, StorageError> {
    let (session_ext, person_ext, role, session_id, person_id, remote) = row;
    Ok(TargetSessionPerson {
        session_external_id: required_id("Session_has_Person", &session_ext)?,
        person_external_id: required_id("Session_has_Person", &person_ext)?,
        role,
        session_id,
        person_id,
        remote,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUID: &str = "99017EB35BD34E55E04017AC41627AFF";

    #[test]
    fn test_proposal_row_with_null_external_id() {
        let row = proposal((Some("nt20".into()), None, Some("Software testing".into()), 42)).unwrap();
        assert_eq!(row.name, "nt20");
        assert_eq!(row.external_id, None);
        assert_eq!(row.proposal_id, 42);
    }

    #[test]
    fn test_session_row_scheduled_flag() {
        let base = (
            Some(GUID.to_string()),
            Some("nt20-1".to_string()),
            Some("i03".to_string()),
            Some("hand edited".to_string()),
            None,
            None,
            7,
            None,
            Some(0),
        );
        assert_eq!(session(base.clone()).unwrap().scheduled, Some(false));

        let mut scheduled = base.clone();
        scheduled.8 = Some(1);
        assert_eq!(session(scheduled).unwrap().scheduled, Some(true));

        let mut unknown = base;
        unknown.8 = None;
        assert_eq!(session(unknown).unwrap().scheduled, None);
    }

    #[test]
    fn test_invalid_hex_is_invalid_row() {
        let err = person((Some("XYZ".into()), None, None, None, None, 1)).unwrap_err();
        assert!(matches!(err, StorageError::InvalidRow { .. }));
    }

    #[test]
    fn test_session_person_row() {
        let row = session_person((
            GUID.into(),
            "E70E7EB35BD34E55E04017AC41627FFB".into(),
            Some("Team Leader".into()),
            3,
            4,
            Some(1),
        ))
        .unwrap();
        assert_eq!(row.remote, Some(1));
        assert_eq!(row.session_id, 3);
    }
}
