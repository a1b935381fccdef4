//! Association seeding for newly inserted sessions and persons.

use datasync_core::{translate_role, PersonSession, RemoteFlag, SessionParticipant};
use datasync_storage::{PersonFields, SessionPersonLink, StorageResult, TargetCatalog};
use tracing::debug;

use crate::collapse::collapse_consecutive;

/// Links the participants of a new session, creating persons the target does
/// not know yet. Participants without a login cannot be created and are
/// skipped. Returns the number of links inserted.
pub(super) async fn seed_session_participants(
    target: &dyn TargetCatalog,
    session_id: i64,
    participants: Vec<SessionParticipant>,
) -> StorageResult<u32> {
    let participants = collapse_consecutive(participants, |p| p.person_external_id);
    let mut seeded = 0;

    for participant in &participants {
        let person_id = match target
            .retrieve_person_id(&participant.person_external_id)
            .await?
        {
            Some(person_id) => person_id,
            None if participant.login.is_none() => {
                debug!(
                    session_id,
                    person = %participant.person_external_id,
                    "Participant has no login, not creating person"
                );
                continue;
            }
            None => {
                let person_id = target
                    .insert_person(&PersonFields {
                        external_id: participant.person_external_id,
                        login: participant.login.clone(),
                        title: participant.title.clone(),
                        given_name: participant.given_name.clone(),
                        family_name: participant.family_name.clone(),
                    })
                    .await?;
                debug!(session_id, person_id, "Created person for session participant");
                person_id
            }
        };

        target
            .insert_session_has_person(&SessionPersonLink {
                session_id,
                person_id,
                role: translate_role(&participant.role),
                remote: RemoteFlag::from_source_on_site(participant.on_site),
            })
            .await?;
        seeded += 1;
    }

    Ok(seeded)
}

/// Links a new person to the sessions it takes part in. Sessions missing from
/// the target are skipped. Returns the number of links inserted.
pub(super) async fn seed_person_sessions(
    target: &dyn TargetCatalog,
    person_id: i64,
    sessions: Vec<PersonSession>,
) -> StorageResult<u32> {
    let sessions = collapse_consecutive(sessions, |s| s.session_external_id);
    let mut seeded = 0;

    for session in &sessions {
        let Some(session_id) = target
            .retrieve_session_id(&session.session_external_id)
            .await?
        else {
            debug!(
                person_id,
                session = %session.session_external_id,
                "Not found: session for new person"
            );
            continue;
        };

        target
            .insert_session_has_person(&SessionPersonLink {
                session_id,
                person_id,
                role: translate_role(&session.role),
                remote: RemoteFlag::from_source_on_site(session.on_site),
            })
            .await?;
        seeded += 1;
    }

    Ok(seeded)
}
