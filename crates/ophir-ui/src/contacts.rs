//! Contact inbox screen.

use ophir_core::models::Contact;

use crate::display::format_timestamp;
use crate::{Effect, Notice, Redirect, SessionStatus, ViewState};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactsScreen {
    pub view: ViewState<Vec<Contact>>,
    /// Contact shown in the detail panel.
    pub selected: Option<String>,
    /// Contact whose deletion is in flight.
    pub deleting: Option<String>,
    pub notice: Option<Notice>,
    pub redirect: Option<Redirect>,
}

/// One line of the inbox table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub document_id: String,
    pub full_name: String,
    pub email: String,
    pub subject: String,
    pub received: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContactsMsg {
    /// Screen opened; the session is checked before anything loads.
    Mount,
    SessionChecked(SessionStatus),
    Load,
    Loaded(Vec<Contact>),
    LoadFailed(String),
    /// A call came back 401.
    SessionExpired,
    Select(String),
    CloseDetail,
    /// The operator confirmed the deletion.
    Delete(String),
    Deleted(String),
    DeleteFailed(String),
    Logout,
    /// Logout finished, successfully or not.
    LoggedOut,
}

impl ContactsScreen {
    pub fn count(&self) -> usize {
        self.view.loaded().map_or(0, Vec::len)
    }

    pub fn selected_contact(&self) -> Option<&Contact> {
        let id = self.selected.as_deref()?;
        self.view.loaded()?.iter().find(|c| c.document_id == id)
    }

    pub fn rows(&self) -> Vec<ContactRow> {
        self.view
            .loaded()
            .map(|contacts| {
                contacts
                    .iter()
                    .map(|c| ContactRow {
                        document_id: c.document_id.clone(),
                        full_name: c.full_name.clone(),
                        email: c.email.clone(),
                        subject: c.subject.clone(),
                        received: format_timestamp(&c.created_at),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub fn update(screen: &mut ContactsScreen, msg: ContactsMsg) -> Option<Effect> {
    match msg {
        ContactsMsg::Mount => Some(Effect::CheckSession),
        // any signed-in role may read the inbox
        ContactsMsg::SessionChecked(Some(_)) => update(screen, ContactsMsg::Load),
        ContactsMsg::SessionChecked(None) | ContactsMsg::SessionExpired | ContactsMsg::LoggedOut => {
            screen.redirect = Some(Redirect::Login);
            None
        }
        ContactsMsg::Load => {
            screen.view = ViewState::Loading;
            screen.notice = None;
            Some(Effect::FetchContacts)
        }
        ContactsMsg::Loaded(contacts) => {
            screen.view = ViewState::Loaded(contacts);
            None
        }
        ContactsMsg::LoadFailed(reason) => {
            screen.view = ViewState::Error(reason);
            None
        }
        ContactsMsg::Select(id) => {
            screen.selected = Some(id);
            None
        }
        ContactsMsg::CloseDetail => {
            screen.selected = None;
            None
        }
        ContactsMsg::Delete(id) => {
            // one deletion at a time
            if screen.deleting.is_some() {
                return None;
            }
            screen.deleting = Some(id.clone());
            Some(Effect::DeleteContact(id))
        }
        ContactsMsg::Deleted(id) => {
            if let Some(contacts) = screen.view.loaded_mut() {
                contacts.retain(|c| c.document_id != id);
            }
            if screen.selected.as_deref() == Some(id.as_str()) {
                screen.selected = None;
            }
            screen.deleting = None;
            None
        }
        ContactsMsg::DeleteFailed(reason) => {
            screen.deleting = None;
            screen.notice = Some(Notice::Error(reason));
            None
        }
        ContactsMsg::Logout => Some(Effect::Logout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use ophir_core::models::Role;

    fn contact(id: &str) -> Contact {
        Contact {
            id: 1,
            document_id: id.into(),
            full_name: "Jean Dupont".into(),
            email: "jean@example.com".into(),
            country: "France".into(),
            subject: "Info".into(),
            message: "Bonjour".into(),
            created_at: DateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn load_cycle() {
        let mut screen = ContactsScreen::default();
        assert_eq!(update(&mut screen, ContactsMsg::Load), Some(Effect::FetchContacts));
        assert!(screen.view.is_loading());

        update(&mut screen, ContactsMsg::Loaded(vec![contact("a"), contact("b")]));
        assert_eq!(screen.count(), 2);

        update(&mut screen, ContactsMsg::LoadFailed("boom".into()));
        assert_eq!(screen.view, ViewState::Error("boom".into()));
    }

    #[test]
    fn mount_checks_the_session_before_loading() {
        let mut screen = ContactsScreen::default();
        assert_eq!(update(&mut screen, ContactsMsg::Mount), Some(Effect::CheckSession));
        assert_eq!(screen.view, ViewState::Idle);

        assert_eq!(
            update(&mut screen, ContactsMsg::SessionChecked(Some(Role::Dev))),
            Some(Effect::FetchContacts)
        );
        assert!(screen.view.is_loading());
        assert!(screen.redirect.is_none());
    }

    #[test]
    fn missing_or_expired_session_sends_to_login() {
        let mut screen = ContactsScreen::default();
        assert_eq!(update(&mut screen, ContactsMsg::SessionChecked(None)), None);
        assert_eq!(screen.redirect, Some(Redirect::Login));

        let mut screen = ContactsScreen::default();
        update(&mut screen, ContactsMsg::Load);
        update(&mut screen, ContactsMsg::SessionExpired);
        assert_eq!(screen.redirect, Some(Redirect::Login));
    }

    #[test]
    fn logout_round_trip() {
        let mut screen = ContactsScreen::default();
        assert_eq!(update(&mut screen, ContactsMsg::Logout), Some(Effect::Logout));
        assert!(screen.redirect.is_none());
        update(&mut screen, ContactsMsg::LoggedOut);
        assert_eq!(screen.redirect, Some(Redirect::Login));
    }

    #[test]
    fn rows_show_the_reception_time() {
        let mut screen = ContactsScreen::default();
        let mut received = contact("a");
        received.created_at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 5, 0).unwrap();
        update(&mut screen, ContactsMsg::Loaded(vec![received]));

        let rows = screen.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].received, "01/03/2025 09:05");
        assert_eq!(rows[0].full_name, "Jean Dupont");
    }

    #[test]
    fn deleting_removes_the_row_and_closes_its_detail() {
        let mut screen = ContactsScreen::default();
        update(&mut screen, ContactsMsg::Loaded(vec![contact("a"), contact("b")]));
        update(&mut screen, ContactsMsg::Select("a".into()));
        assert_eq!(screen.selected_contact().map(|c| c.document_id.as_str()), Some("a"));

        assert_eq!(
            update(&mut screen, ContactsMsg::Delete("a".into())),
            Some(Effect::DeleteContact("a".into()))
        );
        assert_eq!(update(&mut screen, ContactsMsg::Delete("b".into())), None);

        update(&mut screen, ContactsMsg::Deleted("a".into()));
        assert_eq!(screen.count(), 1);
        assert!(screen.selected.is_none());
        assert!(screen.deleting.is_none());
    }

    #[test]
    fn failed_delete_keeps_the_row() {
        let mut screen = ContactsScreen::default();
        update(&mut screen, ContactsMsg::Loaded(vec![contact("a")]));
        update(&mut screen, ContactsMsg::Delete("a".into()));
        update(&mut screen, ContactsMsg::DeleteFailed("backend request failed".into()));
        assert_eq!(screen.count(), 1);
        assert_eq!(screen.notice, Some(Notice::Error("backend request failed".into())));
    }
}
