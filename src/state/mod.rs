pub(crate) mod list_cache;

use crate::api::{BackendClient, EnvConfig};
use crate::models::{LinkItem, News, Profile, Session};
use crate::notify::Notifier;
use crate::resolver::{resolve_profile, Resolution};
use crate::util::log_warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[derive(Clone)]
pub(crate) struct AppState {
    pub client: RwSignal<BackendClient>,
    pub session: RwSignal<Option<Session>>,

    /// Currently displayed identity; placeholder until resolution completes.
    pub profile: RwSignal<Profile>,
    pub links: RwSignal<Vec<LinkItem>>,
    pub news: RwSignal<Vec<News>>,

    pub profile_loading: RwSignal<bool>,
    /// A requested slug matched nothing (full-page state, not a notice).
    pub profile_not_found: RwSignal<bool>,

    /// Stale-response guards: every resolution pass bumps the id, and list
    /// loads remember which owner they were issued for.
    pub resolve_request_id: RwSignal<u64>,
    pub loaded_owner_id: RwSignal<Option<String>>,

    pub notifier: Notifier,

    /// Configured showcase slug (resolution fallback).
    pub showcase_slug: String,
}

impl AppState {
    pub fn new() -> Self {
        let client = BackendClient::load_from_storage();
        let session = client.session().cloned();
        let showcase_slug = EnvConfig::new().showcase_slug;

        Self {
            client: RwSignal::new(client),
            session: RwSignal::new(session),
            profile: RwSignal::new(Profile::placeholder()),
            links: RwSignal::new(vec![]),
            news: RwSignal::new(vec![]),
            profile_loading: RwSignal::new(false),
            profile_not_found: RwSignal::new(false),
            resolve_request_id: RwSignal::new(0),
            loaded_owner_id: RwSignal::new(None),
            notifier: Notifier::new(),
            showcase_slug,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);

/// Pull the requested slug out of a raw query string (`?u=acme&x=1`).
pub(crate) fn requested_slug_from_search(search: &str) -> Option<String> {
    let search = search.strip_prefix('?').unwrap_or(search);
    for pair in search.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == "u" {
            let decoded = urlencoding::decode(value).ok()?.into_owned();
            let trimmed = decoded.trim();
            if trimmed.is_empty() {
                return None;
            }
            return Some(trimmed.to_string());
        }
    }
    None
}

fn current_requested_slug() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    requested_slug_from_search(&search)
}

/// Re-run profile resolution from the current URL and session, then load the
/// owner's links and news concurrently. Responses carrying a stale request
/// id (or an owner that is no longer current) are discarded.
pub(crate) fn refresh_public_data(app: AppState) {
    let req_id = app.resolve_request_id.get_untracked().saturating_add(1);
    app.resolve_request_id.set(req_id);

    app.profile_loading.set(true);
    app.profile_not_found.set(false);

    let client = app.client.get_untracked();
    let session_owner = app.session.get_untracked().map(|s| s.owner_id);
    let requested = current_requested_slug();
    let fallback = app.showcase_slug.clone();

    spawn_local(async move {
        let result = resolve_profile(
            &client,
            requested.as_deref(),
            session_owner.as_deref(),
            &fallback,
        )
        .await;

        // Ignore stale responses.
        if app.resolve_request_id.get_untracked() != req_id {
            return;
        }

        match result {
            Ok(Resolution::Found(profile)) => {
                let owner_id = profile.id.clone();
                app.profile.set(profile);
                app.loaded_owner_id.set(Some(owner_id.clone()));
                // Independent tasks: one list failing leaves the other alone.
                load_links(app.clone(), owner_id.clone(), req_id);
                load_news(app.clone(), owner_id, req_id);
            }
            Ok(Resolution::NotFound) => {
                app.profile_not_found.set(true);
                app.loaded_owner_id.set(None);
                app.links.set(vec![]);
                app.news.set(vec![]);
            }
            Ok(Resolution::Unresolved) => {
                app.profile.set(Profile::placeholder());
                app.loaded_owner_id.set(None);
                app.links.set(vec![]);
                app.news.set(vec![]);
            }
            Err(e) => {
                // Resolution errors leave the last good view in place.
                log_warn(&format!("profile resolution failed: {e}"));
            }
        }

        app.profile_loading.set(false);
    });
}

fn is_stale(app: &AppState, owner_id: &str, req_id: u64) -> bool {
    app.resolve_request_id.get_untracked() != req_id
        || app.loaded_owner_id.get_untracked().as_deref() != Some(owner_id)
}

pub(crate) fn load_links(app: AppState, owner_id: String, req_id: u64) {
    let client = app.client.get_untracked();
    spawn_local(async move {
        let result = client.links_for_owner(&owner_id).await;
        if is_stale(&app, &owner_id, req_id) {
            return;
        }
        match result {
            Ok(rows) => app.links.set(rows),
            Err(e) => {
                app.links.set(vec![]);
                log_warn(&format!("loading links failed: {e}"));
            }
        }
    });
}

pub(crate) fn load_news(app: AppState, owner_id: String, req_id: u64) {
    let client = app.client.get_untracked();
    spawn_local(async move {
        let result = client.news_for_owner(&owner_id).await;
        if is_stale(&app, &owner_id, req_id) {
            return;
        }
        match result {
            Ok(rows) => app.news.set(rows),
            Err(e) => {
                app.news.set(vec![]);
                log_warn(&format!("loading news failed: {e}"));
            }
        }
    });
}

/// After sign-in the admin panel works on the owner's own rows, whatever the
/// public view was showing.
pub(crate) fn load_admin_data(app: AppState, owner_id: String) {
    let req_id = app.resolve_request_id.get_untracked().saturating_add(1);
    app.resolve_request_id.set(req_id);
    app.loaded_owner_id.set(Some(owner_id.clone()));
    app.profile_not_found.set(false);

    let client = app.client.get_untracked();
    {
        let app = app.clone();
        let owner_id = owner_id.clone();
        spawn_local(async move {
            match client.profile_by_owner(&owner_id).await {
                Ok(Some(profile)) => {
                    if app.resolve_request_id.get_untracked() == req_id {
                        app.profile.set(profile);
                    }
                }
                Ok(None) => {
                    // No row yet: keep the form editable with a blank profile
                    // owned by this subject; upsert will create the row.
                    if app.resolve_request_id.get_untracked() == req_id {
                        app.profile.update(|p| p.id = owner_id.clone());
                    }
                }
                Err(e) => log_warn(&format!("loading own profile failed: {e}")),
            }
        });
    }

    load_links(app.clone(), owner_id.clone(), req_id);
    load_news(app, owner_id, req_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_slug_is_read_from_u_param() {
        assert_eq!(requested_slug_from_search("?u=acme"), Some("acme".to_string()));
        assert_eq!(
            requested_slug_from_search("?v=home&u=acme"),
            Some("acme".to_string())
        );
    }

    #[test]
    fn requested_slug_is_decoded_and_trimmed() {
        assert_eq!(
            requested_slug_from_search("?u=a%20b"),
            Some("a b".to_string())
        );
        assert_eq!(requested_slug_from_search("?u=%20%20"), None);
    }

    #[test]
    fn missing_or_empty_param_yields_none() {
        assert_eq!(requested_slug_from_search(""), None);
        assert_eq!(requested_slug_from_search("?v=admin"), None);
        assert_eq!(requested_slug_from_search("?u="), None);
    }
}
