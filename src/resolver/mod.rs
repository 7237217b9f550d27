use crate::api::{ApiResult, BackendClient};
use crate::models::Profile;
use crate::util::normalize_slug;

/// A single profile lookup the resolver wants performed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ProfileLookup {
    BySlug(String),
    ByOwner(String),
}

/// Outcome of a full resolution pass.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Resolution {
    Found(Profile),
    /// A requested slug matched nothing. Terminal; the fallback is never
    /// consulted, regardless of session state.
    NotFound,
    /// Neither session nor showcase produced a profile; lists stay empty.
    Unresolved,
}

/// First lookup in the precedence chain. A requested slug always wins over
/// the session; slugs are normalized before lookup.
pub(crate) fn first_lookup(
    requested_slug: Option<&str>,
    session_owner: Option<&str>,
) -> Option<ProfileLookup> {
    if let Some(slug) = requested_slug {
        let slug = normalize_slug(slug);
        if !slug.is_empty() {
            return Some(ProfileLookup::BySlug(slug));
        }
    }
    session_owner.map(|id| ProfileLookup::ByOwner(id.to_string()))
}

/// Next lookup after a miss. A missed requested slug is terminal (`None`
/// here, surfaced as `NotFound` by the driver); a missed owner lookup falls
/// back to the showcase slug; a missed showcase lookup ends the chain.
pub(crate) fn lookup_after_miss(
    missed: &ProfileLookup,
    fallback_slug: &str,
) -> Option<ProfileLookup> {
    match missed {
        ProfileLookup::BySlug(_) => None,
        ProfileLookup::ByOwner(_) => {
            let slug = normalize_slug(fallback_slug);
            if slug.is_empty() {
                None
            } else {
                Some(ProfileLookup::BySlug(slug))
            }
        }
    }
}

/// Backend surface the resolver needs; `BackendClient` implements it, tests
/// substitute a canned directory.
pub(crate) trait ProfileDirectory {
    async fn find_by_slug(&self, slug: &str) -> ApiResult<Option<Profile>>;
    async fn find_by_owner(&self, owner_id: &str) -> ApiResult<Option<Profile>>;
}

impl ProfileDirectory for BackendClient {
    async fn find_by_slug(&self, slug: &str) -> ApiResult<Option<Profile>> {
        self.profile_by_slug(slug).await
    }

    async fn find_by_owner(&self, owner_id: &str) -> ApiResult<Option<Profile>> {
        self.profile_by_owner(owner_id).await
    }
}

/// Run the precedence chain against a directory.
///
/// Called on initial load and on every explicit refresh; it reads nothing
/// from browser history itself, callers pass the slug they read from the
/// query string at call time. An authenticated owner without a profile row
/// falls through to the showcase profile.
pub(crate) async fn resolve_profile<D: ProfileDirectory>(
    dir: &D,
    requested_slug: Option<&str>,
    session_owner: Option<&str>,
    fallback_slug: &str,
) -> ApiResult<Resolution> {
    let had_requested_slug = requested_slug.is_some_and(|s| !normalize_slug(s).is_empty());

    let mut next = first_lookup(requested_slug, session_owner).or_else(|| {
        // Anonymous visit with no slug: go straight to the showcase.
        let slug = normalize_slug(fallback_slug);
        (!slug.is_empty()).then_some(ProfileLookup::BySlug(slug))
    });

    while let Some(lookup) = next {
        let found = match &lookup {
            ProfileLookup::BySlug(slug) => dir.find_by_slug(slug).await?,
            ProfileLookup::ByOwner(id) => dir.find_by_owner(id).await?,
        };

        if let Some(profile) = found {
            return Ok(Resolution::Found(profile));
        }
        next = lookup_after_miss(&lookup, fallback_slug);
    }

    if had_requested_slug {
        Ok(Resolution::NotFound)
    } else {
        Ok(Resolution::Unresolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;

    struct FakeDirectory {
        profiles: Vec<Profile>,
    }

    fn profile(id: &str, slug: &str) -> Profile {
        Profile {
            id: id.to_string(),
            name: format!("name-{id}"),
            bio: String::new(),
            avatar_url: String::new(),
            mascot_url: None,
            slug: Some(slug.to_string()),
        }
    }

    impl ProfileDirectory for FakeDirectory {
        async fn find_by_slug(&self, slug: &str) -> ApiResult<Option<Profile>> {
            Ok(self
                .profiles
                .iter()
                .find(|p| p.slug.as_deref() == Some(slug))
                .cloned())
        }

        async fn find_by_owner(&self, owner_id: &str) -> ApiResult<Option<Profile>> {
            Ok(self.profiles.iter().find(|p| p.id == owner_id).cloned())
        }
    }

    // The resolver futures never actually suspend against a fake directory,
    // so a single poll is enough to drive them to completion.
    fn run<F: Future>(fut: F) -> F::Output {
        let mut fut = std::pin::pin!(fut);
        let waker = std::task::Waker::noop();
        let mut cx = std::task::Context::from_waker(waker);
        match fut.as_mut().poll(&mut cx) {
            std::task::Poll::Ready(v) => v,
            std::task::Poll::Pending => panic!("fake directory future suspended"),
        }
    }

    fn showcase_dir() -> FakeDirectory {
        FakeDirectory {
            profiles: vec![profile("s1", "showcase"), profile("u1", "owner-one")],
        }
    }

    #[test]
    fn requested_slug_wins_over_session() {
        let dir = showcase_dir();
        let r = run(resolve_profile(&dir, Some("owner-one"), Some("s1"), "showcase"))
            .expect("resolution should succeed");
        assert_eq!(r, Resolution::Found(profile("u1", "owner-one")));
    }

    #[test]
    fn unknown_requested_slug_is_not_found_even_when_signed_in() {
        let dir = showcase_dir();
        let r = run(resolve_profile(&dir, Some("acme"), Some("u1"), "showcase"))
            .expect("resolution should succeed");
        assert_eq!(r, Resolution::NotFound);
    }

    #[test]
    fn requested_slug_lookup_is_case_insensitive() {
        let dir = showcase_dir();
        let r = run(resolve_profile(&dir, Some("  Owner-One "), None, "showcase"))
            .expect("resolution should succeed");
        assert_eq!(r, Resolution::Found(profile("u1", "owner-one")));
    }

    #[test]
    fn session_owner_is_used_when_no_slug_requested() {
        let dir = showcase_dir();
        let r = run(resolve_profile(&dir, None, Some("u1"), "showcase"))
            .expect("resolution should succeed");
        // Showcase fallback is never consulted here.
        assert_eq!(r, Resolution::Found(profile("u1", "owner-one")));
    }

    #[test]
    fn owner_without_profile_row_falls_through_to_showcase() {
        let dir = showcase_dir();
        let r = run(resolve_profile(&dir, None, Some("ghost"), "showcase"))
            .expect("resolution should succeed");
        assert_eq!(r, Resolution::Found(profile("s1", "showcase")));
    }

    #[test]
    fn anonymous_visit_resolves_to_showcase() {
        let dir = showcase_dir();
        let r = run(resolve_profile(&dir, None, None, "showcase"))
            .expect("resolution should succeed");
        assert_eq!(r, Resolution::Found(profile("s1", "showcase")));
    }

    #[test]
    fn missing_showcase_yields_unresolved_not_not_found() {
        let dir = FakeDirectory { profiles: vec![] };
        let r = run(resolve_profile(&dir, None, None, "showcase"))
            .expect("resolution should succeed");
        assert_eq!(r, Resolution::Unresolved);
    }

    #[test]
    fn blank_requested_slug_is_treated_as_absent() {
        let dir = showcase_dir();
        let r = run(resolve_profile(&dir, Some("   "), Some("u1"), "showcase"))
            .expect("resolution should succeed");
        assert_eq!(r, Resolution::Found(profile("u1", "owner-one")));
    }

    #[test]
    fn resolution_is_deterministic_for_identical_inputs() {
        let dir = showcase_dir();
        let a = run(resolve_profile(&dir, None, Some("u1"), "showcase")).expect("should resolve");
        let b = run(resolve_profile(&dir, None, Some("u1"), "showcase")).expect("should resolve");
        assert_eq!(a, b);
    }

    #[test]
    fn first_lookup_prefers_slug_and_normalizes() {
        assert_eq!(
            first_lookup(Some("Acme "), Some("u1")),
            Some(ProfileLookup::BySlug("acme".to_string()))
        );
        assert_eq!(
            first_lookup(None, Some("u1")),
            Some(ProfileLookup::ByOwner("u1".to_string()))
        );
        assert_eq!(first_lookup(None, None), None);
    }

    #[test]
    fn lookup_after_miss_chain() {
        assert_eq!(
            lookup_after_miss(&ProfileLookup::BySlug("acme".into()), "showcase"),
            None
        );
        assert_eq!(
            lookup_after_miss(&ProfileLookup::ByOwner("u1".into()), "showcase"),
            Some(ProfileLookup::BySlug("showcase".to_string()))
        );
        // A showcase miss ends the chain at the driver level (BySlug -> None).
    }
}
