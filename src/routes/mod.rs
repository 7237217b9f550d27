/// The four navigable views. Browser history is treated as an input that
/// produces one of these, never as state of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum View {
    Home,
    Admin,
    Privacy,
    NewsList,
}

pub(crate) fn path_for(view: View) -> &'static str {
    match view {
        View::Home => "/",
        View::Admin => "/admin",
        View::Privacy => "/privacy",
        View::NewsList => "/news",
    }
}

/// Map a location path back to a view. Unknown paths resolve to Home so a
/// full reload of any URL lands somewhere valid instead of a host 404.
pub(crate) fn view_for_path(path: &str) -> View {
    match path.trim_end_matches('/') {
        "/admin" => View::Admin,
        "/privacy" => View::Privacy,
        "/news" => View::NewsList,
        _ => View::Home,
    }
}

/// Public URL for a profile slug, built on the current origin.
pub(crate) fn public_url_for_slug(origin: &str, slug: &str) -> String {
    format!("{}/?u={}", origin.trim_end_matches('/'), urlencoding::encode(slug))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_roundtrip_through_view_for_path() {
        for view in [View::Home, View::Admin, View::Privacy, View::NewsList] {
            assert_eq!(view_for_path(path_for(view)), view);
        }
    }

    #[test]
    fn trailing_slashes_are_tolerated() {
        assert_eq!(view_for_path("/admin/"), View::Admin);
        assert_eq!(view_for_path("/news/"), View::NewsList);
    }

    #[test]
    fn unknown_paths_fall_back_to_home() {
        assert_eq!(view_for_path("/nope"), View::Home);
        assert_eq!(view_for_path(""), View::Home);
    }

    #[test]
    fn public_url_carries_the_slug_query_param() {
        assert_eq!(
            public_url_for_slug("https://bio.example/", "acme"),
            "https://bio.example/?u=acme"
        );
        assert_eq!(
            public_url_for_slug("https://bio.example", "a b"),
            "https://bio.example/?u=a%20b"
        );
    }
}
