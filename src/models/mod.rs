use serde::{Deserialize, Serialize};

/// A published profile row.
///
/// `id` matches the auth subject id for owned profiles. The backend enforces
/// slug uniqueness; the client only normalizes before lookups and writes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Profile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub mascot_url: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl Profile {
    /// Rendered before the first resolution completes (and as the default
    /// identity of the showcase page when the backend has no row for it).
    pub fn placeholder() -> Self {
        Self {
            id: String::new(),
            name: "Biolink".to_string(),
            bio: "One page for every link that matters.".to_string(),
            avatar_url: String::new(),
            mascot_url: None,
            slug: None,
        }
    }
}

/// A call-to-action card. `click_count` only ever grows and is maintained
/// backend-side by the click RPC; the client never writes it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct LinkItem {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon_url: String,
    #[serde(default)]
    pub click_count: i64,
    #[serde(default)]
    pub created_at: String,
}

/// An announcement post.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct News {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

/// Authenticated session as persisted in localStorage.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Session {
    pub access_token: String,
    pub owner_id: String,
    #[serde(default)]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_row_contract_deserialize() {
        // Column names as returned by the profiles table.
        let json = r#"{
            "id": "u1",
            "name": "Acme",
            "bio": "Hello",
            "avatar_url": "https://cdn.example/a.png",
            "mascot_url": null,
            "slug": "acme"
        }"#;
        let p: Profile = serde_json::from_str(json).expect("profile row should parse");
        assert_eq!(p.id, "u1");
        assert_eq!(p.slug.as_deref(), Some("acme"));
        assert!(p.mascot_url.is_none());
    }

    #[test]
    fn profile_row_tolerates_missing_optional_columns() {
        let p: Profile = serde_json::from_str(r#"{"id": "u1"}"#).expect("should parse");
        assert!(p.name.is_empty());
        assert!(p.slug.is_none());
    }

    #[test]
    fn link_row_contract_deserialize() {
        let json = r#"{
            "id": "l1",
            "user_id": "u1",
            "title": "Docs",
            "description": "Read the docs",
            "url": "https://example.com",
            "icon_url": "",
            "click_count": 7,
            "created_at": "2026-08-01T10:00:00Z"
        }"#;
        let l: LinkItem = serde_json::from_str(json).expect("link row should parse");
        assert_eq!(l.click_count, 7);
        assert_eq!(l.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn link_row_defaults_click_count_to_zero() {
        let l: LinkItem = serde_json::from_str(r#"{"id": "l1", "title": "T", "url": "https://x"}"#)
            .expect("should parse");
        assert_eq!(l.click_count, 0);
    }

    #[test]
    fn news_row_contract_deserialize() {
        let json = r#"{
            "id": "n1",
            "user_id": "u1",
            "title": "Launch",
            "content": "We launched.",
            "image_url": "https://cdn.example/b.png",
            "link_url": "https://example.com/post",
            "created_at": "2026-08-02T09:30:00Z"
        }"#;
        let n: News = serde_json::from_str(json).expect("news row should parse");
        assert_eq!(n.link_url.as_deref(), Some("https://example.com/post"));
    }

    #[test]
    fn session_storage_roundtrip_serde() {
        let s = Session {
            access_token: "jwt".to_string(),
            owner_id: "u1".to_string(),
            email: "u@example.com".to_string(),
        };
        let json = serde_json::to_string(&s).expect("should serialize");
        let back: Session = serde_json::from_str(&json).expect("should parse");
        assert_eq!(back, s);
    }
}
