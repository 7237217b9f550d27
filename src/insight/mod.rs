//! Optional generative "insight" tip for the admin panel.
//!
//! Strictly best-effort: no configured endpoint, a failed call, or an
//! unusable response all mean "no tip", never an error surface.

use crate::models::{LinkItem, Profile};

#[derive(Clone, Debug)]
pub(crate) struct InsightConfig {
    pub url: String,
    pub api_key: Option<String>,
}

impl InsightConfig {
    /// `window.ENV.INSIGHT_URL` (+ optional `INSIGHT_KEY`). Absent -> None,
    /// and the whole feature is skipped.
    pub fn from_env() -> Option<Self> {
        let window = web_sys::window()?;
        let env = window.get("ENV")?;
        if env.is_undefined() || !env.is_object() {
            return None;
        }

        let get = |key: &str| {
            js_sys::Reflect::get(&env, &key.into())
                .ok()
                .and_then(|v| v.as_string())
                .filter(|s| !s.trim().is_empty())
        };

        Some(Self {
            url: get("INSIGHT_URL")?,
            api_key: get("INSIGHT_KEY"),
        })
    }
}

/// Short context string the endpoint turns into a one-line tip.
pub(crate) fn build_insight_context(profile: &Profile, links: &[LinkItem]) -> String {
    let total_clicks: i64 = links.iter().map(|l| l.click_count).sum();
    format!(
        "Profile: {}. Bio: {}. {} links, {} total clicks.",
        profile.name.trim(),
        profile.bio.trim(),
        links.len(),
        total_clicks
    )
}

/// Fetch a tip, swallowing every failure.
pub(crate) async fn fetch_tip(config: &InsightConfig, context: &str) -> Option<String> {
    let client = reqwest::Client::new();
    let mut req = client
        .post(&config.url)
        .json(&serde_json::json!({ "context": context }));
    if let Some(key) = &config.api_key {
        req = req.header("Authorization", format!("Bearer {key}"));
    }

    let res = req.send().await.ok()?;
    if !res.status().is_success() {
        return None;
    }

    let data: serde_json::Value = res.json().await.ok()?;
    data.get("tip")
        .or_else(|| data.get("text"))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(clicks: i64) -> LinkItem {
        LinkItem {
            id: "l".to_string(),
            user_id: None,
            title: "t".to_string(),
            description: String::new(),
            url: "https://x".to_string(),
            icon_url: String::new(),
            click_count: clicks,
            created_at: String::new(),
        }
    }

    #[test]
    fn context_aggregates_link_stats() {
        let mut p = Profile::placeholder();
        p.name = "Acme".to_string();
        p.bio = "Tools for teams".to_string();

        let ctx = build_insight_context(&p, &[link(3), link(4)]);
        assert_eq!(ctx, "Profile: Acme. Bio: Tools for teams. 2 links, 7 total clicks.");
    }

    #[test]
    fn context_handles_empty_lists() {
        let p = Profile::placeholder();
        let ctx = build_insight_context(&p, &[]);
        assert!(ctx.ends_with("0 links, 0 total clicks."));
    }
}
