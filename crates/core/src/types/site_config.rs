//! Site branding and footer configuration.

use serde::{Deserialize, Serialize};

/// Primary key of the singleton configuration row.
pub const SITE_CONFIG_ID: i64 = 1;

/// A footer link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

impl SocialLink {
    #[must_use]
    pub fn new(platform: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            url: url.into(),
        }
    }

    /// External links open in a new tab; `#` placeholders and relative
    /// links stay in the page.
    #[must_use]
    pub fn opens_in_new_tab(&self) -> bool {
        self.url.starts_with("http") || self.url.starts_with("mailto:")
    }
}

/// The singleton site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub site_name: String,
    pub logo_url: Option<String>,
    pub footer_text: String,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
}

impl SiteConfig {
    /// Drop links with neither platform nor url and trim the text fields.
    /// An empty logo becomes `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            site_name: self.site_name.trim().to_owned(),
            logo_url: self
                .logo_url
                .map(|url| url.trim().to_owned())
                .filter(|url| !url.is_empty()),
            footer_text: self.footer_text.trim().to_owned(),
            social_links: self
                .social_links
                .into_iter()
                .map(|link| SocialLink::new(link.platform.trim(), link.url.trim()))
                .filter(|link| !link.platform.is_empty() || !link.url.is_empty())
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_opens_in_new_tab() {
        assert!(SocialLink::new("Instagram", "https://instagram.com/x").opens_in_new_tab());
        assert!(SocialLink::new("Contacto", "mailto:hola@x.es").opens_in_new_tab());
        assert!(!SocialLink::new("Pinterest", "#").opens_in_new_tab());
    }

    #[test]
    fn test_normalized() {
        let config = SiteConfig {
            site_name: " Lumina ".to_string(),
            logo_url: Some("  ".to_string()),
            footer_text: "pie".to_string(),
            social_links: vec![SocialLink::new("", " "), SocialLink::new("X", "#")],
        }
        .normalized();

        assert_eq!(config.site_name, "Lumina");
        assert!(config.logo_url.is_none());
        assert_eq!(config.social_links, vec![SocialLink::new("X", "#")]);
    }

    #[test]
    fn test_snapshot_field_names() {
        let config = SiteConfig {
            site_name: "A".to_string(),
            logo_url: None,
            footer_text: String::new(),
            social_links: Vec::new(),
        };
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("siteName").is_some());
        assert!(json.get("socialLinks").is_some());
    }
}
