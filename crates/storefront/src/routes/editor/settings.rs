//! Site settings tab: name, logo, footer text and social links.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Query, State},
    response::{IntoResponse, Response},
};
use lumina_core::{SiteConfig, SocialLink};

use super::{MultipartForm, shop_error_redirect};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireEditor;
use crate::routes::{MessageQuery, redirect_with_success};
use crate::state::AppState;

const SETTINGS_PATH: &str = "/editor/settings";

/// Blank social link rows offered below the existing ones.
const EMPTY_LINK_ROWS: usize = 2;

/// Settings tab template.
#[derive(Template, WebTemplate)]
#[template(path = "editor/settings.html")]
pub struct SettingsTemplate {
    pub site: SiteConfig,
    pub editor_email: String,
    pub error: Option<String>,
    pub success: Option<String>,
    /// Existing links followed by empty rows.
    pub links: Vec<SocialLink>,
}

/// Display the settings form.
pub async fn page(
    State(state): State<AppState>,
    RequireEditor(editor): RequireEditor,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let site = state.shop().catalog().await.site_config.clone();
    let mut links = site.social_links.clone();
    links.extend(std::iter::repeat_n(SocialLink::new("", ""), EMPTY_LINK_ROWS));

    SettingsTemplate {
        site,
        editor_email: editor.email.to_string(),
        error: query.error,
        success: query.success,
        links,
    }
}

/// Build the new configuration. An uploaded logo wins over the URL field;
/// `remove_logo` wins over both.
fn config_from(form: &MultipartForm) -> SiteConfig {
    let logo_url = if form.text("remove_logo").is_empty() {
        form.image("logo")
            .map(str::to_owned)
            .or_else(|| Some(form.text("logo_url")))
    } else {
        None
    };

    let social_links = form
        .all("social_platform")
        .iter()
        .zip(form.all("social_url"))
        .map(|(platform, url)| SocialLink::new(platform.as_str(), url.as_str()))
        .collect();

    SiteConfig {
        site_name: form.text("site_name"),
        logo_url,
        footer_text: form.text("footer_text"),
        social_links,
    }
    .normalized()
}

/// Save the settings form.
pub async fn update(
    State(state): State<AppState>,
    RequireEditor(_editor): RequireEditor,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = MultipartForm::read(multipart).await?;
    let config = config_from(&form);

    match state.shop().update_site_config(config).await {
        Ok(_) => {
            add_breadcrumb("editor", "Updated site settings", None);
            Ok(redirect_with_success(SETTINGS_PATH, "Configuración guardada.").into_response())
        }
        Err(e) => Ok(shop_error_redirect(SETTINGS_PATH, &e).into_response()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn form(fields: &[(&str, &str)], files: &[(&str, &str)]) -> MultipartForm {
        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in fields {
            grouped
                .entry((*key).to_string())
                .or_default()
                .push((*value).to_string());
        }
        MultipartForm {
            fields: grouped,
            files: files
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_social_links_paired_and_blank_rows_dropped() {
        let config = config_from(&form(
            &[
                ("site_name", " Lumina "),
                ("footer_text", "Hecho a mano"),
                ("social_platform", "Instagram"),
                ("social_url", "https://instagram.com/lumina"),
                ("social_platform", ""),
                ("social_url", ""),
            ],
            &[],
        ));
        assert_eq!(config.site_name, "Lumina");
        assert_eq!(
            config.social_links,
            vec![SocialLink::new("Instagram", "https://instagram.com/lumina")]
        );
        assert_eq!(config.logo_url, None);
    }

    #[test]
    fn test_logo_sources() {
        let uploaded = config_from(&form(
            &[("logo_url", "https://example.com/logo.png")],
            &[("logo", "data:image/png;base64,YWJj")],
        ));
        assert_eq!(uploaded.logo_url.as_deref(), Some("data:image/png;base64,YWJj"));

        let removed = config_from(&form(
            &[("logo_url", "https://example.com/logo.png"), ("remove_logo", "on")],
            &[],
        ));
        assert_eq!(removed.logo_url, None);
    }
}
