use crate::ast::{Expression, PageSettings, StoredState};
use crate::error::PublishError;
use crate::generate::validate_expression;
use crate::host::{Notification, Notifier, SETTINGS_ERRORS_GROUP};

/// A page setting which may hold a stored expression
#[derive(Debug, Clone, PartialEq)]
pub enum StoredSetting {
    Expression(Expression),
    Text(String),
}

/// Parse a setting: stored JSON expressions start with `[` or `{`, anything
/// else is plain text. `None` for blank settings.
pub fn parse_setting(name: &str, raw: &str) -> Result<Option<StoredSetting>, PublishError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if !raw.starts_with('[') && !raw.starts_with('{') {
        return Ok(Some(StoredSetting::Text(raw.to_string())));
    }
    let invalid = |reason: String| PublishError::InvalidSettings {
        name: name.to_string(),
        reason,
    };
    let expression: Expression = serde_json::from_str(raw).map_err(|err| invalid(err.to_string()))?;
    if expression.is_empty() {
        return Ok(None);
    }
    validate_expression(&expression).map_err(|err| invalid(err.message))?;
    Ok(Some(StoredSetting::Expression(expression)))
}

/// Settings with every malformed stored expression reported and cleared
pub fn validate_settings(settings: &PageSettings, notifier: &mut dyn Notifier) -> PageSettings {
    let mut settings = settings.clone();
    for (name, value) in settings.expression_settings_mut() {
        let Some(raw) = value.as_deref() else { continue };
        if let Err(err) = parse_setting(name, raw) {
            log::error!("{}", err);
            notifier.notify(Notification::error(format!("Invalid JSON for {}", name), SETTINGS_ERRORS_GROUP));
            *value = None;
        }
    }
    settings
}

/// SEO and social sharing expressions as hidden states of the body, so
/// that the page query includes their fields
pub fn seo_states(settings: &PageSettings) -> Vec<StoredState> {
    let fields = [
        ("eleventySeoTitle", &settings.seo_title),
        ("eleventySeoDescription", &settings.seo_description),
        ("eleventyFavicon", &settings.favicon),
        ("eleventyOGImage", &settings.og_image),
        ("eleventyOGTitle", &settings.og_title),
        ("eleventyOGDescription", &settings.og_description),
    ];
    fields
        .into_iter()
        .filter_map(|(name, value)| match parse_setting(name, value.as_deref()?) {
            Ok(Some(StoredSetting::Expression(expression))) => Some(StoredState {
                id: name.to_string(),
                label: Some(name.to_string()),
                hidden: true,
                expression,
            }),
            _ => None,
        })
        .collect()
}
