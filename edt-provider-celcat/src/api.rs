//! CELCAT wire types and request parameters.

use std::sync::LazyLock;

use edt_core::{DateWindow, Entity};
use regex::Regex;
use serde::{Deserialize, Deserializer};

pub(crate) const LOGIN_PATH: &str = "LdapLogin";
pub(crate) const LOGON_PATH: &str = "LdapLogin/Logon";
pub(crate) const CALENDAR_DATA_PATH: &str = "Home/GetCalendarData";
pub(crate) const SIDEBAR_PATH: &str = "Home/GetSideBarEvent";

const TOKEN_FIELD: &str = "__RequestVerificationToken";

static INPUT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<input\b[^>]*>").expect("valid input tag pattern"));
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid attribute pattern")
});

/// Federation codes used in side-bar elements.
pub(crate) const MODULE_CODE: i64 = 100;
pub(crate) const STAFF_CODE: i64 = 101;
pub(crate) const ROOM_CODE: i64 = 102;

/// One entry of a `GetCalendarData` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEvent {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub start: String,
    pub end: Option<String>,
    #[serde(default)]
    pub all_day: bool,
    pub event_category: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub sites: Option<Vec<String>>,
    #[serde(default)]
    pub modules: Option<Vec<String>>,
}

/// `GetSideBarEvent` response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SideBar {
    #[serde(default)]
    pub elements: Vec<SideBarElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SideBarElement {
    pub content: Option<String>,
    pub entity_type: Option<i64>,
}

impl SideBar {
    /// Non-empty contents of the elements with the given federation code.
    pub fn contents(&self, code: i64) -> Vec<String> {
        self.elements
            .iter()
            .filter(|e| e.entity_type == Some(code))
            .filter_map(|e| e.content.as_deref())
            .map(crate::convert::clean_text)
            .filter(|c| !c.is_empty())
            .collect()
    }
}

/// Event ids come back as strings on most portals and as numbers on some.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Form for the dedicated call: explicit federation code and id.
pub(crate) fn calendar_data_form(
    federation_code: u16,
    entity_id: &str,
    window: &DateWindow,
) -> Vec<(&'static str, String)> {
    vec![
        ("start", window.start_param()),
        ("end", window.end_param()),
        ("resType", federation_code.to_string()),
        ("calView", "month".to_string()),
        ("federationIds[]", entity_id.to_string()),
        ("colourScheme", "3".to_string()),
    ]
}

/// Query for the generic call, in the portal's `cal?et=..&fid0=..` style.
pub(crate) fn calendar_data_query(
    window: &DateWindow,
    entity: Option<&Entity>,
) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("start", window.start_param()),
        ("end", window.end_param()),
        ("calView", "month".to_string()),
    ];
    if let Some(entity) = entity {
        query.push(("et", entity.kind.label().to_string()));
        query.push(("fid0", entity.id.clone()));
    }
    query
}

/// Quoted attribute value of an HTML tag, matched case-insensitively by name.
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    ATTRIBUTE
        .captures_iter(tag)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|value| value.as_str())
}

/// `<input>` tag whose `name` attribute is `name`.
fn find_input<'a>(html: &'a str, name: &str) -> Option<&'a str> {
    INPUT_TAG
        .find_iter(html)
        .map(|tag| tag.as_str())
        .find(|tag| attribute(tag, "name") == Some(name))
}

/// Value of the anti-forgery token hidden in the login form.
pub(crate) fn extract_verification_token(html: &str) -> Option<String> {
    let value = attribute(find_input(html, TOKEN_FIELD)?, "value")?;
    (!value.is_empty()).then(|| value.to_string())
}

/// Whether a page still shows the login form.
pub(crate) fn is_login_page(html: &str) -> bool {
    find_input(html, "Password").is_some() && find_input(html, TOKEN_FIELD).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use edt_core::EntityType;

    const LOGIN_HTML: &str = r#"<form action="/calendar/LdapLogin/Logon" method="post">
<input name="__RequestVerificationToken" type="hidden" value="CfDJ8abc-123_xyz" />
<input id="Name" name="Name" type="text" />
<input id="Password" name="Password" type="password" />
</form>"#;

    #[test]
    fn test_extract_token() {
        assert_eq!(
            extract_verification_token(LOGIN_HTML).as_deref(),
            Some("CfDJ8abc-123_xyz")
        );
    }

    #[test]
    fn test_extract_token_value_before_name() {
        let html = r#"<input type="hidden" value="tok" name="__RequestVerificationToken">"#;
        assert_eq!(extract_verification_token(html).as_deref(), Some("tok"));
    }

    #[test]
    fn test_extract_token_single_quotes_and_uppercase_tag() {
        let html = "<INPUT Type='hidden'\n  Name='__RequestVerificationToken' VALUE='a=b/c+'>";
        assert_eq!(extract_verification_token(html).as_deref(), Some("a=b/c+"));
    }

    #[test]
    fn test_token_name_outside_input_is_ignored() {
        let html = r#"<p>name="__RequestVerificationToken" value="fake"</p>
<input name="__RequestVerificationToken" type="hidden" value="" />"#;
        assert_eq!(extract_verification_token(html), None);
    }

    #[test]
    fn test_no_token() {
        assert_eq!(extract_verification_token("<html><body>Maintenance</body></html>"), None);
    }

    #[test]
    fn test_login_page_detection() {
        assert!(is_login_page(LOGIN_HTML));
        assert!(!is_login_page("<html><title>Calendar</title></html>"));
        assert!(!is_login_page("<p>Password reset: see __RequestVerificationToken docs</p>"));
    }

    #[test]
    fn test_generic_query_without_entity() {
        let window = DateWindow::sliding(NaiveDate::from_ymd_opt(2025, 10, 19).unwrap(), 0, 7);
        let query = calendar_data_query(&window, None);
        assert!(query.iter().all(|(k, _)| *k != "et" && *k != "fid0"));

        let entity = Entity::new(EntityType::Program, "42");
        let query = calendar_data_query(&window, Some(&entity));
        assert!(query.contains(&("et", "program".to_string())));
        assert!(query.contains(&("fid0", "42".to_string())));
    }

    #[test]
    fn test_raw_event_numeric_id() {
        let raw: RawEvent = serde_json::from_value(serde_json::json!({
            "id": 12345,
            "start": "2025-10-20T08:30:00",
            "end": "2025-10-20T10:00:00",
            "allDay": false,
            "eventCategory": "CM",
            "sites": null,
            "modules": ["Algorithmique"]
        }))
        .unwrap();

        assert_eq!(raw.id.as_deref(), Some("12345"));
        assert_eq!(raw.sites, None);
        assert_eq!(raw.modules, Some(vec!["Algorithmique".to_string()]));
    }

    #[test]
    fn test_side_bar_contents_by_code() {
        let side_bar: SideBar = serde_json::from_value(serde_json::json!({
            "elements": [
                { "label": "Salle", "content": "A101", "entityType": 102 },
                { "label": "Salle", "content": "  ", "entityType": 102 },
                { "label": "Enseignant", "content": "DUPONT Jean", "entityType": 101 },
                { "label": "Heure", "content": "08:30-10:00", "entityType": 0 }
            ]
        }))
        .unwrap();

        assert_eq!(side_bar.contents(ROOM_CODE), vec!["A101"]);
        assert_eq!(side_bar.contents(STAFF_CODE), vec!["DUPONT Jean"]);
        assert!(side_bar.contents(MODULE_CODE).is_empty());
    }
}
