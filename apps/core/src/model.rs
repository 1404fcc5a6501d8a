use serde::{Deserialize, Serialize};

/// Opaque handle the host uses to address a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    pub position_index: u32,
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl Tab {
    pub fn new(id: i64, position_index: u32, title: &str, url: &str) -> Self {
        Self {
            id: TabId(id),
            position_index,
            title: title.to_string(),
            url: url.to_string(),
        }
    }

    /// True when the tab's URL starts with one of the schemes the host
    /// forbids scripting on.
    pub fn is_chrome_page(&self, privileged_schemes: &[String]) -> bool {
        let url = self.url.trim_start().to_ascii_lowercase();
        privileged_schemes
            .iter()
            .any(|scheme| !scheme.is_empty() && url.starts_with(&scheme.to_ascii_lowercase()))
    }
}

pub fn normalize_for_match(input: &str) -> String {
    input.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{normalize_for_match, Tab};

    #[test]
    fn detects_privileged_scheme_case_insensitively() {
        let schemes = vec!["chrome://".to_string()];
        let settings = Tab::new(1, 0, "Settings", "CHROME://settings");
        let docs = Tab::new(2, 1, "Docs", "https://docs.rs");
        assert!(settings.is_chrome_page(&schemes));
        assert!(!docs.is_chrome_page(&schemes));
    }

    #[test]
    fn empty_scheme_never_matches() {
        let tab = Tab::new(1, 0, "Docs", "https://docs.rs");
        assert!(!tab.is_chrome_page(&[String::new()]));
    }

    #[test]
    fn normalization_only_lowercases() {
        assert_eq!(normalize_for_match("My Alpha-Page"), "my alpha-page");
    }
}
