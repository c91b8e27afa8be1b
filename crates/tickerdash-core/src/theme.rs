use serde::Serialize;

/// Dark terminal-style palette shared by every chart and the page chrome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub background: String,
    pub text: String,
    pub plot_background: String,
    pub line: String,
    pub table_header: String,
    pub table_border: String,
    pub dropdown_text: String,
    pub increasing: String,
    pub decreasing: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: String::from("#121212"),
            text: String::from("#F5F5F5"),
            plot_background: String::from("#1a1a1a"),
            line: String::from("#00CED1"),
            table_header: String::from("#FF4500"),
            table_border: String::from("#FF6347"),
            dropdown_text: String::from("#FF4500"),
            increasing: String::from("green"),
            decreasing: String::from("red"),
        }
    }
}
