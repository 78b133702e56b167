use std::collections::BTreeMap;

use serde::Serialize;

/// Effective formatting settings for one path.
#[derive(Debug, Serialize)]
pub struct EditorConfigResponse {
    pub ref_name: String,
    pub path: String,
    /// Whether any `.editorconfig` section matched
    pub matched: bool,
    pub tab_width: u32,
    pub indent_style: Option<String>,
    pub max_line_length: Option<u32>,
    pub properties: BTreeMap<String, String>,
}
