use serde::{Deserialize, Serialize};

/// Body of the `POST /shorten` form.
#[derive(Debug, Deserialize)]
pub struct ShortenForm {
    #[serde(rename = "inputUrl", default)]
    pub input_url: String,
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub total_mappings: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_mappings: u64,
}
