use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_SCOPE: &str = "identifi-wallet-app";
pub const DEFAULT_MINIMUM_AGE: u8 = 20;
pub const DEFAULT_EXCLUDED_COUNTRIES: &[&str] = &["FRA"];

/// What a proof must disclose to be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosurePolicy {
    pub scope: String,
    pub minimum_age: u8,
    /// ISO 3166-1 alpha-3 codes.
    pub excluded_countries: Vec<String>,
}

impl Default for DisclosurePolicy {
    fn default() -> Self {
        Self {
            scope: DEFAULT_SCOPE.to_owned(),
            minimum_age: DEFAULT_MINIMUM_AGE,
            excluded_countries: DEFAULT_EXCLUDED_COUNTRIES
                .iter()
                .map(|c| (*c).to_owned())
                .collect(),
        }
    }
}

impl DisclosurePolicy {
    pub fn is_excluded(&self, country: &str) -> bool {
        self.excluded_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(country.trim()))
    }

    /// Parses a comma-separated country list, dropping blanks.
    pub fn parse_countries(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .collect()
    }
}

/// Payload encoded into the QR code the proving app scans.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRequest {
    pub app_name: String,
    pub scope: String,
    pub endpoint: String,
    pub user_id: String,
    pub user_id_type: String,
    pub disclosures: Disclosures,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disclosures {
    pub minimum_age: u8,
    pub excluded_countries: Vec<String>,
}

impl ProofRequest {
    /// New request with a random v4 user id.
    pub fn new(policy: &DisclosurePolicy, endpoint: impl Into<String>) -> Self {
        Self {
            app_name: "Identifi".to_owned(),
            scope: policy.scope.clone(),
            endpoint: endpoint.into(),
            user_id: Uuid::new_v4().to_string(),
            user_id_type: "uuid".to_owned(),
            disclosures: Disclosures {
                minimum_age: policy.minimum_age,
                excluded_countries: policy.excluded_countries.clone(),
            },
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
