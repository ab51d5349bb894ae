use serde::{Deserialize, Serialize};

use crate::catalog;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub city: String,
    pub timezone: String,
}

impl Airport {
    /// Builds a route endpoint from the supported-airport catalog.
    pub fn from_code(code: &str) -> Option<Self> {
        catalog::airport(code).map(|info| Self {
            code: info.code.to_string(),
            name: info.name.to_string(),
            city: info.city.to_string(),
            timezone: info.timezone.to_string(),
        })
    }

    /// Endpoint for a code the catalog does not know; free text is kept as the
    /// display name and the code is truncated to three uppercase letters.
    pub fn unlisted(input: &str) -> Self {
        let code: String = input.trim().to_uppercase().chars().take(3).collect();
        Self {
            code,
            name: input.trim().to_string(),
            city: input.trim().to_string(),
            timezone: "UTC".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Airline {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl Airline {
    pub fn from_code(code: &str) -> Option<Self> {
        catalog::airline(code).map(|info| Self {
            code: info.code.to_string(),
            name: info.name.to_string(),
            logo: None,
        })
    }
}
