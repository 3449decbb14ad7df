use std::env;

use eyre::{Result, eyre};
use serde::Deserialize;
use tracing::{debug, error};
use url::Url;

/// Default FoodData Central API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

/// One nutrient measurement inside a food record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientEntry {
    #[serde(default)]
    pub nutrient_id: Option<u64>,
    #[serde(default)]
    pub nutrient_name: String,
    #[serde(default)]
    pub nutrient_number: Option<String>,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub unit_name: String,
}

/// One search hit from the food database.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRecord {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub food_nutrients: Vec<NutrientEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<FoodRecord>,
}

pub struct UsdaClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl UsdaClient {
    pub fn new() -> Result<Self> {
        let api_key = env::var("USDA_API_KEY")
            .map_err(|_| eyre!("USDA_API_KEY environment variable not set"))?;

        let base_url = env::var("USDA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self::with_config(api_key, base_url))
    }

    pub fn with_config(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Run a keyword search and return the matching food records.
    pub async fn search_foods(&self, query: &str, page_size: u32) -> Result<Vec<FoodRecord>> {
        let endpoint = Url::parse(&format!("{}/foods/search", self.base_url))?;

        debug!("Searching foods: query={:?} page_size={}", query, page_size);

        let response = self
            .client
            .get(endpoint)
            .query(&[
                ("api_key", self.api_key.clone()),
                ("query", query.to_string()),
                ("pageSize", page_size.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Food search failed with status {}: {}", status, body);
            return Err(eyre!("Food search failed with status {}", status));
        }

        let parsed: SearchResponse = response.json().await?;

        debug!("Food search returned {} records", parsed.foods.len());

        Ok(parsed.foods)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
