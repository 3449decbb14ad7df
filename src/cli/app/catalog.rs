use std::collections::BTreeSet;

use tracing::error;

use crate::usda_client::UsdaClient;

/// The fixed food-group search terms used to build the browsable list.
pub const FOOD_GROUPS: [&str; 8] = [
    "Fruits",
    "Vegetables",
    "Grains",
    "Protein Foods",
    "Dairy",
    "Seafood",
    "Nuts",
    "Seeds",
];

const GROUP_PAGE_SIZE: u32 = 50;

/// The browsable food list, plus any per-group warnings to show the user.
pub struct FoodCatalog {
    pub foods: Vec<String>,
    pub warnings: Vec<String>,
}

/// Search every food group and collate the results.
///
/// A group that fails only contributes a warning; the remaining groups are
/// still fetched. There are no retries.
pub async fn fetch_food_catalog(client: &UsdaClient) -> FoodCatalog {
    let mut descriptions = Vec::new();
    let mut warnings = Vec::new();

    for group in FOOD_GROUPS {
        match client.search_foods(group, GROUP_PAGE_SIZE).await {
            Ok(records) => {
                descriptions.extend(
                    records
                        .into_iter()
                        .map(|record| record.description)
                        .filter(|description| !description.is_empty()),
                );
            }
            Err(e) => {
                error!("Catalog fetch failed for group {:?}: {}", group, e);
                warnings.push(format!("Error fetching {}: {}", group, e));
            }
        }
    }

    FoodCatalog {
        foods: collate(descriptions),
        warnings,
    }
}

/// Deduplicate and sort lexicographically.
fn collate(descriptions: Vec<String>) -> Vec<String> {
    let unique: BTreeSet<String> = descriptions.into_iter().collect();
    unique.into_iter().collect()
}
