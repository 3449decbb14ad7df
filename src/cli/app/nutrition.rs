use eyre::Result;

use crate::cli::app::session::SessionState;
use crate::usda_client::{FoodRecord, NutrientEntry, UsdaClient};

/// The five fixed macro-nutrient buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroNutrient {
    Calories,
    Protein,
    Fat,
    Carbohydrates,
    Fiber,
}

impl MacroNutrient {
    /// Map from FoodData Central stable nutrient ids.
    pub fn from_nutrient_id(id: u64) -> Option<Self> {
        match id {
            1008 => Some(MacroNutrient::Calories),
            1003 => Some(MacroNutrient::Protein),
            1004 => Some(MacroNutrient::Fat),
            1005 => Some(MacroNutrient::Carbohydrates),
            1079 => Some(MacroNutrient::Fiber),
            _ => None,
        }
    }

    /// Map from FoodData Central nutrient numbers (the legacy identifiers).
    pub fn from_nutrient_number(number: &str) -> Option<Self> {
        match number {
            "208" => Some(MacroNutrient::Calories),
            "203" => Some(MacroNutrient::Protein),
            "204" => Some(MacroNutrient::Fat),
            "205" => Some(MacroNutrient::Carbohydrates),
            "291" => Some(MacroNutrient::Fiber),
            _ => None,
        }
    }

    /// Name-substring heuristic for records that carry no usable identifier.
    /// First match in this fixed order wins; an entry fills at most one bucket.
    pub fn from_name(name: &str) -> Option<Self> {
        const ORDERED: [(&str, MacroNutrient); 5] = [
            ("Energy", MacroNutrient::Calories),
            ("Protein", MacroNutrient::Protein),
            ("Total lipid (fat)", MacroNutrient::Fat),
            ("Carbohydrate", MacroNutrient::Carbohydrates),
            ("Fiber", MacroNutrient::Fiber),
        ];

        ORDERED
            .iter()
            .find(|(needle, _)| name.contains(needle))
            .map(|(_, bucket)| *bucket)
    }
}

/// Nutrient names that land in the free-form vitamins/minerals list.
const MICRO_KEYWORDS: [&str; 5] = ["vitamin", "mineral", "calcium", "iron", "zinc"];

/// Scaled, formatted nutrient summary for one food lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutritionInfo {
    pub calories: Option<String>,
    pub protein: Option<String>,
    pub fat: Option<String>,
    pub carbohydrates: Option<String>,
    pub fiber: Option<String>,
    pub vitamins_minerals: Vec<String>,
}

impl NutritionInfo {
    /// The five macro fields in display order.
    pub fn macros(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("Calories", self.calories.as_deref()),
            ("Protein", self.protein.as_deref()),
            ("Fat", self.fat.as_deref()),
            ("Carbohydrates", self.carbohydrates.as_deref()),
            ("Fiber", self.fiber.as_deref()),
        ]
    }

    fn macro_field_mut(&mut self, bucket: MacroNutrient) -> &mut Option<String> {
        match bucket {
            MacroNutrient::Calories => &mut self.calories,
            MacroNutrient::Protein => &mut self.protein,
            MacroNutrient::Fat => &mut self.fat,
            MacroNutrient::Carbohydrates => &mut self.carbohydrates,
            MacroNutrient::Fiber => &mut self.fiber,
        }
    }
}

/// A completed lookup: which record matched, and its normalized nutrients.
pub struct FoodLookup {
    pub description: String,
    pub info: NutritionInfo,
}

fn classify(entry: &NutrientEntry) -> Option<MacroNutrient> {
    if let Some(id) = entry.nutrient_id {
        if let Some(bucket) = MacroNutrient::from_nutrient_id(id) {
            return Some(bucket);
        }
    }
    if let Some(number) = &entry.nutrient_number {
        if let Some(bucket) = MacroNutrient::from_nutrient_number(number) {
            return Some(bucket);
        }
    }
    MacroNutrient::from_name(&entry.nutrient_name)
}

pub fn format_scaled(value: f64, quantity: f64, unit: &str) -> String {
    format!("{:.1} {}", value * quantity, unit)
}

/// Scale every nutrient by `quantity` and bucket the results.
///
/// Macro classification prefers the record's stable identifiers and falls
/// back to the name heuristic. The vitamins/minerals keyword match is
/// independent: an entry can fill a macro bucket and still be listed.
pub fn normalize_nutrients(record: &FoodRecord, quantity: f64) -> NutritionInfo {
    let mut info = NutritionInfo::default();

    for entry in &record.food_nutrients {
        let formatted = format_scaled(entry.value, quantity, &entry.unit_name);

        if let Some(bucket) = classify(entry) {
            *info.macro_field_mut(bucket) = Some(formatted.clone());
        }

        let lowered = entry.nutrient_name.to_lowercase();
        if MICRO_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
            info.vitamins_minerals
                .push(format!("{}: {}", entry.nutrient_name, formatted));
        }
    }

    info
}

/// Look up the best-matching record for `food_item` and normalize it.
///
/// Returns `Ok(None)` when the search has no hits; the caller surfaces that
/// as "no data" rather than a failure. On a hit, the session's last-analyzed
/// fields are updated.
pub async fn get_food_nutrition(
    client: &UsdaClient,
    food_item: &str,
    quantity: f64,
    session: &mut SessionState,
) -> Result<Option<FoodLookup>> {
    let mut foods = client.search_foods(food_item, 1).await?;

    if foods.is_empty() {
        return Ok(None);
    }
    let record = foods.remove(0);

    let info = normalize_nutrients(&record, quantity);

    session.last_analyzed_food = Some(food_item.to_string());
    session.last_food_quantity = quantity;

    Ok(Some(FoodLookup {
        description: record.description,
        info,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, value: f64, unit: &str) -> NutrientEntry {
        NutrientEntry {
            nutrient_id: None,
            nutrient_name: name.to_string(),
            nutrient_number: None,
            value,
            unit_name: unit.to_string(),
        }
    }

    fn record(entries: Vec<NutrientEntry>) -> FoodRecord {
        FoodRecord {
            description: "Test food".to_string(),
            food_nutrients: entries,
        }
    }

    #[test]
    fn scales_by_quantity_to_one_decimal() {
        let info = normalize_nutrients(&record(vec![entry("Protein", 5.0, "G")]), 2.0);
        assert_eq!(info.protein.as_deref(), Some("10.0 G"));
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(format_scaled(0.333, 3.0, "G"), "1.0 G");
        assert_eq!(format_scaled(89.0, 1.0, "KCAL"), "89.0 KCAL");
    }

    #[test]
    fn macro_buckets_are_mutually_exclusive() {
        let info = normalize_nutrients(&record(vec![entry("Energy", 89.0, "KCAL")]), 1.0);
        assert_eq!(info.calories.as_deref(), Some("89.0 KCAL"));
        assert_eq!(info.protein, None);
        assert_eq!(info.fat, None);
        assert_eq!(info.carbohydrates, None);
        assert_eq!(info.fiber, None);
    }

    #[test]
    fn first_name_match_in_fixed_order_wins() {
        // Contains both "Energy" and "Protein"; Energy is checked first.
        assert_eq!(
            MacroNutrient::from_name("Energy from Protein"),
            Some(MacroNutrient::Calories)
        );
    }

    #[test]
    fn stable_id_beats_the_name_heuristic() {
        let mut protein = entry("Eiweiß", 3.2, "G");
        protein.nutrient_id = Some(1003);
        let info = normalize_nutrients(&record(vec![protein]), 1.0);
        assert_eq!(info.protein.as_deref(), Some("3.2 G"));
    }

    #[test]
    fn nutrient_number_is_accepted_when_id_is_unmapped() {
        let mut carbs = entry("Carbs", 10.0, "G");
        carbs.nutrient_id = Some(999_999);
        carbs.nutrient_number = Some("205".to_string());
        let info = normalize_nutrients(&record(vec![carbs]), 1.0);
        assert_eq!(info.carbohydrates.as_deref(), Some("10.0 G"));
    }

    #[test]
    fn unmapped_id_falls_back_to_the_name() {
        let mut fiber = entry("Fiber, total dietary", 2.6, "G");
        fiber.nutrient_id = Some(999_999);
        let info = normalize_nutrients(&record(vec![fiber]), 1.0);
        assert_eq!(info.fiber.as_deref(), Some("2.6 G"));
    }

    #[test]
    fn micro_keywords_are_case_insensitive() {
        let info = normalize_nutrients(
            &record(vec![
                entry("Vitamin C, total ascorbic acid", 8.7, "MG"),
                entry("Iron, Fe", 0.3, "MG"),
            ]),
            1.0,
        );
        assert_eq!(
            info.vitamins_minerals,
            vec![
                "Vitamin C, total ascorbic acid: 8.7 MG".to_string(),
                "Iron, Fe: 0.3 MG".to_string(),
            ]
        );
    }

    #[test]
    fn micro_entries_are_scaled_too() {
        let info = normalize_nutrients(&record(vec![entry("Iron, Fe", 2.0, "MG")]), 1.5);
        assert_eq!(info.vitamins_minerals, vec!["Iron, Fe: 3.0 MG".to_string()]);
    }

    #[test]
    fn an_entry_can_fill_a_macro_bucket_and_the_micro_list() {
        let info = normalize_nutrients(
            &record(vec![entry("Protein, iron fortified", 4.0, "G")]),
            1.0,
        );
        assert_eq!(info.protein.as_deref(), Some("4.0 G"));
        assert_eq!(
            info.vitamins_minerals,
            vec!["Protein, iron fortified: 4.0 G".to_string()]
        );
    }

    #[test]
    fn unrelated_entries_are_ignored() {
        let info = normalize_nutrients(&record(vec![entry("Water", 85.0, "G")]), 1.0);
        assert_eq!(info, NutritionInfo::default());
    }
}
