//! Recipe records as returned by TheMealDB.
//!
//! Only the fields the backend inspects are typed; everything else is kept
//! verbatim in `extra` so passthrough responses stay lossless.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of ingredient/measure slots in a meal record.
pub const INGREDIENT_SLOTS: usize = 20;

/// Upstream meal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,
    #[serde(rename = "strArea", default)]
    pub area: Option<String>,
    #[serde(rename = "strInstructions", default)]
    pub instructions: Option<String>,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
    #[serde(rename = "strTags", default)]
    pub tags: Option<String>,
    #[serde(rename = "strYoutube", default)]
    pub youtube: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub ingredient: String,
    pub measure: String,
}

impl Meal {
    /// Non-blank ingredients with their (possibly empty) measures, trimmed.
    pub fn ingredients(&self) -> Vec<Ingredient> {
        (1..=INGREDIENT_SLOTS)
            .filter_map(|i| {
                let ingredient = self.slot("strIngredient", i)?.trim();
                if ingredient.is_empty() {
                    return None;
                }
                let measure = self.slot("strMeasure", i).map(str::trim).unwrap_or_default();
                Some(Ingredient {
                    ingredient: ingredient.to_string(),
                    measure: measure.to_string(),
                })
            })
            .collect()
    }

    fn slot(&self, prefix: &str, index: usize) -> Option<&str> {
        self.extra
            .get(&format!("{prefix}{index}"))
            .and_then(Value::as_str)
    }
}
