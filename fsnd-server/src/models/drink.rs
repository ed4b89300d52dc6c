//! Drinks and their recipes
//!
//! A recipe is stored as JSON text. The public menu shows the short form
//! (`color` and `parts` only); the detail view shows the long form with
//! ingredient names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::validation::{validate, FieldRule, ValidationError};

/// Maximum title length
pub const MAX_TITLE_LEN: usize = 80;

/// Maximum length of the serialized recipe
pub const MAX_RECIPE_LEN: usize = 180;

const TITLE_FIELDS: &[FieldRule] = &[FieldRule::text("title", MAX_TITLE_LEN)];

const INGREDIENT_FIELDS: &[FieldRule] = &[
    FieldRule::text("name", 80),
    FieldRule::text("color", 80),
    FieldRule::integer("parts", 1, 100),
];

/// One recipe line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: i64,
}

/// Recipe line without the ingredient name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: i64,
}

/// A non-empty list of ingredients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe(Vec<Ingredient>);

impl Recipe {
    /// Parse a submitted recipe: one ingredient object or a list of them.
    pub fn parse(raw: &Value) -> Result<Self, ValidationError> {
        const FIELD: &str = "recipe";

        let items: Vec<&Value> = match raw {
            Value::Array(items) => items.iter().collect(),
            Value::Object(_) => vec![raw],
            Value::Null => return Err(ValidationError::Missing { field: FIELD }),
            _ => {
                return Err(ValidationError::InvalidFormat {
                    field: FIELD,
                    reason: "must be an ingredient or a list of ingredients",
                })
            }
        };

        if items.is_empty() {
            return Err(ValidationError::Empty { field: FIELD });
        }

        let mut ingredients = Vec::with_capacity(items.len());
        for item in items {
            let Value::Object(obj) = item else {
                return Err(ValidationError::InvalidFormat {
                    field: FIELD,
                    reason: "each ingredient must be an object with name, color and parts",
                });
            };
            let mut fields = validate(obj, INGREDIENT_FIELDS)?;
            ingredients.push(Ingredient {
                name: fields.text("name")?,
                color: fields.text("color")?,
                parts: fields.integer("parts")?,
            });
        }

        let recipe = Self(ingredients);
        if recipe.to_text().chars().count() > MAX_RECIPE_LEN {
            return Err(ValidationError::TooLong {
                field: FIELD,
                max: MAX_RECIPE_LEN,
            });
        }
        Ok(recipe)
    }

    /// Load a stored recipe.
    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Storage form.
    pub fn to_text(&self) -> String {
        // A list of plain string/integer structs always serializes.
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.0
    }

    pub fn short(&self) -> Vec<ShortIngredient> {
        self.0
            .iter()
            .map(|i| ShortIngredient {
                color: i.color.clone(),
                parts: i.parts,
            })
            .collect()
    }
}

/// A stored drink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Recipe,
}

/// Public menu representation
#[derive(Debug, Clone, Serialize)]
pub struct ShortDrink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

/// Detailed representation
#[derive(Debug, Clone, Serialize)]
pub struct LongDrink {
    pub id: i32,
    pub title: String,
    pub recipe: Recipe,
}

impl Drink {
    pub fn short(&self) -> ShortDrink {
        ShortDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.short(),
        }
    }

    pub fn long(self) -> LongDrink {
        LongDrink {
            id: self.id,
            title: self.title,
            recipe: self.recipe,
        }
    }

    pub fn apply(&mut self, patch: DrinkPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(recipe) = patch.recipe {
            self.recipe = recipe;
        }
    }
}

/// Validated `POST /drinks` body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Recipe,
}

impl NewDrink {
    pub fn parse(input: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut fields = validate(input, TITLE_FIELDS)?;
        let title = fields.text("title")?;
        let recipe = Recipe::parse(input.get("recipe").unwrap_or(&Value::Null))?;
        Ok(Self { title, recipe })
    }
}

/// Validated `PATCH /drinks/{id}` body; absent keys are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrinkPatch {
    pub title: Option<String>,
    pub recipe: Option<Recipe>,
}

impl DrinkPatch {
    pub fn parse(input: &Map<String, Value>) -> Result<Self, ValidationError> {
        let title = match input.get("title") {
            Some(_) => Some(validate(input, TITLE_FIELDS)?.text("title")?),
            None => None,
        };
        let recipe = input.get("recipe").map(Recipe::parse).transpose()?;
        Ok(Self { title, recipe })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_single_ingredient_object() {
        let recipe = Recipe::parse(&json!({"name": "Water", "color": "blue", "parts": 1})).unwrap();
        assert_eq!(recipe.ingredients().len(), 1);
        assert_eq!(recipe.ingredients()[0].name, "Water");
    }

    #[test]
    fn rejects_empty_and_malformed_recipes() {
        assert_eq!(
            Recipe::parse(&json!([])).unwrap_err(),
            ValidationError::Empty { field: "recipe" }
        );
        assert!(matches!(
            Recipe::parse(&json!(["water"])).unwrap_err(),
            ValidationError::InvalidFormat { field: "recipe", .. }
        ));
        assert_eq!(
            Recipe::parse(&json!([{"name": "Water", "color": "blue", "parts": 0}])).unwrap_err(),
            ValidationError::OutOfRange {
                field: "parts",
                min: 1,
                max: 100
            }
        );
    }

    #[test]
    fn rejects_recipes_too_long_to_store() {
        let ingredients: Vec<Value> = (0..6)
            .map(|i| json!({"name": format!("ingredient number {}", i), "color": "brown", "parts": 1}))
            .collect();
        let err = Recipe::parse(&Value::Array(ingredients)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLong {
                field: "recipe",
                max: MAX_RECIPE_LEN
            }
        );
    }

    #[test]
    fn text_round_trip() {
        let recipe = Recipe::parse(&json!([
            {"name": "Espresso", "color": "brown", "parts": 1},
            {"name": "Milk", "color": "white", "parts": 2}
        ]))
        .unwrap();
        assert_eq!(Recipe::from_text(&recipe.to_text()).unwrap(), recipe);
    }

    #[test]
    fn short_form_drops_names() {
        let drink = Drink {
            id: 1,
            title: "Latte".into(),
            recipe: Recipe::parse(&json!([{"name": "Milk", "color": "white", "parts": 3}])).unwrap(),
        };
        assert_eq!(
            serde_json::to_value(drink.short()).unwrap(),
            json!({"id": 1, "title": "Latte", "recipe": [{"color": "white", "parts": 3}]})
        );
        assert_eq!(
            serde_json::to_value(drink.long()).unwrap(),
            json!({"id": 1, "title": "Latte", "recipe": [{"name": "Milk", "color": "white", "parts": 3}]})
        );
    }

    #[test]
    fn patch_leaves_absent_fields() {
        let patch = DrinkPatch::parse(json!({"title": " Flat White "}).as_object().unwrap()).unwrap();
        assert_eq!(patch.title.as_deref(), Some("Flat White"));
        assert!(patch.recipe.is_none());

        let err = DrinkPatch::parse(json!({"title": ""}).as_object().unwrap()).unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "title" });
    }
}
