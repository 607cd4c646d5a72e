use serde::{Deserialize, Serialize};

/// A food in the user's catalog, with macros per serving
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
}

/// Payload for `POST /foods`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodCreate {
    pub name: String,
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
}

impl Food {
    /// One-line summary for list output
    pub fn summary(&self) -> String {
        format!(
            "{} - {} kcal, {}g protein, {}g fats, {}g carbs",
            self.name, self.calories, self.proteins, self.fats, self.carbs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_food_response() {
        let json = r#"{
            "id": 7,
            "name": "Oatmeal",
            "calories": 389.0,
            "proteins": 16.9,
            "fats": 6.9,
            "carbs": 66.3,
            "user_id": 1
        }"#;
        let food: Food = serde_json::from_str(json).unwrap();
        assert_eq!(food.id, 7);
        assert_eq!(
            food.summary(),
            "Oatmeal - 389 kcal, 16.9g protein, 6.9g fats, 66.3g carbs"
        );
    }

    #[test]
    fn test_food_create_serializes_all_macros() {
        let food = FoodCreate {
            name: "Egg".to_string(),
            calories: 155.0,
            proteins: 13.0,
            fats: 11.0,
            carbs: 1.1,
        };
        let value = serde_json::to_value(&food).unwrap();
        assert_eq!(value["name"], "Egg");
        assert_eq!(value["calories"], 155.0);
        assert_eq!(value["carbs"], 1.1);
    }
}
