use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day's accumulated nutrition totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
}

/// Payload for `POST /tracker`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerEntryCreate {
    pub date: NaiveDate,
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
}

impl TrackerEntry {
    /// One-line summary for list output
    pub fn summary(&self) -> String {
        format!(
            "{}: {} kcal, {}g protein, {}g fats, {}g carbs",
            self.date, self.calories, self.proteins, self.fats, self.carbs
        )
    }
}
