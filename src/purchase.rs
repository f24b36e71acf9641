//! Purchase records as exchanged with the collection endpoint, plus the
//! draft and month-filter types the presentation layer works with.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::currency::{fold_accents, month_from_name_pt, month_name_pt};

/// Server-assigned identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => RecordId(text),
            RawId::Number(number) => RecordId(number.to_string()),
        })
    }
}

/// A persisted purchase as listed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(rename = "marca")]
    pub brand: String,
    /// Kilograms.
    #[serde(rename = "quantidade", deserialize_with = "wire::flexible_number")]
    pub quantity: f64,
    /// Brazilian reais.
    #[serde(rename = "valor", deserialize_with = "wire::flexible_number")]
    pub price: f64,
    #[serde(rename = "data", with = "wire::iso_date")]
    pub date: NaiveDate,
}

impl PurchaseRecord {
    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }

    /// Field values of this record without its identifier.
    pub fn fields(&self) -> NewPurchase {
        NewPurchase {
            brand: self.brand.clone(),
            quantity: self.quantity,
            price: self.price,
            date: self.date,
        }
    }
}

/// A validated purchase ready to be submitted. Carries no id: the server
/// assigns one on creation and updates address the record separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPurchase {
    #[serde(rename = "marca")]
    pub brand: String,
    #[serde(rename = "quantidade", deserialize_with = "wire::flexible_number")]
    pub quantity: f64,
    #[serde(rename = "valor", deserialize_with = "wire::flexible_number")]
    pub price: f64,
    #[serde(rename = "data", with = "wire::iso_date")]
    pub date: NaiveDate,
}

/// Names of the user-editable purchase fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Brand,
    Quantity,
    Price,
    Date,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Brand, Field::Quantity, Field::Price, Field::Date];

    /// Wire/form key (`marca`, `quantidade`, `valor`, `data`).
    pub fn key(self) -> &'static str {
        match self {
            Field::Brand => "marca",
            Field::Quantity => "quantidade",
            Field::Price => "valor",
            Field::Date => "data",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Brand => "Marca",
            Field::Quantity => "Quantidade",
            Field::Price => "Valor",
            Field::Date => "Data",
        }
    }

    /// Accepts the Portuguese keys as well as their English names.
    pub fn from_key(key: &str) -> Option<Self> {
        match fold_accents(key.trim()).as_str() {
            "marca" | "brand" => Some(Field::Brand),
            "quantidade" | "quantity" | "kg" => Some(Field::Quantity),
            "valor" | "price" | "preco" => Some(Field::Price),
            "data" | "date" => Some(Field::Date),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw form input. Every field is kept as typed until validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurchaseDraft {
    pub brand: String,
    pub quantity: String,
    pub price: String,
    pub date: String,
}

impl PurchaseDraft {
    pub fn new(
        brand: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            brand: brand.into(),
            quantity: quantity.into(),
            price: price.into(),
            date: date.into(),
        }
    }

    /// Pre-fills a draft from an existing record, as the edit form does.
    pub fn from_record(record: &PurchaseRecord) -> Self {
        Self {
            brand: record.brand.clone(),
            quantity: format!("{:.2}", record.quantity),
            price: format!("{:.2}", record.price),
            date: record.date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Brand => &self.brand,
            Field::Quantity => &self.quantity,
            Field::Price => &self.price,
            Field::Date => &self.date,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Brand => self.brand = value,
            Field::Quantity => self.quantity = value,
            Field::Price => self.price = value,
            Field::Date => self.date = value,
        }
    }
}

/// Calendar month used as the filter key. Compared by `(year, month)`;
/// the pt-BR label is only produced for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// `Março 2024`
    pub fn label(&self) -> String {
        format!("{} {}", month_name_pt(self.month), self.year)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Label of the "no restriction" sentinel.
pub const SHOW_ALL_LABEL: &str = "Exibir todos";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MonthFilter {
    #[default]
    All,
    Month(MonthKey),
}

impl MonthFilter {
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Month(key) => key.contains(date),
        }
    }

    pub fn label(&self) -> String {
        match self {
            MonthFilter::All => SHOW_ALL_LABEL.to_string(),
            MonthFilter::Month(key) => key.label(),
        }
    }

    /// Interprets user input as a filter.
    ///
    /// Accepts the sentinel (`Exibir todos`, `todos`, `all`), `YYYY-MM`,
    /// `Março 2024`, `março/2024`, or a bare month name. A bare name resolves
    /// to the first matching entry of `available`, which callers pass in
    /// date-descending order so the most recent month wins.
    pub fn parse(input: &str, available: &[MonthKey]) -> Option<Self> {
        let folded = fold_accents(input.trim());
        if folded.is_empty() {
            return None;
        }
        if matches!(folded.as_str(), "exibir todos" | "todos" | "all" | "*") {
            return Some(MonthFilter::All);
        }

        if let Some((year, month)) = folded.split_once('-') {
            if let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) {
                return MonthKey::new(year, month).map(MonthFilter::Month);
            }
        }

        let tokens: Vec<&str> = folded
            .split(|ch: char| ch.is_whitespace() || ch == '/')
            .filter(|token| !token.is_empty() && *token != "de")
            .collect();
        match tokens.as_slice() {
            [name] => {
                let month = month_from_name_pt(name)?;
                available
                    .iter()
                    .find(|key| key.month == month)
                    .copied()
                    .map(MonthFilter::Month)
            }
            [name, year] => {
                let month = month_from_name_pt(name)?;
                let year = year.parse::<i32>().ok()?;
                MonthKey::new(year, month).map(MonthFilter::Month)
            }
            _ => None,
        }
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Serde helpers for the collection's JSON representation.
pub(crate) mod wire {
    use chrono::NaiveDate;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const ISO_DATE: &str = "%Y-%m-%d";

    /// Numbers may arrive as JSON numbers or numeric strings.
    pub fn flexible_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(value),
            Raw::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("`{text}` is not a number"))),
        }
    }

    pub mod iso_date {
        use super::*;

        pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&date.format(ISO_DATE).to_string())
        }

        /// Accepts `YYYY-MM-DD` and full timestamps such as
        /// `2024-03-15T00:00:00.000Z`, keeping only the date part.
        pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = String::deserialize(deserializer)?;
            let date_part = raw.trim().get(..10).unwrap_or(raw.trim());
            NaiveDate::parse_from_str(date_part, ISO_DATE)
                .map_err(|_| D::Error::custom(format!("`{raw}` is not an ISO date")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn decodes_server_records_with_wire_names() {
        let raw = json!({
            "_id": "65f1c0ffee",
            "marca": "Golden",
            "quantidade": 10.5,
            "valor": "89.90",
            "data": "2024-03-15T00:00:00.000Z",
            "__v": 0
        });
        let record: PurchaseRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.id, RecordId::new("65f1c0ffee"));
        assert_eq!(record.brand, "Golden");
        assert_eq!(record.quantity, 10.5);
        assert_eq!(record.price, 89.9);
        assert_eq!(record.date, date(2024, 3, 15));
    }

    #[test]
    fn numeric_ids_are_kept_as_text() {
        let raw = json!({
            "_id": 7,
            "marca": "X",
            "quantidade": 1,
            "valor": 1,
            "data": "2024-01-01"
        });
        let record: PurchaseRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.id.as_str(), "7");
    }

    #[test]
    fn new_purchase_serializes_without_id() {
        let purchase = NewPurchase {
            brand: "Golden".into(),
            quantity: 10.5,
            price: 89.9,
            date: date(2024, 3, 15),
        };
        let value = serde_json::to_value(&purchase).unwrap();
        assert_eq!(
            value,
            json!({"marca": "Golden", "quantidade": 10.5, "valor": 89.9, "data": "2024-03-15"})
        );
    }

    #[test]
    fn month_filter_parses_labels_and_keys() {
        let available = [
            MonthKey::new(2024, 3).unwrap(),
            MonthKey::new(2023, 3).unwrap(),
        ];
        assert_eq!(MonthFilter::parse("Exibir todos", &available), Some(MonthFilter::All));
        assert_eq!(
            MonthFilter::parse("Março", &available),
            Some(MonthFilter::Month(available[0]))
        );
        assert_eq!(
            MonthFilter::parse("marco 2023", &available),
            Some(MonthFilter::Month(available[1]))
        );
        assert_eq!(
            MonthFilter::parse("Março de 2023", &available),
            Some(MonthFilter::Month(available[1]))
        );
        assert_eq!(
            MonthFilter::parse("2024-03", &[]),
            Some(MonthFilter::Month(available[0]))
        );
        assert_eq!(MonthFilter::parse("2024-13", &available), None);
        assert_eq!(MonthFilter::parse("Abril", &available), None);
    }

    #[test]
    fn month_key_distinguishes_years() {
        let march_2024 = MonthFilter::Month(MonthKey::new(2024, 3).unwrap());
        assert!(march_2024.matches(date(2024, 3, 10)));
        assert!(!march_2024.matches(date(2023, 3, 10)));
        assert_eq!(march_2024.label(), "Março 2024");
    }

    #[test]
    fn draft_from_record_round_trips_fields() {
        let record = PurchaseRecord {
            id: RecordId::new("a"),
            brand: "Premier".into(),
            quantity: 15.0,
            price: 120.5,
            date: date(2024, 2, 1),
        };
        let draft = PurchaseDraft::from_record(&record);
        assert_eq!(draft, PurchaseDraft::new("Premier", "15.00", "120.50", "2024-02-01"));
        assert_eq!(Field::from_key("preço"), Some(Field::Price));
    }
}
