//! Field validation for purchase drafts.
//!
//! Each field has its own validator; there are no cross-field rules. The
//! validators are pure and report pt-BR messages naming the violated bound.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::currency::{format_brl, format_kilograms, LocaleConfig};
use crate::purchase::{Field, NewPurchase, PurchaseDraft};

pub const REQUIRED_MESSAGE: &str = "Campo obrigatório";
pub const NUMBER_MESSAGE: &str = "Digite um número válido";
pub const POSITIVE_MESSAGE: &str = "Digite um valor maior que zero";
pub const DATE_MESSAGE: &str = "Digite uma data válida";

/// Product bounds applied to every draft.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseLimits {
    pub brand_max_chars: usize,
    pub quantity_max_kg: f64,
    pub price_max: f64,
}

impl Default for PurchaseLimits {
    fn default() -> Self {
        Self {
            brand_max_chars: 15,
            quantity_max_kg: 500.0,
            price_max: 5000.0,
        }
    }
}

impl PurchaseLimits {
    /// Rejects limits that would make every draft invalid.
    pub fn check(&self) -> Result<(), String> {
        if self.brand_max_chars == 0 {
            return Err("brand_max_chars must be at least 1".into());
        }
        if !(self.quantity_max_kg.is_finite() && self.quantity_max_kg > 0.0) {
            return Err("quantity_max_kg must be a positive number".into());
        }
        if !(self.price_max.is_finite() && self.price_max > 0.0) {
            return Err("price_max must be a positive number".into());
        }
        Ok(())
    }
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Every failing field of a draft, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<Field, ValidationError>,
}

impl FieldErrors {
    pub fn insert(&mut self, field: Field, error: ValidationError) {
        self.errors.insert(field, error);
    }

    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.errors.get(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &ValidationError)> {
        self.errors.iter().map(|(field, error)| (*field, error))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, error)| format!("{}: {}", field.key(), error))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

pub fn validate_brand(input: &str, limits: &PurchaseLimits) -> Result<String, ValidationError> {
    let brand = input.trim();
    if brand.is_empty() {
        return Err(ValidationError::new(REQUIRED_MESSAGE));
    }
    if brand.chars().count() > limits.brand_max_chars {
        return Err(ValidationError::new(format!(
            "Digite {} caracteres ou menos",
            limits.brand_max_chars
        )));
    }
    Ok(brand.to_string())
}

pub fn validate_quantity(input: &str, limits: &PurchaseLimits) -> Result<f64, ValidationError> {
    let max_label =
        format_kilograms(&LocaleConfig::pt_br(), limits.quantity_max_kg).replace(' ', "");
    validate_bounded_decimal(input, limits.quantity_max_kg, &max_label)
}

pub fn validate_price(input: &str, limits: &PurchaseLimits) -> Result<f64, ValidationError> {
    validate_bounded_decimal(input, limits.price_max, &format_brl(limits.price_max))
}

fn validate_bounded_decimal(
    input: &str,
    max: f64,
    max_label: &str,
) -> Result<f64, ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::new(REQUIRED_MESSAGE));
    }
    let value = parse_decimal(input).ok_or_else(|| ValidationError::new(NUMBER_MESSAGE))?;
    let rounded = round_cents(value);
    if value <= 0.0 || rounded <= 0.0 {
        return Err(ValidationError::new(POSITIVE_MESSAGE));
    }
    if value > max {
        return Err(ValidationError::new(format!(
            "Digite um valor abaixo de {max_label}"
        )));
    }
    Ok(rounded)
}

pub fn validate_date(input: &str) -> Result<NaiveDate, ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::new(REQUIRED_MESSAGE));
    }
    parse_date(input).ok_or_else(|| ValidationError::new(DATE_MESSAGE))
}

/// Validates every field and returns the normalized purchase, or all errors.
pub fn validate_draft(
    draft: &PurchaseDraft,
    limits: &PurchaseLimits,
) -> Result<NewPurchase, FieldErrors> {
    let mut errors = FieldErrors::default();

    let brand = validate_brand(&draft.brand, limits)
        .map_err(|err| errors.insert(Field::Brand, err))
        .ok();
    let quantity = validate_quantity(&draft.quantity, limits)
        .map_err(|err| errors.insert(Field::Quantity, err))
        .ok();
    let price = validate_price(&draft.price, limits)
        .map_err(|err| errors.insert(Field::Price, err))
        .ok();
    let date = validate_date(&draft.date)
        .map_err(|err| errors.insert(Field::Date, err))
        .ok();

    match (brand, quantity, price, date) {
        (Some(brand), Some(quantity), Some(price), Some(date)) => Ok(NewPurchase {
            brand,
            quantity,
            price,
            date,
        }),
        _ => Err(errors),
    }
}

/// Validates one field in isolation, as a form does after each input.
pub fn validate_field(
    field: Field,
    input: &str,
    limits: &PurchaseLimits,
) -> Result<(), ValidationError> {
    match field {
        Field::Brand => validate_brand(input, limits).map(|_| ()),
        Field::Quantity => validate_quantity(input, limits).map(|_| ()),
        Field::Price => validate_price(input, limits).map(|_| ()),
        Field::Date => validate_date(input).map(|_| ()),
    }
}

/// Parses user-typed decimals.
///
/// Accepts `89.90`, `89,90` and pt-BR grouped input such as `1.234,56` or
/// `1.500`, with an optional `R$` prefix or `kg` suffix.
pub fn parse_decimal(input: &str) -> Option<f64> {
    let mut text = input.trim();
    if let Some(rest) = text.strip_prefix("R$") {
        text = rest.trim_start();
    }
    if let Some(rest) = text
        .strip_suffix("kg")
        .or_else(|| text.strip_suffix("KG"))
        .or_else(|| text.strip_suffix("Kg"))
    {
        text = rest.trim_end();
    }
    if text.is_empty() {
        return None;
    }

    let normalized = if text.contains(',') {
        text.replace('.', "").replace(',', ".")
    } else if is_grouped_thousands(text) {
        text.replace('.', "")
    } else {
        text.to_string()
    };

    let digits = normalized.strip_prefix(['-', '+']).unwrap_or(&normalized);
    let well_formed = !digits.is_empty()
        && digits.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
        && digits.chars().filter(|ch| *ch == '.').count() <= 1
        && digits.chars().any(|ch| ch.is_ascii_digit());
    if !well_formed {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// `1.500`, `12.345.678`: one to three leading digits, then dot-separated
/// groups of exactly three.
fn is_grouped_thousands(text: &str) -> bool {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let mut groups = unsigned.split('.');
    let all_digits = |group: &str| group.bytes().all(|b| b.is_ascii_digit());
    let leading_ok = groups
        .next()
        .is_some_and(|head| (1..=3).contains(&head.len()) && all_digits(head));
    let mut rest = groups.peekable();
    leading_ok && rest.peek().is_some() && rest.all(|group| group.len() == 3 && all_digits(group))
}

/// Parses `YYYY-MM-DD` or day-first `DD/MM/YYYY` dates.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let text = input.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d/%m/%Y"))
        .ok()
}

/// Two-decimal precision used for quantities and prices.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
