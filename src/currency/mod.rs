use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("BRL")
    }
}

/// Locale-aware formatting preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
    /// Whether a space separates the currency symbol from the amount.
    pub symbol_spacing: bool,
    pub date_format: DateFormatStyle,
}

impl LocaleConfig {
    pub fn pt_br() -> Self {
        Self {
            language_tag: "pt-BR".into(),
            decimal_separator: ',',
            grouping_separator: '.',
            symbol_spacing: true,
            date_format: DateFormatStyle::DayMonthYear,
        }
    }

    pub fn en_us() -> Self {
        Self {
            language_tag: "en-US".into(),
            decimal_separator: '.',
            grouping_separator: ',',
            symbol_spacing: false,
            date_format: DateFormatStyle::Iso,
        }
    }

    /// Resolves a language tag, falling back to pt-BR for unknown tags.
    pub fn for_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "en-us" | "en" => Self::en_us(),
            _ => Self::pt_br(),
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::pt_br()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DateFormatStyle {
    /// `2024-03-15`
    Iso,
    /// `15/03/2024`
    DayMonthYear,
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "BRL" => "R$".into(),
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        _ => code.into(),
    }
}

pub fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" => 0,
        _ => 2,
    }
}

pub fn format_number(locale: &LocaleConfig, value: f64, precision: u8) -> String {
    let mut body = format!("{:.*}", precision as usize, value);
    if locale.decimal_separator != '.' {
        if let Some(pos) = body.find('.') {
            body.replace_range(pos..=pos, &locale.decimal_separator.to_string());
        }
    }
    if let Some(pos) = body.find(locale.decimal_separator) {
        let mut int_part = body[..pos].to_string();
        insert_grouping(&mut int_part, locale.grouping_separator);
        body = format!("{}{}", int_part, &body[pos..]);
    } else {
        insert_grouping(&mut body, locale.grouping_separator);
    }
    body
}

fn insert_grouping(int_part: &mut String, separator: char) {
    let mut cleaned = int_part.replace(separator, "");
    if cleaned.starts_with('-') {
        let sign = cleaned.remove(0);
        let grouped = group_digits(&cleaned, separator);
        *int_part = format!("{}{}", sign, grouped);
    } else {
        *int_part = group_digits(&cleaned, separator);
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// Formats an amount with the currency symbol, e.g. `R$ 1.234,50`.
pub fn format_currency_value(amount: f64, code: &CurrencyCode, locale: &LocaleConfig) -> String {
    let precision = minor_units_for(code.as_str());
    let body = format_number(locale, amount.abs(), precision);
    let symbol = symbol_for(code.as_str());
    let spacing = if locale.symbol_spacing { " " } else { "" };
    // `-0,00` is rendered without a sign.
    let negative = amount < 0.0 && body.chars().any(|ch| ch.is_ascii_digit() && ch != '0');
    let sign = if negative { "-" } else { "" };
    format!("{sign}{symbol}{spacing}{body}")
}

/// Shorthand for the Brazilian real in the pt-BR locale.
pub fn format_brl(amount: f64) -> String {
    format_currency_value(amount, &CurrencyCode::default(), &LocaleConfig::pt_br())
}

/// Formats a weight the way the pt-BR kilogram unit formatter does:
/// at most three fraction digits, trailing zeros dropped (`10,5 kg`).
pub fn format_kilograms(locale: &LocaleConfig, value: f64) -> String {
    let mut body = format_number(locale, value, 3);
    if body.contains(locale.decimal_separator) {
        let trimmed = body
            .trim_end_matches('0')
            .trim_end_matches(locale.decimal_separator)
            .len();
        body.truncate(trimmed);
    }
    format!("{body} kg")
}

pub fn format_date(locale: &LocaleConfig, date: NaiveDate) -> String {
    match locale.date_format {
        DateFormatStyle::Iso => date.format("%Y-%m-%d").to_string(),
        DateFormatStyle::DayMonthYear => format_date_br(date),
    }
}

/// Day-first date used by the purchase list (`15/03/2024`).
pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

const MONTH_NAMES_PT: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Capitalized pt-BR month name for `month` in `1..=12`.
pub fn month_name_pt(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|index| MONTH_NAMES_PT.get(index as usize))
        .copied()
        .unwrap_or("")
}

/// Finds the month number for a pt-BR month name, ignoring case and accents.
pub fn month_from_name_pt(name: &str) -> Option<u32> {
    let wanted = fold_accents(name.trim());
    MONTH_NAMES_PT
        .iter()
        .position(|candidate| fold_accents(candidate) == wanted)
        .map(|index| index as u32 + 1)
}

/// Lowercases and strips the diacritics used in Portuguese.
pub fn fold_accents(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .map(|ch| match ch {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
