use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, path::Path, str::FromStr};
use thiserror::Error;

/// Zero-based index into a `RecordSet`. This is *not* a stable identifier:
/// every record after a deleted one moves down by one.
pub type Position = usize;

/// The whole ordered collection of expenses, in file order.
pub type RecordSet = Vec<ExpenseRecord>;

/// Amounts are kept with two decimal places.
pub const SIGNIFICANT_DIGITS: u32 = 2;

/// Column names, in the order they are written to the backing file.
pub const HEADER: [&str; 4] = ["Date", "Category", "Amount", "Description"];

/// One dated spending entry. Field names map to the capitalized CSV headers.
///
/// The `amount >= 0` invariant is checked when a record is built from user
/// input (see `ExpenseRecord::new`), not when it's read back from the file:
/// whatever was saved is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ExpenseRecord {
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    pub category: Category,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
}

impl ExpenseRecord {
    /// Builds a record from user input, rejecting negative amounts and rounding
    /// the amount to cents.
    pub fn new(
        date: NaiveDate,
        category: Category,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<Self, Error> {
        Ok(Self {
            date,
            category,
            amount: normalize_amount(amount)?,
            description: description.into(),
        })
    }
}

/// Input-boundary check for amounts: must be non-negative, stored with two decimals.
pub(crate) fn normalize_amount(amount: Decimal) -> Result<Decimal, Error> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::NegativeAmount);
    }
    let mut amount =
        amount.round_dp_with_strategy(SIGNIFICANT_DIGITS, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(SIGNIFICANT_DIGITS);
    Ok(amount)
}

/// Accepts plain dates as well as date-times (`2024-03-01 00:00:00`), which is what
/// datetime-aware tools write when they re-save the file. The time part is dropped.
fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_date(&text).map_err(serde::de::Error::custom)
}

/// Hand-edited files often carry blanks around numbers (`Food,  5.5,`).
fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    Decimal::from_str(text.trim()).map_err(serde::de::Error::custom)
}

pub(crate) fn parse_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
    let text = text.trim();
    let date_part = text.split([' ', 'T']).next().unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
}

/// Spending categories. The six named ones are the choices offered to the user;
/// anything else found in the file (hand edits, older versions) is kept verbatim
/// in `Unlisted` so that loading never fails on it and it's written back unchanged.
///
/// The derived ordering puts the known categories first, in this order, then
/// unlisted ones alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub(crate) enum Category {
    Food,
    Transport,
    Shopping,
    Bills,
    Entertainment,
    Other,
    Unlisted(String),
}

impl Category {
    pub const KNOWN: [Category; 6] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Bills,
        Category::Entertainment,
        Category::Other,
    ];

    pub fn name(&self) -> &str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
            Category::Unlisted(name) => name,
        }
    }

    pub fn is_listed(&self) -> bool {
        !matches!(self, Category::Unlisted(_))
    }

    /// Strict parser for user input: case-insensitive, known categories only.
    pub fn parse_known(text: &str) -> Result<Self, Error> {
        let text = text.trim();
        Self::KNOWN
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(text))
            .cloned()
            .ok_or_else(|| Error::UnknownCategory(text.to_owned()))
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Self::KNOWN
            .iter()
            .find(|c| c.name() == name)
            .cloned()
            .unwrap_or(Category::Unlisted(name))
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Unlisted(name) => name,
            known => known.name().to_owned(),
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_known(s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything that can go wrong with a command. None of them is retried: the
/// command is abandoned and the backing file is left as it was.
#[derive(Error, Debug, PartialEq, Eq)]
pub(crate) enum Error {
    #[error("No expense at position {position} (there are {len})")]
    OutOfRange { position: Position, len: usize },
    #[error("Cannot access {path}: {reason}")]
    StorageUnavailable { path: String, reason: String },
    #[error("Malformed expense on line {line}: {reason}")]
    MalformedInput { line: u64, reason: String },
    #[error("Expense amount cannot be negative")]
    NegativeAmount,
    #[error("{0:?} is not an amount")]
    InvalidAmount(String),
    #[error("Total spent in {0} is too large to compute")]
    Overflow(String),
    #[error("Unknown category {0:?} (expected one of Food, Transport, Shopping, Bills, Entertainment, Other)")]
    UnknownCategory(String),
}

impl Error {
    pub(crate) fn storage(path: &Path, err: impl fmt::Display) -> Self {
        Error::StorageUnavailable {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_amount, parse_date, Category, Error};
    use rust_decimal_macros::dec;

    #[test]
    fn known_categories_roundtrip_through_strings() {
        for category in Category::KNOWN {
            let name: String = category.clone().into();
            assert_eq!(Category::from(name), category);
        }
    }

    #[test]
    fn unlisted_category_keeps_literal() {
        let category = Category::from(String::from("Groceries"));
        assert_eq!(category, Category::Unlisted(String::from("Groceries")));
        assert_eq!(category.to_string(), "Groceries");
        assert!(!category.is_listed());
        // file values are matched exactly
        assert_eq!(
            Category::from(String::from("food")),
            Category::Unlisted(String::from("food"))
        );
    }

    #[test]
    fn parse_user_category() {
        assert_eq!(Category::parse_known(" transport "), Ok(Category::Transport));
        assert_eq!("BILLS".parse::<Category>(), Ok(Category::Bills));
        assert_eq!(
            Category::parse_known("Rent"),
            Err(Error::UnknownCategory(String::from("Rent")))
        );
    }

    #[test]
    fn unlisted_sorts_after_known() {
        let mut categories = vec![
            Category::Unlisted(String::from("Apples")),
            Category::Other,
            Category::Food,
        ];
        categories.sort();
        assert_eq!(
            categories,
            [
                Category::Food,
                Category::Other,
                Category::Unlisted(String::from("Apples"))
            ]
        );
    }

    #[test]
    fn amount_normalization() {
        assert_eq!(normalize_amount(dec!(12.345)), Ok(dec!(12.35)));
        assert_eq!(normalize_amount(dec!(7)).unwrap().to_string(), "7.00");
        assert_eq!(normalize_amount(dec!(0)), Ok(dec!(0)));
        assert_eq!(normalize_amount(dec!(-0.01)), Err(Error::NegativeAmount));
    }

    #[test]
    fn dates_with_time_component() {
        let expected = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_date("2024-03-01"), Ok(expected));
        assert_eq!(parse_date("2024-03-01 00:00:00"), Ok(expected));
        assert_eq!(parse_date("2024-03-01T12:30:00"), Ok(expected));
        assert!(parse_date("01/03/2024").is_err());
    }
}
