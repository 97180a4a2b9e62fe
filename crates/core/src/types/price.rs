//! Type-safe price representation using decimal arithmetic.
//!
//! Shopify reports money as a decimal string plus an ISO 4217 currency code.
//! Amounts are parsed into [`rust_decimal::Decimal`] so totals never pick up
//! floating point error.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CurrencyCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// The code is not exactly three characters long.
    #[error("currency code must be 3 letters (got {0:?})")]
    InvalidLength(String),
    /// The code contains something other than ASCII letters.
    #[error("currency code must contain only letters (got {0:?})")]
    InvalidCharacters(String),
}

/// Errors that can occur when building a [`Price`] from wire values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is not a decimal number.
    #[error("invalid price amount {0:?}")]
    InvalidAmount(String),
    /// The currency code is malformed.
    #[error(transparent)]
    Currency(#[from] CurrencyError),
}

/// ISO 4217 currency code (e.g. `USD`, `INR`).
///
/// Stored uppercase. Any well-formed three-letter code is accepted since the
/// store's currency is configured in Shopify, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a currency code, normalizing to uppercase.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly three ASCII letters.
    pub fn parse(code: &str) -> Result<Self, CurrencyError> {
        let code = code.trim();
        if code.chars().count() != 3 {
            return Err(CurrencyError::InvalidLength(code.to_owned()));
        }
        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError::InvalidCharacters(code.to_owned()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// A price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Parse a price from Shopify's wire representation
    /// (`{ amount: "10.00", currencyCode: "USD" }`).
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not a decimal or the currency code
    /// is malformed.
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(amount.trim())
            .map_err(|_| PriceError::InvalidAmount(amount.to_owned()))?;
        let currency_code = CurrencyCode::parse(currency_code)?;
        Ok(Self::new(amount, currency_code))
    }

    /// This price multiplied by a quantity (line total).
    ///
    /// Saturates at `Decimal::MAX` / `Decimal::MIN` instead of overflowing.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        let amount = self
            .amount
            .checked_mul(Decimal::from(quantity))
            .unwrap_or_else(|| saturated(self.amount));
        Self::new(amount, self.currency_code.clone())
    }

    /// Add `amount` in this price's currency, saturating on overflow.
    #[must_use]
    pub fn saturating_add(&self, amount: Decimal) -> Self {
        let sum = self
            .amount
            .checked_add(amount)
            .unwrap_or_else(|| saturated(amount));
        Self::new(sum, self.currency_code.clone())
    }

    /// Format for display as `CODE 0.00` (e.g. `INR 1499.00`).
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} {:.2}", self.currency_code, self.amount.round_dp(2))
    }
}

/// The bound an overflowing operation with a `sign`-signed operand ran into.
fn saturated(sign: Decimal) -> Decimal {
    if sign.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}
