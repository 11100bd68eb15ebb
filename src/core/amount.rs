//! Currency amounts in the smallest unit and decimal unit conversion.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Amount of value in the smallest currency unit.
pub type Wei = u128;

/// Wei in one ether (10^18).
pub const WEI_PER_ETHER: Wei = 1_000_000_000_000_000_000;

/// The payment a paid update must carry exactly: 0.1 ether.
pub const REQUIRED_PAYMENT: Wei = WEI_PER_ETHER / 10;

/// Denomination used when parsing or formatting amounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Wei,
    Gwei,
    Ether,
}

impl Unit {
    /// Number of decimal places between this unit and wei.
    pub fn decimals(self) -> u32 {
        match self {
            Self::Wei => 0,
            Self::Gwei => 9,
            Self::Ether => 18,
        }
    }

    fn scale(self) -> Wei {
        10u128.pow(self.decimals())
    }
}

/// Errors from decimal amount parsing.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,

    #[error("invalid amount '{0}'")]
    Invalid(String),

    #[error("amount '{input}' has more than {max} fractional digits")]
    TooPrecise { input: String, max: u32 },

    #[error("amount '{0}' overflows")]
    Overflow(String),
}

/// Parse a decimal string expressed in `unit` into wei.
///
/// # Example
///
/// ```rust
/// use greeter_ledger::core::{parse_units, Unit, REQUIRED_PAYMENT};
///
/// assert_eq!(parse_units("0.1", Unit::Ether).unwrap(), REQUIRED_PAYMENT);
/// assert_eq!(parse_units("1", Unit::Gwei).unwrap(), 1_000_000_000);
/// assert!(parse_units("0.1", Unit::Wei).is_err());
/// ```
pub fn parse_units(input: &str, unit: Unit) -> Result<Wei, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(AmountError::Invalid(trimmed.to_string()));
    }

    let decimals = unit.decimals();
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(AmountError::TooPrecise {
            input: trimmed.to_string(),
            max: decimals,
        });
    }

    let overflow = || AmountError::Overflow(trimmed.to_string());

    let whole_value: Wei = if whole.is_empty() {
        0
    } else {
        whole.parse::<Wei>().map_err(|_| overflow())?
    };

    let fraction_value: Wei = if fraction.is_empty() {
        0
    } else {
        let padding = decimals - fraction.len() as u32;
        fraction
            .parse::<Wei>()
            .map_err(|_| overflow())?
            .checked_mul(10u128.pow(padding))
            .ok_or_else(overflow)?
    };

    whole_value
        .checked_mul(unit.scale())
        .and_then(|w| w.checked_add(fraction_value))
        .ok_or_else(overflow)
}

/// Format a wei amount as a decimal string in `unit`.
///
/// Trailing fractional zeros are dropped, but at least one fractional
/// digit is always kept for units with decimals (`"1.0"`, `"0.4"`).
pub fn format_units(amount: Wei, unit: Unit) -> String {
    let decimals = unit.decimals() as usize;
    if decimals == 0 {
        return amount.to_string();
    }

    let scale = unit.scale();
    let whole = amount / scale;
    let fraction = format!("{:0width$}", amount % scale, width = decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}
