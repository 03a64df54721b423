//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts stay in [`Decimal`] end to end so cart and checkout totals are
//! exact. The store sells in Brazilian reais and prints amounts the way a
//! Brazilian shopper reads them:
//!
//! ```
//! use rust_decimal::Decimal;
//! use shopnow_core::Price;
//!
//! assert_eq!(Price::brl(Decimal::new(123_456, 2)).display(), "R$ 1.234,56");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

const SYMBOL: &str = "R$ ";
const GROUP_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';

/// A price in reais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    /// Amount in reais, not centavos.
    pub amount: Decimal,
}

impl Price {
    /// Create a price in Brazilian reais, the store currency.
    #[must_use]
    pub const fn brl(amount: Decimal) -> Self {
        Self { amount }
    }

    /// Format for display, rounded half away from zero to two places.
    #[must_use]
    pub fn display(&self) -> String {
        let mut rounded = self
            .amount
            .abs()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);

        let digits = rounded.to_string();
        let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        let sign = if self.amount.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        format!(
            "{sign}{SYMBOL}{}{DECIMAL_SEPARATOR}{cents}",
            group_thousands(whole, GROUP_SEPARATOR),
        )
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert `separator` between every group of three digits, from the right.
fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}
