//! Amounts in words, Indian numbering (crore, lakh, thousand, hundred).

use rust_decimal::Decimal;

use crate::error::{BillingError, Result};
use crate::money::Money;

/// Largest rupee value that can be spelled out (99 crore and change).
pub const MAX_WORDS_RUPEES: i64 = 999_999_999;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Spell an amount as it appears on the invoice, e.g.
/// `One Thousand Two Hundred And Thirty-Four Rupees And Fifty Paise Only`.
///
/// The paise clause is dropped when there are no paise, which leaves a double
/// space before `Only` (`Zero Rupees  Only`).
pub fn amount_to_words(amount: Money) -> Result<String> {
    if amount.is_negative() {
        return Err(BillingError::NegativeAmount(amount.to_string()));
    }
    if amount.rupees() > MAX_WORDS_RUPEES {
        return Err(BillingError::InvalidRange(amount));
    }

    let paise = amount.paise_part() as u32;
    let paise_clause = if paise > 0 {
        format!("And {} Paise", integer_to_words(paise))
    } else {
        String::new()
    };

    Ok(format!(
        "{} Rupees {} Only",
        integer_to_words(amount.rupees() as u32),
        paise_clause
    ))
}

/// Spell an amount given in rupees. Any negative input is rejected, including
/// one that would round to zero paise.
pub fn decimal_to_words(amount: Decimal) -> Result<String> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(BillingError::NegativeAmount(amount.to_string()));
    }
    amount_to_words(Money::from_decimal(amount))
}

/// Spell a whole number using crore / lakh / thousand / hundred groupings.
pub fn integer_to_words(number: u32) -> String {
    let groups = [
        (number / 10_000_000, "Crore"),
        (number / 100_000 % 100, "Lakh"),
        (number / 1_000 % 100, "Thousand"),
        (number / 100 % 10, "Hundred"),
    ];
    let rest = number % 100;

    let mut words = groups
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{} {label}", integer_to_words(*count)))
        .collect::<Vec<_>>()
        .join(" ");

    if rest > 0 {
        if !words.is_empty() {
            words.push_str(" And ");
        }
        words.push_str(&two_digit_words(rest));
    }

    if words.is_empty() {
        words.push_str("Zero");
    }
    words
}

fn two_digit_words(number: u32) -> String {
    let number = number as usize;
    if number < 20 {
        return ONES[number].to_string();
    }
    let (tens, ones) = (number / 10, number % 10);
    if ones == 0 {
        TENS[tens].to_string()
    } else {
        format!("{}-{}", TENS[tens], ONES[ones])
    }
}
