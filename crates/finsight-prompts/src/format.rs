//! Number and text formatting shared by every prompt

use rust_decimal::Decimal;

/// Render money with a dollar sign and exactly two decimals, e.g. `-$4.50`
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}

/// Render a fraction as a percentage with one decimal, `0.125` becomes `12.5%`
pub fn format_fraction_percent(fraction: f64) -> String {
    format_percent(fraction * 100.0)
}

/// Render an already-scaled percentage with one decimal
pub fn format_percent(percent: f64) -> String {
    if percent.is_finite() {
        format!("{percent:.1}%")
    } else {
        "0.0%".to_string()
    }
}

pub fn format_decimal_percent(percent: Decimal) -> String {
    format!("{:.1}%", percent.round_dp(1))
}

/// Capitalize the first letter of every alphabetic run and lowercase the rest,
/// so `other_expense` becomes `Other_Expense`
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Collapse line breaks and runs of whitespace so caller text cannot fake prompt structure
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_has_two_decimals() {
        assert_eq!(format_currency(dec!(4.5)), "$4.50");
        assert_eq!(format_currency(dec!(1234)), "$1234.00");
        assert_eq!(format_currency(dec!(-12.345)), "-$12.35");
        assert_eq!(format_currency(dec!(-0.001)), "$0.00");
        assert_eq!(format_currency(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn test_percentages_have_one_decimal() {
        assert_eq!(format_fraction_percent(0.125), "12.5%");
        assert_eq!(format_percent(85.0), "85.0%");
        assert_eq!(format_percent(f64::NAN), "0.0%");
        assert_eq!(format_decimal_percent(dec!(133.3333)), "133.3%");
        assert_eq!(format_decimal_percent(dec!(80)), "80.0%");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("food"), "Food");
        assert_eq!(title_case("other_expense"), "Other_Expense");
        assert_eq!(title_case("DINING out"), "Dining Out");
        assert_eq!(title_case("401k plan"), "401K Plan");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("  Coffee\nCategory: salary  "), "Coffee Category: salary");
    }
}
