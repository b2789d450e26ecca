//! Locale-tolerant money parsing
//!
//! Spreadsheet exports mix pt-BR ("1.234,56") and en-US ("1,234.56")
//! punctuation, currency prefixes, non-breaking spaces and three flavours of
//! negative notation. Parsing is total: anything that cannot be read becomes
//! zero so one bad cell never aborts an ingestion.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)R\$\s*").expect("valid currency regex"));
static MONEY_LIKE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\(?[-−]?\s*R\$\s*)?[-−(]?\d[\d.,]*\)?[-−]?$").expect("valid money regex")
});

/// Parse a money cell into a signed decimal, yielding zero on failure
pub fn parse_money(raw: &str) -> Decimal {
    let normalized = normalize_spaces(raw);
    let negative = is_negative(&normalized);

    let stripped = CURRENCY_RE.replace(&normalized, "");
    let digits: String = stripped
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if digits.is_empty() {
        return Decimal::ZERO;
    }

    let value = canonical_number(&digits)
        .and_then(|s| Decimal::from_str(&s).ok())
        .unwrap_or(Decimal::ZERO)
        .abs();

    if negative && !value.is_zero() {
        -value
    } else {
        value
    }
}

/// Parse a possibly absent cell
pub fn parse_money_cell(cell: Option<&str>) -> Decimal {
    cell.map(parse_money).unwrap_or(Decimal::ZERO)
}

/// Convert an already numeric value; NaN and infinities become zero
pub fn money_from_number(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Add two amounts, clamping at `Decimal::MAX`/`MIN` on overflow
///
/// Single cells can legally be close to the decimal range, so running totals
/// saturate and log a warning rather than panic.
pub fn add_money(total: Decimal, value: Decimal) -> Decimal {
    total.checked_add(value).unwrap_or_else(|| {
        tracing::warn!(%total, %value, "money total overflowed; clamping");
        total.saturating_add(value)
    })
}

/// Subtract two amounts with the same clamping as [`add_money`]
pub fn sub_money(left: Decimal, right: Decimal) -> Decimal {
    left.checked_sub(right).unwrap_or_else(|| {
        tracing::warn!(%left, %right, "money difference overflowed; clamping");
        left.saturating_sub(right)
    })
}

/// Whether a cell looks like a money amount ("R$ 1.234,56", "(99,00)", "12-")
pub fn is_money_like(raw: &str) -> bool {
    let s = raw.trim();
    !s.is_empty() && MONEY_LIKE_RE.is_match(s)
}

fn normalize_spaces(raw: &str) -> String {
    let replaced = raw.replace(&['\u{00A0}', '\u{202F}'][..], " ");
    WHITESPACE_RE.replace_all(&replaced, " ").trim().to_string()
}

fn is_negative(s: &str) -> bool {
    let parenthesized = s.starts_with('(') && s.ends_with(')');
    let leading_minus = s.trim_start().starts_with(&['-', '−'][..]);
    let trailing_minus = s.trim_end().ends_with(&['-', '−'][..]);
    parenthesized || leading_minus || trailing_minus
}

/// Rewrite a digits-and-separators string with '.' as the only separator.
///
/// The separator occurring last is the decimal point; every other '.' or ','
/// is a thousands separator and is dropped.
fn canonical_number(digits: &str) -> Option<String> {
    let decimal_at = digits.rfind(&['.', ','][..]);

    let mut out = String::with_capacity(digits.len() + 1);
    for (i, c) in digits.char_indices() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if Some(i) == decimal_at {
            out.push('.');
        }
    }

    if out.starts_with('.') {
        out.insert(0, '0');
    }
    if out.ends_with('.') {
        out.pop();
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_pt_br_and_en_us_separators() {
        assert_eq!(parse_money("1.234,56"), dec("1234.56"));
        assert_eq!(parse_money("1,234.56"), dec("1234.56"));
        assert_eq!(parse_money("1.234.567,89"), dec("1234567.89"));
        assert_eq!(parse_money("99,00"), dec("99"));
        assert_eq!(parse_money("42"), dec("42"));
    }

    #[test]
    fn test_currency_and_spaces() {
        assert_eq!(parse_money("R$ 99,00"), dec("99"));
        assert_eq!(parse_money("R$\u{00A0}99,90"), dec("99.90"));
        assert_eq!(parse_money("R$\u{202F}1.000,00"), dec("1000"));
        assert_eq!(parse_money("r$ 5,5"), dec("5.5"));
    }

    #[test]
    fn test_negative_notations() {
        assert_eq!(parse_money("(99,00)"), dec("-99"));
        assert_eq!(parse_money("(50,00)"), dec("-50"));
        assert_eq!(parse_money("99,00-"), dec("-99"));
        assert_eq!(parse_money("50,00-"), dec("-50"));
        assert_eq!(parse_money("-R$ 10,00"), dec("-10"));
        assert_eq!(parse_money("  −7,25"), dec("-7.25"));
    }

    #[test]
    fn test_empty_and_garbage_are_zero() {
        assert_eq!(parse_money(""), Decimal::ZERO);
        assert_eq!(parse_money("   "), Decimal::ZERO);
        assert_eq!(parse_money("\u{00A0}"), Decimal::ZERO);
        assert_eq!(parse_money("Nome Filial"), Decimal::ZERO);
        assert_eq!(parse_money("R$"), Decimal::ZERO);
        assert_eq!(parse_money(".,"), Decimal::ZERO);
        assert_eq!(parse_money_cell(None), Decimal::ZERO);
    }

    #[test]
    fn test_overflow_degrades_to_zero() {
        let huge = "9".repeat(60);
        assert_eq!(parse_money(&huge), Decimal::ZERO);
    }

    #[test]
    fn test_dangling_separators() {
        assert_eq!(parse_money(",5"), dec("0.5"));
        assert_eq!(parse_money("5,"), dec("5"));
    }

    #[test]
    fn test_parser_is_total() {
        let inputs = [
            "", "-", "()", "(-)", "R$ -", "--5", "1e10", "NaN", "Infinity", "½", "١٢٣",
            "12.34.56", ",,,", "R$ (1.234,56)", "💸 10", "\t\n", "0,00", "-0",
        ];
        for input in inputs {
            // must not panic, must stay finite (Decimal always is)
            let _ = parse_money(input);
        }
        assert_eq!(parse_money("-0"), Decimal::ZERO);
    }

    #[test]
    fn test_from_number() {
        assert_eq!(money_from_number(12.5), dec("12.5"));
        assert_eq!(money_from_number(f64::NAN), Decimal::ZERO);
        assert_eq!(money_from_number(f64::INFINITY), Decimal::ZERO);
    }

    #[test]
    fn test_money_like() {
        assert!(is_money_like("R$ 1.234,56"));
        assert!(is_money_like("R$100,00"));
        assert!(is_money_like("(99,00)"));
        assert!(is_money_like("-12"));
        assert!(is_money_like("99,00-"));
        assert!(is_money_like(" 0,00 "));
        assert!(!is_money_like(""));
        assert!(!is_money_like("Total"));
        assert!(!is_money_like("Valor Total do mês 6"));
    }

    #[test]
    fn test_totals_clamp_instead_of_overflowing() {
        let big = parse_money("50000000000000000000000000000");
        assert_eq!(big, dec("50000000000000000000000000000"));

        assert_eq!(add_money(big, big), Decimal::MAX);
        assert_eq!(add_money(-big, -big), Decimal::MIN);
        assert_eq!(sub_money(-big, big), Decimal::MIN);
        assert_eq!(add_money(dec("1.5"), dec("2.25")), dec("3.75"));
        assert_eq!(sub_money(dec("10"), dec("2.5")), dec("7.5"));
    }
}
