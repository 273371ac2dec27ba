//! Duration expression grammar: `<integer><unit>` with unit `s`, `m` or `h`

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::{Error, Result};

static DURATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)(\d+)([smh])$").expect("Invalid duration pattern regex"));

/// Parse a duration expression such as `30s`, `5m` or `1h`.
///
/// Anything else, including a missing unit or trailing text, is rejected with
/// [`Error::InvalidDuration`].
pub fn parse_duration_expr(expr: &str) -> Result<Duration> {
    let trimmed = expr.trim();
    let caps = DURATION_PATTERN
        .captures(trimmed)
        .ok_or_else(|| Error::invalid_duration(expr))?;

    let value: u64 = caps[1]
        .parse()
        .map_err(|_| Error::invalid_duration(expr))?;

    let multiplier = match caps[2].to_ascii_lowercase().as_str() {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        _ => return Err(Error::invalid_duration(expr)),
    };

    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| Error::invalid_duration(expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_unit() {
        assert_eq!(parse_duration_expr("30s").unwrap().as_secs(), 30);
        assert_eq!(parse_duration_expr("5m").unwrap().as_secs(), 300);
        assert_eq!(parse_duration_expr("1h").unwrap().as_secs(), 3600);
    }

    #[test]
    fn test_parse_accepts_uppercase_and_padding() {
        assert_eq!(parse_duration_expr(" 2M ").unwrap().as_secs(), 120);
    }

    #[test]
    fn test_zero_is_allowed() {
        assert_eq!(parse_duration_expr("0s").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_rejects_invalid_expressions() {
        for expr in ["5x", "", "s", "30", "1.5m", "-5s", "30sec", "5 m", "m5"] {
            assert!(
                matches!(parse_duration_expr(expr), Err(Error::InvalidDuration { .. })),
                "expected rejection of {:?}",
                expr
            );
        }
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert!(parse_duration_expr("99999999999999999999s").is_err());
        assert!(parse_duration_expr("18446744073709551615h").is_err());
    }
}
