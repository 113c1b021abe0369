//! Date helper functions

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Locale, TimeZone};

/// Parse a locale name such as `pt_BR`, falling back to `POSIX`
pub fn parse_locale(name: &str) -> Locale {
    Locale::try_from(name).unwrap_or_else(|_| {
        tracing::warn!("Unknown locale {:?}, falling back to POSIX", name);
        Locale::POSIX
    })
}

/// Whether a chrono format string contains only known specifiers
pub fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Format a date with a chrono format string in the given locale
///
/// # Examples
/// ```ignore
/// format_date(&date, "%d %b %Y", Locale::pt_BR) // -> "15 jan 2021"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str, locale: Locale) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format_localized(format, locale).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_date_pt_br() {
        let date = Utc.with_ymd_and_hms(2021, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_date(&date, "%d %b %Y", Locale::pt_BR), "15 jan 2021");
    }

    #[test]
    fn test_format_datetime_pt_br() {
        let date = Utc.with_ymd_and_hms(2021, 3, 25, 9, 5, 0).unwrap();
        assert_eq!(
            format_date(&date, "%d %b %Y às %-H:%-M", Locale::pt_BR),
            "25 mar 2021 às 9:5"
        );
    }

    #[test]
    fn test_is_valid_format() {
        assert!(is_valid_format("%d %b %Y às %-H:%-M"));
        assert!(!is_valid_format("%d %Q"));
    }

    #[test]
    fn test_parse_locale() {
        assert_eq!(parse_locale("pt_BR"), Locale::pt_BR);
        assert_eq!(parse_locale("xx_NOPE"), Locale::POSIX);
    }
}
