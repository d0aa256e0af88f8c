use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// Pulls the first calendar date out of a day caption like
/// `"Mittagsmensa Montag, 01.01.2024"`. Two-digit years are taken as 2000+.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{2,4})").expect("date pattern"));

    pattern.captures_iter(text).find_map(|captures| {
        let day: u32 = captures[1].parse().ok()?;
        let month: u32 = captures[2].parse().ok()?;
        let mut year: i32 = captures[3].parse().ok()?;
        if captures[3].len() == 2 {
            year += 2000;
        }
        NaiveDate::from_ymd_opt(year, month, day)
    })
}
