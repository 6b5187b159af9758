//! Formatting used by the dashboard tables and cards.

use chrono::{DateTime, Utc};
use ophir_core::models::{Category, Property};

/// Counters shown in the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub patrimoine: usize,
    pub offmarket: usize,
    pub visible: usize,
}

impl CatalogStats {
    pub fn of(properties: &[Property]) -> Self {
        properties.iter().fold(
            CatalogStats {
                total: properties.len(),
                ..CatalogStats::default()
            },
            |mut stats, p| {
                match p.category {
                    Category::Patrimoine => stats.patrimoine += 1,
                    Category::Offmarket => stats.offmarket += 1,
                }
                if p.visible {
                    stats.visible += 1;
                }
                stats
            },
        )
    }
}

/// `"12 ha"` for hectares, `"250 m²"` for anything else.
pub fn format_surface(surface: &str, unit: &str) -> String {
    let suffix = if unit == "hectares" { "ha" } else { "m²" };
    format!("{surface} {suffix}")
}

/// `"1 200 000 €"`, or the on-request label when the price is `"0"`.
pub fn format_price(price: &str) -> String {
    if price.trim() == "0" {
        return "Prix sur demande".to_string();
    }
    match price.trim().parse::<u64>() {
        Ok(amount) => format!("{} €", group_thousands(amount)),
        Err(_) => price.to_string(),
    }
}

fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('\u{202f}');
        }
        grouped.push(ch);
    }
    grouped
}

/// `dd/mm/yyyy`
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%d/%m/%Y").to_string()
}

/// `dd/mm/yyyy hh:mm`, used in the contact inbox.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%d/%m/%Y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn surfaces() {
        assert_eq!(format_surface("12", "hectares"), "12 ha");
        assert_eq!(format_surface("250", "m2"), "250 m²");
    }

    #[test]
    fn prices() {
        assert_eq!(format_price("0"), "Prix sur demande");
        assert_eq!(format_price("1200000"), "1\u{202f}200\u{202f}000 €");
        assert_eq!(format_price("950"), "950 €");
        assert_eq!(format_price("nous consulter"), "nous consulter");
    }

    #[test]
    fn dates() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 5, 0).unwrap();
        assert_eq!(format_date(&at), "01/03/2025");
        assert_eq!(format_timestamp(&at), "01/03/2025 09:05");
    }
}
