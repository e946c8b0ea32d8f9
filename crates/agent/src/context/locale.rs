//! Indonesian (`id-ID`) rendering of numbers, percentages and dates.

use chrono::{Datelike, NaiveDate, Weekday};

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Senin",
        Weekday::Tue => "Selasa",
        Weekday::Wed => "Rabu",
        Weekday::Thu => "Kamis",
        Weekday::Fri => "Jumat",
        Weekday::Sat => "Sabtu",
        Weekday::Sun => "Minggu",
    }
}

/// Long date, e.g. `Senin, 19 Oktober 2026`.
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{}, {} {} {}",
        weekday_name(date.weekday()),
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Group with `.` and use `,` as the decimal separator, keeping at most three
/// fraction digits: `1250000.5` → `1.250.000,5`.
pub fn format_number(value: f64) -> String {
    let rendered = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rendered
        .split_once('.')
        .unwrap_or((rendered.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let is_zero = int_part.trim_start_matches('0').is_empty() && frac_part.is_empty();
    let negative = value < 0.0 && !is_zero;
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push(',');
        out.push_str(frac_part);
    }
    out
}

/// Rupiah amount with no space after the symbol: `Rp5.000.000`.
pub fn format_rupiah(value: Option<f64>) -> String {
    format!("Rp{}", format_number(value.unwrap_or(0.0)))
}

/// Ratio as a percentage with one decimal (`0.125` → `12.5`).
///
/// An absent or zero ratio renders as a bare `0`.
pub fn format_percent(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) if r != 0.0 => one_decimal(r * 100.0),
        _ => "0".to_string(),
    }
}

/// One fractional digit, with exact ties rounded away from zero.
///
/// `{:.1}` rounds an exact tie such as `0.25` to even (`0.2`); reports expect
/// `0.3`. Ties are only exact when the value has at most two fractional bits,
/// so `value * 10.0` is exact whenever the check below fires.
fn one_decimal(value: f64) -> String {
    let scaled = value * 10.0;
    if (scaled - scaled.trunc()).abs() == 0.5 {
        format!("{:.1}", scaled.round() / 10.0)
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_use_indonesian_names() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(format_date(date), "Senin, 19 Oktober 2026");

        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(format_date(date), "Sabtu, 1 Maret 2025");

        let date = NaiveDate::from_ymd_opt(2024, 12, 22).unwrap();
        assert_eq!(format_date(date), "Minggu, 22 Desember 2024");
    }

    #[test]
    fn numbers_group_with_dots() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1000.0), "1.000");
        assert_eq!(format_number(5_000_000.0), "5.000.000");
        assert_eq!(format_number(123_456_789.0), "123.456.789");
    }

    #[test]
    fn fractions_use_comma_and_three_digits() {
        assert_eq!(format_number(1_250_000.5), "1.250.000,5");
        assert_eq!(format_number(0.25), "0,25");
        assert_eq!(format_number(1.23456), "1,235");
        assert_eq!(format_number(2.0004), "2");
    }

    #[test]
    fn negative_numbers_keep_sign() {
        assert_eq!(format_number(-1500.0), "-1.500");
        assert_eq!(format_number(-0.0001), "0");
    }

    #[test]
    fn rupiah_defaults_to_zero() {
        assert_eq!(format_rupiah(Some(5_000_000.0)), "Rp5.000.000");
        assert_eq!(format_rupiah(None), "Rp0");
    }

    #[test]
    fn percentages() {
        assert_eq!(format_percent(Some(0.125)), "12.5");
        assert_eq!(format_percent(Some(0.05)), "5.0");
        assert_eq!(format_percent(Some(1.0)), "100.0");
        assert_eq!(format_percent(Some(0.0)), "0");
        assert_eq!(format_percent(None), "0");
    }

    #[test]
    fn percentage_ties_round_up() {
        // One order per 400 visitors.
        assert_eq!(format_percent(Some(1.0 / 400.0)), "0.3");
        assert_eq!(format_percent(Some(0.0125)), "1.3");
        assert_eq!(format_percent(Some(-0.0125)), "-1.3");
        // Values just off a tie keep their nearest rounding.
        assert_eq!(format_percent(Some(0.01249)), "1.2");
    }
}
