//! Utility functions for visualization: colors, text measurement, locale-aware numbers.

use crate::color::Rgb;
use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

/// Convert a domain color into a plotters color.
#[inline]
pub fn to_rgb_color(c: Rgb) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

#[inline]
pub fn tuple_color((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Cut `text` to fit `max_px`, ending with a single ellipsis when shortened.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out: String = text.to_string();
    while !out.is_empty() && estimate_text_width_px(&format!("{out}…"), font_px) > max_px {
        out.pop();
    }
    if out.is_empty() {
        out
    } else {
        format!("{out}…")
    }
}

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `de`, `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'),
    }
}

/// `1234567.891` with 2 decimals → `"1,234,567.89"` (en) or `"1.234.567,89"` (de).
pub fn format_grouped(value: f64, decimals: usize, locale: &Locale, dec_sep: char) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let rounded = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rounded.as_str(), None),
    };
    let mut out = String::new();
    if value < 0.0 && rounded.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    match int_part.parse::<u128>() {
        Ok(int_value) => out.push_str(&int_value.to_formatted_string(locale)),
        // beyond u128: print the digits ungrouped
        Err(_) => out.push_str(int_part),
    }
    if let Some(frac) = frac_part {
        out.push(dec_sep);
        out.push_str(frac);
    }
    out
}

/// Tick label precision that shrinks as magnitude grows.
pub fn tick_label(v: f64) -> String {
    let a = v.abs();
    let prec = if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    format!("{:.*}", prec, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_numbers_follow_locale() {
        let (en_loc, en_sep) = map_locale("en");
        let (de_loc, de_sep) = map_locale("DE");
        assert_eq!(format_grouped(1234567.891, 2, en_loc, en_sep), "1,234,567.89");
        assert_eq!(format_grouped(1234567.891, 2, de_loc, de_sep), "1.234.567,89");
        assert_eq!(format_grouped(-0.001, 0, en_loc, en_sep), "0");
    }

    #[test]
    fn huge_magnitudes_keep_their_digits() {
        let (en_loc, en_sep) = map_locale("en");
        assert_eq!(format_grouped(3.0e19, 0, en_loc, en_sep), "30,000,000,000,000,000,000");
        let big = format_grouped(-1.0e300, 1, en_loc, en_sep);
        assert!(big.starts_with("-1000"));
        assert!(big.ends_with(".0"));
        assert_eq!(big.len(), 1 + 301 + 2);
    }

    #[test]
    fn truncation_adds_ellipsis() {
        assert_eq!(truncate_to_width("short", 10, 100), "short");
        let t = truncate_to_width("a very long legend title", 10, 60);
        assert!(t.ends_with('…'));
        assert!(estimate_text_width_px(&t, 10) <= 60);
    }
}
