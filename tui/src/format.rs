use unicode_width::UnicodeWidthStr;

use crate::theme::Glyphs;

/// `1234567` -> `1,234,567`.
pub(crate) fn format_amount(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Horizontal meter of `width` cells for a 0..=100 percentage. Out-of-range
/// values are clamped for display only.
pub(crate) fn meter(percent: i32, width: usize, glyphs: &Glyphs) -> String {
    let clamped = usize::try_from(percent.clamp(0, 100)).unwrap_or(0);
    let filled = (clamped * width + 50) / 100;
    let mut out = glyphs.meter_full.repeat(filled);
    out.push_str(&glyphs.meter_empty.repeat(width - filled));
    out
}

/// `left` and `right` separated by enough padding to fill `width` columns.
pub(crate) fn spread(left: &str, right: &str, width: usize) -> String {
    let used = left.width() + right.width();
    let gap = width.saturating_sub(used).max(1);
    format!("{left}{}{right}", " ".repeat(gap))
}

#[cfg(test)]
mod tests {
    use rubberstamp_types::ui::UiOptions;

    use super::{format_amount, meter, spread};
    use crate::theme::glyphs;

    #[test]
    fn amounts_group_thousands() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1_200), "1,200");
        assert_eq!(format_amount(12_000_000), "12,000,000");
    }

    #[test]
    fn meter_clamps_and_rounds() {
        let ascii = glyphs(UiOptions {
            ascii_only: true,
            ..UiOptions::default()
        });
        assert_eq!(meter(100, 10, &ascii), "##########");
        assert_eq!(meter(0, 10, &ascii), "..........");
        assert_eq!(meter(-15, 4, &ascii), "....");
        assert_eq!(meter(55, 10, &ascii), "######....");
    }

    #[test]
    fn spread_pads_by_display_width() {
        assert_eq!(spread("Processed:", "5", 14), "Processed:   5");
        assert_eq!(spread("m²", "x", 5), "m²  x");
        assert_eq!(spread("long", "text", 2), "long text");
    }
}
