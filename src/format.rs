//! Pure formatting and layout arithmetic used by the report builder.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use genpdf::Mm;

/// Rows that fit on the first page, below the masthead.
pub const FIRST_PAGE_ROWS: usize = 24;

/// Rows that fit on every following page.
pub const FOLLOWING_PAGE_ROWS: usize = 29;

/// Resolution used to convert layout millimetres into points.
pub const DPI: f64 = 72.0;

/// Inch length used for the millimetre-to-point ratio.
///
/// A real inch is 25.4 mm. The layout has always been computed with 25.2 and the
/// value is kept so page geometry stays identical to previously issued reports.
pub const LAYOUT_INCH_MM: f64 = 25.2;

/// True millimetres per inch, used when handing points over to `genpdf`.
pub const MM_PER_INCH: f64 = 25.4;

/// Background of odd table rows, RGB(0.95, 0.95, 0.95).
pub const LIGHT_GRAY_RGB: [u8; 3] = [242, 242, 242];

/// Number of pages the table needs for `rows` data rows.
///
/// Returns `None` when there is nothing to report.
pub fn page_count(rows: usize) -> Option<usize> {
    match rows {
        0 => None,
        n if n <= FIRST_PAGE_ROWS => Some(1),
        n => Some(1 + (n - FIRST_PAGE_ROWS + FOLLOWING_PAGE_ROWS - 1) / FOLLOWING_PAGE_ROWS),
    }
}

/// Points per layout millimetre (`DPI / LAYOUT_INCH_MM`).
pub fn points_per_mm() -> f64 {
    DPI / LAYOUT_INCH_MM
}

/// Converts layout millimetres into points using [`points_per_mm`].
pub fn layout_mm_to_points(mm: f64) -> f64 {
    mm * points_per_mm()
}

/// Converts PDF points into `genpdf` millimetres.
pub fn points(pt: f64) -> Mm {
    mm_from_f64(pt * MM_PER_INCH / DPI)
}

/// Converts `genpdf` millimetres back into PDF points.
pub fn to_points(value: Mm) -> f64 {
    mm_to_f64(value) * DPI / MM_PER_INCH
}

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Zero-pads the identifier to six digits without truncating longer values.
pub fn person_code(id: u32) -> String {
    format!("{:06}", id)
}

/// Background shade of a table row; the header is row `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowShade {
    /// Even rows.
    White,
    /// Odd rows.
    LightGray,
}

impl RowShade {
    /// Shade for the row at `row_index`.
    pub fn for_row(row_index: usize) -> Self {
        if row_index % 2 == 1 {
            RowShade::LightGray
        } else {
            RowShade::White
        }
    }

    /// RGB channels of the row fill, also used when flattening transparent
    /// icons onto the row.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            RowShade::White => [255, 255, 255],
            RowShade::LightGray => LIGHT_GRAY_RGB,
        }
    }

    /// Whether the row needs an explicit fill on a white page.
    pub fn is_filled(self) -> bool {
        self != RowShade::White
    }
}

/// Currency conventions supported by the salary column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locale {
    /// `$1,234.50`
    #[default]
    EnUs,
    /// `R$ 1.234,50`
    PtBr,
}

impl Locale {
    fn symbol(self) -> &'static str {
        match self {
            Locale::EnUs => "$",
            Locale::PtBr => "R$ ",
        }
    }

    fn separators(self) -> (char, char) {
        match self {
            Locale::EnUs => (',', '.'),
            Locale::PtBr => ('.', ','),
        }
    }

    /// Formats `amount` with two decimals, grouping and the currency symbol.
    pub fn format_currency(self, amount: f64) -> String {
        let cents = (amount.abs() * 100.0).round() as u64;
        let (units, fraction) = (cents / 100, cents % 100);
        let (group, decimal) = self.separators();

        let digits = units.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (index, ch) in digits.chars().enumerate() {
            if index > 0 && (digits.len() - index) % 3 == 0 {
                grouped.push(group);
            }
            grouped.push(ch);
        }

        let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
        format!(
            "{}{}{}{}{:02}",
            sign,
            self.symbol(),
            grouped,
            decimal,
            fraction
        )
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::EnUs => f.write_str("en-US"),
            Locale::PtBr => f.write_str("pt-BR"),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().replace('_', "-").as_str() {
            "en-us" | "en" => Ok(Locale::EnUs),
            "pt-br" | "pt" => Ok(Locale::PtBr),
            other => Err(format!(
                "unsupported locale `{}`; expected en-US or pt-BR",
                other
            )),
        }
    }
}

/// Output file name, `pessoas.yyyy.MM.dd.HH.mm.ss.pdf`.
pub fn report_file_name(generated_at: NaiveDateTime) -> String {
    format!("pessoas.{}.pdf", generated_at.format("%Y.%m.%d.%H.%M.%S"))
}

/// Footer text with the generation date and time.
pub fn generated_on(generated_at: NaiveDateTime) -> String {
    format!(
        "Generated on {} at {}",
        generated_at.format("%d/%m/%Y"),
        generated_at.format("%H:%M")
    )
}

/// Footer text with the page position.
pub fn page_label(page: usize, total: usize) -> String {
    format!("Page {} of {}", page, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|date| date.and_hms_opt(h, m, s))
            .expect("valid timestamp")
    }

    #[test]
    fn page_count_uses_asymmetric_first_page() {
        let cases = [
            (0, None),
            (1, Some(1)),
            (24, Some(1)),
            (25, Some(2)),
            (53, Some(2)),
            (54, Some(3)),
        ];
        for (rows, expected) in cases {
            assert_eq!(page_count(rows), expected, "rows = {}", rows);
        }
    }

    #[test]
    fn codes_are_padded_but_not_truncated() {
        assert_eq!(person_code(42), "000042");
        assert_eq!(person_code(0), "000000");
        assert_eq!(person_code(1_000_000), "1000000");
    }

    #[test]
    fn currency_has_two_decimals_and_grouping() {
        assert_eq!(Locale::EnUs.format_currency(1234.5), "$1,234.50");
        assert_eq!(Locale::PtBr.format_currency(1234.5), "R$ 1.234,50");
        assert_eq!(Locale::EnUs.format_currency(0.0), "$0.00");
        assert_eq!(Locale::EnUs.format_currency(999.999), "$1,000.00");
        assert_eq!(Locale::EnUs.format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(Locale::EnUs.format_currency(-12.3), "-$12.30");
    }

    #[test]
    fn locale_parses_common_spellings() {
        assert_eq!("pt-BR".parse::<Locale>(), Ok(Locale::PtBr));
        assert_eq!("en_us".parse::<Locale>(), Ok(Locale::EnUs));
        assert!("fr-FR".parse::<Locale>().is_err());
    }

    #[test]
    fn rows_alternate_starting_white() {
        assert_eq!(RowShade::for_row(0), RowShade::White);
        assert_eq!(RowShade::for_row(1), RowShade::LightGray);
        assert_eq!(RowShade::for_row(2), RowShade::White);
        assert_eq!(RowShade::for_row(1).rgb(), [242, 242, 242]);
        assert!(!RowShade::for_row(4).is_filled());
    }

    #[test]
    fn file_names_embed_the_second() {
        let first = report_file_name(timestamp(14, 5, 9));
        let second = report_file_name(timestamp(14, 5, 10));
        assert_eq!(first, "pessoas.2024.03.09.14.05.09.pdf");
        assert_ne!(first, second);
    }

    #[test]
    fn footer_texts() {
        assert_eq!(
            generated_on(timestamp(8, 30, 0)),
            "Generated on 09/03/2024 at 08:30"
        );
        assert_eq!(page_label(2, 3), "Page 2 of 3");
    }

    #[test]
    fn layout_ratio_keeps_the_recorded_inch() {
        assert!((points_per_mm() - 72.0 / 25.2).abs() < 1e-12);
        assert!((layout_mm_to_points(15.0) - 42.857_142_857).abs() < 1e-6);
        assert!((to_points(points(32.0)) - 32.0).abs() < 1e-9);
    }
}
