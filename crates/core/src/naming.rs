//! Export filename convention.
//!
//! Convention: `{sanitized_project_name}_{YYYY-MM-DD}.{ext}`
//!
//! The date is passed in rather than read from the clock so the same inputs
//! always give the same name.
//!
//! ```
//! use chrono::NaiveDate;
//! use smotree_core::export::ExportFormat;
//! use smotree_core::naming::export_filename;
//!
//! let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
//! assert_eq!(
//!     export_filename("Brand Film v2", ExportFormat::Xml, date),
//!     "Brand_Film_v2_2026-03-14.xml"
//! );
//! ```

use chrono::NaiveDate;

use crate::export::ExportFormat;

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
///
/// Works per character, so a multi-byte letter becomes a single `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Build the filename for an export of `project_name` made on `date`.
pub fn export_filename(project_name: &str, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{}_{}.{}",
        sanitize_name(project_name),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn plain_name_kept() {
        assert_eq!(sanitize_name("Promo_2026"), "Promo_2026");
    }

    #[test]
    fn punctuation_and_spaces_replaced() {
        assert_eq!(sanitize_name("R&D: cut #3"), "R_D__cut__3");
    }

    #[test]
    fn non_ascii_letters_replaced_one_for_one() {
        assert_eq!(sanitize_name("Ролик"), "_____");
    }

    #[test]
    fn extension_follows_format() {
        assert_eq!(
            export_filename("Brand Film", ExportFormat::Edl, date()),
            "Brand_Film_2026-03-14.edl"
        );
        assert_eq!(
            export_filename("Brand Film", ExportFormat::Csv, date()),
            "Brand_Film_2026-03-14.csv"
        );
    }

    #[test]
    fn date_is_zero_padded() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(export_filename("x", ExportFormat::Xml, d), "x_2026-01-05.xml");
    }
}
