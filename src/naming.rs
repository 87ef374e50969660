//! Caption helpers for file and directory stems.
//!
//! Two display forms are derived from a stem, and they are deliberately
//! different because they appear in different places:
//!
//! - **Navigation captions** ([`capitalize`]): first character upper-cased,
//!   the rest lower-cased, dashes kept. `nut-roast` → "Nut-roast".
//! - **Category headings** ([`display_title`]): dash-separated words, each
//!   capitalized, joined with spaces. `nut-roast` → "Nut Roast".
//!
//! Non-ASCII letters go through Unicode case mapping; nothing is transliterated.

/// Capitalize a stem for use as a navigation caption.
///
/// - `"recipes"` → "Recipes"
/// - `"ABOUT"` → "About"
/// - `"nut-roast"` → "Nut-roast"
/// - `""` → ""
pub fn capitalize(stem: &str) -> String {
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Turn a dashed stem into a heading title.
///
/// Empty segments (from doubled or trailing dashes) are dropped, so
/// `"--odd--name-"` becomes "Odd Name". Only the first letter of each word is
/// touched; the rest keeps its case (`"diy-HiFi"` → "Diy HiFi").
pub fn display_title(stem: &str) -> String {
    stem.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
