//! Realistic string source.
//!
//! Free text and dictionary fallbacks are delegated to a [`StringSource`].
//! Values from it are not tied to the row index.

use fake::faker::name::en::Name;
use fake::Fake;

/// Palette for `string_dict` columns declared without a dictionary.
///
/// fake's `faker::color` (behind its `random_color` feature) only renders
/// hex, rgb and hsl codes, so plain names are drawn from this list instead.
pub const COLOR_NAMES: &[&str] = &[
    "red", "orange", "yellow", "green", "blue", "indigo", "violet", "black", "white", "gray",
    "silver", "gold", "maroon", "olive", "teal", "navy", "purple", "pink", "brown", "cyan",
];

/// Source of human-like string values.
pub trait StringSource: Send + Sync {
    /// A person's full name, used for `string` columns.
    fn full_name(&self) -> String;

    /// A color name, used for `string_dict` columns without a dictionary.
    fn color_name(&self) -> String;
}

/// [`StringSource`] backed by the `fake` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakerStrings;

impl StringSource for FakerStrings {
    fn full_name(&self) -> String {
        Name().fake()
    }

    fn color_name(&self) -> String {
        let slot: usize = (0..COLOR_NAMES.len()).fake();
        COLOR_NAMES[slot].to_string()
    }
}
