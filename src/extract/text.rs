/// Value stored for a field that could not be extracted
pub const NOT_AVAILABLE: &str = "N/A";

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
