//! Enhanced parsing for CLI arguments that support both repeated flags and comma-separated values

/// Parse a vector of strings that may contain comma-separated values
///
/// This function takes a Vec<String> from clap's ArgAction::Append and processes it to:
/// - Split any comma-separated values into individual items
/// - Trim whitespace from each item
/// - Remove empty items
///
/// # Examples
///
/// ```
/// use failprone::cli::enhanced_parser::parse_comma_separated;
///
/// // Multiple flags: --labels bug --labels defect
/// let input = vec!["bug".to_string(), "defect".to_string()];
/// assert_eq!(parse_comma_separated(input), vec!["bug", "defect"]);
///
/// // Mixed: --labels "bug,kind/bug" --labels defect
/// let input = vec!["bug,kind/bug".to_string(), "defect".to_string()];
/// assert_eq!(parse_comma_separated(input), vec!["bug", "kind/bug", "defect"]);
/// ```
pub fn parse_comma_separated(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .flat_map(|item| {
            item.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<String>>()
        })
        .collect()
}

/// Applies the enhanced parsing to list-valued CLI arguments
pub struct EnhancedParser;

impl EnhancedParser {
    /// Parse a list argument such as `--labels`
    pub fn parse_list(values: Vec<String>) -> Vec<String> {
        parse_comma_separated(values)
    }
}
