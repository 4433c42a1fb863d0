use serde::Deserialize;

/// Output format for per-utterance results.
///
/// Integration notes:
/// - Each variant maps to one `ResultEncoder`: `Json` to `JsonArrayEncoder`, `Text` to
///   `TextEncoder`.
/// - Under the `cli` feature the enum doubles as the `--output-type` flag via `ValueEnum`.
/// - In JSON options it is spelled in kebab-case (`"json"`, `"text"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum OutputType {
    /// Output results as a JSON array.
    #[default]
    Json,

    /// Output one tab-separated `file<TAB>prediction` line per utterance.
    Text,
}
