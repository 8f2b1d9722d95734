/// Structural failures from the markup parser. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A line is indented deeper than its block allows, or a dedent landed
    /// on a level no ancestor block opened.
    #[error("invalid indentation at line {line}")]
    Indentation { line: usize },

    /// A block mixes `- ` sequence items and `key: value` mapping entries.
    #[error("mixed sequence/mapping block at line {line}")]
    MixedBlock { line: usize },

    /// A mapping line has no `:` separator.
    #[error("mapping entry without ':' at line {line}: {text}")]
    MissingColon { line: usize, text: String },
}
