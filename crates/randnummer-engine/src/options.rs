/// Tunables of the border-number commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Label written into freshly created number nodes until renumbering runs
    pub placeholder_label: String,
    /// First value of the sequence written by renumbering
    pub first_number: usize,
    /// Markup tag names that identify serialized border numbers in clipboard HTML
    pub marker_tags: Vec<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            placeholder_label: "0".to_string(),
            first_number: 1,
            marker_tags: vec![
                "border-number".to_string(),
                "border-number-number".to_string(),
                "border-number-content".to_string(),
            ],
        }
    }
}
