use serde::{Deserialize, Serialize};

/// Summary output style. A closed set: configuration strings map onto these
/// variants totally, with unrecognized values falling back to `Detailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    /// Full structured markdown with overview, decisions, and action items.
    Detailed,
    /// Concise bullet points plus action items.
    Bullets,
    /// Short 2-3 paragraph executive brief.
    Executive,
    /// Email-ready follow-up recap.
    Email,
}

impl SummaryFormat {
    pub const ALL: &[SummaryFormat] = &[
        SummaryFormat::Detailed,
        SummaryFormat::Bullets,
        SummaryFormat::Executive,
        SummaryFormat::Email,
    ];

    /// Total mapping from a configuration string. Unrecognized values get the
    /// default format rather than failing.
    pub fn parse(value: &str) -> SummaryFormat {
        match value.trim().to_lowercase().as_str() {
            "bullets" => SummaryFormat::Bullets,
            "executive" => SummaryFormat::Executive,
            "email" => SummaryFormat::Email,
            _ => SummaryFormat::Detailed,
        }
    }
}

impl Default for SummaryFormat {
    fn default() -> Self {
        SummaryFormat::Detailed
    }
}

impl std::fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryFormat::Detailed => write!(f, "detailed"),
            SummaryFormat::Bullets => write!(f, "bullets"),
            SummaryFormat::Executive => write!(f, "executive"),
            SummaryFormat::Email => write!(f, "email"),
        }
    }
}
