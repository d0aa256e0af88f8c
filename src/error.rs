use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Cells a data row must carry: category, name, icons and the three price
/// columns.
pub const MEAL_ROW_CELLS: usize = 6;

/// Fatal failures while building one canteen feed. Any of these aborts the
/// whole build; there is no partial feed.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no date in day caption {caption:?}")]
    CaptionDate { caption: String },

    #[error("{date}: meal row has {cells} cells, expected at least {MEAL_ROW_CELLS}")]
    MalformedRow { date: NaiveDate, cells: usize },

    #[error("cannot derive legend url from {url:?} (no \"essen/\" segment)")]
    LegendUrl { url: String },

    #[error("legend page {url} has no article text")]
    LegendText { url: String },

    #[error("{kind} code {code:?} missing from legend")]
    LegendLookup { kind: LegendKind, code: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendKind {
    Allergen,
    Additive,
}

impl fmt::Display for LegendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allergen => f.write_str("allergen"),
            Self::Additive => f.write_str("additive"),
        }
    }
}

/// Non-fatal events observed while parsing a week page, returned to the
/// caller alongside the emitted meals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Icon title had a `kind:codes` shape with a kind that is neither the
    /// allergen nor the additive keyword.
    UnrecognizedIcon { kind: String, title: String },
    /// Icon image carrying no `title` attribute at all.
    UntitledIcon,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedIcon { kind, title } => {
                write!(f, "unrecognized icon type {kind:?} in {title:?}")
            }
            Self::UntitledIcon => f.write_str("icon image without title attribute"),
        }
    }
}
