use serde::Serialize;
use std::fmt;

/// Checklist status token written into the `Status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Done,
    Open,
}

impl CheckStatus {
    pub const fn from_passed(passed: bool) -> Self {
        if passed {
            CheckStatus::Done
        } else {
            CheckStatus::Open
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Done => "erledigt",
            CheckStatus::Open => "offen",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
