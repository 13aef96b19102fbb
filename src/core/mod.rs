mod check;
mod report;
mod scan_result;
mod status;
mod suggestion;

pub use check::{CheckOutcome, CheckResults};
pub use report::{Report, ReportOutputs, ReportSummary};
pub use scan_result::ScanResult;
pub use status::CheckStatus;
pub use suggestion::Suggestion;
