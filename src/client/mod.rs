//! Backend API client.
//!
//! This module provides:
//! - Slip submission (`/transform-and-analyze`) with a uniform result shape
//! - Typed wrappers for the status, draw and saved-analysis endpoints
//! - Concurrent winning-number lookups that tolerate partial failure

pub mod api;
pub mod error;
pub mod fanout;
pub mod types;

#[cfg(test)]
pub mod test_server;

pub use api::ApiClient;
pub use error::ClientError;
pub use fanout::DrawLookup;
pub use types::{
    AnalysisFields, LatestDraw, OcrStatus, SavedAnalysis, SubmissionResult, WinningNumbers,
    WinningNumbersMap,
};
