//! GUI application state management.
//!
//! Holds everything the panels display. Network results are folded in by
//! the `apply_*` methods; none of them touch the corner selector.

use std::path::PathBuf;

use crate::analysis::rules::{check_ticket_rules, RuleCheck};
use crate::analysis::statistics::analysis_outcomes;
use crate::analysis::StatisticsSnapshot;
use crate::analysis::TicketOutcome;
use crate::client::types::{HealthStatus, SavedAnalysisDetail};
use crate::client::{AnalysisFields, ClientError, LatestDraw, OcrStatus, SubmissionResult};

/// Top-level page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Scan,
    History,
    Statistics,
}

/// One-line status shown under the toolbar.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// A photo picked by the user.
#[derive(Clone, Debug)]
pub struct LoadedPhoto {
    pub path: PathBuf,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// One saved analysis as a history table row.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryRow {
    pub id: String,
    pub timestamp: String,
    pub draw_number: Option<u32>,
    pub lines: Vec<(Vec<u32>, TicketOutcome)>,
}

/// GUI application state.
#[derive(Debug, Default)]
pub struct GuiState {
    pub tab: Tab,
    pub status: Option<StatusMessage>,
    pub photo: Option<LoadedPhoto>,
    /// Bumped whenever the photo is cleared or replaced; tags submissions
    pub session: u64,
    /// True while a submission is in flight
    pub submitting: bool,
    pub saving: bool,
    pub loading_statistics: bool,
    /// Last analysis response, kept whole for saving
    pub submission: Option<SubmissionResult>,
    /// Extracted fields of a successful analysis
    pub fields: Option<AnalysisFields>,
    pub rule_checks: Vec<RuleCheck>,
    pub saved_id: Option<String>,
    pub statistics: Option<StatisticsSnapshot>,
    pub loading_detail: bool,
    /// Saved analysis opened from the history table
    pub history_detail: Option<SavedAnalysisDetail>,
    /// Last health check succeeded
    pub server_online: bool,
    pub ocr_status: Option<OcrStatus>,
    pub latest_draw: Option<LatestDraw>,
    pub export_dir: Option<PathBuf>,
}

impl GuiState {
    /// Marks a submission as started. Returns false, leaving state
    /// untouched, if one is already in flight.
    pub fn begin_submission(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.submitting = true;
        self.saved_id = None;
        self.status = Some(StatusMessage::info("Analyzing..."));
        true
    }

    /// Folds an analysis response into the view. Returns false, showing
    /// nothing, if the response belongs to an earlier session.
    ///
    /// A failed analysis shows its message and clears the previous result
    /// so stale fields are never displayed next to an error.
    pub fn apply_submission(&mut self, session: u64, result: SubmissionResult) -> bool {
        self.submitting = false;
        if session != self.session {
            log::info!("Dropping analysis for superseded session {}", session);
            return false;
        }
        if result.success {
            self.fields = result.fields();
            self.rule_checks = self
                .fields
                .as_ref()
                .map(check_ticket_rules)
                .unwrap_or_default();
            self.status = Some(StatusMessage::info("Analysis complete"));
            self.submission = Some(result);
        } else {
            let message = result
                .message
                .clone()
                .unwrap_or_else(|| "analysis failed".to_string());
            self.status = Some(StatusMessage::error(message));
            self.fields = None;
            self.rule_checks.clear();
            self.submission = None;
        }
        true
    }

    pub fn apply_saved(&mut self, result: Result<String, ClientError>) {
        self.saving = false;
        match result {
            Ok(id) => {
                self.status = Some(StatusMessage::info(format!("Saved as #{}", id)));
                self.saved_id = Some(id);
            }
            Err(e) => {
                log::error!("Saving analysis failed: {}", e);
                self.status = Some(StatusMessage::error(e.user_message()));
            }
        }
    }

    pub fn apply_statistics(&mut self, result: Result<StatisticsSnapshot, ClientError>) {
        self.loading_statistics = false;
        match result {
            Ok(snapshot) => {
                if snapshot.lookup.failed.is_empty() {
                    self.status = Some(StatusMessage::info(format!(
                        "Loaded {} saved analyses",
                        snapshot.analyses.len()
                    )));
                } else {
                    self.status = Some(StatusMessage::info(format!(
                        "Loaded {} saved analyses; {} draw results unavailable",
                        snapshot.analyses.len(),
                        snapshot.lookup.failed.len()
                    )));
                }
                self.statistics = Some(snapshot);
            }
            Err(e) => {
                log::error!("Loading statistics failed: {}", e);
                self.status = Some(StatusMessage::error(e.user_message()));
            }
        }
    }

    pub fn apply_analysis_detail(&mut self, result: Result<SavedAnalysisDetail, ClientError>) {
        self.loading_detail = false;
        match result {
            Ok(detail) => self.history_detail = Some(detail),
            Err(e) => {
                log::error!("Loading saved analysis failed: {}", e);
                self.status = Some(StatusMessage::error(e.user_message()));
            }
        }
    }

    pub fn apply_server_status(
        &mut self,
        health: Result<HealthStatus, ClientError>,
        ocr: Result<OcrStatus, ClientError>,
        latest: Result<LatestDraw, ClientError>,
    ) {
        match health {
            Ok(status) => {
                log::info!("Backend health: {} {}", status.status, status.message);
                self.server_online = true;
            }
            Err(e) => {
                log::warn!("Backend health check failed: {}", e);
                self.server_online = false;
            }
        }
        match ocr {
            Ok(status) => self.ocr_status = Some(status),
            Err(e) => {
                log::warn!("OCR status unavailable: {}", e);
                self.ocr_status = None;
            }
        }
        match latest {
            Ok(draw) => self.latest_draw = Some(draw),
            Err(e) => log::warn!("Latest draw unavailable: {}", e),
        }
    }

    /// Drops the photo and the analysis result. Statistics stay.
    pub fn clear_session(&mut self) {
        self.session = self.session.wrapping_add(1);
        self.photo = None;
        self.submission = None;
        self.fields = None;
        self.rule_checks.clear();
        self.saved_id = None;
        self.status = None;
    }

    /// True if anything is waiting on the backend.
    pub fn is_busy(&self) -> bool {
        self.submitting || self.saving || self.loading_statistics || self.loading_detail
    }

    /// Rows for the history table, newest first.
    pub fn history_rows(&self) -> Vec<HistoryRow> {
        let Some(snapshot) = &self.statistics else {
            return Vec::new();
        };
        let mut rows: Vec<HistoryRow> = snapshot
            .analyses
            .iter()
            .map(|analysis| HistoryRow {
                id: analysis.id.clone(),
                timestamp: analysis.timestamp.clone(),
                draw_number: analysis.analysis_result.draw_number,
                lines: analysis
                    .analysis_result
                    .extracted_combinations
                    .iter()
                    .cloned()
                    .zip(analysis_outcomes(analysis, &snapshot.lookup.winning))
                    .collect(),
            })
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StatisticsReport;
    use crate::analysis::PrizeRank;
    use crate::client::{DrawLookup, SavedAnalysis, WinningNumbers};
    use crate::config::{PrizeTable, StatisticsConfig};
    use serde_json::json;

    #[test]
    fn test_second_submission_refused_while_busy() {
        let mut state = GuiState::default();
        assert!(state.begin_submission());
        assert!(!state.begin_submission());
        assert!(state.is_busy());

        state.apply_submission(0, SubmissionResult::unreachable());
        assert!(!state.is_busy());
        assert!(state.begin_submission());
    }

    #[test]
    fn test_successful_submission_populates_fields() {
        let mut state = GuiState::default();
        state.begin_submission();
        state.apply_submission(0, SubmissionResult::from_payload(json!({
            "success": true,
            "draw_number": 1150,
            "draw_date": "2024/12/14",
            "issue_date": "2024/12/09",
            "extracted_combinations": [[1, 2, 3, 4, 5, 6]]
        })));

        let fields = state.fields.as_ref().unwrap();
        assert_eq!(fields.draw_number, Some(1150));
        assert_eq!(state.rule_checks.len(), 2);
        assert!(state.rule_checks.iter().all(|c| c.passed));
        assert!(state.submission.is_some());
        assert!(!state.status.as_ref().unwrap().is_error);
    }

    #[test]
    fn test_failed_submission_clears_previous_result() {
        let mut state = GuiState::default();
        state.apply_submission(0, SubmissionResult::from_payload(json!({
            "success": true,
            "draw_number": 1150
        })));
        assert!(state.fields.is_some());

        state.apply_submission(0, SubmissionResult::from_payload(json!({
            "success": false,
            "message": "x"
        })));
        assert!(state.fields.is_none());
        assert!(state.submission.is_none());
        assert!(state.rule_checks.is_empty());
        assert_eq!(state.status, Some(StatusMessage::error("x")));
    }

    #[test]
    fn test_unreachable_submission_message() {
        let mut state = GuiState::default();
        state.apply_submission(0, SubmissionResult::unreachable());
        assert_eq!(
            state.status.as_ref().map(|s| s.text.as_str()),
            Some("cannot reach server")
        );
    }

    #[test]
    fn test_statistics_error_keeps_previous_snapshot() {
        let mut state = GuiState {
            loading_statistics: true,
            ..Default::default()
        };
        state.apply_statistics(Err(ClientError::Http {
            status: 500,
            detail: "database offline".to_string(),
        }));
        assert!(!state.loading_statistics);
        assert!(state.statistics.is_none());
        assert_eq!(state.status, Some(StatusMessage::error("database offline")));
    }

    #[test]
    fn test_history_rows_mark_unknown_draws_pending() {
        let analyses = vec![
            SavedAnalysis {
                id: "1".to_string(),
                timestamp: "2024-12-09T10:00:00".to_string(),
                analysis_result: AnalysisFields {
                    draw_number: Some(1150),
                    extracted_combinations: vec![vec![1, 2, 3, 4, 5, 6]],
                    ..Default::default()
                },
            },
            SavedAnalysis {
                id: "2".to_string(),
                timestamp: "2024-12-16T10:00:00".to_string(),
                analysis_result: AnalysisFields {
                    draw_number: Some(1151),
                    extracted_combinations: vec![vec![1, 2, 3, 4, 5, 6]],
                    ..Default::default()
                },
            },
        ];
        let mut lookup = DrawLookup::default();
        lookup.winning.insert(
            1150,
            WinningNumbers {
                draw_no: 1150,
                numbers: [1, 2, 3, 4, 5, 6],
                bonus: 7,
            },
        );
        lookup.failed.push((1151, "timeout".to_string()));
        let report = StatisticsReport::build(
            &analyses,
            &lookup.winning,
            vec![1151],
            &StatisticsConfig::default(),
            &PrizeTable::default(),
        );

        let mut state = GuiState::default();
        state.apply_statistics(Ok(StatisticsSnapshot {
            analyses,
            lookup,
            report,
        }));

        let rows = state.history_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "2");
        assert_eq!(rows[0].lines[0].1, TicketOutcome::Undetermined);
        assert_eq!(rows[1].lines[0].1, TicketOutcome::Win(PrizeRank::First));
        assert!(state.status.as_ref().unwrap().text.contains("1 draw results unavailable"));
    }

    #[test]
    fn test_result_for_replaced_photo_is_dropped() {
        let photo = |name: &str| LoadedPhoto {
            path: PathBuf::from(name),
            file_name: name.to_string(),
            bytes: name.as_bytes().to_vec(),
        };
        let mut state = GuiState::default();
        state.clear_session();
        state.photo = Some(photo("a.jpg"));
        let session_a = state.session;
        assert!(state.begin_submission());

        // User switches to another photo before the response arrives
        state.clear_session();
        state.photo = Some(photo("b.jpg"));

        let applied = state.apply_submission(
            session_a,
            SubmissionResult::from_payload(json!({"success": true, "draw_number": 1150})),
        );
        assert!(!applied);
        assert!(!state.submitting);
        assert!(state.fields.is_none());
        assert!(state.submission.is_none());
        assert_eq!(state.photo.as_ref().unwrap().file_name, "b.jpg");

        // B's own result still lands
        let session_b = state.session;
        assert!(state.begin_submission());
        assert!(state.apply_submission(
            session_b,
            SubmissionResult::from_payload(json!({"success": true, "draw_number": 1151})),
        ));
        assert_eq!(state.fields.as_ref().unwrap().draw_number, Some(1151));
    }

    #[test]
    fn test_analysis_detail_keeps_previous_on_error() {
        let mut state = GuiState {
            loading_detail: true,
            ..Default::default()
        };
        let detail: SavedAnalysisDetail = serde_json::from_value(json!({
            "id": 4,
            "timestamp": "2024-12-09T10:00:00",
            "analysis_result": {"draw_number": 1150}
        }))
        .unwrap();
        state.apply_analysis_detail(Ok(detail));
        assert!(!state.is_busy());
        assert_eq!(state.history_detail.as_ref().unwrap().id, "4");

        state.apply_analysis_detail(Err(ClientError::Http {
            status: 404,
            detail: "Analysis not found".into(),
        }));
        assert_eq!(state.history_detail.as_ref().unwrap().id, "4");
        assert_eq!(state.status, Some(StatusMessage::error("Analysis not found")));
    }

    #[test]
    fn test_server_status_offline() {
        let mut state = GuiState::default();
        state.apply_server_status(
            Err(ClientError::Unreachable("refused".into())),
            Err(ClientError::Unreachable("refused".into())),
            Err(ClientError::Unreachable("refused".into())),
        );
        assert!(!state.server_online);
        assert!(state.ocr_status.is_none());
        assert!(state.latest_draw.is_none());

        state.apply_server_status(
            Ok(HealthStatus {
                status: "healthy".into(),
                message: String::new(),
            }),
            Ok(OcrStatus {
                ocr_available: true,
                message: "ready".into(),
            }),
            Err(ClientError::Application("no draws yet".into())),
        );
        assert!(state.server_online);
        assert!(state.ocr_status.as_ref().unwrap().ocr_available);
    }

    #[test]
    fn test_clear_session_keeps_statistics() {
        let mut state = GuiState {
            photo: Some(LoadedPhoto {
                path: PathBuf::from("slip.jpg"),
                file_name: "slip.jpg".to_string(),
                bytes: vec![1, 2, 3],
            }),
            saved_id: Some("9".to_string()),
            ..Default::default()
        };
        state.clear_session();
        assert!(state.photo.is_none());
        assert!(state.saved_id.is_none());
        assert!(state.fields.is_none());
    }
}
