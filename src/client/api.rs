//! Blocking HTTP client for the analysis backend.
//!
//! Calls are made from worker threads, never from the GUI thread.

use anyhow::{Context, Result};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::Duration;

use super::error::ClientError;
use super::fanout::{fetch_all_settled, DrawLookup};
use super::types::{
    detail_message, DrawLookupResponse, HealthStatus, LatestDraw, LatestLottoResponse, OcrStatus,
    SaveAnalysisResponse, SavedAnalysesResponse, SavedAnalysis, SavedAnalysisDetail,
    SavedAnalysisDetailResponse, SubmissionResult, WinningNumbers,
};
use crate::config::ApiConfig;

/// Client for every backend endpoint the app uses.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("lotto-scanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the original photo and the selected corners for perspective
    /// correction and OCR.
    ///
    /// Never fails: transport errors come back as `success: false` with
    /// "cannot reach server", HTTP errors with the backend's detail text.
    /// Single attempt, no retry.
    pub fn submit(&self, file_name: &str, image: Vec<u8>, corners_json: &str) -> SubmissionResult {
        let form = match image_part(file_name, image) {
            Ok(part) => Form::new().part("file", part).text("corners", corners_json.to_string()),
            Err(e) => {
                log::error!("Failed to build upload for {}: {}", file_name, e);
                return SubmissionResult::failure(e.to_string());
            }
        };

        log::info!("Submitting {} with corners {}", file_name, corners_json);
        let response = match self
            .http
            .post(self.url("/transform-and-analyze"))
            .multipart(form)
            .send()
        {
            Ok(response) => response,
            Err(e) => {
                log::warn!("transform-and-analyze request failed: {}", e);
                return SubmissionResult::unreachable();
            }
        };

        let status = response.status();
        let body: Value = match response.json() {
            Ok(body) => body,
            Err(e) => {
                log::warn!("transform-and-analyze returned unreadable body ({}): {}", status, e);
                if status.is_success() {
                    return SubmissionResult::unreachable();
                }
                return SubmissionResult::failure(format!("HTTP {}", status.as_u16()));
            }
        };

        if !status.is_success() {
            let message =
                detail_message(&body).unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            log::warn!("transform-and-analyze failed with {}: {}", status, message);
            return SubmissionResult {
                success: false,
                message: Some(message),
                payload: body,
            };
        }

        let result = SubmissionResult::from_payload(body);
        if result.success {
            log::info!("Analysis succeeded");
        } else {
            log::info!(
                "Analysis rejected: {}",
                result.message.as_deref().unwrap_or_default()
            );
        }
        result
    }

    /// `GET /ocr-status`
    pub fn ocr_status(&self) -> Result<OcrStatus, ClientError> {
        self.get_json("/ocr-status")
    }

    /// `GET /api/health`
    pub fn health(&self) -> Result<HealthStatus, ClientError> {
        self.get_json("/api/health")
    }

    /// `GET /api/latest-lotto`
    pub fn latest_lotto(&self) -> Result<LatestDraw, ClientError> {
        let response: LatestLottoResponse = self.get_json("/api/latest-lotto")?;
        match (response.success, response.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(ClientError::Application(
                response
                    .message
                    .unwrap_or_else(|| "latest draw unavailable".to_string()),
            )),
        }
    }

    /// `GET /api/lotto/{draw_no}`
    pub fn winning_numbers(&self, draw_no: u32) -> Result<WinningNumbers, ClientError> {
        let response: DrawLookupResponse = self.get_json(&format!("/api/lotto/{}", draw_no))?;
        response.into_winning(draw_no)
    }

    /// Looks up every draw concurrently and waits for all of them.
    /// Failed draws are left out of the map and listed in `failed`.
    pub fn fetch_winning_numbers(&self, draws: &BTreeSet<u32>) -> DrawLookup {
        fetch_all_settled(draws, |draw_no| self.winning_numbers(draw_no))
    }

    /// `GET /api/saved-analyses`
    pub fn saved_analyses(&self) -> Result<Vec<SavedAnalysis>, ClientError> {
        let response: SavedAnalysesResponse = self.get_json("/api/saved-analyses")?;
        Ok(response.analyses)
    }

    /// `GET /api/saved-analyses/{id}`
    pub fn saved_analysis(&self, id: &str) -> Result<SavedAnalysisDetail, ClientError> {
        let response: SavedAnalysisDetailResponse =
            self.get_json(&format!("/api/saved-analyses/{}", id))?;
        Ok(response.analysis)
    }

    /// `POST /api/save-analysis`. Returns the new analysis id.
    pub fn save_analysis(
        &self,
        file_name: &str,
        image: Vec<u8>,
        analysis_result: &Value,
    ) -> Result<String, ClientError> {
        let part = image_part(file_name, image).map_err(|e| ClientError::Decode(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("analysis_result", analysis_result.to_string());

        let response = self
            .http
            .post(self.url("/api/save-analysis"))
            .multipart(form)
            .send()?;
        let saved: SaveAnalysisResponse = read_json(response)?;
        log::info!("Analysis saved as {}", saved.analysis_id);
        Ok(saved.analysis_id)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        log::debug!("GET {}", path);
        let response = self.http.get(self.url(path)).send()?;
        read_json(response)
    }
}

/// Checks the status and decodes the body, keeping the backend's detail
/// text for non-2xx answers.
fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let detail = response
            .json::<Value>()
            .ok()
            .and_then(|body| detail_message(&body))
            .unwrap_or_else(|| status.to_string());
        return Err(ClientError::Http {
            status: status.as_u16(),
            detail,
        });
    }
    response
        .json::<T>()
        .map_err(|e| ClientError::Decode(e.to_string()))
}

fn image_part(file_name: &str, image: Vec<u8>) -> Result<Part> {
    Part::bytes(image)
        .file_name(file_name.to_string())
        .mime_str(mime_for_file_name(file_name))
        .context("Invalid upload content type")
}

/// Content type for an uploaded photo, from its extension.
pub fn mime_for_file_name(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
