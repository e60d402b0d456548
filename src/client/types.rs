//! Request and response shapes of the analysis backend.
//!
//! The backend has grown its response fields over several versions, so
//! everything beyond `success` is optional and unknown fields are ignored.

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::error::{ClientError, UNREACHABLE_MESSAGE};

/// Winning numbers keyed by draw number, built fresh for each statistics refresh.
pub type WinningNumbersMap = BTreeMap<u32, WinningNumbers>;

/// Fields extracted from one slip. Shared by live analysis responses and
/// saved analyses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFields {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub draw_number: Option<u32>,
    #[serde(default)]
    pub issue_date: Option<String>,
    #[serde(default)]
    pub draw_date: Option<String>,
    #[serde(default)]
    pub payment_deadline: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extracted_combinations: Vec<Vec<u32>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extracted_amounts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_results: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_verification: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_result: Option<Value>,
}

/// Outcome of `POST /transform-and-analyze`, in one shape whatever went wrong.
///
/// `payload` is the backend's JSON body, passed through untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionResult {
    pub success: bool,
    pub message: Option<String>,
    pub payload: Value,
}

impl SubmissionResult {
    /// Synthetic result for requests that never produced a readable response.
    pub fn unreachable() -> Self {
        Self::failure(UNREACHABLE_MESSAGE)
    }

    /// Synthetic failure with a message.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            payload: serde_json::json!({ "success": false, "message": message }),
            message: Some(message),
        }
    }

    /// Wraps a backend body. A missing `success` counts as failure.
    pub fn from_payload(payload: Value) -> Self {
        let success = payload.get("success").and_then(Value::as_bool).unwrap_or(false);
        let mut message = detail_message(&payload);
        if !success && message.is_none() {
            message = Some("analysis failed".to_string());
        }
        Self {
            success,
            message,
            payload,
        }
    }

    /// Extracted fields; `None` unless the analysis succeeded.
    pub fn fields(&self) -> Option<AnalysisFields> {
        if !self.success {
            return None;
        }
        match serde_json::from_value(self.payload.clone()) {
            Ok(fields) => Some(fields),
            Err(e) => {
                log::warn!("Analysis fields did not match the expected shape: {}", e);
                None
            }
        }
    }

    /// Perspective-corrected image as a data URL.
    pub fn transformed_image(&self) -> Option<&str> {
        self.payload.get("transformed_image").and_then(Value::as_str)
    }

    /// Post-processed image as a data URL.
    pub fn corrected_image(&self) -> Option<&str> {
        self.payload.get("corrected_image").and_then(Value::as_str)
    }
}

/// Reads `message`, or FastAPI's `detail`, from an error-ish body.
pub fn detail_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("detail"))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
}

/// Decodes a `data:<mime>;base64,<payload>` URL (or bare base64) to bytes.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let encoded = match data_url.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest
                .split_once(',')
                .ok_or_else(|| anyhow!("Malformed data URL"))?;
            if !header.ends_with(";base64") {
                return Err(anyhow!("Data URL is not base64 encoded"));
            }
            data
        }
        None => data_url,
    };
    BASE64
        .decode(encoded.trim())
        .context("Failed to decode base64 image data")
}

/// `GET /ocr-status`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct OcrStatus {
    #[serde(default)]
    pub ocr_available: bool,
    #[serde(default)]
    pub message: String,
}

/// `GET /api/health`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Most recent official draw.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LatestDraw {
    pub draw_no: u32,
    #[serde(default)]
    pub draw_date: Option<String>,
    pub numbers: [u32; 6],
    pub bonus: u32,
    #[serde(default)]
    pub first_win_amount: Option<u64>,
    #[serde(default)]
    pub first_prize_winners: Option<u32>,
}

impl LatestDraw {
    pub fn winning_numbers(&self) -> WinningNumbers {
        WinningNumbers {
            draw_no: self.draw_no,
            numbers: self.numbers,
            bonus: self.bonus,
        }
    }
}

/// `GET /api/latest-lotto`
#[derive(Clone, Debug, Deserialize)]
pub struct LatestLottoResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<LatestDraw>,
}

/// Official result of one draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningNumbers {
    pub draw_no: u32,
    pub numbers: [u32; 6],
    pub bonus: u32,
}

/// `GET /api/lotto/{draw_no}`
///
/// Accepts the wrapped `{success, numbers, bonus}` shape as well as the
/// lottery site's raw record (`returnValue`, `drwtNo1..6`, `bnusNo`) that
/// some backends pass through untouched.
#[derive(Clone, Debug, Deserialize)]
pub struct DrawLookupResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "drwNo")]
    pub draw_no: Option<u32>,
    #[serde(default)]
    pub numbers: Option<[u32; 6]>,
    #[serde(default, alias = "bnusNo")]
    pub bonus: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "returnValue")]
    pub return_value: Option<String>,
    #[serde(default, rename = "drwtNo1")]
    pub drwt_no1: Option<u32>,
    #[serde(default, rename = "drwtNo2")]
    pub drwt_no2: Option<u32>,
    #[serde(default, rename = "drwtNo3")]
    pub drwt_no3: Option<u32>,
    #[serde(default, rename = "drwtNo4")]
    pub drwt_no4: Option<u32>,
    #[serde(default, rename = "drwtNo5")]
    pub drwt_no5: Option<u32>,
    #[serde(default, rename = "drwtNo6")]
    pub drwt_no6: Option<u32>,
}

impl DrawLookupResponse {
    fn succeeded(&self) -> bool {
        self.success || self.return_value.as_deref() == Some("success")
    }

    /// Winning numbers, taken from `numbers` or else from `drwtNo1..6`.
    fn winning_numbers(&self) -> Option<[u32; 6]> {
        if let Some(numbers) = self.numbers {
            return Some(numbers);
        }
        Some([
            self.drwt_no1?,
            self.drwt_no2?,
            self.drwt_no3?,
            self.drwt_no4?,
            self.drwt_no5?,
            self.drwt_no6?,
        ])
    }

    /// Converts the response for `draw_no` into a draw result.
    pub fn into_winning(self, draw_no: u32) -> Result<WinningNumbers, ClientError> {
        if !self.succeeded() {
            return Err(ClientError::Application(
                self.message
                    .unwrap_or_else(|| format!("draw {} not available", draw_no)),
            ));
        }
        match (self.winning_numbers(), self.bonus) {
            (Some(numbers), Some(bonus)) => Ok(WinningNumbers {
                draw_no: self.draw_no.unwrap_or(draw_no),
                numbers,
                bonus,
            }),
            _ => Err(ClientError::Decode(format!(
                "draw {} response is missing numbers or bonus",
                draw_no
            ))),
        }
    }
}

/// One analysis stored by the backend.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SavedAnalysis {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub analysis_result: AnalysisFields,
}

/// `GET /api/saved-analyses`
#[derive(Clone, Debug, Deserialize)]
pub struct SavedAnalysesResponse {
    #[serde(default)]
    pub analyses: Vec<SavedAnalysis>,
}

/// Full stored analysis including the original photo.
#[derive(Clone, Debug, Deserialize)]
pub struct SavedAnalysisDetail {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub analysis_result: AnalysisFields,
    /// Base64 (or data URL) encoded original photo
    #[serde(default)]
    pub original_image: Option<String>,
}

/// `GET /api/saved-analyses/{id}`
#[derive(Clone, Debug, Deserialize)]
pub struct SavedAnalysisDetailResponse {
    pub analysis: SavedAnalysisDetail,
}

/// `POST /api/save-analysis`
#[derive(Clone, Debug, Deserialize)]
pub struct SaveAnalysisResponse {
    #[serde(deserialize_with = "id_string")]
    pub analysis_id: String,
}

/// Accepts a number, a numeric string, or null.
fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Treats an explicit null as an empty list.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ids arrive as numbers or strings depending on the storage backend.
fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}
