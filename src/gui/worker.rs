//! Background worker for backend calls.
//!
//! Each job runs on its own thread and reports back through an mpsc
//! channel. The GUI drains the channel once per frame.

use serde_json::Value;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;

use crate::analysis::{self, StatisticsSnapshot};
use crate::client::types::{HealthStatus, SavedAnalysisDetail};
use crate::client::{ApiClient, ClientError, LatestDraw, OcrStatus, SubmissionResult};
use crate::config::AppConfig;

/// Work the GUI can hand off.
#[derive(Debug, Clone)]
pub enum Job {
    /// Send the photo and corners for analysis
    Submit {
        session: u64,
        file_name: String,
        image: Vec<u8>,
        corners_json: String,
    },
    /// Store a finished analysis on the backend
    Save {
        file_name: String,
        image: Vec<u8>,
        analysis_result: Value,
    },
    /// Reload saved analyses and winning numbers
    RefreshStatistics,
    /// Fetch one saved analysis with its photo
    LoadAnalysis { id: String },
    /// OCR availability and the latest draw
    ServerStatus,
}

/// Outcome of a job, delivered back to the GUI thread.
#[derive(Debug)]
pub enum JobResult {
    Submitted {
        session: u64,
        result: SubmissionResult,
    },
    Saved(Result<String, ClientError>),
    Statistics(Result<StatisticsSnapshot, ClientError>),
    AnalysisDetail(Result<SavedAnalysisDetail, ClientError>),
    ServerStatus {
        health: Result<HealthStatus, ClientError>,
        ocr: Result<OcrStatus, ClientError>,
        latest: Result<LatestDraw, ClientError>,
    },
}

/// Spawns jobs and collects their results.
pub struct Worker {
    client: ApiClient,
    config: AppConfig,
    sender: Sender<JobResult>,
    receiver: Receiver<JobResult>,
    in_flight: usize,
}

impl Worker {
    pub fn new(client: ApiClient, config: AppConfig) -> Self {
        let (sender, receiver) = channel();
        Self {
            client,
            config,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Number of jobs that have not reported back yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Starts `job` on a new thread. No cancellation.
    pub fn spawn(&mut self, job: Job) {
        let client = self.client.clone();
        let config = self.config.clone();
        let sender = self.sender.clone();
        self.in_flight += 1;

        thread::spawn(move || {
            let result = run_job(&client, &config, job);
            if sender.send(result).is_err() {
                log::debug!("GUI went away before job finished");
            }
        });
    }

    /// Returns every result that has arrived since the last call.
    pub fn poll(&mut self) -> Vec<JobResult> {
        let mut results = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(result) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    results.push(result);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        results
    }
}

/// Runs a job to completion on the calling thread.
pub fn run_job(client: &ApiClient, config: &AppConfig, job: Job) -> JobResult {
    match job {
        Job::Submit {
            session,
            file_name,
            image,
            corners_json,
        } => JobResult::Submitted {
            session,
            result: client.submit(&file_name, image, &corners_json),
        },
        Job::Save {
            file_name,
            image,
            analysis_result,
        } => JobResult::Saved(client.save_analysis(&file_name, image, &analysis_result)),
        Job::RefreshStatistics => {
            JobResult::Statistics(analysis::refresh_statistics(client, config))
        }
        Job::LoadAnalysis { id } => JobResult::AnalysisDetail(client.saved_analysis(&id)),
        Job::ServerStatus => JobResult::ServerStatus {
            health: client.health(),
            ocr: client.ocr_status(),
            latest: client.latest_lotto(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_server::{dead_base_url, TestServer};
    use crate::config::ApiConfig;
    use std::time::{Duration, Instant};

    fn worker_for(base_url: String) -> Worker {
        let config = AppConfig {
            api: ApiConfig {
                base_url,
                timeout_secs: 5,
            },
            ..Default::default()
        };
        let client = ApiClient::new(&config.api).unwrap();
        Worker::new(client, config)
    }

    fn wait_for_results(worker: &mut Worker, count: usize) -> Vec<JobResult> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut results = Vec::new();
        while results.len() < count && Instant::now() < deadline {
            results.extend(worker.poll());
            thread::sleep(Duration::from_millis(10));
        }
        results
    }

    #[test]
    fn test_submit_job_reports_back() {
        let server = TestServer::start(|_| {
            (200, r#"{"success": true, "draw_number": 1150}"#.to_string())
        });
        let mut worker = worker_for(server.base_url.clone());

        worker.spawn(Job::Submit {
            session: 3,
            file_name: "slip.jpg".to_string(),
            image: vec![0xFF, 0xD8, 0xFF],
            corners_json: "[[0,0],[1,0],[1,1],[0,1]]".to_string(),
        });
        assert_eq!(worker.in_flight(), 1);

        let results = wait_for_results(&mut worker, 1);
        assert_eq!(worker.in_flight(), 0);
        match &results[..] {
            [JobResult::Submitted { session, result }] => {
                assert_eq!(*session, 3);
                assert!(result.success);
            }
            other => panic!("unexpected results: {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_server_status() {
        let mut worker = worker_for(dead_base_url());
        worker.spawn(Job::ServerStatus);

        let results = wait_for_results(&mut worker, 1);
        match &results[..] {
            [JobResult::ServerStatus { health, ocr, latest }] => {
                assert!(matches!(health, Err(ClientError::Unreachable(_))));
                assert!(matches!(ocr, Err(ClientError::Unreachable(_))));
                assert!(matches!(latest, Err(ClientError::Unreachable(_))));
            }
            other => panic!("unexpected results: {:?}", other),
        }
    }
}
