//! Concurrent per-draw lookups joined with an "all settled" barrier.

use std::collections::BTreeSet;
use std::thread;

use super::error::ClientError;
use super::types::{WinningNumbers, WinningNumbersMap};

/// Result of looking up several draws at once.
#[derive(Clone, Debug, Default)]
pub struct DrawLookup {
    /// Draws that resolved successfully.
    pub winning: WinningNumbersMap,
    /// Draws whose lookup failed, with the reason. Absent from `winning`.
    pub failed: Vec<(u32, String)>,
}

/// Runs `fetch` for every draw on its own scoped thread and returns once
/// every lookup has finished, successful or not.
pub fn fetch_all_settled<F>(draws: &BTreeSet<u32>, fetch: F) -> DrawLookup
where
    F: Fn(u32) -> Result<WinningNumbers, ClientError> + Sync,
{
    let fetch = &fetch;
    let outcomes: Vec<(u32, Result<WinningNumbers, String>)> = thread::scope(|scope| {
        let handles: Vec<_> = draws
            .iter()
            .map(|&draw_no| {
                (
                    draw_no,
                    scope.spawn(move || fetch(draw_no).map_err(|e| e.to_string())),
                )
            })
            .collect();

        handles
            .into_iter()
            .map(|(draw_no, handle)| {
                let outcome = handle
                    .join()
                    .unwrap_or_else(|_| Err("lookup thread panicked".to_string()));
                (draw_no, outcome)
            })
            .collect()
    });

    let mut lookup = DrawLookup::default();
    for (draw_no, outcome) in outcomes {
        match outcome {
            Ok(winning) => {
                lookup.winning.insert(draw_no, winning);
            }
            Err(reason) => {
                log::warn!("Winning numbers for draw {} unavailable: {}", draw_no, reason);
                lookup.failed.push((draw_no, reason));
            }
        }
    }

    log::info!(
        "Draw lookups settled: {} resolved, {} failed",
        lookup.winning.len(),
        lookup.failed.len()
    );
    lookup
}
