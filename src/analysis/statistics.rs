//! Statistics over saved analyses.
//!
//! Pure functions: saved analyses plus a winning-numbers map in, view
//! models out. Malformed dates and amounts never abort an aggregation.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::dates::{parse_slip_date, parse_timestamp, YearMonth};
use super::prize::{ticket_outcome, PrizeRank, TicketOutcome};
use crate::client::{SavedAnalysis, WinningNumbersMap};
use crate::config::{PrizeTable, StatisticsConfig};

/// Highest number on a 6/45 slip.
pub const MAX_NUMBER: u32 = 45;

/// How often each number 1..=45 was played.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NumberFrequency {
    /// `counts[n - 1]` is the count for number `n`
    pub counts: Vec<u32>,
}

impl NumberFrequency {
    /// Count for number `n`; 0 outside 1..=45.
    #[cfg(test)]
    pub fn count(&self, n: u32) -> u32 {
        if (1..=MAX_NUMBER).contains(&n) {
            self.counts[(n - 1) as usize]
        } else {
            0
        }
    }

    /// Sum over all numbers.
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// `(number, count)` pairs for 1..=45.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.counts.iter().enumerate().map(|(i, &c)| (i as u32 + 1, c))
    }

    /// The `n` most played numbers, most frequent first, smaller number
    /// first on ties. Numbers never played are left out.
    pub fn most_frequent(&self, n: usize) -> Vec<(u32, u32)> {
        let mut pairs: Vec<(u32, u32)> = self.iter().filter(|&(_, c)| c > 0).collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        pairs.truncate(n);
        pairs
    }
}

/// Counts every number in every combination of every analysis.
pub fn number_frequency(analyses: &[SavedAnalysis]) -> NumberFrequency {
    let mut counts = vec![0u32; MAX_NUMBER as usize];
    for analysis in analyses {
        for combination in &analysis.analysis_result.extracted_combinations {
            for &n in combination {
                if (1..=MAX_NUMBER).contains(&n) {
                    counts[(n - 1) as usize] += 1;
                } else {
                    log::warn!("Ignoring out-of-range number {} in analysis {}", n, analysis.id);
                }
            }
        }
    }
    NumberFrequency { counts }
}

/// Number of ticket lines bought in one month.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlyCount {
    pub month: YearMonth,
    pub count: u32,
}

/// Month an analysis counts toward: the slip's issue date, or the record
/// timestamp when the issue date is missing or unreadable.
pub fn purchase_month(analysis: &SavedAnalysis) -> Option<YearMonth> {
    analysis
        .analysis_result
        .issue_date
        .as_deref()
        .and_then(parse_slip_date)
        .or_else(|| parse_timestamp(&analysis.timestamp))
        .map(YearMonth::of)
}

/// Ticket lines per month, oldest first. Months without purchases are
/// omitted; analyses without any readable date are skipped.
pub fn monthly_purchase_counts(analyses: &[SavedAnalysis]) -> Vec<MonthlyCount> {
    let mut months: BTreeMap<YearMonth, u32> = BTreeMap::new();
    for analysis in analyses {
        let lines = analysis.analysis_result.extracted_combinations.len() as u32;
        if lines == 0 {
            continue;
        }
        match purchase_month(analysis) {
            Some(month) => *months.entry(month).or_insert(0) += lines,
            None => log::warn!(
                "Skipping analysis {}: no readable issue date or timestamp ({:?})",
                analysis.id,
                analysis.timestamp
            ),
        }
    }
    months
        .into_iter()
        .map(|(month, count)| MonthlyCount { month, count })
        .collect()
}

/// Ticket lines per outcome.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PrizeTally {
    pub first: u32,
    pub second: u32,
    pub third: u32,
    pub fourth: u32,
    pub fifth: u32,
    pub no_win: u32,
    /// Lines whose draw result is unknown
    pub undetermined: u32,
}

impl PrizeTally {
    pub fn count(&self, rank: PrizeRank) -> u32 {
        match rank {
            PrizeRank::First => self.first,
            PrizeRank::Second => self.second,
            PrizeRank::Third => self.third,
            PrizeRank::Fourth => self.fourth,
            PrizeRank::Fifth => self.fifth,
        }
    }

    fn record(&mut self, outcome: TicketOutcome) {
        match outcome {
            TicketOutcome::Win(PrizeRank::First) => self.first += 1,
            TicketOutcome::Win(PrizeRank::Second) => self.second += 1,
            TicketOutcome::Win(PrizeRank::Third) => self.third += 1,
            TicketOutcome::Win(PrizeRank::Fourth) => self.fourth += 1,
            TicketOutcome::Win(PrizeRank::Fifth) => self.fifth += 1,
            TicketOutcome::NoWin => self.no_win += 1,
            TicketOutcome::Undetermined => self.undetermined += 1,
        }
    }

    pub fn total_wins(&self) -> u32 {
        PrizeRank::ALL.iter().map(|&r| self.count(r)).sum()
    }

    pub fn total(&self) -> u32 {
        self.total_wins() + self.no_win + self.undetermined
    }
}

/// Outcome of every ticket line of one analysis, in slip order.
pub fn analysis_outcomes(analysis: &SavedAnalysis, winning: &WinningNumbersMap) -> Vec<TicketOutcome> {
    let draw = analysis
        .analysis_result
        .draw_number
        .and_then(|draw_no| winning.get(&draw_no));
    analysis
        .analysis_result
        .extracted_combinations
        .iter()
        .map(|combination| ticket_outcome(combination, draw))
        .collect()
}

/// Tallies every ticket line by outcome.
///
/// Lines whose draw has no entry in `winning` are `undetermined`, unless
/// `count_undetermined_as_no_win` is set, in which case they are counted
/// as losses.
pub fn aggregate_prize_stats(
    analyses: &[SavedAnalysis],
    winning: &WinningNumbersMap,
    config: &StatisticsConfig,
) -> PrizeTally {
    let mut tally = PrizeTally::default();
    for analysis in analyses {
        for outcome in analysis_outcomes(analysis, winning) {
            let outcome = match outcome {
                TicketOutcome::Undetermined if config.count_undetermined_as_no_win => {
                    TicketOutcome::NoWin
                }
                other => other,
            };
            tally.record(outcome);
        }
    }
    tally
}

/// Parses a currency string by dropping every non-digit, e.g. `₩5,000` -> 5000.
/// Anything unreadable is 0.
pub fn parse_amount(text: &str) -> u64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Money in and out.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Financials {
    pub total_spent: u64,
    pub total_won: u64,
    /// `total_won - total_spent`
    pub net: i64,
}

/// `a - b`, clamped to the `i64` range.
fn signed_difference(a: u64, b: u64) -> i64 {
    let diff = i128::from(a) - i128::from(b);
    i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX })
}

/// Sums declared spend against nominal prize amounts. Undetermined lines win nothing.
pub fn aggregate_financials(
    analyses: &[SavedAnalysis],
    winning: &WinningNumbersMap,
    prizes: &PrizeTable,
) -> Financials {
    let total_spent: u64 = analyses
        .iter()
        .flat_map(|a| a.analysis_result.extracted_amounts.iter())
        .map(|amount| parse_amount(amount))
        .fold(0u64, u64::saturating_add);

    let total_won: u64 = analyses
        .iter()
        .flat_map(|a| analysis_outcomes(a, winning))
        .filter_map(|outcome| match outcome {
            TicketOutcome::Win(rank) => Some(prizes.amount(rank)),
            _ => None,
        })
        .fold(0u64, u64::saturating_add);

    Financials {
        total_spent,
        total_won,
        net: signed_difference(total_won, total_spent),
    }
}

/// Distinct draw numbers referenced by the analyses.
pub fn referenced_draws(analyses: &[SavedAnalysis]) -> BTreeSet<u32> {
    analyses
        .iter()
        .filter_map(|a| a.analysis_result.draw_number)
        .collect()
}

/// Everything the statistics view and the JSON export show.
#[derive(Clone, Debug, Serialize)]
pub struct StatisticsReport {
    pub generated_at: String,
    pub total_analyses: usize,
    pub total_tickets: usize,
    pub number_frequency: NumberFrequency,
    pub hot_numbers: Vec<(u32, u32)>,
    pub monthly_purchases: Vec<MonthlyCount>,
    pub prizes: PrizeTally,
    pub financials: Financials,
    /// Draws whose official result could not be fetched
    pub unresolved_draws: Vec<u32>,
}

impl StatisticsReport {
    pub fn build(
        analyses: &[SavedAnalysis],
        winning: &WinningNumbersMap,
        unresolved_draws: Vec<u32>,
        statistics: &StatisticsConfig,
        prizes: &PrizeTable,
    ) -> Self {
        let number_frequency = number_frequency(analyses);
        Self {
            generated_at: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            total_analyses: analyses.len(),
            total_tickets: analyses
                .iter()
                .map(|a| a.analysis_result.extracted_combinations.len())
                .sum(),
            hot_numbers: number_frequency.most_frequent(6),
            number_frequency,
            monthly_purchases: monthly_purchase_counts(analyses),
            prizes: aggregate_prize_stats(analyses, winning, statistics),
            financials: aggregate_financials(analyses, winning, prizes),
            unresolved_draws,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{AnalysisFields, WinningNumbers};

    fn analysis(
        id: &str,
        timestamp: &str,
        draw: Option<u32>,
        issue_date: Option<&str>,
        combinations: Vec<Vec<u32>>,
        amounts: Vec<&str>,
    ) -> SavedAnalysis {
        SavedAnalysis {
            id: id.to_string(),
            timestamp: timestamp.to_string(),
            analysis_result: AnalysisFields {
                draw_number: draw,
                issue_date: issue_date.map(str::to_string),
                extracted_combinations: combinations,
                extracted_amounts: amounts.into_iter().map(str::to_string).collect(),
                ..Default::default()
            },
        }
    }

    fn winning_map() -> WinningNumbersMap {
        let mut map = WinningNumbersMap::new();
        map.insert(
            100,
            WinningNumbers {
                draw_no: 100,
                numbers: [1, 2, 3, 4, 5, 6],
                bonus: 9,
            },
        );
        map
    }

    #[test]
    fn test_frequency_single_combination() {
        let data = vec![analysis("1", "", None, None, vec![vec![1, 2, 3, 4, 5, 6]], vec![])];
        let freq = number_frequency(&data);

        for n in 1..=6 {
            assert_eq!(freq.count(n), 1);
        }
        for n in 7..=45 {
            assert_eq!(freq.count(n), 0);
        }
        assert_eq!(freq.counts.len(), 45);
        assert_eq!(freq.total(), 6);
    }

    #[test]
    fn test_frequency_total_matches_numbers_submitted() {
        let data = vec![
            analysis("1", "", None, None, vec![vec![1, 2, 3, 4, 5, 6], vec![1, 10, 20, 30, 40, 45]], vec![]),
            analysis("2", "", None, None, vec![vec![1, 7, 8, 9, 10, 11]], vec![]),
        ];
        let freq = number_frequency(&data);
        assert_eq!(freq.total(), 18);
        assert_eq!(freq.count(1), 3);
        assert_eq!(freq.count(10), 2);
        assert_eq!(freq.most_frequent(2), vec![(1, 3), (10, 2)]);
    }

    #[test]
    fn test_frequency_skips_out_of_range() {
        let data = vec![analysis("1", "", None, None, vec![vec![0, 46, 99, 45]], vec![])];
        let freq = number_frequency(&data);
        assert_eq!(freq.total(), 1);
        assert_eq!(freq.count(45), 1);
        assert_eq!(freq.count(0), 0);
    }

    #[test]
    fn test_monthly_counts_lines_and_sorts() {
        let data = vec![
            analysis("1", "2024-03-30T09:00:00", None, Some("2024/03/02"), vec![vec![1; 6]; 5], vec![]),
            analysis("2", "2024-01-10T09:00:00", None, None, vec![vec![1; 6]; 2], vec![]),
            analysis("3", "2024-03-15T09:00:00", None, Some("2024-03-15"), vec![vec![1; 6]], vec![]),
        ];
        let monthly = monthly_purchase_counts(&data);

        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].month.to_string(), "2024-01");
        assert_eq!(monthly[0].count, 2);
        assert_eq!(monthly[1].month.to_string(), "2024-03");
        assert_eq!(monthly[1].count, 6);
    }

    #[test]
    fn test_monthly_prefers_issue_date_over_timestamp() {
        // Scanned in February, bought in January: counted once, under January
        let data = vec![analysis(
            "1",
            "2024-02-03T10:00:00",
            None,
            Some("2024/01/27 (토) 19:40:00"),
            vec![vec![1; 6]; 3],
            vec![],
        )];
        let monthly = monthly_purchase_counts(&data);
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].month.to_string(), "2024-01");
        assert_eq!(monthly[0].count, 3);
    }

    #[test]
    fn test_monthly_falls_back_and_skips_unreadable() {
        let data = vec![
            analysis("1", "2024-06-01T10:00:00", None, Some("smudged"), vec![vec![1; 6]], vec![]),
            analysis("2", "garbage", None, Some("also garbage"), vec![vec![1; 6]], vec![]),
        ];
        let monthly = monthly_purchase_counts(&data);
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].month.to_string(), "2024-06");
        assert_eq!(monthly[0].count, 1);
    }

    #[test]
    fn test_prize_tally_keeps_undetermined_separate() {
        let data = vec![
            analysis(
                "1",
                "",
                Some(100),
                None,
                vec![vec![1, 2, 3, 4, 5, 6], vec![1, 2, 3, 4, 5, 9], vec![1, 2, 3, 40, 41, 42], vec![40, 41, 42, 43, 44, 45]],
                vec![],
            ),
            analysis("2", "", Some(101), None, vec![vec![1, 2, 3, 4, 5, 6]], vec![]),
            analysis("3", "", None, None, vec![vec![1, 2, 3, 4, 5, 6]], vec![]),
        ];

        let tally = aggregate_prize_stats(&data, &winning_map(), &StatisticsConfig::default());
        assert_eq!(tally.first, 1);
        assert_eq!(tally.second, 1);
        assert_eq!(tally.fifth, 1);
        assert_eq!(tally.no_win, 1);
        assert_eq!(tally.undetermined, 2);
        assert_eq!(tally.total(), 6);
    }

    #[test]
    fn test_prize_tally_legacy_mode_counts_undetermined_as_loss() {
        let data = vec![analysis("1", "", Some(101), None, vec![vec![1, 2, 3, 4, 5, 6]], vec![])];
        let config = StatisticsConfig {
            count_undetermined_as_no_win: true,
        };

        let tally = aggregate_prize_stats(&data, &winning_map(), &config);
        assert_eq!(tally.no_win, 1);
        assert_eq!(tally.undetermined, 0);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("₩5,000"), 5000);
        assert_eq!(parse_amount("1,000원"), 1000);
        assert_eq!(parse_amount("금액 없음"), 0);
        assert_eq!(parse_amount(""), 0);
    }

    #[test]
    fn test_financials() {
        let data = vec![
            analysis(
                "1",
                "",
                Some(100),
                None,
                vec![vec![1, 2, 3, 40, 41, 42], vec![1, 2, 3, 4, 40, 41]],
                vec!["₩2,000"],
            ),
            analysis("2", "", Some(101), None, vec![vec![1, 2, 3, 4, 5, 6]], vec!["₩1,000", "??"]),
        ];
        let prizes = PrizeTable::default();

        let financials = aggregate_financials(&data, &winning_map(), &prizes);
        assert_eq!(financials.total_spent, 3_000);
        assert_eq!(financials.total_won, 5_000 + 50_000);
        assert_eq!(financials.net, 52_000);
    }

    #[test]
    fn test_financials_use_configured_prizes() {
        let data = vec![analysis("1", "", Some(100), None, vec![vec![1, 2, 3, 40, 41, 42]], vec!["5000"])];
        let prizes = PrizeTable {
            rank5: 10_000,
            ..PrizeTable::default()
        };
        let financials = aggregate_financials(&data, &winning_map(), &prizes);
        assert_eq!(financials.total_won, 10_000);
        assert_eq!(financials.net, 5_000);
    }

    #[test]
    fn test_financials_saturate_on_huge_amounts() {
        // OCR noise can produce absurd amount strings
        let data = vec![
            analysis("1", "", Some(100), None, vec![vec![1, 2, 3, 4, 5, 6]], vec!["9999999999999999999"]),
            analysis("2", "", None, None, vec![], vec!["9,999,999,999,999,999,999"]),
        ];
        let financials = aggregate_financials(&data, &winning_map(), &PrizeTable::default());
        assert_eq!(financials.total_spent, u64::MAX);
        assert_eq!(financials.total_won, 2_000_000_000);
        assert_eq!(financials.net, i64::MIN);
    }

    #[test]
    fn test_signed_difference_clamps() {
        assert_eq!(signed_difference(5, 3), 2);
        assert_eq!(signed_difference(3, 5), -2);
        assert_eq!(signed_difference(u64::MAX, 0), i64::MAX);
        assert_eq!(signed_difference(0, u64::MAX), i64::MIN);
    }

    #[test]
    fn test_referenced_draws_are_distinct() {
        let data = vec![
            analysis("1", "", Some(100), None, vec![], vec![]),
            analysis("2", "", Some(100), None, vec![], vec![]),
            analysis("3", "", Some(98), None, vec![], vec![]),
            analysis("4", "", None, None, vec![], vec![]),
        ];
        let draws: Vec<u32> = referenced_draws(&data).into_iter().collect();
        assert_eq!(draws, vec![98, 100]);
    }

    #[test]
    fn test_report_build() {
        let data = vec![analysis(
            "1",
            "2024-05-01T10:00:00",
            Some(100),
            None,
            vec![vec![1, 2, 3, 4, 5, 6]],
            vec!["₩1,000"],
        )];
        let report = StatisticsReport::build(
            &data,
            &winning_map(),
            vec![],
            &StatisticsConfig::default(),
            &PrizeTable::default(),
        );
        assert_eq!(report.total_analyses, 1);
        assert_eq!(report.total_tickets, 1);
        assert_eq!(report.prizes.first, 1);
        assert_eq!(report.monthly_purchases.len(), 1);
        assert_eq!(report.hot_numbers.len(), 6);
    }
}
