//! Prize rank classification for 6/45 tickets.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::client::WinningNumbers;

/// Prize tiers, first being the jackpot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PrizeRank {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
}

impl PrizeRank {
    pub const ALL: [PrizeRank; 5] = [
        PrizeRank::First,
        PrizeRank::Second,
        PrizeRank::Third,
        PrizeRank::Fourth,
        PrizeRank::Fifth,
    ];
}

impl fmt::Display for PrizeRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PrizeRank::First => "1st",
            PrizeRank::Second => "2nd",
            PrizeRank::Third => "3rd",
            PrizeRank::Fourth => "4th",
            PrizeRank::Fifth => "5th",
        };
        write!(f, "{}", label)
    }
}

/// Outcome of one ticket line against its draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketOutcome {
    Win(PrizeRank),
    NoWin,
    /// The draw's official result is not known (not drawn yet, or lookup failed).
    Undetermined,
}

impl fmt::Display for TicketOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketOutcome::Win(rank) => write!(f, "{} prize", rank),
            TicketOutcome::NoWin => write!(f, "No win"),
            TicketOutcome::Undetermined => write!(f, "Pending"),
        }
    }
}

/// Number of ticket numbers that appear among the winning numbers.
/// Order is irrelevant and duplicates on the ticket count once.
pub fn count_matches(ticket: &[u32], winning: &[u32; 6]) -> usize {
    let ticket: BTreeSet<u32> = ticket.iter().copied().collect();
    let winning: BTreeSet<u32> = winning.iter().copied().collect();
    ticket.intersection(&winning).count()
}

/// Classifies a ticket line. `None` means no prize.
///
/// 6 matches: first. 5 matches plus the bonus number: second. 5 matches:
/// third. 4: fourth. 3: fifth.
pub fn classify_ticket(ticket: &[u32], winning: &[u32; 6], bonus: u32) -> Option<PrizeRank> {
    match count_matches(ticket, winning) {
        6 => Some(PrizeRank::First),
        5 if ticket.contains(&bonus) => Some(PrizeRank::Second),
        5 => Some(PrizeRank::Third),
        4 => Some(PrizeRank::Fourth),
        3 => Some(PrizeRank::Fifth),
        _ => None,
    }
}

/// Outcome of a ticket line given the (possibly unknown) draw result.
pub fn ticket_outcome(ticket: &[u32], draw: Option<&WinningNumbers>) -> TicketOutcome {
    match draw {
        None => TicketOutcome::Undetermined,
        Some(draw) => match classify_ticket(ticket, &draw.numbers, draw.bonus) {
            Some(rank) => TicketOutcome::Win(rank),
            None => TicketOutcome::NoWin,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINNING: [u32; 6] = [1, 2, 3, 4, 5, 6];

    #[test]
    fn test_first_prize() {
        assert_eq!(classify_ticket(&[1, 2, 3, 4, 5, 6], &WINNING, 7), Some(PrizeRank::First));
    }

    #[test]
    fn test_second_prize_needs_bonus() {
        assert_eq!(classify_ticket(&[1, 2, 3, 4, 5, 9], &WINNING, 9), Some(PrizeRank::Second));
    }

    #[test]
    fn test_third_prize_without_bonus() {
        assert_eq!(classify_ticket(&[1, 2, 3, 4, 5, 9], &WINNING, 10), Some(PrizeRank::Third));
    }

    #[test]
    fn test_fourth_and_fifth() {
        assert_eq!(classify_ticket(&[1, 2, 3, 4, 20, 21], &WINNING, 7), Some(PrizeRank::Fourth));
        assert_eq!(classify_ticket(&[1, 2, 3, 10, 20, 21], &WINNING, 7), Some(PrizeRank::Fifth));
    }

    #[test]
    fn test_no_prize() {
        let rank = classify_ticket(&[10, 20, 30, 40, 41, 42], &WINNING, 7);
        assert_eq!(rank, None);
        // Two matches is still nothing
        assert_eq!(classify_ticket(&[1, 2, 30, 40, 41, 42], &WINNING, 7), None);
    }

    #[test]
    fn test_order_is_irrelevant() {
        assert_eq!(classify_ticket(&[6, 5, 4, 3, 2, 1], &WINNING, 7), Some(PrizeRank::First));
        assert_eq!(count_matches(&[45, 3, 1], &WINNING), 2);
    }

    #[test]
    fn test_bonus_only_matters_for_five_matches() {
        // Four matches plus bonus stays fourth
        assert_eq!(classify_ticket(&[1, 2, 3, 4, 7, 21], &WINNING, 7), Some(PrizeRank::Fourth));
    }

    #[test]
    fn test_ticket_outcome_distinguishes_unknown_draw() {
        let draw = WinningNumbers {
            draw_no: 1,
            numbers: WINNING,
            bonus: 7,
        };
        assert_eq!(ticket_outcome(&[1, 2, 3, 40, 41, 42], Some(&draw)), TicketOutcome::Win(PrizeRank::Fifth));
        assert_eq!(ticket_outcome(&[10, 20, 30, 40, 41, 42], Some(&draw)), TicketOutcome::NoWin);
        assert_eq!(ticket_outcome(&[1, 2, 3, 4, 5, 6], None), TicketOutcome::Undetermined);
    }
}
