//! Draw schedule rules.
//!
//! Draw 1 took place on Saturday 2002-12-07 and there has been exactly one
//! draw every Saturday since. A slip bought Sunday through Saturday belongs
//! to that week's Saturday draw. These rules let the app cross-check the
//! draw number and dates read off a slip.

use chrono::{Datelike, Duration, NaiveDate};

use super::dates::parse_slip_date;
use crate::client::AnalysisFields;

fn first_draw_date() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2002, 12, 7)
}

/// Draw number held on `date`'s week, counting the draw day itself.
/// `None` before the first draw.
pub fn draw_number_for_date(date: NaiveDate) -> Option<u32> {
    let first = first_draw_date()?;
    if date < first {
        return None;
    }
    let weeks = (date - first).num_days() / 7;
    u32::try_from(weeks + 1).ok()
}

/// Saturday on which draw `draw_number` took place.
pub fn draw_date_for_number(draw_number: u32) -> Option<NaiveDate> {
    if draw_number == 0 {
        return None;
    }
    let first = first_draw_date()?;
    first.checked_add_signed(Duration::weeks(i64::from(draw_number) - 1))
}

/// Draw a slip bought on `purchase_date` takes part in.
pub fn draw_number_for_purchase_date(purchase_date: NaiveDate) -> Option<u32> {
    let days_from_sunday = i64::from(purchase_date.weekday().num_days_from_sunday());
    let saturday = purchase_date.checked_add_signed(Duration::days(6 - days_from_sunday))?;
    draw_number_for_date(saturday)
}

/// One consistency check on a slip's fields.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleCheck {
    pub passed: bool,
    pub message: String,
}

impl RuleCheck {
    fn pass(message: String) -> Self {
        Self {
            passed: true,
            message,
        }
    }

    fn fail(message: String) -> Self {
        Self {
            passed: false,
            message,
        }
    }
}

/// Cross-checks the draw number against the slip's draw date and issue
/// date. Checks whose inputs are missing are skipped.
pub fn check_ticket_rules(fields: &AnalysisFields) -> Vec<RuleCheck> {
    let mut checks = Vec::new();
    let Some(draw_number) = fields.draw_number else {
        return checks;
    };

    match draw_date_for_number(draw_number) {
        Some(expected) => {
            if let Some(printed) = fields.draw_date.as_deref().and_then(parse_slip_date) {
                if printed == expected {
                    checks.push(RuleCheck::pass(format!(
                        "Draw {} is held on {}",
                        draw_number,
                        expected.format("%Y/%m/%d")
                    )));
                } else {
                    checks.push(RuleCheck::fail(format!(
                        "Draw {} should be on {}, slip says {}",
                        draw_number,
                        expected.format("%Y/%m/%d"),
                        printed.format("%Y/%m/%d")
                    )));
                }
            }
        }
        None => checks.push(RuleCheck::fail(format!(
            "Draw number {} is not a valid draw",
            draw_number
        ))),
    }

    if let Some(issued) = fields.issue_date.as_deref().and_then(parse_slip_date) {
        match draw_number_for_purchase_date(issued) {
            Some(expected) if expected == draw_number => checks.push(RuleCheck::pass(format!(
                "Issued {} for draw {}",
                issued.format("%Y/%m/%d"),
                draw_number
            ))),
            Some(expected) => checks.push(RuleCheck::fail(format!(
                "A slip issued {} belongs to draw {}, not {}",
                issued.format("%Y/%m/%d"),
                expected,
                draw_number
            ))),
            None => checks.push(RuleCheck::fail(format!(
                "Issue date {} is before the first draw",
                issued.format("%Y/%m/%d")
            ))),
        }
    }

    checks
}
