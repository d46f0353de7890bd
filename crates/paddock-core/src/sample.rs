//! Built-in sample records for first-run seeding and tests.

use rust_decimal::Decimal;

use crate::types::{Entry, FlagValue, Race, RaceResult, RecordBatch, Surface};

fn entry(
    race_id: &str,
    horse_id: &str,
    name: &str,
    time_index: [Option<f64>; 5],
    checks: &[f64],
) -> Entry {
    Entry::new(race_id, horse_id, name)
        .with_time_index(time_index)
        .with_flag("checkValues", FlagValue::Numbers(checks.to_vec()))
}

/// Two settled races on consecutive days, four runners each.
pub fn dataset() -> RecordBatch {
    let r1 = "202401010101";
    let r2 = "202401020201";

    RecordBatch {
        races: vec![
            Race::new(r1, "20240101")
                .with_venue("Nakayama 11R")
                .with_course(1600, Surface::Turf)
                .with_class("G3"),
            Race::new(r2, "20240102")
                .with_venue("Kyoto 10R")
                .with_course(1400, Surface::Dirt)
                .with_class("OP"),
        ],
        entries: vec![
            entry(
                r1,
                "h1",
                "Alpha",
                [Some(92.0), Some(95.0), None, Some(101.0), Some(98.0)],
                &[95.0, 101.0, 98.0],
            ),
            entry(
                r1,
                "h2",
                "Bravo",
                [Some(88.0), Some(90.0), Some(91.0), Some(89.0), Some(92.0)],
                &[90.0, 91.0, 92.0],
            ),
            entry(
                r1,
                "h3",
                "Charlie",
                [None, Some(87.0), Some(84.0), Some(85.0), Some(86.0)],
                &[86.0],
            ),
            entry(
                r1,
                "h4",
                "Delta",
                [Some(102.0), None, Some(99.0), Some(97.0), Some(96.0)],
                &[102.0, 99.0, 97.0, 96.0],
            ),
            entry(
                r2,
                "a1",
                "Echo",
                [Some(80.0), Some(81.0), Some(79.0), Some(83.0), Some(85.0)],
                &[83.0, 85.0],
            ),
            entry(
                r2,
                "a2",
                "Foxtrot",
                [Some(84.0), Some(86.0), Some(88.0), Some(87.0), Some(86.0)],
                &[84.0, 86.0, 88.0, 87.0, 86.0],
            ),
            entry(
                r2,
                "a3",
                "Gamma",
                [Some(70.0), None, Some(76.0), Some(74.0), Some(73.0)],
                &[76.0, 74.0, 73.0],
            ),
            entry(
                r2,
                "a4",
                "Hotel",
                [Some(90.0), Some(88.0), Some(87.0), Some(91.0), Some(92.0)],
                &[90.0, 88.0, 91.0, 92.0],
            ),
        ],
        results: vec![
            RaceResult::new(r1, vec!["Delta".into(), "Alpha".into(), "Bravo".into()])
                .with_payout("win", Decimal::new(350, 0))
                .with_payout("quinella", Decimal::new(1240, 0))
                .with_payout("trio", Decimal::new(2680, 0))
                .with_payout("trifecta", Decimal::new(15890, 0)),
            RaceResult::new(r2, vec!["Hotel".into(), "Foxtrot".into(), "Echo".into()])
                .with_payout("win", Decimal::new(420, 0))
                .with_payout("quinella", Decimal::new(980, 0))
                .with_payout("trio", Decimal::new(3120, 0))
                .with_payout("trifecta", Decimal::new(20980, 0)),
        ],
    }
}
