//! Live predictions for upcoming races.

use chrono::{Datelike, Duration, NaiveDate};
use paddock_core::store::RecordStore;
use paddock_core::types::{resolve_params, Preset};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::runner::DateRange;
use crate::strategy::{StrategyRegistry, Verdict};

/// Pick for one upcoming race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub date: String,
    pub race_id: String,
    pub venue: Option<String>,
    pub main: String,
    pub rivals: Vec<String>,
}

/// Evaluate `preset` on every race in `range` without settling anything.
///
/// Races the strategy passes on are dropped. Output is ordered by date, then
/// venue, then race id.
pub async fn predict(
    store: &dyn RecordStore,
    registry: &StrategyRegistry,
    range: &DateRange,
    preset: &Preset,
) -> Result<Vec<Prediction>> {
    let strategy = registry.resolve(&preset.strategy_id)?;
    let params = resolve_params(&strategy.schema(), &preset.params);
    let races = store.races_between(&range.from, &range.to).await?;
    let mut predictions = Vec::new();

    for race in races {
        let field = store.entries_for(&race.race_id).await?;
        if let Verdict::Pick { main, rivals } = strategy.evaluate(&field, &params) {
            predictions.push(Prediction {
                date: race.date,
                race_id: race.race_id,
                venue: race.venue,
                main,
                rivals,
            });
        }
    }

    predictions.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.venue.cmp(&b.venue))
            .then_with(|| a.race_id.cmp(&b.race_id))
    });

    info!(
        strategy = strategy.id(),
        preset = %preset.id,
        from = %range.from,
        to = %range.to,
        picks = predictions.len(),
        "Predictions generated"
    );

    Ok(predictions)
}

/// The coming Saturday and Sunday as a `YYYYMMDD` range.
///
/// On a Saturday this is the current weekend; on a Sunday it is the next one.
pub fn this_weekend(today: NaiveDate) -> DateRange {
    let weekday = today.weekday().num_days_from_sunday() as i64;
    let saturday = today + Duration::days((6 - weekday + 7) % 7);
    let sunday = saturday + Duration::days(1);

    DateRange::new(
        saturday.format("%Y%m%d").to_string(),
        sunday.format("%Y%m%d").to_string(),
    )
}
