//! Anomaly scoring - baseline statistics and the three-threshold rule.
//!
//! The target day's cost is compared against a trailing baseline that
//! excludes the two most recent days, so a spike spanning two days cannot
//! contaminate its own baseline.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::query::series::DailySeries;

/// Upper bound of the severity score.
const SCORE_CEILING: f64 = 100.0;

/// Parameters for one scoring pass.
#[derive(Debug, Clone, Copy)]
pub struct ScoreParams {
    /// The day under test.
    pub target: NaiveDate,
    /// Trailing window length in days.
    pub lookback_days: u32,
    /// Standard-deviation multiplier the target day must clear.
    pub threshold_std: f64,
    /// Multiple of the baseline mean the target day must exceed.
    pub threshold_relative: f64,
    /// Absolute cost floor.
    pub threshold_absolute: f64,
}

/// One scored day for one query. Created once, immutable, handed to the
/// result sinks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyResult {
    pub day: NaiveDate,
    pub query: String,
    /// Severity in [0, 100]. Never signals "unusually cheap": negative
    /// deviations floor at 0.
    pub score: f64,
    pub is_anomaly: bool,
    pub cost: f64,
    pub mean: f64,
    pub std: f64,
}

impl AnomalyResult {
    /// Flat line-per-field rendering for the archive sink.
    pub fn archive_lines(&self) -> String {
        format!(
            "day={}\nquery={}\nscore={}\nis_anomaly={}\ncost={}\nmean={}\nstd={}\n",
            self.day, self.query, self.score, self.is_anomaly, self.cost, self.mean, self.std
        )
    }
}

/// Baseline statistics over the trailing window population.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Baseline {
    mean: f64,
    std: f64,
}

impl Baseline {
    /// Arithmetic mean and sample standard deviation (n−1 divisor). An empty
    /// population has both at zero; a single observation has zero spread.
    fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                std: 0.0,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() < 2 {
            0.0
        } else {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        };
        Self { mean, std }
    }
}

/// The three-condition anomaly rule. ALL must hold: the cost clears the
/// statistical band, the relative band, and the absolute floor.
pub fn exceeds_thresholds(cost: f64, mean: f64, std: f64, params: &ScoreParams) -> bool {
    cost >= mean + params.threshold_std * std
        && cost > params.threshold_relative * mean
        && cost >= params.threshold_absolute
}

/// Score the target day of a series against its trailing baseline.
///
/// Interior gap days are interpolated before any statistics; the window is
/// the closed range [target − (lookback+1), target]; the baseline excludes
/// the target day and the day before it. Returns None when cost, mean and
/// std are all zero - "no activity" is not an anomaly. The caller is
/// responsible for having checked that the target day is present.
pub fn score_series(
    query: &str,
    series: &DailySeries,
    params: &ScoreParams,
) -> Option<AnomalyResult> {
    let mut series = series.clone();
    series.interpolate_gaps();

    let start = params.target - Duration::days(i64::from(params.lookback_days) + 1);
    let window = series.window(start, params.target);

    let cost = window.get(params.target).unwrap_or(0.0);
    let baseline_values =
        window.values_excluding(&[params.target, params.target - Duration::days(1)]);
    let Baseline { mean, std } = Baseline::compute(&baseline_values);

    if mean == 0.0 && std == 0.0 && cost == 0.0 {
        return None;
    }

    let score = if std > 0.0 {
        ((cost - mean) / std).clamp(0.0, SCORE_CEILING)
    } else {
        0.0
    };

    Some(AnomalyResult {
        day: params.target,
        query: query.to_string(),
        score,
        is_anomaly: exceeds_thresholds(cost, mean, std, params),
        cost,
        mean,
        std,
    })
}
