use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bar granularity a signal was computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Timeframe {
    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }
}

/// Latched direction of the inertia tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InertiaDirection {
    Up,
    Down,
    #[default]
    Neutral,
}

/// Result of an inertia scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InertiaSignal {
    pub timeframe: Timeframe,
    pub direction: InertiaDirection,
    /// Length of the current unbroken run of same-direction transitions.
    pub run_count: usize,
    /// Dates of every transition in the current run, ascending.
    pub trigger_dates: Vec<NaiveDate>,
}

impl InertiaSignal {
    /// The no-signal default.
    pub fn neutral(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            direction: InertiaDirection::Neutral,
            run_count: 0,
            trigger_dates: Vec::new(),
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.direction == InertiaDirection::Neutral
    }
}

/// Inertia on daily bars and on weekly/monthly resamples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiTimeframeInertia {
    pub daily: InertiaSignal,
    /// `None` when fewer than two weekly bars could be built.
    pub weekly: Option<InertiaSignal>,
    pub monthly: Option<InertiaSignal>,
}

/// Latched state of the 3-bar channel breakout tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BreakoutDirection {
    AboveHigh,
    BelowLow,
    #[default]
    Neutral,
}

/// Whether a zone is expected to hold price from below or from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Support,
    Resistance,
}

/// Price band of the reference bar behind the latest breakout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceZone {
    pub kind: ZoneKind,
    pub low: f64,
    pub high: f64,
    /// Date of the reference bar the band was taken from.
    pub date: NaiveDate,
}

/// Result of a breakout scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakoutSignal {
    pub timeframe: Timeframe,
    pub direction: BreakoutDirection,
    pub run_count: usize,
    pub trigger_dates: Vec<NaiveDate>,
    pub zone: Option<PriceZone>,
}

impl BreakoutSignal {
    /// The no-signal default.
    pub fn neutral(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            direction: BreakoutDirection::Neutral,
            run_count: 0,
            trigger_dates: Vec::new(),
            zone: None,
        }
    }
}

/// Side of a moving-average cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossKind {
    /// MA20 crossing above MA60.
    Golden,
    /// MA20 crossing below MA60.
    Death,
}

/// Phase of the MA20/MA60 cross state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CrossPhase {
    #[default]
    Neutral,
    GoldenObserving,
    GoldenConfirmed,
    DeathObserving,
    DeathConfirmed,
}

/// A cross that survived its observation period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedCross {
    pub kind: CrossKind,
    /// Bar on which MA20 first crossed MA60.
    pub date: NaiveDate,
    /// Highest high (golden) or lowest low (death) around the cross date.
    pub key_price: f64,
    pub band_low: f64,
    pub band_high: f64,
}

/// Next-bar close that would make tomorrow's MA20 equal tomorrow's MA60.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPrice {
    pub kind: CrossKind,
    pub price: f64,
}

/// Result of an MA cross scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossSignal {
    pub phase: CrossPhase,
    /// Observation day (1..=2) while observing, otherwise 0.
    pub observation_count: u8,
    /// Most recent confirmed cross in the window, if any.
    pub confirmed: Option<ConfirmedCross>,
    pub trigger: Option<TriggerPrice>,
}

impl Default for CrossSignal {
    fn default() -> Self {
        Self {
            phase: CrossPhase::Neutral,
            observation_count: 0,
            confirmed: None,
            trigger: None,
        }
    }
}

/// All technical signals for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSnapshot {
    pub last_date: NaiveDate,
    pub last_close: f64,
    /// `None` when the series was too short for indicators.
    pub ma20: Option<f64>,
    pub inertia: MultiTimeframeInertia,
    pub breakout: BreakoutSignal,
    pub cross: CrossSignal,
}
