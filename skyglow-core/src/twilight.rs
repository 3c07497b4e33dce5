use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::TwilightWindows;

const BLUE_HOUR_MINUTES: i64 = 30;
const GOLDEN_HOUR_MINUTES: i64 = 60;

/// Derive golden and blue hour windows from a sunrise/sunset pair.
///
/// Pure arithmetic: the pair is not checked for order, so a sunset before
/// sunrise yields overlapping or inverted windows.
pub fn twilight_windows(
    sunrise: DateTime<FixedOffset>,
    sunset: DateTime<FixedOffset>,
) -> TwilightWindows {
    let blue = Duration::minutes(BLUE_HOUR_MINUTES);
    let golden = Duration::minutes(GOLDEN_HOUR_MINUTES);

    TwilightWindows {
        blue_hour_morning_start: sunrise - blue,
        blue_hour_morning_end: sunrise,
        golden_hour_morning_start: sunrise,
        golden_hour_morning_end: sunrise + golden,
        golden_hour_evening_start: sunset - golden,
        golden_hour_evening_end: sunset,
        blue_hour_evening_start: sunset,
        blue_hour_evening_end: sunset + blue,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightPhase {
    MorningBlueHour,
    MorningGoldenHour,
    EveningGoldenHour,
    EveningBlueHour,
}

impl std::fmt::Display for LightPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LightPhase::MorningBlueHour => "morning blue hour",
            LightPhase::MorningGoldenHour => "morning golden hour",
            LightPhase::EveningGoldenHour => "evening golden hour",
            LightPhase::EveningBlueHour => "evening blue hour",
        };
        f.write_str(s)
    }
}

impl TwilightWindows {
    /// Which window contains `instant`, if any. Windows are half-open
    /// `[start, end)`; the first match in chronological order wins.
    pub fn phase_at<Tz: chrono::TimeZone>(&self, instant: &DateTime<Tz>) -> Option<LightPhase> {
        let at = instant.fixed_offset();
        let windows = [
            (self.blue_hour_morning_start, self.blue_hour_morning_end, LightPhase::MorningBlueHour),
            (
                self.golden_hour_morning_start,
                self.golden_hour_morning_end,
                LightPhase::MorningGoldenHour,
            ),
            (
                self.golden_hour_evening_start,
                self.golden_hour_evening_end,
                LightPhase::EveningGoldenHour,
            ),
            (self.blue_hour_evening_start, self.blue_hour_evening_end, LightPhase::EveningBlueHour),
        ];

        windows.into_iter().find(|(start, end, _)| *start <= at && at < *end).map(|(_, _, p)| p)
    }
}
