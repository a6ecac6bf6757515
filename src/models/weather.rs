//! Per-day weather model used to annotate itinerary days

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Coarse sky condition
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Fog,
    Rain,
    Snow,
    Storm,
}

impl WeatherCondition {
    /// Map a WMO weather interpretation code to a condition
    #[must_use]
    pub fn from_wmo_code(code: u8) -> Self {
        match code {
            0 | 1 => Self::Clear,
            2 | 3 => Self::Clouds,
            45 | 48 => Self::Fog,
            51..=67 | 80..=82 => Self::Rain,
            71..=77 | 85 | 86 => Self::Snow,
            95..=99 => Self::Storm,
            _ => Self::Clouds,
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "clear sky",
            Self::Clouds => "partly cloudy",
            Self::Fog => "fog",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Storm => "thunderstorm",
        }
    }
}

/// Kind of activity a day's weather is judged against
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Outdoor,
    Beach,
    Hiking,
    Indoor,
}

/// Weather summary for one trip day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayWeather {
    pub date: NaiveDate,
    /// Temperature in Celsius
    pub temperature: f32,
    pub condition: WeatherCondition,
    /// Human-readable description of weather conditions
    pub description: String,
    /// False when the value is a placeholder because no forecast was available
    pub forecast: bool,
}

impl DayWeather {
    #[must_use]
    pub fn is_good_for(&self, activity: ActivityType) -> bool {
        use WeatherCondition::{Clear, Rain, Snow, Storm};

        let t = self.temperature;
        match activity {
            ActivityType::Outdoor => !matches!(self.condition, Rain | Storm | Snow) && t > 5.0,
            ActivityType::Beach => self.condition == Clear && t > 20.0,
            ActivityType::Hiking => !matches!(self.condition, Rain | Storm) && t > 10.0 && t < 30.0,
            ActivityType::Indoor => true,
        }
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn weather(condition: WeatherCondition, temperature: f32) -> DayWeather {
        DayWeather {
            date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            temperature,
            condition,
            description: condition.description().to_string(),
            forecast: true,
        }
    }

    #[rstest]
    #[case(WeatherCondition::Clouds, 20.0, ActivityType::Outdoor, true)]
    #[case(WeatherCondition::Rain, 20.0, ActivityType::Outdoor, false)]
    #[case(WeatherCondition::Clear, 4.0, ActivityType::Outdoor, false)]
    #[case(WeatherCondition::Clear, 25.0, ActivityType::Beach, true)]
    #[case(WeatherCondition::Clouds, 25.0, ActivityType::Beach, false)]
    #[case(WeatherCondition::Snow, 15.0, ActivityType::Hiking, true)]
    #[case(WeatherCondition::Clear, 31.0, ActivityType::Hiking, false)]
    #[case(WeatherCondition::Storm, -5.0, ActivityType::Indoor, true)]
    fn test_activity_suitability(
        #[case] condition: WeatherCondition,
        #[case] temperature: f32,
        #[case] activity: ActivityType,
        #[case] expected: bool,
    ) {
        assert_eq!(weather(condition, temperature).is_good_for(activity), expected);
    }

    #[rstest]
    #[case(0, WeatherCondition::Clear)]
    #[case(3, WeatherCondition::Clouds)]
    #[case(61, WeatherCondition::Rain)]
    #[case(73, WeatherCondition::Snow)]
    #[case(96, WeatherCondition::Storm)]
    fn test_wmo_mapping(#[case] code: u8, #[case] expected: WeatherCondition) {
        assert_eq!(WeatherCondition::from_wmo_code(code), expected);
    }
}
