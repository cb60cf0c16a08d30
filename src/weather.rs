//! The weather collaborator: a 5-day/3-hour forecast fetched from OpenWeather
//! and folded into one summary per calendar day, keyed by a `MM/DD` string.
//!
//! api doc here:
//! <https://openweathermap.org/forecast5>

use std::collections::HashMap;
use std::error::Error;

use serde_json::Value;

use crate::config;
use crate::utils;

/// Key format of the per-day map handed to the calendar view
pub const WEATHER_DATE_FORMAT: &str = "%m/%d";

/// Broad weather category, resolved from the provider's condition codes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WeatherKind {
    Clear,
    Clouds,
    Drizzle,
    Rain,
    Thunderstorm,
    Snow,
    Atmosphere,
    Unknown,
}

impl WeatherKind {
    pub fn from_code(code: u32) -> Self {
        match code {
            200..=299 => WeatherKind::Thunderstorm,
            300..=399 => WeatherKind::Drizzle,
            500..=599 => WeatherKind::Rain,
            600..=699 => WeatherKind::Snow,
            700..=799 => WeatherKind::Atmosphere,
            800 => WeatherKind::Clear,
            801..=804 => WeatherKind::Clouds,
            _ => WeatherKind::Unknown,
        }
    }

    /// The Material Design icon name for this category
    pub fn icon(&self) -> &'static str {
        match self {
            WeatherKind::Clear => "mdi-weather-sunny",
            WeatherKind::Clouds => "mdi-weather-cloudy",
            WeatherKind::Drizzle => "mdi-weather-rainy",
            WeatherKind::Rain => "mdi-weather-pouring",
            WeatherKind::Thunderstorm => "mdi-weather-lightning",
            WeatherKind::Snow => "mdi-weather-snowy",
            WeatherKind::Atmosphere => "mdi-weather-fog",
            WeatherKind::Unknown => "mdi-weather-cloudy-clock",
        }
    }
}

/// One calendar day of forecast, aggregated over the provider's 3-hour slots
#[derive(Clone, Debug, PartialEq)]
pub struct DailySummary {
    /// Full weekday name
    pub dow: String,
    /// The middle slot's condition, as a rough description of the day
    pub desc: String,
    /// Average temperature, rounded
    pub temp: i64,
    pub low: i64,
    pub high: i64,
    /// Average chance of precipitation, in percent
    pub precip: i64,
    /// Every slot's rounded temperature, in order
    pub temp_list: Vec<i64>,
}

/// The parsed forecast: general info plus one summary per day
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Forecast {
    pub city: Option<String>,
    pub days: HashMap<String, DailySummary>,
}

fn request_url(units: &str, lat: f64, lon: f64) -> String {
    let unit_param = if units == "F" { "imperial" } else { "metric" };
    let api_key = config::WEATHER_API_KEY.lock().unwrap().clone();
    format!(
        "https://api.openweathermap.org/data/2.5/forecast?lat={}&lon={}&appid={}&units={}",
        lat, lon, api_key, unit_param
    )
}

/// Fetch and aggregate the forecast. `coords` falls back to
/// [`config::DEFAULT_COORDS`] when the caller has no position
pub async fn load_weather_data(units: &str, coords: Option<(f64, f64)>) -> Result<Forecast, Box<dyn Error>> {
    let (lat, lon) = coords.unwrap_or_else(|| *config::DEFAULT_COORDS.lock().unwrap());
    let url = request_url(units, lat, lon);
    let json: Value = reqwest::get(&url).await?.json().await?;
    Ok(parse_by_day(&json))
}

#[derive(Default)]
struct DayAccumulator {
    dow: String,
    descs: Vec<String>,
    temps: Vec<f64>,
    precip_sum: f64,
}

impl DayAccumulator {
    fn finalize(self) -> DailySummary {
        let reads = self.temps.len().max(1) as f64;
        let low = self.temps.iter().cloned().fold(f64::INFINITY, f64::min);
        let high = self.temps.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        DailySummary {
            dow: self.dow,
            desc: self.descs.get(self.descs.len() / 2).cloned().unwrap_or_default(),
            temp: (self.temps.iter().sum::<f64>() / reads).round() as i64,
            low: if low.is_finite() { low.round() as i64 } else { 0 },
            high: if high.is_finite() { high.round() as i64 } else { 0 },
            precip: (self.precip_sum / reads * 100.0).round() as i64,
            temp_list: self.temps.iter().map(|t| t.round() as i64).collect(),
        }
    }
}

/// Fold the provider's slot list into per-day summaries: averaged temperature
/// and precipitation, min/max bounds, and the middle slot's description
pub fn parse_by_day(json: &Value) -> Forecast {
    let mut forecast = Forecast::default();
    forecast.city = json["city"]["name"].as_str().map(|c| c.to_string());

    let slots = match json["list"].as_array() {
        Some(slots) => slots,
        None => return forecast,
    };

    let mut accumulators: Vec<(String, DayAccumulator)> = Vec::new();
    for slot in slots {
        let raw_date = match slot["dt"].as_i64().and_then(utils::from_epoch) {
            Some(date) => date,
            None => {
                log::warn!("forecast slot with a missing or invalid timestamp, skipping it");
                continue;
            }
        };
        let temp = match slot["main"]["temp"].as_f64() {
            Some(temp) => temp,
            None => {
                log::warn!("forecast slot with no temperature, skipping it");
                continue;
            }
        };
        let date_key = raw_date.format(WEATHER_DATE_FORMAT).to_string();

        let index = match accumulators.iter().position(|(key, _)| key == &date_key) {
            Some(index) => index,
            None => {
                accumulators.push((date_key, DayAccumulator::default()));
                accumulators.len() - 1
            }
        };
        let accumulator = &mut accumulators[index].1;
        if accumulator.dow.is_empty() {
            accumulator.dow = raw_date.format("%A").to_string();
        }
        if let Some(desc) = slot["weather"][0]["main"].as_str() {
            accumulator.descs.push(desc.to_string());
        }
        accumulator.temps.push(temp);
        accumulator.precip_sum += slot["pop"].as_f64().unwrap_or(0.0);
    }

    for (key, accumulator) in accumulators {
        forecast.days.insert(key, accumulator.finalize());
    }
    forecast
}
