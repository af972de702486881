//! Weather: current conditions and 3-hour forecast from OpenWeatherMap,
//! active alerts from the National Weather Service.

use super::http::with_query;
use super::{DataSource, FormatError, HttpClient, SourceError};
use crate::time::Clock;
use crate::topic::Topic;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use std::sync::Arc;

const CURRENT_URL: &str = "http://api.openweathermap.org/data/2.5/weather";
const FORECAST_URL: &str = "http://api.openweathermap.org/data/2.5/forecast";
const ALERTS_URL: &str = "https://api.weather.gov/alerts";

#[derive(Debug, Deserialize)]
struct Current {
    name: String,
    coord: Coord,
    main: Readings,
    wind: Wind,
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct Coord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct Readings {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Wind {
    deg: f64,
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct Alerts {
    features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
struct AlertFeature {
    properties: AlertProperties,
}

#[derive(Debug, Deserialize)]
struct AlertProperties {
    effective: Option<String>,
    ends: Option<String>,
    event: String,
}

/// Everything the weather line shows, already rounded the way it is printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// City name as reported by the provider.
    pub city: String,
    /// Event name of the active alert, if any.
    pub alert: Option<String>,
    /// Temperature in whole degrees Fahrenheit.
    pub temp_f: i64,
    /// Feels-like temperature in whole degrees Fahrenheit.
    pub feels_like_f: i64,
    /// Relative humidity in percent.
    pub humidity: i64,
    /// Wind direction in degrees.
    pub wind_deg: i64,
    /// Wind speed in whole mph.
    pub wind_mph: i64,
    /// Current conditions.
    pub description: String,
    /// Conditions three hours out.
    pub short_forecast: String,
}

impl Report {
    /// Temperature converted to whole degrees Celsius (truncated).
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn temp_c(&self) -> i64 {
        ((self.temp_f - 32) as f64 / 1.8) as i64
    }

    /// The ticker line for this report.
    pub fn format(&self) -> String {
        let alert = self
            .alert
            .as_ref()
            .map(|event| format!("! {event} ! "))
            .unwrap_or_default();
        format!(
            "* Weather *  {}: {}{}F / {}C (feels like {}F). {}% rel hum. winds {}@{}mph. {}. 3hr forecast: {}.",
            self.city,
            alert,
            self.temp_f,
            self.temp_c(),
            self.feels_like_f,
            self.humidity,
            wind_direction(self.wind_deg),
            self.wind_mph,
            self.description,
            self.short_forecast,
        )
    }
}

/// Bucket a wind bearing into an 8-point compass direction.
pub const fn wind_direction(deg: i64) -> &'static str {
    match deg {
        0..=23 | 339..=360 => "N",
        24..=68 => "NE",
        69..=113 => "E",
        114..=158 => "SE",
        159..=203 => "S",
        204..=248 => "SW",
        249..=293 => "W",
        _ => "NW",
    }
}

/// The alert window check for the most recently issued alert.
///
/// Active when `effective <= now < ends`, or `effective <= now` when the alert
/// has no end time. Alerts without an effective time never show.
fn active_alert(alerts: &Alerts, now: DateTime<Utc>) -> Result<Option<String>, FormatError> {
    let Some(latest) = alerts.features.last() else {
        return Ok(None);
    };
    let props = &latest.properties;

    let start = props.effective.as_deref().map(parse_timestamp).transpose()?;
    let end = props.ends.as_deref().map(parse_timestamp).transpose()?;

    let active = match (start, end) {
        (Some(start), Some(end)) => start <= now && now < end,
        (Some(start), None) => start <= now,
        (None, _) => false,
    };
    Ok(active.then(|| props.event.clone()))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, FormatError> {
    DateTime::<FixedOffset>::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| FormatError(format!("bad alert timestamp {raw:?}: {e}")))
}

fn first_description(conditions: &[Condition], what: &str) -> Result<String, FormatError> {
    conditions
        .first()
        .map(|c| c.description.clone())
        .ok_or_else(|| FormatError(format!("{what} has no conditions")))
}

/// Weather data source for one US zip code.
pub struct Weather {
    client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    zip: String,
    api_key: String,
}

impl Weather {
    /// Create a weather source.
    pub fn new(
        client: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
        zip: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            clock,
            zip: zip.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetch all three endpoints and assemble a report.
    #[allow(clippy::cast_possible_truncation)]
    pub fn report(&self) -> Result<Report, SourceError> {
        let zip = format!("{},us", self.zip);

        let url = with_query(
            CURRENT_URL,
            &[
                ("zip", zip.as_str()),
                ("units", "imperial"),
                ("appid", self.api_key.as_str()),
            ],
        )?;
        let current: Current = serde_json::from_value(self.client.get_json(&url)?)?;

        let url = with_query(
            FORECAST_URL,
            &[
                ("zip", zip.as_str()),
                ("units", "imperial"),
                ("cnt", "3"),
                ("appid", self.api_key.as_str()),
            ],
        )?;
        let forecast: Forecast = serde_json::from_value(self.client.get_json(&url)?)?;
        let short_forecast = forecast
            .list
            .get(2)
            .ok_or_else(|| FormatError("forecast has fewer than 3 entries".into()))
            .and_then(|entry| first_description(&entry.weather, "forecast"))?;

        let point = format!("{},{}", current.coord.lat, current.coord.lon);
        let url = with_query(ALERTS_URL, &[("active", "true"), ("point", point.as_str())])?;
        let alerts: Alerts = serde_json::from_value(self.client.get_json(&url)?)?;
        let alert = active_alert(&alerts, self.clock.now().with_timezone(&Utc))?;

        Ok(Report {
            description: first_description(&current.weather, "current conditions")?,
            city: current.name,
            alert,
            temp_f: current.main.temp as i64,
            feels_like_f: current.main.feels_like as i64,
            humidity: current.main.humidity as i64,
            wind_deg: current.wind.deg as i64,
            wind_mph: current.wind.speed as i64,
            short_forecast,
        })
    }
}

impl DataSource for Weather {
    fn topic(&self) -> Topic {
        Topic::Weather
    }

    fn fetch(&mut self) -> Result<String, SourceError> {
        self.report().map(|report| report.format())
    }
}
