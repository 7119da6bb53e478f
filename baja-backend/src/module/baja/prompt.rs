use chrono::NaiveDate;

use baja_common::NO_DATA;
use crate::config::LocationConfig;

/// The instruction sent on every fetch. Only the date and location vary.
pub fn build_prompt(location: &LocationConfig, today: NaiveDate) -> String {
    format!(
        r#"Fetch the current data for {town}, {country} for today ({date}):
  - Current temperature in Celsius
  - Current wind speed in km/h
  - Current {river} water level at {town} in cm (from {source} or similar)
  - Sunrise time (HH:mm)
  - Sunset time (HH:mm)
  - Moonrise time (HH:mm)
  - Moonset time (HH:mm)
  - Current moon phase in Hungarian (e.g., Telihold, Újhold, Első negyed, etc.)
  - Date of the next full moon (Következő telihold dátuma)

Return the data as a single strict JSON object with these exact keys:
temperature, windSpeed, waterLevel, sunrise, sunset, moonrise, moonset, moonPhase, nextFullMoon.
Ensure all values are strings. If a specific value is absolutely unavailable, use "{no_data}".
Respond with the JSON object only: no markdown, no code fences, no explanation.
Use your search tool to find the most recent and accurate values."#,
        town = location.town,
        country = location.country,
        date = today.format("%Y-%m-%d"),
        river = location.river,
        source = location.water_level_source,
        no_data = NO_DATA,
    )
}
