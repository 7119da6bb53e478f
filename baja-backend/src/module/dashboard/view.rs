use regex::Regex;
use std::sync::LazyLock;

use baja_common::{Card, DashboardView, PLACEHOLDER, Readings, ViewStatus};
use super::controller::DashboardState;

static NUMERIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d+(?:\.\d+)?").expect("numeric token pattern"));

/// How a card turns its raw reading into a display value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CardKind {
    /// Show only the leading number, e.g. "23.5°C approx" → "23.5"
    Numeric,
    /// Show the string as-is
    Text,
}

struct CardSpec {
    field: &'static str,
    title: &'static str,
    unit: Option<&'static str>,
    kind: CardKind,
}

const ENVIRONMENT_CARDS: [CardSpec; 3] = [
    CardSpec { field: "temperature", title: "Hőmérséklet", unit: Some("°C"), kind: CardKind::Numeric },
    CardSpec { field: "windSpeed", title: "Szélerősség", unit: Some("km/h"), kind: CardKind::Numeric },
    CardSpec { field: "waterLevel", title: "Dunai Vízállás", unit: Some("cm"), kind: CardKind::Numeric },
];

const ASTRONOMY_CARDS: [CardSpec; 6] = [
    CardSpec { field: "sunrise", title: "Napkelte", unit: None, kind: CardKind::Text },
    CardSpec { field: "sunset", title: "Napnyugta", unit: None, kind: CardKind::Text },
    CardSpec { field: "moonrise", title: "Holdkelte", unit: None, kind: CardKind::Text },
    CardSpec { field: "moonset", title: "Holdnyugta", unit: None, kind: CardKind::Text },
    CardSpec { field: "moonPhase", title: "Holdfázis", unit: None, kind: CardKind::Text },
    CardSpec { field: "nextFullMoon", title: "Következő Telihold", unit: None, kind: CardKind::Text },
];

/// First signed decimal number in `raw`, if any.
pub fn extract_numeric_token(raw: &str) -> Option<&str> {
    NUMERIC_TOKEN.find(raw).map(|m| m.as_str())
}

/// Raw value, or the placeholder when missing or blank.
pub fn display_text(raw: Option<&str>) -> String {
    match raw {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Leading number of the raw value; the raw value when it has none; the
/// placeholder when missing or blank.
pub fn display_numeric(raw: Option<&str>) -> String {
    match raw {
        Some(value) if !value.trim().is_empty() => extract_numeric_token(value)
            .unwrap_or(value)
            .to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

fn build_cards(specs: &[CardSpec], readings: Option<&Readings>) -> Vec<Card> {
    specs
        .iter()
        .map(|spec| {
            let raw = readings.and_then(|r| r.get(spec.field));
            let value = match spec.kind {
                CardKind::Numeric => display_numeric(raw),
                CardKind::Text => display_text(raw),
            };
            let unit = spec
                .unit
                .filter(|_| value != PLACEHOLDER)
                .map(str::to_string);
            Card {
                field: spec.field.to_string(),
                title: spec.title.to_string(),
                value,
                unit,
            }
        })
        .collect()
}

/// Derive what the page shows from the controller state.
pub fn build_view(state: &DashboardState, refreshing: bool) -> DashboardView {
    match state {
        DashboardState::Loading => DashboardView {
            status: ViewStatus::Loading,
            refreshing,
            error: None,
            last_updated: None,
            environment: Vec::new(),
            astronomy: Vec::new(),
        },
        DashboardState::Ready(snapshot) => DashboardView {
            status: ViewStatus::Ready,
            refreshing,
            error: None,
            last_updated: Some(snapshot.last_updated.clone()),
            environment: build_cards(&ENVIRONMENT_CARDS, Some(&snapshot.readings)),
            astronomy: build_cards(&ASTRONOMY_CARDS, Some(&snapshot.readings)),
        },
        DashboardState::Failed(message) => DashboardView {
            status: ViewStatus::Failed,
            refreshing,
            error: Some(message.clone()),
            last_updated: None,
            environment: Vec::new(),
            astronomy: Vec::new(),
        },
    }
}
