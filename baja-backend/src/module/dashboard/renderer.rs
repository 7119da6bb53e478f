///! Dashboard page renderer
///!
///! Fills the HTML template from a `DashboardView`. Card values come from the
///! backend verbatim, so everything is escaped.

use chrono::{DateTime, Datelike, Local};

use baja_common::{Card, DashboardView, ViewStatus};
use crate::config::LocationConfig;

const PAGE_TEMPLATE: &str = include_str!("../../../resources/dashboard_template.html");

pub struct DashboardRenderer {
    town: String,
    region: String,
    /// Browser reload period, so an open page follows background refreshes
    auto_reload_secs: u64,
}

impl DashboardRenderer {
    const SKELETON_CARDS: usize = 8;

    pub fn new(location: &LocationConfig, auto_reload_secs: u64) -> Self {
        Self {
            town: location.town.clone(),
            region: location.region.clone(),
            auto_reload_secs,
        }
    }

    pub fn render(&self, view: &DashboardView, now: DateTime<Local>) -> String {
        let freshness = match &view.last_updated {
            Some(t) => format!("Utolsó frissítés: {}", t),
            None => "Frissítés...".to_string(),
        };
        let dot_class = if view.refreshing { "dot busy" } else { "dot" };
        let disabled = if view.refreshing { "disabled" } else { "" };

        PAGE_TEMPLATE
            .replace("{{AUTO_RELOAD_SECS}}", &self.auto_reload_secs.to_string())
            .replace("{{TOWN}}", &Self::escape_html(&self.town))
            .replace("{{REGION}}", &Self::escape_html(&self.region))
            .replace("{{TODAY}}", &now.format("%Y. %m. %d.").to_string())
            .replace("{{YEAR}}", &now.year().to_string())
            .replace("{{DOT_CLASS}}", dot_class)
            .replace("{{FRESHNESS}}", &Self::escape_html(&freshness))
            .replace("{{REFRESH_DISABLED}}", disabled)
            .replace("{{CONTENT}}", &Self::build_content(view))
    }

    fn build_content(view: &DashboardView) -> String {
        match view.status {
            ViewStatus::Loading => {
                let mut out = String::from(r#"<div class="grid">"#);
                for _ in 0..Self::SKELETON_CARDS {
                    out.push_str(r#"<div class="skeleton"></div>"#);
                }
                out.push_str("</div>");
                out
            }
            ViewStatus::Failed => format!(
                r#"<form class="error" method="post" action="/refresh"><p>{}</p><button type="submit">Újrapróbálkozás</button></form>"#,
                Self::escape_html(view.error.as_deref().unwrap_or_default())
            ),
            ViewStatus::Ready => {
                let mut out = String::new();
                out.push_str(&Self::build_section("Környezeti Adatok", &view.environment));
                out.push_str(&Self::build_section("Csillagászati Adatok", &view.astronomy));
                out
            }
        }
    }

    fn build_section(title: &str, cards: &[Card]) -> String {
        let mut out = format!(
            r#"<section><h2>{}</h2><div class="grid">"#,
            Self::escape_html(title)
        );
        for card in cards {
            let unit = card
                .unit
                .as_deref()
                .map(|u| format!(r#"<span class="unit">{}</span>"#, Self::escape_html(u)))
                .unwrap_or_default();
            out.push_str(&format!(
                r#"<div class="card" data-field="{field}"><h3>{title}</h3><span class="value">{value}</span>{unit}</div>"#,
                field = Self::escape_html(&card.field),
                title = Self::escape_html(&card.title),
                value = Self::escape_html(&card.value),
                unit = unit,
            ));
        }
        out.push_str("</div></section>");
        out
    }

    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }
}
