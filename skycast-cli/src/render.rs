use std::io::{self, Write};

use skycast_core::{Granularity, WeatherDataPoint, WeatherResponse};

/// Pick a glyph for a free-text condition, Chinese or English.
///
/// Checked in order, so "雷阵雨" (thunder shower) counts as rain.
pub fn condition_icon(condition: &str) -> &'static str {
    let c = condition.to_lowercase();
    let has = |keys: &[&str]| keys.iter().any(|k| c.contains(k));

    if has(&["雨", "rain"]) {
        "🌧"
    } else if has(&["雪", "snow"]) {
        "❄"
    } else if has(&["雷", "storm"]) {
        "⛈"
    } else if has(&["云", "阴", "cloud", "overcast"]) {
        "☁"
    } else if has(&["风", "wind"]) {
        "💨"
    } else {
        "☀"
    }
}

fn caption(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Week => "Forecast",
        Granularity::Month => "This month",
        Granularity::Year => "Yearly climate",
    }
}

pub fn render<W: Write>(
    out: &mut W,
    response: &WeatherResponse,
    granularity: Granularity,
) -> io::Result<()> {
    if response.has_alerts() {
        let alerts = response.alerts.as_deref().unwrap_or_default();
        let titles: Vec<&str> = alerts.iter().map(|a| a.title.as_str()).collect();
        writeln!(out, "⚠ Weather alerts: {}", titles.join(", "))?;
        for alert in alerts {
            writeln!(out, "  [{}] {}", alert.level, alert.description)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "{} · {}", response.location, caption(granularity))?;
    if !response.summary.is_empty() {
        writeln!(out, "{}", response.summary)?;
    }
    writeln!(out)?;

    for point in &response.data {
        writeln!(out, "{}", data_line(point))?;
    }

    if let Some(sources) = response.grounding_sources.as_ref().filter(|s| !s.is_empty()) {
        writeln!(out)?;
        writeln!(out, "Sources:")?;
        for source in sources {
            writeln!(out, "  - {}", source.display_text())?;
        }
    }

    Ok(())
}

fn data_line(point: &WeatherDataPoint) -> String {
    let precipitation = point
        .precipitation
        .map(|mm| format!("{mm:.1} mm"))
        .unwrap_or_else(|| "-".to_string());

    let mut line = format!(
        "  {:<8} {:<12} {} {:>5.1}° / {:>5.1}°  {:>9}  {}",
        point.label,
        point.date,
        condition_icon(&point.condition),
        point.temp_high,
        point.temp_low,
        precipitation,
        point.condition,
    );
    if let Some(tip) = point.description.as_deref().filter(|tip| !tip.is_empty()) {
        line.push_str(&format!("  ({tip})"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycast_core::{AlertLevel, GroundingSource, WeatherAlert};

    fn point(label: &str, condition: &str, precipitation: Option<f64>) -> WeatherDataPoint {
        WeatherDataPoint {
            date: "2024-10-28".into(),
            label: label.into(),
            temp_high: 21.0,
            temp_low: 12.5,
            precipitation,
            condition: condition.into(),
            humidity: None,
            description: None,
        }
    }

    fn rendered(response: &WeatherResponse) -> String {
        let mut out = Vec::new();
        render(&mut out, response, Granularity::Week).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn icons_follow_keyword_order() {
        assert_eq!(condition_icon("Light Rain"), "🌧");
        assert_eq!(condition_icon("雷阵雨"), "🌧");
        assert_eq!(condition_icon("暴雪"), "❄");
        assert_eq!(condition_icon("Thunderstorm"), "⛈");
        assert_eq!(condition_icon("多云"), "☁");
        assert_eq!(condition_icon("Overcast"), "☁");
        assert_eq!(condition_icon("大风"), "💨");
        assert_eq!(condition_icon("晴"), "☀");
        assert_eq!(condition_icon("Haze"), "☀");
    }

    #[test]
    fn renders_alerts_summary_points_and_sources() {
        let response = WeatherResponse {
            location: "Shenzhen".into(),
            summary: "Typhoon approaching.".into(),
            alerts: Some(vec![WeatherAlert {
                title: "Typhoon Warning".into(),
                level: AlertLevel::Red,
                description: "Stay indoors".into(),
            }]),
            data: vec![point("Mon", "Heavy Rain", Some(48.0)), point("Tue", "Cloudy", None)],
            grounding_sources: Some(vec![
                GroundingSource { uri: "https://a.example".into(), title: Some("Observatory".into()) },
                GroundingSource { uri: "https://b.example".into(), title: None },
            ]),
        };

        let text = rendered(&response);

        assert!(text.contains("⚠ Weather alerts: Typhoon Warning"));
        assert!(text.contains("[Red] Stay indoors"));
        assert!(text.contains("Shenzhen · Forecast"));
        assert!(text.contains("Typhoon approaching."));
        assert!(text.contains("48.0 mm"));
        assert!(text.contains(" 21.0° /  12.5°"));
        assert!(text.contains("  - Observatory"));
        assert!(text.contains("  - https://b.example"));

        let tuesday = text.lines().find(|l| l.contains("Tue")).unwrap();
        assert!(tuesday.contains(" - "));
    }

    #[test]
    fn quiet_response_has_no_banner_or_sources() {
        let response = WeatherResponse {
            location: "Lhasa".into(),
            summary: String::new(),
            alerts: Some(Vec::new()),
            data: vec![point("Jan", "Sunny", Some(0.0))],
            grounding_sources: None,
        };

        let text = rendered(&response);

        assert!(!text.contains("Weather alerts"));
        assert!(!text.contains("Sources:"));
        assert!(text.contains("0.0 mm"));
    }
}
