//! Template substitution over the full token vocabulary.

use chrono::NaiveDateTime;

use renderer::{load_template, render, DisplayData, RenderContext, RoomView};
use test_utils::TEMPLATE_SVG;
use weather_common::forecast::truncate_summary;
use weather_common::{
    AirQualityIndex, AirQualitySnapshot, DailyForecast, ForecastBundle, HourlyForecast,
    IndoorConditions, Moon, OutdoorConditions, WindOctant,
};

// ============================================================================
// Helper functions
// ============================================================================

fn render_time() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-05-28 10:05:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

fn forecast() -> ForecastBundle {
    ForecastBundle {
        summary: truncate_summary("Clear and cold for the rest of the day.", 20),
        icon: "clear-day".into(),
        sunrise: Some("05:42".into()),
        sunset: Some("21:35".into()),
        moon: Some(Moon::from_fraction(0.69)),
        daily: (0..3)
            .map(|k| DailyForecast {
                date: format!("{:02}.05.", 28 + k),
                weekday: ["Tue", "Wed", "Thu"][k].into(),
                icon: "partly-cloudy-day".into(),
                temp_low: 8.0 + k as f64,
                temp_high: 18.0 + k as f64,
                wind_gust: 20.0,
                rain_probability: 50.0,
                rain_intensity: 0.5,
            })
            .collect(),
        hourly: (0..24)
            .map(|h| HourlyForecast {
                hour_label: format!("{:02}", (10 + h) % 24),
                icon: "cloudy".into(),
                temperature: 12.0 + h as f64,
                rain_probability: if h == 0 { 50.0 } else { 10.0 },
                wind_gust: 10.0,
            })
            .collect(),
    }
}

fn outdoor() -> OutdoorConditions {
    OutdoorConditions {
        temperature: Some(17.34),
        temperature_min: Some(9.8),
        temperature_max: Some(21.4),
        humidity: Some(64.0),
        humidity_min: Some(52.0),
        humidity_max: Some(88.0),
        rain_24h: Some(3.0),
        wind_direction: Some(WindOctant::SW),
        wind_speed: Some(12.7),
        wind_speed_max: Some(31.6),
    }
}

fn air() -> AirQualitySnapshot {
    AirQualitySnapshot {
        pm10: Some(29.0),
        o3: Some(52.0),
        no2: Some(9.0),
        index: AirQualityIndex::Good,
    }
}

fn living_room() -> RoomView {
    RoomView::new(
        "Innen ({room})",
        "Wohnzimmer",
        IndoorConditions {
            temperature: Some(21.6),
            temperature_min: Some(20.9),
            temperature_max: Some(22.3),
            ..Default::default()
        }
        .with_humidity_override(Some(0.0)),
    )
}

fn full_context() -> RenderContext {
    let forecast = forecast();
    let outdoor = outdoor();
    let air = air();
    DisplayData {
        now: render_time(),
        location: "Jülich",
        forecast: Some(&forecast),
        outdoor: &outdoor,
        air_quality: Some(&air),
        no_data: "--",
    }
    .context(&living_room())
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_full_template_has_no_tokens_left() {
    let output = render(TEMPLATE_SVG, &full_context());
    assert!(!output.contains('$'), "unreplaced token in:\n{}", output);
}

#[test]
fn test_rendering_is_idempotent() {
    let ctx = full_context();
    let once = render(TEMPLATE_SVG, &ctx);
    let twice = render(&once, &ctx);
    assert_eq!(once, twice);
}

#[test]
fn test_summary_and_icon() {
    let output = render("<t>$TEXT</t><i>$I0</i>", &full_context());
    assert_eq!(output, "<t>Clear and cold for t...</t><i>clear-day</i>");
}

#[test]
fn test_rendered_values() {
    let output = render(TEMPLATE_SVG, &full_context());

    assert!(output.contains("Jülich 2024-05-28 10:05"));
    assert!(output.contains("17° 9.8° 21.4° 64 52 88"));
    assert!(output.contains("SW 13 32 3.0"));
    assert!(output.contains("Innen (Wohnzimmer) 21.6° 20.9° 22.3° 0 0 0"));
    assert!(output.contains("Tue. partly-cloudy-day 8° 18° 20 50 0.5"));
    assert!(output.contains("10 cloudy 12° 50% 09 35°"));
    assert!(output.contains("05:42 21:35 69 moon-waning-50"));
    assert!(output.contains("good 29 52 9 00 000"));
}

#[test]
fn test_each_token_replaced_exactly_once() {
    let mut ctx = RenderContext::new();
    ctx.insert("CT", "$CT");
    ctx.insert("BT", "21.6°");

    // The substituted `$CT` must not be expanded again
    assert_eq!(render("$CT|$BT|$BT", &ctx), "$CT|21.6°|21.6°");
}

#[test]
fn test_unknown_tokens_stay_literal() {
    let output = render("<t>$XYZ $ROOM2 $BT</t>", &full_context());
    assert_eq!(output, "<t>$XYZ $ROOM2 21.6°</t>");
}

#[test]
fn test_missing_forecast_uses_marker() {
    let outdoor = OutdoorConditions::default();
    let ctx = DisplayData {
        now: render_time(),
        location: "Jülich",
        forecast: None,
        outdoor: &outdoor,
        air_quality: None,
        no_data: "--",
    }
    .context(&living_room());

    let output = render("$TEXT|$D1|$T24|$R01|$CT|$IDX", &ctx);
    assert_eq!(output, "--|--|--|--|--|--");
}

#[test]
fn test_shipped_templates_are_fully_substituted() {
    let ctx = full_context();

    for name in ["kindle_pw2.svg", "kindle_touch.svg"] {
        let path = test_utils::templates_dir().join(name);
        let template = load_template(&path).unwrap();
        let output = render(&template, &ctx);
        assert!(!output.contains('$'), "unreplaced token in {}", name);
    }
}
