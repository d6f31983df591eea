//! Token vocabulary of the display templates.
//!
//! | Group    | Tokens |
//! |----------|--------|
//! | current  | `$TEXT` `$I0` `$TIME` `$LOC` |
//! | outdoor  | `$CT` `$CHH` `$CHL` `$CL` `$CAH` `$CAL` `$CW` `$CD` `$CHW` `$CR` |
//! | sky      | `$sunrise` `$sunset` `$MO` `$MI` |
//! | air      | `$IDX` `$PM` `$O3` `$NO` `$SO` `$AQ` `$QL` `$QH` |
//! | daily    | `$D1..3` `$I1..3` `$L1..3` `$H1..3` `$W1..3` `$P1..3` `$M1..3` |
//! | hourly   | `$K01..24` `$J01..24` `$T01..24` `$R01..24` |
//! | room     | `$ROOM1` `$BT` `$BSL` `$BSH` `$BH` `$BBH` `$BBL` |
//!
//! Values that are unavailable render as the configured no-data marker.

use chrono::NaiveDateTime;

use weather_common::forecast::{DAILY_ENTRIES, HOURLY_ENTRIES};
use weather_common::format::{degrees, degrees_tenths, fixed, integer, two_digits};
use weather_common::{AirQualitySnapshot, ForecastBundle, IndoorConditions, OutdoorConditions};

use crate::context::RenderContext;

/// Placeholder in the room label format replaced by the room name.
pub const ROOM_PLACEHOLDER: &str = "{room}";

/// Everything shared between the rooms of one cycle.
#[derive(Debug, Clone, Copy)]
pub struct DisplayData<'a> {
    /// Local render time
    pub now: NaiveDateTime,
    pub location: &'a str,
    pub forecast: Option<&'a ForecastBundle>,
    pub outdoor: &'a OutdoorConditions,
    pub air_quality: Option<&'a AirQualitySnapshot>,
    pub no_data: &'a str,
}

/// One room's header and indoor values.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomView {
    pub label: String,
    pub conditions: IndoorConditions,
}

impl RoomView {
    /// Build a view, expanding `{room}` in `label_format` with `name`.
    pub fn new(label_format: &str, name: &str, conditions: IndoorConditions) -> Self {
        Self {
            label: label_format.replace(ROOM_PLACEHOLDER, name),
            conditions,
        }
    }
}

/// Inserts values, falling back to the no-data marker.
struct Filler<'a> {
    ctx: RenderContext,
    no_data: &'a str,
}

impl Filler<'_> {
    fn text(&mut self, token: impl Into<String>, value: Option<&str>) {
        let value = value.unwrap_or(self.no_data);
        self.ctx.insert(token, value);
    }

    fn number(&mut self, token: impl Into<String>, value: Option<f64>, format: impl Fn(f64) -> String) {
        match value {
            Some(v) => self.ctx.insert(token, format(v)),
            None => self.ctx.insert(token, self.no_data),
        }
    }
}

impl DisplayData<'_> {
    /// Full token map for one room.
    pub fn context(&self, room: &RoomView) -> RenderContext {
        let mut f = Filler {
            ctx: RenderContext::new(),
            no_data: self.no_data,
        };

        f.ctx.insert("TIME", self.now.format("%Y-%m-%d %H:%M").to_string());
        f.ctx.insert("LOC", self.location);

        self.forecast_tokens(&mut f);
        self.outdoor_tokens(&mut f);
        self.air_quality_tokens(&mut f);
        room_tokens(&mut f, room);

        f.ctx
    }

    fn forecast_tokens(&self, f: &mut Filler<'_>) {
        let forecast = self.forecast;

        f.text("TEXT", forecast.map(|b| b.summary.as_str()));
        f.text("I0", forecast.map(|b| b.icon.as_str()));
        f.text("sunrise", forecast.and_then(|b| b.sunrise.as_deref()));
        f.text("sunset", forecast.and_then(|b| b.sunset.as_deref()));

        let moon = forecast.and_then(|b| b.moon);
        f.number("MO", moon.map(|m| m.percent as f64), two_digits);
        f.text("MI", moon.map(|m| m.phase.icon()));

        for i in 0..DAILY_ENTRIES {
            let day = forecast.and_then(|b| b.daily.get(i));
            let n = i + 1;

            let weekday = day.map(|d| format!("{}.", d.weekday));
            f.text(format!("D{}", n), weekday.as_deref());
            f.text(format!("I{}", n), day.map(|d| d.icon.as_str()));
            f.number(format!("L{}", n), day.map(|d| d.temp_low), degrees);
            f.number(format!("H{}", n), day.map(|d| d.temp_high), degrees);
            f.number(format!("W{}", n), day.map(|d| d.wind_gust), |v| integer(v, ""));
            f.number(format!("P{}", n), day.map(|d| d.rain_probability), |v| integer(v, ""));
            f.number(format!("M{}", n), day.map(|d| d.rain_intensity), |v| fixed(v, 1));
        }

        for i in 0..HOURLY_ENTRIES {
            let hour = forecast.and_then(|b| b.hourly.get(i));
            let n = format!("{:02}", i + 1);

            f.text(format!("K{}", n), hour.map(|h| h.hour_label.as_str()));
            f.text(format!("J{}", n), hour.map(|h| h.icon.as_str()));
            f.number(format!("T{}", n), hour.map(|h| h.temperature), degrees);
            match hour {
                Some(h) if h.shows_rain() => f.ctx.insert(format!("R{}", n), integer(h.rain_probability, "%")),
                Some(_) => f.ctx.insert(format!("R{}", n), ""),
                None => f.text(format!("R{}", n), None),
            }
        }
    }

    fn outdoor_tokens(&self, f: &mut Filler<'_>) {
        let o = self.outdoor;

        f.number("CT", o.temperature, degrees);
        f.number("CHH", o.temperature_max, degrees_tenths);
        f.number("CHL", o.temperature_min, degrees_tenths);
        f.number("CL", o.humidity, |v| integer(v, ""));
        f.number("CAH", o.humidity_max, |v| integer(v, ""));
        f.number("CAL", o.humidity_min, |v| integer(v, ""));
        f.number("CW", o.wind_speed, |v| integer(v, ""));
        f.text("CD", o.wind_direction.map(|d| d.label()));
        f.number("CHW", o.wind_speed_max, |v| integer(v, ""));
        f.number("CR", o.rain_24h, |v| fixed(v, 1));
    }

    fn air_quality_tokens(&self, f: &mut Filler<'_>) {
        // Reserved fields without a data source
        f.ctx.insert("AQ", "000");
        f.ctx.insert("QL", "000");
        f.ctx.insert("QH", "000");
        f.ctx.insert("SO", "00");

        let aq = self.air_quality;
        f.text("IDX", aq.map(|s| s.index.label()));
        f.number("PM", aq.and_then(|s| s.pm10), |v| integer(v, ""));
        f.number("O3", aq.and_then(|s| s.o3), |v| integer(v, ""));
        f.number("NO", aq.and_then(|s| s.no2), |v| integer(v, ""));
    }
}

fn room_tokens(f: &mut Filler<'_>, room: &RoomView) {
    let c = &room.conditions;

    f.ctx.insert("ROOM1", &room.label);
    f.number("BT", c.temperature, degrees_tenths);
    f.number("BSL", c.temperature_min, degrees_tenths);
    f.number("BSH", c.temperature_max, degrees_tenths);
    f.number("BH", c.humidity, |v| integer(v, ""));
    f.number("BBH", c.humidity_max, |v| integer(v, ""));
    f.number("BBL", c.humidity_min, |v| integer(v, ""));
}
