//! Recorded upstream responses and templates for tests.
//!
//! Device ids and datapoint ids are consistent across fixtures: the outdoor
//! sensor is device `1001`, the two rooms are `2001` and `3001`.

/// Homematic device ids used by the fixtures.
pub mod devices {
    pub const OUTDOOR: &str = "1001";
    pub const ROOM_A: &str = "2001";
    pub const ROOM_B: &str = "3001";

    /// Datapoint ids on the outdoor device
    pub const OUTDOOR_TEMPERATURE: &str = "1011";
    pub const OUTDOOR_HUMIDITY: &str = "1012";
    pub const OUTDOOR_RAIN_COUNTER: &str = "1013";
    pub const OUTDOOR_WIND_DIR: &str = "1014";
    pub const OUTDOOR_WIND_SPEED: &str = "1015";

    pub const ROOM_A_TEMPERATURE: &str = "2011";
    pub const ROOM_A_HUMIDITY: &str = "2012";
    pub const ROOM_B_TEMPERATURE: &str = "3011";
}

/// `state.cgi` response for the outdoor weather sensor.
pub const OUTDOOR_STATE_XML: &str = r#"<?xml version="1.0" encoding="ISO-8859-1" ?>
<state>
  <device name="Garten" ise_id="1001" unreach="false" config_pending="false">
    <channel name="Garten:0" ise_id="1002">
      <datapoint name="HmIP-SWO-PL 0001:0.LOW_BAT" type="LOW_BAT" ise_id="1003" value="false"/>
      <datapoint name="HmIP-SWO-PL 0001:0.OPERATING_VOLTAGE" type="OPERATING_VOLTAGE" ise_id="1004" value="2.9"/>
    </channel>
    <channel name="Garten:1" ise_id="1010">
      <datapoint name="HmIP-SWO-PL 0001:1.ACTUAL_TEMPERATURE" type="ACTUAL_TEMPERATURE" ise_id="1011" value="17.340000"/>
      <datapoint name="HmIP-SWO-PL 0001:1.HUMIDITY" type="HUMIDITY" ise_id="1012" value="64"/>
      <datapoint name="HmIP-SWO-PL 0001:1.RAIN_COUNTER" type="RAIN_COUNTER" ise_id="1013" value="1204.500000"/>
      <datapoint name="HmIP-SWO-PL 0001:1.WIND_DIR" type="WIND_DIR" ise_id="1014" value="250.000000"/>
      <datapoint name="HmIP-SWO-PL 0001:1.WIND_DIR_RANGE" type="WIND_DIR_RANGE" ise_id="1016" value="22.500000"/>
      <datapoint name="HmIP-SWO-PL 0001:1.WIND_SPEED" type="WIND_SPEED" ise_id="1015" value="12.700000"/>
    </channel>
  </device>
</state>"#;

/// `state.cgi` response for the first room (temperature and humidity).
pub const ROOM_A_STATE_XML: &str = r#"<?xml version="1.0" encoding="ISO-8859-1" ?>
<state>
  <device name="Wohnzimmer" ise_id="2001" unreach="false">
    <channel name="Wohnzimmer:0" ise_id="2002"/>
    <channel name="Wohnzimmer:1" ise_id="2010">
      <datapoint name="HmIP-STHD 0002:1.ACTUAL_TEMPERATURE" type="ACTUAL_TEMPERATURE" ise_id="2011" value="21.600000"/>
      <datapoint name="HmIP-STHD 0002:1.HUMIDITY" type="HUMIDITY" ise_id="2012" value="48"/>
      <datapoint name="HmIP-STHD 0002:1.SET_POINT_TEMPERATURE" type="SET_POINT_TEMPERATURE" ise_id="2013" value="21.000000"/>
    </channel>
  </device>
</state>"#;

/// `state.cgi` response for the second room (temperature only).
pub const ROOM_B_STATE_XML: &str = r#"<?xml version="1.0" encoding="ISO-8859-1" ?>
<state>
  <device name="Dachgeschoss" ise_id="3001" unreach="false">
    <channel name="Dachgeschoss:1" ise_id="3010">
      <datapoint name="HmIP-WTH 0003:1.ACTUAL_TEMPERATURE" type="ACTUAL_TEMPERATURE" ise_id="3011" value="19.100000"/>
    </channel>
  </device>
</state>"#;

/// UBA CSV header row as published with `lang=de`.
pub const UBA_CSV_HEADER: &str = "Stationscode;Datum;Feinstaub (PM₁₀) stündlich gleitendes Tagesmittel in µg/m³;Ozon (O₃) Ein-Stunden-Mittelwert in µg/m³;Stickstoffdioxid (NO₂) Ein-Stunden-Mittelwert in µg/m³;Luftqualitätsindex";

/// First station: PM10 and O3 measured, no NO2.
pub const UBA_CSV_STATION_A: &str = "Stationscode;Datum;Feinstaub (PM₁₀) stündlich gleitendes Tagesmittel in µg/m³;Ozon (O₃) Ein-Stunden-Mittelwert in µg/m³;Stickstoffdioxid (NO₂) Ein-Stunden-Mittelwert in µg/m³;Luftqualitätsindex
DENW074;'28.05.2024 08:00';29;52;-;gut
";

/// First station as returned with a units row between header and data.
pub const UBA_CSV_STATION_A_WITH_UNITS: &str = "Stationscode;Datum;Feinstaub (PM₁₀) stündlich gleitendes Tagesmittel in µg/m³;Ozon (O₃) Ein-Stunden-Mittelwert in µg/m³;Stickstoffdioxid (NO₂) Ein-Stunden-Mittelwert in µg/m³;Luftqualitätsindex
;;µg/m³;µg/m³;µg/m³;
DENW074;'28.05.2024 08:00';29;52;-;gut
";

/// Second station: PM10 and NO2 measured, no O3.
pub const UBA_CSV_STATION_B: &str = "Stationscode;Datum;Feinstaub (PM₁₀) stündlich gleitendes Tagesmittel in µg/m³;Ozon (O₃) Ein-Stunden-Mittelwert in µg/m³;Stickstoffdioxid (NO₂) Ein-Stunden-Mittelwert in µg/m³;Luftqualitätsindex
DENW329;'28.05.2024 08:00';16;-;9;sehr gut
";

/// A small display template using a cross-section of the token vocabulary.
pub const TEMPLATE_SVG: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="600" height="800" viewBox="0 0 600 800">
  <rect x="0" y="0" width="600" height="800" fill="#ffffff"/>
  <text x="10" y="30" font-size="24">$LOC $TIME</text>
  <text x="10" y="60" font-size="20">$TEXT $I0</text>
  <text x="10" y="90" font-size="20">$CT $CHL $CHH $CL $CAL $CAH</text>
  <text x="10" y="120" font-size="20">$CD $CW $CHW $CR</text>
  <text x="10" y="150" font-size="20">$ROOM1 $BT $BSL $BSH $BH $BBL $BBH</text>
  <text x="10" y="180" font-size="20">$D1 $I1 $L1 $H1 $W1 $P1 $M1</text>
  <text x="10" y="210" font-size="20">$K01 $J01 $T01 $R01 $K24 $T24</text>
  <text x="10" y="240" font-size="20">$sunrise $sunset $MO $MI</text>
  <text x="10" y="270" font-size="20">$IDX $PM $O3 $NO $SO $AQ</text>
  <rect x="10" y="700" width="580" height="80" fill="#000000"/>
</svg>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_fixtures_share_header() {
        assert!(UBA_CSV_STATION_A.starts_with(UBA_CSV_HEADER));
        assert!(UBA_CSV_STATION_B.starts_with(UBA_CSV_HEADER));
        assert!(UBA_CSV_STATION_A_WITH_UNITS.starts_with(UBA_CSV_HEADER));
    }

    #[test]
    fn test_template_is_complete_document() {
        assert!(TEMPLATE_SVG.starts_with("<?xml"));
        assert!(TEMPLATE_SVG.trim_end().ends_with("</svg>"));
        assert!(TEMPLATE_SVG.contains(r##"fill="#ffffff""##));
        assert!(TEMPLATE_SVG.contains("$IDX"));
    }

    #[test]
    fn test_xml_fixtures_reference_devices() {
        assert!(OUTDOOR_STATE_XML.contains(devices::OUTDOOR_RAIN_COUNTER));
        assert!(ROOM_A_STATE_XML.contains(devices::ROOM_A_HUMIDITY));
        assert!(ROOM_B_STATE_XML.contains(devices::ROOM_B_TEMPERATURE));
    }
}
