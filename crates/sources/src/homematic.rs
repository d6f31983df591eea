//! Homematic CCU XML-API client.
//!
//! `state.cgi?device_id=N` returns
//!
//! ```xml
//! <state>
//!   <device name="..." ise_id="1234">
//!     <channel name="..." ise_id="1235">
//!       <datapoint name="HmIP-STHO 0001:1.ACTUAL_TEMPERATURE" ise_id="1240" value="21.3"/>
//!     </channel>
//!   </device>
//! </state>
//! ```

use async_trait::async_trait;
use chrono::NaiveDateTime;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use weather_common::{DisplayError, DisplayResult, Reading, SensorKind};

use crate::{get_text, DeviceSource};

#[derive(Debug, Clone, Deserialize)]
pub struct HomematicConfig {
    /// CCU host name or address, without scheme
    pub host: String,
}

/// A device channel and the datapoints it exposes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Channel {
    pub name: String,
    pub ise_id: String,
    pub datapoints: Vec<Datapoint>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datapoint {
    pub name: String,
    pub ise_id: String,
    pub value: String,
}

impl Datapoint {
    /// Interpret this datapoint as a recorded measurement.
    ///
    /// Returns `None` for datapoints that are not recorded. Recorded kinds
    /// with a non-numeric value are skipped with a warning.
    pub fn to_reading(&self, timestamp: NaiveDateTime) -> Option<Reading> {
        let kind = SensorKind::from_datapoint_name(&self.name)?;

        match self.value.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Some(Reading {
                sensor_id: self.ise_id.clone(),
                kind,
                value,
                timestamp,
            }),
            _ => {
                warn!(
                    datapoint = %self.name,
                    ise_id = %self.ise_id,
                    value = %self.value,
                    "Skipping non-numeric datapoint value"
                );
                None
            }
        }
    }
}

/// All recorded readings across a device's channels, in document order.
pub fn readings(channels: &[Channel], timestamp: NaiveDateTime) -> Vec<Reading> {
    channels
        .iter()
        .flat_map(|c| c.datapoints.iter())
        .filter_map(|dp| dp.to_reading(timestamp))
        .collect()
}

fn attribute(
    reader: &Reader<&[u8]>,
    element: &BytesStart<'_>,
    key: &[u8],
) -> DisplayResult<String> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| DisplayError::decode("homematic", e.to_string()))?;
        if attr.key.as_ref() == key {
            return attr
                .decode_and_unescape_value(reader)
                .map(|v| v.into_owned())
                .map_err(|e| DisplayError::decode("homematic", e.to_string()));
        }
    }
    Ok(String::new())
}

/// Parse a `state.cgi` response into channels.
///
/// Channels without datapoints are kept. An error element in place of a
/// device (`<not_found/>`) yields no channels.
pub fn parse_device_state(xml: &str) -> DisplayResult<Vec<Channel>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut channels = Vec::new();
    let mut current: Option<Channel> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"channel" => {
                current = Some(Channel {
                    name: attribute(&reader, &e, b"name")?,
                    ise_id: attribute(&reader, &e, b"ise_id")?,
                    datapoints: Vec::new(),
                });
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"channel" => {
                channels.push(Channel {
                    name: attribute(&reader, &e, b"name")?,
                    ise_id: attribute(&reader, &e, b"ise_id")?,
                    datapoints: Vec::new(),
                });
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"datapoint" => {
                let datapoint = Datapoint {
                    name: attribute(&reader, &e, b"name")?,
                    ise_id: attribute(&reader, &e, b"ise_id")?,
                    value: attribute(&reader, &e, b"value")?,
                };
                match current.as_mut() {
                    Some(channel) => channel.datapoints.push(datapoint),
                    None => debug!(name = %datapoint.name, "Datapoint outside channel ignored"),
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"channel" => {
                if let Some(channel) = current.take() {
                    channels.push(channel);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DisplayError::decode(
                    "homematic",
                    format!("XML error at position {}: {}", reader.buffer_position(), e),
                ))
            }
            _ => {}
        }
    }

    if current.is_some() {
        return Err(DisplayError::decode("homematic", "unterminated channel element"));
    }

    Ok(channels)
}

/// Reads device state from a CCU.
pub struct HomematicClient {
    client: Client,
    config: HomematicConfig,
}

impl HomematicClient {
    pub fn new(client: Client, config: HomematicConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, device_id: &str) -> String {
        format!(
            "http://{}/addons/xmlapi/state.cgi?device_id={}",
            self.config.host, device_id
        )
    }
}

#[async_trait]
impl DeviceSource for HomematicClient {
    #[instrument(skip(self))]
    async fn read_device(&self, device_id: &str) -> DisplayResult<Vec<Channel>> {
        let url = self.url(device_id);
        let body = get_text(&self.client, &url, &url).await?;
        let channels = parse_device_state(&body)?;

        debug!(
            channels = channels.len(),
            datapoints = channels.iter().map(|c| c.datapoints.len()).sum::<usize>(),
            "Read device state"
        );
        Ok(channels)
    }
}
