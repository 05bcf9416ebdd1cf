//! Client for the SolisCloud HTTP API.

use serde_json::{json, Value};
use tracing::{debug, warn};

use async_trait::async_trait;

use crate::api::{PortalApi, TransportSession};
use crate::config::SoliscloudConfig;
use crate::error::{ApiError, Result};
use crate::types::{map_portal_fields, InverterData, InverterSerial, ENERGY_TODAY, INVERTER_STATE};

/// Portal detail fields carried over into canonical attribute names.
const SOLISCLOUD_FIELDS: &[(&str, &str)] = &[
    ("state", INVERTER_STATE),
    ("eToday", ENERGY_TODAY),
    ("eTotal", "energy_total"),
    ("pac", "power_ac"),
    ("uAc1", "voltage_ac"),
    ("iAc1", "current_ac"),
    ("inverterTemperature", "temperature"),
    ("model", "device_type"),
];

/// Client for one SolisCloud API key.
pub struct SoliscloudApi {
    config: SoliscloudConfig,
    transport: Option<TransportSession>,
    inverters: Option<Vec<InverterSerial>>,
    online: bool,
}

impl SoliscloudApi {
    /// Create a client for the given API key. No network traffic happens
    /// until `login`.
    pub fn new(config: SoliscloudConfig) -> Self {
        Self {
            config,
            transport: None,
            inverters: None,
            online: false,
        }
    }

    /// The API has no session endpoint; listing the account's inverters
    /// doubles as the credential check.
    async fn do_login(&mut self, transport: &TransportSession) -> Result<()> {
        self.transport = Some(transport.clone());
        let mut body = json!({"pageNo": 1, "pageSize": 100});
        if let Some(station_id) = &self.config.station_id {
            body["stationId"] = json!(station_id);
        }
        let response = self.request("/v1/api/inverterList", body).await?;
        let serials = parse_inverter_list(&response)?;
        debug!("soliscloud account lists {} inverters", serials.len());
        self.inverters = Some(serials);
        Ok(())
    }

    async fn fetch_detail(&self, serial: &InverterSerial) -> Result<InverterData> {
        let response = self
            .request("/v1/api/inverterDetail", json!({"sn": serial.as_str()}))
            .await?;
        parse_detail(serial, &response)
    }

    async fn request(&self, path: &str, body: Value) -> Result<Value> {
        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| ApiError::Portal("not logged in".to_string()))?;
        let url = format!("{}{}", self.config.domain, path);
        // Each request authenticates through the Authorization header.
        let response: Value = transport
            .post(&url)
            .header(
                "Authorization",
                format!("API {}:{}", self.config.key_id, self.config.secret),
            )
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        if response.get("success").and_then(Value::as_bool) == Some(false) {
            let message = response
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("request not successful");
            return Err(ApiError::Portal(message.to_string()));
        }
        Ok(response)
    }
}

#[async_trait]
impl PortalApi for SoliscloudApi {
    fn is_online(&self) -> bool {
        self.online
    }

    async fn login(&mut self, transport: &TransportSession) -> bool {
        match self.do_login(transport).await {
            Ok(()) => {
                self.online = true;
                true
            }
            Err(err) => {
                warn!("soliscloud login failed: {}", err);
                self.transport = None;
                self.online = false;
                false
            }
        }
    }

    async fn logout(&mut self) {
        self.transport = None;
        self.inverters = None;
        self.online = false;
    }

    fn inverters(&self) -> Option<Vec<InverterSerial>> {
        self.inverters.clone()
    }

    async fn fetch_inverter_data(&mut self, serial: &InverterSerial) -> Option<InverterData> {
        match self.fetch_detail(serial).await {
            Ok(data) => Some(data),
            Err(err) => {
                warn!("fetching inverter {} failed: {}", serial, err);
                None
            }
        }
    }
}

fn parse_inverter_list(body: &Value) -> Result<Vec<InverterSerial>> {
    let records = body
        .pointer("/data/page/records")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::Parse("inverter list missing from response".to_string()))?;
    Ok(records
        .iter()
        .filter_map(|record| record.get("sn").and_then(Value::as_str))
        .map(InverterSerial::from)
        .collect())
}

fn parse_detail(serial: &InverterSerial, body: &Value) -> Result<InverterData> {
    let detail = body
        .get("data")
        .ok_or_else(|| ApiError::Parse("inverter detail missing from response".to_string()))?;
    let attributes = map_portal_fields(detail, SOLISCLOUD_FIELDS);
    if attributes.is_empty() {
        return Err(ApiError::Parse(
            "no known fields in inverter detail response".to_string(),
        ));
    }
    Ok(InverterData::new(serial.clone(), attributes))
}
