//! Client for the classic Ginlong monitoring platform.
//!
//! Works for m.ginlong.com; the myevolvecloud.com deployment exposes the
//! same endpoints and should work as well.

use serde_json::Value;
use tracing::{debug, warn};

use async_trait::async_trait;

use crate::api::{PortalApi, TransportSession};
use crate::config::GinlongConfig;
use crate::error::{ApiError, Result};
use crate::types::{map_portal_fields, InverterData, InverterSerial, ENERGY_TODAY, INVERTER_STATE};

/// Portal detail fields carried over into canonical attribute names.
const GINLONG_FIELDS: &[(&str, &str)] = &[
    ("state", INVERTER_STATE),
    ("etoday", ENERGY_TODAY),
    ("etotal", "energy_total"),
    ("pac", "power_ac"),
    ("uac", "voltage_ac"),
    ("iac", "current_ac"),
    ("tem", "temperature"),
    ("deviceType", "device_type"),
];

/// Client for one Ginlong portal account.
pub struct GinlongApi {
    config: GinlongConfig,
    transport: Option<TransportSession>,
    token: Option<String>,
    inverters: Option<Vec<InverterSerial>>,
    online: bool,
}

impl GinlongApi {
    /// Create a client for the given account. No network traffic happens
    /// until `login`.
    pub fn new(config: GinlongConfig) -> Self {
        Self {
            config,
            transport: None,
            token: None,
            inverters: None,
            online: false,
        }
    }

    async fn do_login(&mut self, transport: &TransportSession) -> Result<()> {
        let url = format!("{}/cpro/login/validateLogin.json", self.config.domain);
        let params = [
            ("userName", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
            ("lan", "2"),
            ("domain", self.config.domain.as_str()),
            ("userType", "C"),
        ];
        let body: Value = transport.post(&url).form(&params).send().await?.json().await?;
        if !login_accepted(&body) {
            return Err(ApiError::Portal("login rejected by portal".to_string()));
        }
        self.token = body
            .pointer("/result/token")
            .and_then(Value::as_str)
            .map(str::to_string);
        self.transport = Some(transport.clone());

        let serials = self.fetch_device_list().await?;
        debug!("ginlong login found {} inverters", serials.len());
        self.inverters = Some(serials);
        Ok(())
    }

    async fn fetch_device_list(&self) -> Result<Vec<InverterSerial>> {
        let url = format!("{}/cpro/device/inverter/getDeviceList.json", self.config.domain);
        let body: Value = self.request(&url, &[]).await?;
        parse_device_list(&body)
    }

    async fn fetch_detail(&self, serial: &InverterSerial) -> Result<InverterData> {
        let url = format!("{}/cpro/device/inverter/goDetailAjax.json", self.config.domain);
        let body: Value = self.request(&url, &[("sn", serial.as_str())]).await?;
        parse_detail(serial, &body)
    }

    async fn request(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| ApiError::Portal("not logged in".to_string()))?;
        let mut request = transport.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(plant_id) = &self.config.plant_id {
            request = request.query(&[("plantId", plant_id.as_str())]);
        }
        // The portal scopes the session to the token returned at login.
        if let Some(token) = &self.token {
            request = request.header("token", token);
        }
        Ok(request.send().await?.json().await?)
    }
}

#[async_trait]
impl PortalApi for GinlongApi {
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
                warn!("ginlong login failed: {}", err);
                self.online = false;
                false
            }
        }
    }

    async fn logout(&mut self) {
        // The session lives in the token; forgetting it is the logout.
        self.token = None;
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

fn login_accepted(body: &Value) -> bool {
    // The portal reports state either as a number or a numeric string.
    match body.pointer("/result/state") {
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s == "1",
        _ => false,
    }
}

fn parse_device_list(body: &Value) -> Result<Vec<InverterSerial>> {
    let rows = body
        .pointer("/result/deviceList")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::Parse("device list missing from response".to_string()))?;
    Ok(rows
        .iter()
        .filter_map(|row| row.get("sn").and_then(Value::as_str))
        .map(InverterSerial::from)
        .collect())
}

fn parse_detail(serial: &InverterSerial, body: &Value) -> Result<InverterData> {
    let detail = body
        .pointer("/result/detail")
        .ok_or_else(|| ApiError::Parse("inverter detail missing from response".to_string()))?;
    let attributes = map_portal_fields(detail, GINLONG_FIELDS);
    if attributes.is_empty() {
        return Err(ApiError::Parse(
            "no known fields in inverter detail response".to_string(),
        ));
    }
    Ok(InverterData::new(serial.clone(), attributes))
}
