use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Airport {
    pub icao: String,
    pub lat: f64,
    pub lon: f64,
}

/// The subset of a SimBrief OFP the overlay consumes. Replies without a
/// plan (`{"fetch": {"status": "Error: ..."}}`) fail to deserialize.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct OfpResponse {
    pub aircraft: OfpAircraft,
    pub origin: OfpAirport,
    pub destination: OfpAirport,
    pub general: OfpGeneral,
    pub atc: OfpAtc,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OfpAircraft {
    #[serde(default, deserialize_with = "de_opt_string_from_any")]
    pub icaocode: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string_from_any")]
    pub reg: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OfpAirport {
    #[serde(default, deserialize_with = "de_opt_string_from_any")]
    pub icao_code: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OfpGeneral {
    #[serde(default, deserialize_with = "de_opt_string_from_any")]
    pub icao_airline: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OfpAtc {
    #[serde(default, deserialize_with = "de_opt_string_from_any")]
    pub callsign: Option<String>,
}

/// Settings values taken from a dispatched flight plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlightPlan {
    pub aircraft_type: String,
    pub registration: String,
    pub origin: String,
    pub destination: String,
    pub airline_label: String,
}

impl TryFrom<OfpResponse> for FlightPlan {
    type Error = anyhow::Error;

    /// Aircraft type, origin and destination are required; the rest may be blank.
    fn try_from(ofp: OfpResponse) -> Result<Self> {
        let aircraft_type = ofp
            .aircraft
            .icaocode
            .ok_or_else(|| anyhow!("OFP has no aircraft type"))?;
        let origin = ofp
            .origin
            .icao_code
            .ok_or_else(|| anyhow!("OFP has no origin"))?;
        let destination = ofp
            .destination
            .icao_code
            .ok_or_else(|| anyhow!("OFP has no destination"))?;
        let airline = ofp.general.icao_airline.unwrap_or_default();
        let callsign = ofp.atc.callsign.unwrap_or_default();
        Ok(Self {
            aircraft_type,
            registration: ofp.aircraft.reg.unwrap_or_default(),
            origin,
            destination,
            airline_label: format!("{airline} - {callsign}"),
        })
    }
}

// SimBrief renders empty fields as `{}` and some numeric ones as numbers.
fn de_opt_string_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Null | Value::Object(_) | Value::Array(_) => Ok(None),
        other => Err(serde::de::Error::custom(format!(
            "expected string or null, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{FlightPlan, OfpResponse};
    use anyhow::Result;

    fn parse_plan(body: &str) -> Result<FlightPlan> {
        let ofp: OfpResponse = serde_json::from_str(body)?;
        FlightPlan::try_from(ofp)
    }

    const MOCK: &str = r#"{
        "general": { "icao_airline": "ASA", "flight_number": "1234" },
        "origin": { "icao_code": "KPDX", "iata_code": "PDX" },
        "destination": { "icao_code": "KSEA", "iata_code": "SEA" },
        "aircraft": { "icaocode": "B39M", "reg": "N913AK", "name": "BOEING 737 MAX 9" },
        "atc": { "callsign": "ASA1234" }
    }"#;

    #[test]
    fn parse_ofp() {
        let plan = parse_plan(MOCK).unwrap();
        assert_eq!(plan.aircraft_type, "B39M");
        assert_eq!(plan.registration, "N913AK");
        assert_eq!(plan.origin, "KPDX");
        assert_eq!(plan.destination, "KSEA");
        assert_eq!(plan.airline_label, "ASA - ASA1234");
    }

    #[test]
    fn empty_objects_become_blank() {
        let plan = parse_plan(
            r#"{"general": {"icao_airline": {}}, "atc": {"callsign": "N172SP"}, "aircraft": {"icaocode": "C172", "reg": 172}, "origin": {"icao_code": "KPDX"}, "destination": {"icao_code": "KSEA"}}"#,
        )
        .unwrap();
        assert_eq!(plan.airline_label, " - N172SP");
        assert_eq!(plan.registration, "172");
    }

    #[test]
    fn reply_without_plan_is_rejected() {
        assert!(parse_plan("{}").is_err());
        assert!(parse_plan(r#"{"fetch":{"status":"Error: No flight plan on file"}}"#).is_err());
    }

    #[test]
    fn plan_missing_required_field_is_rejected() {
        let err = parse_plan(
            r#"{"general": {}, "atc": {}, "aircraft": {"icaocode": "C172"}, "origin": {"icao_code": "KPDX"}, "destination": {"icao_code": {}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("destination"));
    }
}
