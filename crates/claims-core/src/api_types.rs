use serde::{Deserialize, Serialize};

// --- Health ---

pub const STATUS_HEALTHY: &str = "healthy";
pub const STATUS_ERROR: &str = "error";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    pub fn healthy(service: impl Into<String>) -> Self {
        Self {
            status: STATUS_HEALTHY.to_string(),
            service: Some(service.into()),
            error: None,
        }
    }

    pub fn error(service: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            service: Some(service.into()),
            error: Some(error.into()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == STATUS_HEALTHY
    }
}

// --- Claim processing ---

/// Envelope returned by every claim-processing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessClaimResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessClaimResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

// --- Structured view of model output ---

/// Typed view over the JSON a model returns for a claim.
///
/// Every field is optional because the model's schema is not guaranteed.
/// Keys outside the known sections are kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_info: Option<VehicleInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_assessment: Option<DamageAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_info: Option<IncidentInfo>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleInfo {
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Models return the year as either a number or a string.
    #[serde(default)]
    pub year: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DamageAssessment {
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub estimated_cost: Option<serde_json::Value>,
    #[serde(default)]
    pub affected_areas: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentInfo {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
    Unknown,
}

impl DamageAssessment {
    pub fn severity_level(&self) -> Severity {
        match self
            .severity
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .as_deref()
        {
            Some("minor") => Severity::Minor,
            Some("moderate") => Severity::Moderate,
            Some("severe") => Severity::Severe,
            _ => Severity::Unknown,
        }
    }

    /// Estimated cost when the model reported it as a number.
    pub fn estimated_cost_amount(&self) -> Option<f64> {
        self.estimated_cost.as_ref().and_then(|v| v.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_error_shape() {
        let json = serde_json::to_value(HealthResponse::error("svc", "boom")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn healthy_response_omits_error() {
        let json = serde_json::to_value(HealthResponse::healthy("svc")).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "svc");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failed_envelope_has_no_data() {
        let json = serde_json::to_value(ProcessClaimResponse::failed("nope")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "nope");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn claim_data_tolerates_loose_model_output() {
        let raw = serde_json::json!({
            "vehicle_info": {"make": "Toyota", "model": "Corolla", "year": 2019},
            "damage_assessment": {"severity": "Moderate", "estimated_cost": 2500.5, "affected_areas": ["bumper", "hood"]},
            "incident_info": {"date": "2024-03-01", "location": "Lisbon"},
            "claim_number": "CLM-1"
        });
        let data: ClaimData = serde_json::from_value(raw).unwrap();

        let vehicle = data.vehicle_info.as_ref().unwrap();
        assert_eq!(vehicle.make.as_deref(), Some("Toyota"));
        assert_eq!(vehicle.color, None);
        assert_eq!(vehicle.year, Some(serde_json::json!(2019)));

        let damage = data.damage_assessment.as_ref().unwrap();
        assert_eq!(damage.severity_level(), Severity::Moderate);
        assert_eq!(damage.estimated_cost_amount(), Some(2500.5));
        assert_eq!(damage.affected_areas.len(), 2);

        assert_eq!(data.extra["claim_number"], "CLM-1");
    }

    #[test]
    fn unknown_severity_and_textual_cost() {
        let damage = DamageAssessment {
            severity: Some("catastrophic".into()),
            estimated_cost: Some(serde_json::json!("about 3k")),
            affected_areas: vec![],
        };
        assert_eq!(damage.severity_level(), Severity::Unknown);
        assert_eq!(damage.estimated_cost_amount(), None);
    }
}
