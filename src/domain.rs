use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An event as it accumulates through the validation stages.
///
/// Well-known fields are typed; everything else the client SDK sent rides in
/// the `properties` map. Serializes to the JSON shape downstream consumers
/// expect, with absent optionals omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub event_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Original event name when a legacy alias was migrated to its canonical form
    #[serde(rename = "_legacy_name", skip_serializing_if = "Option::is_none")]
    pub legacy_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent_granted: Option<bool>,
    pub properties: Map<String, Value>,
}

impl EventSnapshot {
    /// Best-effort extraction from an arbitrary JSON object.
    ///
    /// Takes whatever fields already have the right shape and ignores the
    /// rest; the structure stage decides what is actually a violation.
    pub fn lenient(raw: &Value) -> Self {
        let get_str = |key: &str| raw.get(key).and_then(|v| v.as_str()).map(|s| s.to_string());

        let timestamp = raw
            .get("timestamp")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        let properties = raw
            .get("properties")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();

        Self {
            event_name: get_str("event_name").unwrap_or_default(),
            timestamp,
            user_id: get_str("user_id"),
            session_id: get_str("session_id"),
            platform: get_str("platform"),
            page_url: get_str("page_url"),
            user_agent: get_str("user_agent"),
            legacy_name: get_str("_legacy_name"),
            consent_granted: raw.get("consent_granted").and_then(|v| v.as_bool()),
            properties,
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(|v| v.as_str())
    }

    pub fn property_f64(&self, key: &str) -> Option<f64> {
        self.property(key).and_then(|v| v.as_f64())
    }

    /// Whether a named field is present either in `properties` or as a
    /// populated top-level field. Used for required-property and
    /// conversion-parameter presence checks.
    pub fn has_field(&self, key: &str) -> bool {
        if self.properties.contains_key(key) {
            return true;
        }
        match key {
            "event_name" => true,
            "timestamp" => true,
            "user_id" => self.user_id.is_some(),
            "session_id" => self.session_id.is_some(),
            "platform" => self.platform.is_some(),
            "page_url" => self.page_url.is_some(),
            "user_agent" => self.user_agent.is_some(),
            _ => false,
        }
    }

    /// At least one user-identifying signal a conversion API can match on.
    pub fn has_user_signal(&self) -> bool {
        self.user_id.is_some()
            || self.property("email").is_some()
            || self.property("phone").is_some()
    }
}

/// The fixed validation stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Structure,
    Standardization,
    DataTypes,
    BusinessRules,
    AdPlatformReadiness,
    Privacy,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Structure => "structure",
            StageName::Standardization => "standardization",
            StageName::DataTypes => "data_types",
            StageName::BusinessRules => "business_rules",
            StageName::AdPlatformReadiness => "ad_platform_readiness",
            StageName::Privacy => "privacy",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a single stage found and, when it rewrote the event, the rewritten
/// snapshot that the next stage should see.
#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub stage: StageName,
    pub passed: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub transformed: Option<EventSnapshot>,
}

impl StageOutcome {
    pub fn passing(stage: StageName) -> Self {
        Self {
            stage,
            passed: true,
            warnings: Vec::new(),
            errors: Vec::new(),
            transformed: None,
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.passed = false;
    }

    pub fn set_transform(&mut self, snapshot: EventSnapshot) {
        self.transformed = Some(snapshot);
    }
}

/// Post-stage evaluation attached to every result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMetadata {
    /// Stages that ran, in order
    pub stages: Vec<StageName>,
    /// Event carries enough identification and parameters for server-side
    /// conversion forwarding
    pub ad_platform_ready: bool,
    /// No unhashed PII in the fixed field list and consent granted
    pub privacy_compliant: bool,
    /// Percentage of the canonical definition's required properties present
    pub data_completeness: u8,
}

/// Final verdict for one event. Warnings are advisory; only errors flip
/// `is_valid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// 0-100, clamped
    pub quality_score: u8,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub standardized_data: EventSnapshot,
    pub metadata: ValidationMetadata,
}
