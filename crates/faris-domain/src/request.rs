//! Analysis requests and the identifiers attached to them

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Deployment context of the analysed answer
///
/// The domain scales how costly a failure is: the same finding weighs more
/// in a medical answer than in a general-knowledge one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// General knowledge
    #[default]
    General,
    /// Medical and health information
    Medical,
    /// Legal information
    Legal,
    /// Financial information
    Finance,
    /// Source code and programming
    Code,
}

impl Domain {
    /// All domains in declaration order
    pub const ALL: [Domain; 5] = [
        Domain::General,
        Domain::Medical,
        Domain::Legal,
        Domain::Finance,
        Domain::Code,
    ];

    /// Get the domain name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::General => "general",
            Domain::Medical => "medical",
            Domain::Legal => "legal",
            Domain::Finance => "finance",
            Domain::Code => "code",
        }
    }

    /// Whether a wrong answer in this domain can cause direct harm
    pub fn is_high_stakes(&self) -> bool {
        matches!(self, Domain::Medical | Domain::Legal | Domain::Finance)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(Domain::General),
            "medical" => Ok(Domain::Medical),
            "legal" => Ok(Domain::Legal),
            "finance" | "financial" => Ok(Domain::Finance),
            "code" => Ok(Domain::Code),
            other => Err(format!("Invalid domain: {}", other)),
        }
    }
}

/// Metadata about the model that produced the answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    /// Model name (e.g., "gpt-4o", "llama3.1:8b")
    pub name: String,

    /// Sampling temperature used for the answer, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A single (question, answer) pair submitted for analysis
///
/// Requests are immutable once accepted; every pipeline stage reads the same
/// value through a shared snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// The question that was asked
    pub question: String,

    /// The model's answer under analysis
    pub answer: String,

    /// Deployment domain
    #[serde(default)]
    pub domain: Domain,

    /// Reference context the answer should be grounded in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Information about the answering model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelMetadata>,
}

impl AnalysisRequest {
    /// Create a request without context or model metadata
    pub fn new(question: impl Into<String>, answer: impl Into<String>, domain: Domain) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            domain,
            context: None,
            model: None,
        }
    }

    /// Attach reference context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attach model metadata
    pub fn with_model(mut self, name: impl Into<String>, temperature: Option<f32>) -> Self {
        self.model = Some(ModelMetadata {
            name: name.into(),
            temperature,
        });
        self
    }

    /// Context text, or `None` when absent or blank
    pub fn context_text(&self) -> Option<&str> {
        self.context
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Unique identifier for an analysis case, based on UUIDv7
///
/// UUIDv7 keeps case ids chronologically sortable, which the case store
/// relies on for "most recent first" listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaseId(u128);

impl CaseId {
    /// Generate a new UUIDv7-based CaseId
    ///
    /// # Examples
    ///
    /// ```
    /// use faris_domain::CaseId;
    ///
    /// let id = CaseId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a CaseId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Milliseconds since Unix epoch encoded in the UUIDv7 prefix
    pub fn timestamp_millis(&self) -> u64 {
        (self.0 >> 80) as u64
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl FromStr for CaseId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid case id: {}", e))
    }
}

impl Serialize for CaseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CaseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_parsing() {
        assert_eq!("medical".parse::<Domain>().unwrap(), Domain::Medical);
        assert_eq!(" Legal ".parse::<Domain>().unwrap(), Domain::Legal);
        assert_eq!("financial".parse::<Domain>().unwrap(), Domain::Finance);
        assert!("astrology".parse::<Domain>().is_err());
    }

    #[test]
    fn test_high_stakes_domains() {
        assert!(Domain::Medical.is_high_stakes());
        assert!(Domain::Legal.is_high_stakes());
        assert!(!Domain::Code.is_high_stakes());
        assert!(!Domain::General.is_high_stakes());
    }

    #[test]
    fn test_request_defaults_from_json() {
        let json = r#"{"question": "q?", "answer": "a."}"#;
        let request: AnalysisRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.domain, Domain::General);
        assert!(request.context.is_none());
    }

    #[test]
    fn test_blank_context_is_absent() {
        let request = AnalysisRequest::new("q", "a", Domain::General).with_context("   ");
        assert_eq!(request.context_text(), None);
    }

    #[test]
    fn test_case_id_round_trip() {
        let id = CaseId::new();
        let parsed: CaseId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);

        let json = serde_json::to_string(&id).unwrap();
        assert!(json.starts_with('"'));
        let back: CaseId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_case_ids_are_time_ordered() {
        let first = CaseId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = CaseId::new();
        assert!(first < second);
        assert!(first.timestamp_millis() <= second.timestamp_millis());
    }
}
