use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(SubmissionId);
id_newtype!(SessionGeneration);

/// Session fields the verification service accepts through its setter API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionField {
    Cpf,
    Email,
}

impl SessionField {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionField::Cpf => "cpf",
            SessionField::Email => "email",
        }
    }
}

/// One analysis submission, built from the form at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub cpf: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
}

impl AnalysisRequest {
    pub fn new(cpf: impl Into<String>, email: impl Into<String>, ref_id_geoloc: &str) -> Self {
        Self {
            cpf: cpf.into(),
            email: email.into(),
            ref_id: normalize_ref_id(ref_id_geoloc),
        }
    }
}

/// An empty geolocation reference means "no reference".
pub fn normalize_ref_id(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
