//! Request/response envelopes at the HTTP edge (§11.5 `[SUPPLEMENT]`).
//!
//! Grounded on `api/req/message.go` and `api/res/*.go`. These are
//! pure wire DTOs for this edge; the core crates never see them.

use dmp_discovery::Service;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct Member {
    pub ip: String,
    pub namespace: String,
    pub status: String,
}

impl From<&Service> for Member {
    fn from(service: &Service) -> Self {
        Member {
            ip: service.ip.to_string(),
            namespace: service.namespace.clone(),
            status: service.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Members {
    pub members: Vec<Member>,
}

#[derive(Debug, Serialize)]
pub struct ResultEnvelope {
    pub result: bool,
}

#[derive(Debug, Deserialize)]
pub struct ServiceRegistration {
    pub namespace: String,
    #[serde(rename = "contactPoint")]
    pub contact_point: String,
}
