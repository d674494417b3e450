use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteWalletResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Body of a request rejected by the fault gate
#[derive(Debug, Serialize, Deserialize)]
pub struct SimulatedFaultResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
    pub path: String,
    pub method: String,
}
