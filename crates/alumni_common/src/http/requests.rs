use serde::{Deserialize, Serialize};

/// Acting user plus the other party of a connection request. For accept and
/// reject the target is the user who sent the request.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub user_id: String,
    pub target_user_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserReferenceRequest {
    pub user_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DonationRequest {
    pub amount: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
