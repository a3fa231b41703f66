use serde::Deserialize;
use serde::Serialize;

#[derive(Deserialize)]
pub struct RenewRequest {
    pub refresh: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserInfo,
}

#[derive(Serialize)]
pub struct UserInfo {
    pub handle: String,
    pub session: String,
}
