use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Customer,
    Rider,
    Employee,
    Admin,
}

#[derive(Debug, Deserialize)]
pub struct JwtPayload {
    pub user_id: String,
    pub role: Role,
}
