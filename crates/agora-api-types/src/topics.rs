use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiTopic {
    pub id: i32,
    pub name: String,
}

/// Request body for `POST /topics`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreateTopic {
    pub name: String,
}
