use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::user::{check_id, require_id};
use super::{parse_json, Request};

/// A saved 3D resume layout. `layers` and `colors` are opaque to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub id: u64,
    pub user_id: u64,
    pub layers: JsonValue,
    pub colors: JsonValue,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct CreateResumeRequest {
    #[serde(rename = "userId", default)]
    pub user_id: u64,
    #[serde(default)]
    pub layers: JsonValue,
    #[serde(default)]
    pub colors: JsonValue,
}

impl Request for CreateResumeRequest {
    fn is_data(&self) -> bool {
        true
    }

    fn complete_data(&mut self, data: &[u8]) -> Result<()> {
        *self = parse_json(data, "resume")?;
        if self.user_id == 0 {
            bail!("userId is required");
        }
        check_id("userId", self.user_id)?;
        if self.layers.is_null() || self.colors.is_null() {
            bail!("layers and colors are required");
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UserResumesRequest {
    pub user_id: u64,
}

impl Request for UserResumesRequest {
    fn complete(&mut self, fields: HashMap<String, String>) -> Result<()> {
        self.user_id = require_id(&fields, "userId")?;
        Ok(())
    }
}
