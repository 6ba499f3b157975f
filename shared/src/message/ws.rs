//! WebSocket protocol (`GET /ws`)
//!
//! Text frames carrying JSON, tagged by `type`.

use super::{CallType, Notification};
use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};

/// Client → server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Kitchen display feed (ADMIN / KITCHEN)
    SubscribeKitchen,
    /// Staff call feed (ADMIN / STAFF)
    SubscribeStaff,
    /// Customer table screen; addressed by access token only
    SubscribeTable { access_token: String },
    Unsubscribe { topic: String },
    CallStaff {
        access_token: String,
        call_type: CallType,
    },
}

/// Server → client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Subscribed {
        topic: String,
    },
    Unsubscribed {
        topic: String,
    },
    Notification {
        topic: String,
        payload: Notification,
    },
    /// Acknowledges a `call_staff` command
    CallAccepted,
    Error {
        code: ErrorCode,
        message: String,
    },
}
