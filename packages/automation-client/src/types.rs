use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body for the row-creation service.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRowsRequest {
    #[serde(rename = "sourceRecordId")]
    pub source_record_id: Uuid,
    pub platforms: Vec<String>,
}

/// Response from the row-creation service.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRowsResponse {
    #[serde(rename = "newRecords", default)]
    pub new_records: Vec<NewRecord>,
}

/// A record created by the row-creation service.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecord {
    pub id: Uuid,
    pub platform: String,
    #[serde(rename = "contentGroupId")]
    pub content_group_id: Option<Uuid>,
}

/// Flat publish command for the automation endpoint.
///
/// Every platform field is always present; platforms that are not part of the
/// command serialize as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishCommandBody {
    pub facebook_post_id: Option<Uuid>,
    pub instagram_post_id: Option<Uuid>,
    pub linkedin_post_id: Option<Uuid>,
    pub tiktok_post_id: Option<Uuid>,
    pub user_id: Uuid,
}

impl PublishCommandBody {
    /// Empty command for a user (no platform selected yet).
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            facebook_post_id: None,
            instagram_post_id: None,
            linkedin_post_id: None,
            tiktok_post_id: None,
            user_id,
        }
    }
}
