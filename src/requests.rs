//! Special prayer request intake and listing.

use crate::celebrations::Window;
use crate::store::{RequestStore, StoreError};
use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Minimum detail length when the request type is "Other".
pub const MIN_OTHER_DETAIL: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    #[serde(rename = "Orma Qurbana")]
    OrmaQurbana,
    #[serde(rename = "Special Qurbana")]
    SpecialQurbana,
    #[serde(rename = "Other Intercessory Prayers")]
    Other,
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestType::OrmaQurbana => write!(f, "Orma Qurbana"),
            RequestType::SpecialQurbana => write!(f, "Special Qurbana"),
            RequestType::Other => write!(f, "Other Intercessory Prayers"),
        }
    }
}

/// A recorded prayer request, attributed to the submitting member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialRequest {
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub member_avatar_url: String,
    /// Who the prayer is offered for.
    pub praying_for: String,
    pub request_type: RequestType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_request: Option<String>,
    /// The service date the request is for.
    pub request_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Submission form, not yet validated or timestamped.
#[derive(Debug, Clone)]
pub struct RequestInput {
    pub member_id: String,
    pub member_name: String,
    pub member_avatar_url: String,
    pub praying_for: String,
    pub request_type: RequestType,
    pub other_request: Option<String>,
    pub request_date: NaiveDate,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("a name to pray for is required")]
    MissingSubject,
    #[error("other intercessory prayers need at least {} characters of detail", MIN_OTHER_DETAIL)]
    MissingDetail,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validate a submission and stamp it with an id and creation time.
pub fn build_request(
    input: RequestInput,
    created_at: DateTime<Utc>,
) -> Result<SpecialRequest, RequestError> {
    let praying_for = input.praying_for.trim().to_string();
    if praying_for.is_empty() {
        return Err(RequestError::MissingSubject);
    }

    let other_request = input
        .other_request
        .map(|detail| detail.trim().to_string())
        .filter(|detail| !detail.is_empty());
    if input.request_type == RequestType::Other {
        let detail_len = other_request.as_deref().map_or(0, |detail| detail.chars().count());
        if detail_len < MIN_OTHER_DETAIL {
            return Err(RequestError::MissingDetail);
        }
    }

    Ok(SpecialRequest {
        id: Uuid::new_v4().to_string(),
        member_id: input.member_id,
        member_name: input.member_name,
        member_avatar_url: input.member_avatar_url,
        praying_for,
        request_type: input.request_type,
        other_request,
        request_date: input.request_date,
        created_at,
    })
}

/// Validate and persist a request, returning the stored record.
pub async fn submit_request(
    store: &dyn RequestStore,
    input: RequestInput,
) -> Result<SpecialRequest, RequestError> {
    let request = build_request(input, Utc::now())?;
    store.insert_request(request.clone()).await?;
    info!(
        "Recorded {} request from {} for service on {}",
        request.request_type, request.member_name, request.request_date
    );
    Ok(request)
}

/// Order requests by the service date they are for, earliest first.
pub fn sort_by_service_date(requests: &mut [SpecialRequest]) {
    requests.sort_by_key(|request| request.request_date);
}

/// Requests whose service date falls inside `window`.
pub fn within_window(requests: &[SpecialRequest], window: Window) -> Vec<&SpecialRequest> {
    requests.iter().filter(|request| window.contains(request.request_date)).collect()
}
