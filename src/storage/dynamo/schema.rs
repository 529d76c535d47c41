//! Attribute names and expressions for the baskets table.
//!
//! Table schema:
//! - PK: `userId` (String), SK: `basketId` (String)
//! - LSI: `userId` partition, `lastUpdated` sort, projecting
//!   `userId, basketId, data`
//! - TTL attribute: `expiresAt` (Number, epoch seconds)

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use crate::storage::{BasketHead, BasketRecord, BasketSummary, Result, StoreError};

pub const ATTR_USER_ID: &str = "userId";
pub const ATTR_BASKET_ID: &str = "basketId";
pub const ATTR_DATA: &str = "data";
pub const ATTR_LOGIN_ID: &str = "loginId";
pub const ATTR_LAST_UPDATED: &str = "lastUpdated";
pub const ATTR_EXPIRES_AT: &str = "expiresAt";

/// `data` is a DynamoDB reserved word; every expression that touches it
/// goes through this placeholder.
pub const DATA_PLACEHOLDER: &str = "#data";

/// Point-read projection.
pub const PROJECTION_HEAD: &str = "userId, #data, loginId";
/// Index-query projection.
pub const PROJECTION_SUMMARY: &str = "userId, basketId, #data";
/// Key condition for a whole-partition index query.
pub const KEY_CONDITION_USER: &str = "userId = :userId";
/// Partial update stamping a login onto one record.
pub const UPDATE_LOGIN: &str = "SET loginId = :loginId, lastUpdated = :lastUpdated";

/// Marshall a record into a full DynamoDB item.
pub fn record_to_item(record: &BasketRecord) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert(
        ATTR_USER_ID.to_string(),
        AttributeValue::S(record.user_id.clone()),
    );
    item.insert(
        ATTR_BASKET_ID.to_string(),
        AttributeValue::S(record.basket_id.clone()),
    );
    item.insert(
        ATTR_DATA.to_string(),
        AttributeValue::S(record.data.clone()),
    );
    if let Some(login_id) = &record.login_id {
        item.insert(ATTR_LOGIN_ID.to_string(), AttributeValue::S(login_id.clone()));
    }
    item.insert(
        ATTR_LAST_UPDATED.to_string(),
        AttributeValue::N(record.last_updated.to_string()),
    );
    item.insert(
        ATTR_EXPIRES_AT.to_string(),
        AttributeValue::N(record.expires_at.to_string()),
    );
    item
}

/// Parse a point-read item into its head projection.
pub fn item_to_head(item: &HashMap<String, AttributeValue>) -> Result<BasketHead> {
    Ok(BasketHead {
        user_id: required_s(item, ATTR_USER_ID)?,
        data: required_s(item, ATTR_DATA)?,
        login_id: optional_s(item, ATTR_LOGIN_ID),
    })
}

/// Parse an index-query item into its summary projection.
pub fn item_to_summary(item: &HashMap<String, AttributeValue>) -> Result<BasketSummary> {
    Ok(BasketSummary {
        user_id: required_s(item, ATTR_USER_ID)?,
        basket_id: required_s(item, ATTR_BASKET_ID)?,
        data: required_s(item, ATTR_DATA)?,
    })
}

fn required_s(item: &HashMap<String, AttributeValue>, name: &str) -> Result<String> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| StoreError::MalformedItem(format!("missing string attribute {name}")))
}

fn optional_s(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}
