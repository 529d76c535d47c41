//! DynamoDB Store implementation.

pub mod schema;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::storage::{BasketHead, BasketRecord, BasketSummary, Result, Store, StoreError};

/// DynamoDB implementation of [`Store`].
///
/// Reads are eventually consistent. The per-user listing goes through the
/// `userId`/`lastUpdated` local secondary index, which hands back the
/// partition in ascending write order.
pub struct DynamoStore {
    client: Client,
    table: String,
    index: String,
}

impl DynamoStore {
    /// Create a store from the ambient AWS configuration, applying any
    /// region or endpoint override (the endpoint override points at a
    /// local DynamoDB for offline development).
    pub async fn new(config: &StorageConfig) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);

        if let Some(region) = &config.region {
            builder = builder.region(aws_sdk_dynamodb::config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }

        let client = Client::from_conf(builder.build());
        info!(table = %config.table, index = %config.index, "Connected to DynamoDB");

        Self {
            client,
            table: config.table.clone(),
            index: config.index.clone(),
        }
    }

    /// Create from a pre-built client (for testing against a local endpoint).
    pub fn from_client(client: Client, table: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            index: index.into(),
        }
    }
}

#[async_trait]
impl Store for DynamoStore {
    async fn get(&self, user_id: &str, basket_id: &str) -> Result<Option<BasketHead>> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(schema::ATTR_USER_ID, AttributeValue::S(user_id.to_string()))
            .key(
                schema::ATTR_BASKET_ID,
                AttributeValue::S(basket_id.to_string()),
            )
            .projection_expression(schema::PROJECTION_HEAD)
            .expression_attribute_names(schema::DATA_PLACEHOLDER, schema::ATTR_DATA)
            .consistent_read(false)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("DynamoDB GetItem failed: {e}")))?;

        match response.item() {
            Some(item) => Ok(Some(schema::item_to_head(item)?)),
            None => Ok(None),
        }
    }

    async fn query(&self, user_id: &str) -> Result<Vec<BasketSummary>> {
        let mut summaries = Vec::new();
        let mut last_evaluated_key = None;

        // Ascending index order (ScanIndexForward defaults to true); the
        // pagination loop preserves it across pages.
        loop {
            let mut request = self
                .client
                .query()
                .table_name(&self.table)
                .index_name(&self.index)
                .key_condition_expression(schema::KEY_CONDITION_USER)
                .expression_attribute_values(":userId", AttributeValue::S(user_id.to_string()))
                .expression_attribute_names(schema::DATA_PLACEHOLDER, schema::ATTR_DATA)
                .projection_expression(schema::PROJECTION_SUMMARY)
                .consistent_read(false);

            if let Some(key) = last_evaluated_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }

            let response = request
                .send()
                .await
                .map_err(|e| StoreError::Unavailable(format!("DynamoDB Query failed: {e}")))?;

            for item in response.items() {
                summaries.push(schema::item_to_summary(item)?);
            }

            match response.last_evaluated_key() {
                Some(key) if !key.is_empty() => {
                    last_evaluated_key = Some(key.clone());
                }
                _ => break,
            }
        }

        debug!(user_id = %user_id, count = summaries.len(), "Queried baskets");
        Ok(summaries)
    }

    async fn put(&self, record: BasketRecord) -> Result<()> {
        let item = schema::record_to_item(&record);

        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("DynamoDB PutItem failed: {e}")))?;

        debug!(
            user_id = %record.user_id,
            basket_id = %record.basket_id,
            "Stored basket record"
        );
        Ok(())
    }

    async fn update_login(
        &self,
        user_id: &str,
        basket_id: &str,
        login_id: &str,
        last_updated: i64,
    ) -> Result<()> {
        self.client
            .update_item()
            .table_name(&self.table)
            .key(schema::ATTR_USER_ID, AttributeValue::S(user_id.to_string()))
            .key(
                schema::ATTR_BASKET_ID,
                AttributeValue::S(basket_id.to_string()),
            )
            .update_expression(schema::UPDATE_LOGIN)
            .expression_attribute_values(":loginId", AttributeValue::S(login_id.to_string()))
            .expression_attribute_values(":lastUpdated", AttributeValue::N(last_updated.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("DynamoDB UpdateItem failed: {e}")))?;

        debug!(
            user_id = %user_id,
            basket_id = %basket_id,
            "Stamped login onto basket record"
        );
        Ok(())
    }
}
