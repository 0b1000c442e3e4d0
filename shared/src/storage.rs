//! DynamoDB persistence for collected answers and pizza orders.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use tracing::info;
use uuid::Uuid;

use crate::{Error, Result};

/// Answers collected by a feedback conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub first_name: String,
    pub last_name: String,
    pub feedback: String,
}

/// A placed pizza order.
#[derive(Debug, Clone, PartialEq)]
pub struct PizzaOrderRecord {
    pub order_id: String,
    pub customer_id: String,
    pub pizza_type: String,
    pub pizza_size: String,
    pub pizza_crust: String,
    pub pizza_count: u32,
    pub bot_locale: String,
    pub total_bill: String,
    /// Seconds since the epoch, recorded at order time.
    pub order_timestamp: f64,
}

/// The order details relevant when offering to repeat a previous order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastOrder {
    pub pizza_type: String,
    pub pizza_size: String,
    pub pizza_crust: String,
    pub pizza_count: String,
}

/// Write a feedback record keyed by a fresh UUID. Returns the key.
pub async fn put_feedback(
    client: &DynamoClient,
    table: &str,
    record: &FeedbackRecord,
) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    let mut request = client.put_item().table_name(table);
    for (key, value) in feedback_item(&id, record) {
        request = request.item(key, value);
    }
    request
        .send()
        .await
        .map_err(|e| Error::Storage(format!("failed to put item in table {table}: {e}")))?;

    info!(table, uuid = %id, "stored feedback record");
    Ok(id)
}

/// The customer's most recent order, if any.
pub async fn last_pizza_order(
    client: &DynamoClient,
    table: &str,
    index: &str,
    customer_id: &str,
) -> Result<Option<LastOrder>> {
    let response = client
        .query()
        .table_name(table)
        .index_name(index)
        .key_condition_expression("customerId = :email")
        .expression_attribute_values(":email", AttributeValue::S(customer_id.to_string()))
        .scan_index_forward(false)
        .send()
        .await
        .map_err(|e| Error::Storage(format!("failed to query table {table}: {e}")))?;

    Ok(response.items().first().and_then(last_order_from_item))
}

/// Record a placed order.
pub async fn put_pizza_order(
    client: &DynamoClient,
    table: &str,
    order: &PizzaOrderRecord,
) -> Result<()> {
    let mut request = client.put_item().table_name(table);
    for (key, value) in order_item(order) {
        request = request.item(key, value);
    }
    request
        .send()
        .await
        .map_err(|e| Error::Storage(format!("failed to put item in table {table}: {e}")))?;

    info!(table, order_id = %order.order_id, "placed order");
    Ok(())
}

fn feedback_item(id: &str, record: &FeedbackRecord) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("uuid".to_string(), AttributeValue::S(id.to_string())),
        (
            "FirstName".to_string(),
            AttributeValue::S(record.first_name.clone()),
        ),
        (
            "LastName".to_string(),
            AttributeValue::S(record.last_name.clone()),
        ),
        (
            "Feedback".to_string(),
            AttributeValue::S(record.feedback.clone()),
        ),
    ])
}

fn order_item(order: &PizzaOrderRecord) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            "orderId".to_string(),
            AttributeValue::S(order.order_id.clone()),
        ),
        (
            "orderTimestamp".to_string(),
            AttributeValue::N(order.order_timestamp.to_string()),
        ),
        (
            "customerId".to_string(),
            AttributeValue::S(order.customer_id.clone()),
        ),
        (
            "pizzaType".to_string(),
            AttributeValue::S(order.pizza_type.clone()),
        ),
        (
            "pizzaSize".to_string(),
            AttributeValue::S(order.pizza_size.clone()),
        ),
        (
            "pizzaCrust".to_string(),
            AttributeValue::S(order.pizza_crust.clone()),
        ),
        (
            "pizzaCount".to_string(),
            AttributeValue::N(order.pizza_count.to_string()),
        ),
        (
            "botLanguage".to_string(),
            AttributeValue::S(order.bot_locale.clone()),
        ),
        (
            "orderTotalBill".to_string(),
            AttributeValue::N(order.total_bill.clone()),
        ),
    ])
}

fn last_order_from_item(item: &HashMap<String, AttributeValue>) -> Option<LastOrder> {
    let string = |key: &str| item.get(key)?.as_s().ok().cloned();
    let number = |key: &str| item.get(key)?.as_n().ok().cloned();

    Some(LastOrder {
        pizza_type: string("pizzaType")?,
        pizza_size: string("pizzaSize")?,
        pizza_crust: string("pizzaCrust")?,
        pizza_count: number("pizzaCount")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_item_carries_all_answers() {
        let record = FeedbackRecord {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            feedback: "Great bot".to_string(),
        };
        let item = feedback_item("key-1", &record);
        assert_eq!(item["uuid"], AttributeValue::S("key-1".to_string()));
        assert_eq!(item["FirstName"], AttributeValue::S("Ada".to_string()));
        assert_eq!(item["Feedback"], AttributeValue::S("Great bot".to_string()));
    }

    #[test]
    fn order_round_trips_through_item_shape() {
        let order = PizzaOrderRecord {
            order_id: "1234-5678-9012-3456".to_string(),
            customer_id: "ada@example.com".to_string(),
            pizza_type: "Margherita".to_string(),
            pizza_size: "large".to_string(),
            pizza_crust: "thin".to_string(),
            pizza_count: 2,
            bot_locale: "en_US".to_string(),
            total_bill: "45.20".to_string(),
            order_timestamp: 1700000000.0,
        };

        let item = order_item(&order);
        let last = last_order_from_item(&item).unwrap();
        assert_eq!(last.pizza_type, "Margherita");
        assert_eq!(last.pizza_size, "large");
        assert_eq!(last.pizza_crust, "thin");
        assert_eq!(last.pizza_count, "2");
    }

    #[test]
    fn partial_item_yields_no_last_order() {
        let mut item = HashMap::new();
        item.insert(
            "pizzaType".to_string(),
            AttributeValue::S("Margherita".to_string()),
        );
        assert!(last_order_from_item(&item).is_none());
    }
}
