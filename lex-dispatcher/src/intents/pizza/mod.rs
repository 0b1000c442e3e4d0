//! PizzaOrder intent: menu, repeat-last-order, confirmation, and placement.

mod responses;

use std::collections::HashMap;

use chrono::Utc;
use rand::Rng;
use shared::lex::{
    empty_slots, full_slots, resolved_slot, ActiveContext, ConfirmationState, DialogActionType,
    FulfillmentState, LexEvent, LexResponse, Slot, SlotValue, TimeToLive,
};
use shared::storage::{last_pizza_order, put_pizza_order, LastOrder, PizzaOrderRecord};
use shared::{Error, Locale, Result};
use tracing::{error, info, warn};

use crate::menu::calculate_bill;
use crate::AppState;

use responses::{
    cancel_message, confirmation_message, fulfilled_message, menu_message, repeat_message,
};

const SLOT_NAMES: [&str; 4] = ["type", "size", "crust", "count"];

pub async fn handle_order(state: &AppState, event: LexEvent) -> Result<LexResponse> {
    let locale = Locale::parse(&event.bot.locale_id)?;
    let order_id = generate_order_id();

    match event.session_state.intent.state {
        Some(FulfillmentState::InProgress) | None => {
            handle_in_progress(state, event, locale, order_id).await
        }
        Some(FulfillmentState::ReadyForFulfillment) => {
            place_order(state, event, locale, order_id).await
        }
        Some(other) => Err(Error::Validation(format!(
            "unexpected intent state {other:?} for PizzaOrder"
        ))),
    }
}

async fn handle_in_progress(
    state: &AppState,
    event: LexEvent,
    locale: Locale,
    order_id: String,
) -> Result<LexResponse> {
    let intent = &event.session_state.intent;
    if full_slots(intent) {
        handle_full_slots(state, event, locale, order_id).await
    } else if empty_slots(intent) {
        handle_empty_slots(state, event, locale).await
    } else {
        // Some slots are still open; let Lex elicit them from its own
        // slot prompts.
        Ok(event
            .reply(FulfillmentState::InProgress, DialogActionType::Delegate)
            .message("next slot value")
            .build())
    }
}

/// All slots are filled: confirm, re-elicit after a declined repeat order,
/// cancel, or place.
async fn handle_full_slots(
    state: &AppState,
    event: LexEvent,
    locale: Locale,
    order_id: String,
) -> Result<LexResponse> {
    match event.session_state.intent.confirmation_state {
        None | Some(ConfirmationState::None) => {
            let summary = order_summary(&event, locale)?;
            Ok(event
                .reply(FulfillmentState::InProgress, DialogActionType::ConfirmIntent)
                .message(summary)
                .build())
        }
        Some(ConfirmationState::Denied) => {
            let declined_repeat = event
                .session_state
                .active_contexts
                .as_ref()
                .is_some_and(|contexts| !contexts.is_empty());

            if declined_repeat {
                // The customer rejected repeating the last order: start a
                // fresh one without the welcome message.
                Ok(event
                    .reply(FulfillmentState::InProgress, DialogActionType::ElicitSlot)
                    .message(menu_message(locale, false))
                    .slots(empty_slot_values())
                    .elicit("type")
                    .build())
            } else {
                Ok(event
                    .reply(FulfillmentState::Failed, DialogActionType::Close)
                    .message(cancel_message(locale))
                    .build())
            }
        }
        Some(ConfirmationState::Confirmed) => place_order(state, event, locale, order_id).await,
    }
}

/// All slots are empty: offer to repeat the last order, or present the menu.
async fn handle_empty_slots(
    state: &AppState,
    event: LexEvent,
    locale: Locale,
) -> Result<LexResponse> {
    match previous_order(state, &event).await {
        Some(last_order) => {
            let message = repeat_message(locale, &last_order);
            Ok(event
                .reply(FulfillmentState::InProgress, DialogActionType::ConfirmIntent)
                .message(message)
                .slots(slots_from_last_order(&last_order))
                .active_context(repeat_order_context())
                .build())
        }
        None => Ok(event
            .reply(FulfillmentState::InProgress, DialogActionType::ElicitSlot)
            .message(menu_message(locale, true))
            .elicit("type")
            .build()),
    }
}

async fn place_order(
    state: &AppState,
    event: LexEvent,
    locale: Locale,
    order_id: String,
) -> Result<LexResponse> {
    let customer_id = customer_email(&event)?.to_string();

    let placed = async {
        let table = state
            .config
            .pizza_orders_table
            .as_deref()
            .ok_or_else(|| Error::Config("PIZZA_ORDERS_TABLE not set".to_string()))?;

        let intent = &event.session_state.intent;
        let slot = |name: &str| {
            resolved_slot(intent, name)
                .ok_or_else(|| Error::Validation(format!("slot {name} has no resolved value")))
        };
        let pizza_type = slot("type")?.to_string();
        let pizza_size = slot("size")?.to_string();
        let pizza_crust = slot("crust")?.to_string();
        let pizza_count = slot("count")?.to_string();

        let total_bill = calculate_bill(locale, &pizza_type, &pizza_size, &pizza_count)?;
        let record = PizzaOrderRecord {
            order_id: order_id.clone(),
            customer_id,
            pizza_type,
            pizza_size,
            pizza_crust,
            pizza_count: pizza_count.parse().unwrap_or(1),
            bot_locale: locale.lex_id().to_string(),
            total_bill: total_bill.clone(),
            order_timestamp: Utc::now().timestamp_millis() as f64 / 1000.0,
        };
        put_pizza_order(&state.dynamo, table, &record).await?;
        Ok::<String, Error>(total_bill)
    }
    .await;

    match placed {
        Ok(total_bill) => {
            info!(order_id = %order_id, "placed order");
            Ok(event
                .reply(FulfillmentState::Fulfilled, DialogActionType::Close)
                .message(fulfilled_message(locale, &order_id, &total_bill))
                .build())
        }
        Err(e) => {
            error!(order_id = %order_id, error = %e, "unable to place order");
            Ok(event
                .reply(FulfillmentState::Failed, DialogActionType::Close)
                .message(cancel_message(locale))
                .build())
        }
    }
}

fn order_summary(event: &LexEvent, locale: Locale) -> Result<String> {
    let intent = &event.session_state.intent;
    let slot = |name: &str| {
        resolved_slot(intent, name)
            .ok_or_else(|| Error::Validation(format!("slot {name} has no resolved value")))
    };
    Ok(confirmation_message(
        locale,
        slot("type")?,
        slot("size")?,
        slot("count")?,
        slot("crust")?,
    ))
}

/// Most recent order for the calling customer, if the deployment tracks
/// orders and the lookup succeeds.
async fn previous_order(state: &AppState, event: &LexEvent) -> Option<LastOrder> {
    let email = match customer_email(event) {
        Ok(email) => email,
        Err(_) => {
            warn!("request is missing the customer email attribute");
            return None;
        }
    };

    let (table, index) = match (
        state.config.pizza_orders_table.as_deref(),
        state.config.pizza_orders_index.as_deref(),
    ) {
        (Some(table), Some(index)) => (table, index),
        _ => return None,
    };

    match last_pizza_order(&state.dynamo, table, index, email).await {
        Ok(last) => last,
        Err(e) => {
            warn!(error = %e, "unable to look up the previous order");
            None
        }
    }
}

fn customer_email(event: &LexEvent) -> Result<&str> {
    event
        .request_attributes
        .as_ref()
        .and_then(|attributes| attributes.get("email"))
        .map(String::as_str)
        .ok_or_else(|| Error::Validation("request attributes carry no email".to_string()))
}

fn slots_from_last_order(last_order: &LastOrder) -> HashMap<String, Option<Slot>> {
    HashMap::from([
        (
            "type".to_string(),
            Some(Slot {
                value: Some(SlotValue::literal(last_order.pizza_type.clone())),
            }),
        ),
        (
            "size".to_string(),
            Some(Slot {
                value: Some(SlotValue::literal(last_order.pizza_size.clone())),
            }),
        ),
        (
            "crust".to_string(),
            Some(Slot {
                value: Some(SlotValue::literal(last_order.pizza_crust.clone())),
            }),
        ),
        (
            "count".to_string(),
            Some(Slot {
                value: Some(SlotValue::literal(last_order.pizza_count.clone())),
            }),
        ),
    ])
}

fn empty_slot_values() -> HashMap<String, Option<Slot>> {
    SLOT_NAMES
        .iter()
        .map(|name| {
            (
                name.to_string(),
                Some(Slot {
                    value: Some(SlotValue::default()),
                }),
            )
        })
        .collect()
}

fn repeat_order_context() -> ActiveContext {
    ActiveContext {
        name: "repeatOrder".to_string(),
        context_attributes: HashMap::from([(
            "repeatLastOrder".to_string(),
            "Pending".to_string(),
        )]),
        time_to_live: TimeToLive {
            turns_to_live: 2,
            time_to_live_in_seconds: 300,
        },
    }
}

/// Order id in `xxxx-xxxx-xxxx-xxxx` form: a random prefix plus slices of
/// the current timestamp.
fn generate_order_id() -> String {
    let timestamp = Utc::now().timestamp_micros().to_string();
    let prefix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!(
        "{prefix}-{}-{}-{}",
        &timestamp[4..8],
        &timestamp[8..12],
        &timestamp[12..16]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Provider, WeatherClient};

    fn stub_state() -> AppState {
        AppState::stub(WeatherClient::new(Provider::Stub, ""))
    }

    fn order_event(slots: serde_json::Value, extra_state: serde_json::Value) -> LexEvent {
        let mut event = serde_json::json!({
            "sessionId": "session-1",
            "bot": {"localeId": "en_US"},
            "requestAttributes": {"email": "ada@example.com"},
            "sessionState": {
                "intent": {
                    "name": "PizzaOrder",
                    "state": "InProgress",
                    "slots": slots
                }
            }
        });
        if let Some(extra) = extra_state.as_object() {
            for (key, value) in extra {
                if key == "confirmationState" {
                    event["sessionState"]["intent"]["confirmationState"] = value.clone();
                } else {
                    event["sessionState"][key] = value.clone();
                }
            }
        }

        serde_json::from_value(event).unwrap()
    }

    fn filled_slots() -> serde_json::Value {
        serde_json::json!({
            "type": {"value": {"interpretedValue": "Pepperoni", "resolvedValues": ["Pepperoni"]}},
            "size": {"value": {"interpretedValue": "large", "resolvedValues": ["large"]}},
            "crust": {"value": {"interpretedValue": "thin", "resolvedValues": ["thin"]}},
            "count": {"value": {"interpretedValue": "2", "resolvedValues": ["2"]}}
        })
    }

    fn null_slots() -> serde_json::Value {
        serde_json::json!({"type": null, "size": null, "crust": null, "count": null})
    }

    #[test]
    fn order_ids_are_four_groups_of_four() {
        let order_id = generate_order_id();
        let groups: Vec<&str> = order_id.split('-').collect();
        assert_eq!(groups.len(), 4);
        for group in groups {
            assert_eq!(group.len(), 4);
            assert!(group.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn unconfirmed_full_slots_prompt_for_confirmation() {
        let state = stub_state();
        let event = order_event(filled_slots(), serde_json::json!({}));
        let response = handle_order(&state, event).await.unwrap();

        let action = response.session_state.dialog_action.unwrap();
        assert_eq!(action.action_type, DialogActionType::ConfirmIntent);
        let message = &response.messages.unwrap()[0].content;
        assert!(message.contains("Type: Pepperoni"));
        assert!(message.contains("Number of Pizzas: 2"));
    }

    #[tokio::test]
    async fn denied_repeat_order_starts_a_fresh_order() {
        let state = stub_state();
        let event = order_event(
            filled_slots(),
            serde_json::json!({
                "confirmationState": "Denied",
                "activeContexts": [{
                    "name": "repeatOrder",
                    "contextAttributes": {"repeatLastOrder": "Pending"},
                    "timeToLive": {"turnsToLive": 2, "timeToLiveInSeconds": 300}
                }]
            }),
        );
        let response = handle_order(&state, event).await.unwrap();

        let action = response.session_state.dialog_action.unwrap();
        assert_eq!(action.action_type, DialogActionType::ElicitSlot);
        assert_eq!(action.slot_to_elicit.as_deref(), Some("type"));
        let message = &response.messages.unwrap()[0].content;
        assert!(message.starts_with("Our Pizza menu includes: "));

        let slots = response.session_state.intent.slots.unwrap();
        let emptied = slots["type"].as_ref().unwrap().value.as_ref().unwrap();
        assert!(emptied.interpreted_value.is_none());
    }

    #[tokio::test]
    async fn denied_new_order_cancels() {
        let state = stub_state();
        let event = order_event(
            filled_slots(),
            serde_json::json!({"confirmationState": "Denied"}),
        );
        let response = handle_order(&state, event).await.unwrap();

        assert_eq!(
            response.session_state.intent.state,
            Some(FulfillmentState::Failed)
        );
        assert_eq!(
            response.messages.unwrap()[0].content,
            "Your order has been cancelled. Thank you!"
        );
    }

    #[tokio::test]
    async fn empty_slots_without_history_present_the_menu() {
        let state = stub_state();
        let event = order_event(null_slots(), serde_json::json!({}));
        let response = handle_order(&state, event).await.unwrap();

        let action = response.session_state.dialog_action.unwrap();
        assert_eq!(action.action_type, DialogActionType::ElicitSlot);
        let message = &response.messages.unwrap()[0].content;
        assert!(message.starts_with("Welcome to our Pizza Ordering Service. "));
    }

    #[tokio::test]
    async fn partial_slots_delegate_back_to_lex() {
        let state = stub_state();
        let mut slots = null_slots();
        slots["type"] =
            serde_json::json!({"value": {"interpretedValue": "Pepperoni", "resolvedValues": ["Pepperoni"]}});
        let event = order_event(slots, serde_json::json!({}));
        let response = handle_order(&state, event).await.unwrap();

        let action = response.session_state.dialog_action.unwrap();
        assert_eq!(action.action_type, DialogActionType::Delegate);
    }

    #[test]
    fn repeat_slots_mirror_the_last_order() {
        let last = LastOrder {
            pizza_type: "Hawaiian".to_string(),
            pizza_size: "medium".to_string(),
            pizza_crust: "stuffed".to_string(),
            pizza_count: "3".to_string(),
        };
        let slots = slots_from_last_order(&last);
        let value = slots["count"].as_ref().unwrap().value.as_ref().unwrap();
        assert_eq!(value.interpreted_value.as_deref(), Some("3"));
        assert_eq!(value.resolved_values, vec!["3"]);
    }
}
