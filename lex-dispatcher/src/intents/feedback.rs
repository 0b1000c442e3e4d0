//! LeaveFeedback intent: store the collected slots in DynamoDB.

use shared::lex::{interpreted_slot, FulfillmentState, LexEvent, LexResponse};
use shared::storage::{put_feedback, FeedbackRecord};
use shared::Result;
use tracing::{error, info};

use crate::AppState;

pub async fn save_feedback(state: &AppState, event: LexEvent) -> Result<LexResponse> {
    let Some(table) = state.config.feedback_table.as_deref() else {
        error!("FEEDBACK_TABLE is not configured");
        return Ok(event.close(FulfillmentState::Failed));
    };

    let record = match collected_record(&event) {
        Some(record) => record,
        None => {
            error!("LeaveFeedback event is missing slot values");
            return Ok(event.close(FulfillmentState::Failed));
        }
    };

    match put_feedback(&state.dynamo, table, &record).await {
        Ok(id) => {
            // Identifiers stay out of the logs for child-directed deployments.
            if !state.config.child_directed {
                info!(table, uuid = %id, "feedback stored");
            }
            Ok(event.close(FulfillmentState::Fulfilled))
        }
        Err(e) => {
            error!(table, error = %e, "unable to put item");
            Ok(event.close(FulfillmentState::Failed))
        }
    }
}

fn collected_record(event: &LexEvent) -> Option<FeedbackRecord> {
    let intent = &event.session_state.intent;
    Some(FeedbackRecord {
        first_name: interpreted_slot(intent, "firstName")?.to_string(),
        last_name: interpreted_slot(intent, "lastName")?.to_string(),
        feedback: interpreted_slot(intent, "feedback")?.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback_event() -> LexEvent {
        serde_json::from_value(serde_json::json!({
            "sessionId": "session-1",
            "bot": {"localeId": "en_US"},
            "sessionState": {
                "intent": {
                    "name": "LeaveFeedback",
                    "slots": {
                        "firstName": {"value": {"interpretedValue": "Ada"}},
                        "lastName": {"value": {"interpretedValue": "Lovelace"}},
                        "feedback": {"value": {"interpretedValue": "Great bot"}}
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn collects_all_three_slots() {
        let record = collected_record(&feedback_event()).unwrap();
        assert_eq!(record.first_name, "Ada");
        assert_eq!(record.last_name, "Lovelace");
        assert_eq!(record.feedback, "Great bot");
    }

    #[test]
    fn missing_slot_means_nothing_to_store() {
        let mut event = feedback_event();
        event
            .session_state
            .intent
            .slots
            .as_mut()
            .unwrap()
            .remove("feedback");
        assert!(collected_record(&event).is_none());
    }

    #[test]
    fn close_reply_has_no_message() {
        let response = feedback_event().close(FulfillmentState::Fulfilled);
        assert!(response.messages.is_none());
        assert_eq!(
            response.session_state.intent.state,
            Some(FulfillmentState::Fulfilled)
        );
    }
}
