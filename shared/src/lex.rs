//! Amazon Lex v2 fulfillment event and response types.
//!
//! Only the fields the intent handlers touch are modeled; everything else
//! Lex sends is carried through untouched where it matters (request
//! attributes, session attributes).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Fulfillment event as delivered by Amazon Lex v2.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexEvent {
    pub session_state: SessionState,
    pub bot: BotContext,
    pub session_id: String,
    #[serde(default)]
    pub request_attributes: Option<HashMap<String, String>>,
    #[serde(default)]
    pub input_transcript: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotContext {
    #[serde(default)]
    pub name: Option<String>,
    pub locale_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub intent: Intent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_contexts: Option<Vec<ActiveContext>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_action: Option<DialogAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<HashMap<String, Option<Slot>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<FulfillmentState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_state: Option<ConfirmationState>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<SlotValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreted_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolved_values: Vec<String>,
}

impl SlotValue {
    /// A slot whose interpreted, original and resolved values all agree.
    pub fn literal(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            interpreted_value: Some(value.clone()),
            original_value: Some(value.clone()),
            resolved_values: vec![value],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FulfillmentState {
    InProgress,
    Fulfilled,
    Failed,
    ReadyForFulfillment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationState {
    None,
    Confirmed,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogActionType {
    Close,
    ConfirmIntent,
    Delegate,
    ElicitIntent,
    ElicitSlot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogAction {
    #[serde(rename = "type")]
    pub action_type: DialogActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_to_elicit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveContext {
    pub name: String,
    pub context_attributes: HashMap<String, String>,
    pub time_to_live: TimeToLive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeToLive {
    pub turns_to_live: u32,
    pub time_to_live_in_seconds: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub content_type: &'static str,
    pub content: String,
}

impl Message {
    pub fn plain_text(content: impl Into<String>) -> Self {
        Self {
            content_type: "PlainText",
            content: content.into(),
        }
    }
}

/// Response returned to Amazon Lex.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LexResponse {
    pub session_state: SessionState,
    pub messages: Option<Vec<Message>>,
    pub session_id: String,
    pub request_attributes: Option<HashMap<String, String>>,
}

/// First interpreted value of a named slot.
pub fn interpreted_slot<'a>(intent: &'a Intent, name: &str) -> Option<&'a str> {
    slot_value(intent, name)?.interpreted_value.as_deref()
}

/// First resolved value of a named slot.
pub fn resolved_slot<'a>(intent: &'a Intent, name: &str) -> Option<&'a str> {
    slot_value(intent, name)?
        .resolved_values
        .first()
        .map(String::as_str)
}

fn slot_value<'a>(intent: &'a Intent, name: &str) -> Option<&'a SlotValue> {
    intent.slots.as_ref()?.get(name)?.as_ref()?.value.as_ref()
}

/// Whether every declared slot has a value.
pub fn full_slots(intent: &Intent) -> bool {
    match &intent.slots {
        Some(slots) => slots.values().all(|s| s.is_some()),
        None => false,
    }
}

/// Whether every declared slot is still empty.
pub fn empty_slots(intent: &Intent) -> bool {
    match &intent.slots {
        Some(slots) => slots.values().all(|s| s.is_none()),
        None => true,
    }
}

/// Builder for responses sent back to Lex, mirroring the fields the
/// fulfillment contract accepts.
pub struct ReplyBuilder {
    event: LexEvent,
    message: Option<String>,
    state: FulfillmentState,
    action_type: DialogActionType,
    confirmation_state: Option<ConfirmationState>,
    slots: Option<HashMap<String, Option<Slot>>>,
    slot_to_elicit: Option<String>,
    active_context: Option<ActiveContext>,
}

impl LexEvent {
    /// Start building a reply; consumes the event since the intent and
    /// session fields are echoed back mutated.
    pub fn reply(self, state: FulfillmentState, action_type: DialogActionType) -> ReplyBuilder {
        ReplyBuilder {
            event: self,
            message: None,
            state,
            action_type,
            confirmation_state: None,
            slots: None,
            slot_to_elicit: None,
            active_context: None,
        }
    }

    /// Close the intent without a message (the closing response is
    /// configured on the bot itself).
    pub fn close(self, state: FulfillmentState) -> LexResponse {
        self.reply(state, DialogActionType::Close).build()
    }
}

impl ReplyBuilder {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn confirmation_state(mut self, state: ConfirmationState) -> Self {
        self.confirmation_state = Some(state);
        self
    }

    pub fn slots(mut self, slots: HashMap<String, Option<Slot>>) -> Self {
        self.slots = Some(slots);
        self
    }

    pub fn elicit(mut self, slot: impl Into<String>) -> Self {
        self.slot_to_elicit = Some(slot.into());
        self
    }

    pub fn active_context(mut self, context: ActiveContext) -> Self {
        self.active_context = Some(context);
        self
    }

    pub fn build(self) -> LexResponse {
        let mut intent = self.event.session_state.intent;
        intent.state = Some(self.state);
        if let Some(confirmation) = self.confirmation_state {
            intent.confirmation_state = Some(confirmation);
        }
        if let Some(slots) = self.slots {
            intent.slots = Some(slots);
        }

        LexResponse {
            session_state: SessionState {
                intent,
                session_attributes: self.event.session_state.session_attributes,
                active_contexts: self.active_context.map(|c| vec![c]),
                dialog_action: Some(DialogAction {
                    action_type: self.action_type,
                    slot_to_elicit: self.slot_to_elicit,
                }),
            },
            messages: self.message.map(|m| vec![Message::plain_text(m)]),
            session_id: self.event.session_id,
            request_attributes: self.event.request_attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> LexEvent {
        serde_json::from_value(serde_json::json!({
            "sessionId": "session-1",
            "bot": {"name": "TestBot", "localeId": "en_US"},
            "requestAttributes": {"email": "ada@example.com"},
            "sessionState": {
                "intent": {
                    "name": "WeatherForecast",
                    "slots": {
                        "City": {
                            "value": {
                                "interpretedValue": "toronto",
                                "originalValue": "toronto",
                                "resolvedValues": ["Toronto"]
                            }
                        }
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn deserializes_a_fulfillment_event() {
        let event = sample_event();
        assert_eq!(event.bot.locale_id, "en_US");
        assert_eq!(event.session_state.intent.name, "WeatherForecast");
        assert_eq!(
            resolved_slot(&event.session_state.intent, "City"),
            Some("Toronto")
        );
        assert_eq!(
            interpreted_slot(&event.session_state.intent, "City"),
            Some("toronto")
        );
    }

    #[test]
    fn missing_slot_reads_as_none() {
        let event = sample_event();
        assert_eq!(interpreted_slot(&event.session_state.intent, "Town"), None);
    }

    #[test]
    fn close_reply_echoes_session_and_has_no_messages() {
        let response = sample_event().close(FulfillmentState::Fulfilled);
        assert_eq!(response.session_id, "session-1");
        assert!(response.messages.is_none());
        assert_eq!(
            response.session_state.intent.state,
            Some(FulfillmentState::Fulfilled)
        );
        let action = response.session_state.dialog_action.unwrap();
        assert_eq!(action.action_type, DialogActionType::Close);
    }

    #[test]
    fn reply_builder_sets_message_and_elicits() {
        let response = sample_event()
            .reply(FulfillmentState::InProgress, DialogActionType::ElicitSlot)
            .message("What type of pizza would you like?")
            .elicit("type")
            .build();

        let rendered = serde_json::to_value(&response).unwrap();
        assert_eq!(rendered["messages"][0]["contentType"], "PlainText");
        assert_eq!(rendered["sessionState"]["dialogAction"]["type"], "ElicitSlot");
        assert_eq!(
            rendered["sessionState"]["dialogAction"]["slotToElicit"],
            "type"
        );
        assert_eq!(
            rendered["requestAttributes"]["email"],
            "ada@example.com"
        );
    }

    #[test]
    fn slot_fullness_checks() {
        let mut event = sample_event();
        assert!(full_slots(&event.session_state.intent));
        event
            .session_state
            .intent
            .slots
            .as_mut()
            .unwrap()
            .insert("Day".to_string(), None);
        assert!(!full_slots(&event.session_state.intent));
        assert!(!empty_slots(&event.session_state.intent));
    }
}
