//! Step-driven dialog engine for the sample bots.
//!
//! The conversation state lives entirely in the event payload: the caller
//! sends the payload back unchanged every turn, the handler advances the
//! `step` counter and echoes the mutated payload in its reply. A payload
//! without a `step` starts the conversation; `endConversation` in the reply
//! tells the caller to discard it.
//!
//! The first two interactions (name, last name) and the closing statements
//! are common to every sample bot; what differs is the final question and
//! how its answer is validated, supplied through [`DialogScript`].

use serde::{Deserialize, Serialize};

use crate::locale::Locale;
use crate::{Error, Result};

/// Free-text answer collected on a previous turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAnswer {
    pub response: String,
}

/// The mutable conversation payload round-tripped between caller and handler.
///
/// Fields this engine does not know about are preserved verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationPayload {
    pub lang: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<SlotAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<SlotAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwd: Option<SlotAnswer>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ConversationPayload {
    /// Start-of-conversation payload for the given locale tag.
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            step: None,
            count: None,
            name: None,
            last_name: None,
            pwd: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Whether the final validated answer was accepted.
    pub fn completed(&self) -> bool {
        self.step == Some(5)
    }
}

/// Prompt text rendered both as display text and speech.
#[derive(Debug, Clone, Serialize)]
pub struct Ask {
    pub text: String,
    pub speech: String,
}

impl Ask {
    fn spoken(text: String) -> Self {
        Self {
            speech: text.clone(),
            text,
        }
    }
}

/// One turn of the conversation as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    /// Identifier of the slot the caller should collect next.
    pub id: &'static str,
    pub ask: Ask,
    pub payload: ConversationPayload,
    #[serde(rename = "endConversation", skip_serializing_if = "Option::is_none")]
    pub end_conversation: Option<bool>,
}

/// The channel envelope the web client expects.
#[derive(Debug, Clone, Serialize)]
pub struct StepperReply {
    #[serde(rename = "asyncConversation")]
    pub conversation: Turn,
}

impl StepperReply {
    pub fn payload(&self) -> &ConversationPayload {
        &self.conversation.payload
    }

    pub fn is_final(&self) -> bool {
        self.conversation.end_conversation == Some(true)
    }
}

/// The bot-specific part of a stepped dialog.
pub trait DialogScript {
    /// Question asked at the third interaction, once name and last name are known.
    fn final_question(&self, locale: Locale, name: &str, last_name: &str) -> String;

    /// Re-prompt after the first failed validation.
    fn retry_message(&self, locale: Locale, name: &str) -> String;

    /// Validate the answer to the final question.
    fn validate(&self, locale: Locale, answer: &str) -> bool;
}

/// One retry at the validation step, then the conversation is ended.
const MAX_ATTEMPTS: u32 = 2;

/// Advance the conversation one turn.
///
/// `step` only ever increases, except that a failed validation repeats
/// step 4 once. Replaying an unmodified payload reproduces the same reply.
pub fn advance(mut payload: ConversationPayload, script: &impl DialogScript) -> Result<StepperReply> {
    let locale = Locale::parse(&payload.lang)?;

    match payload.step {
        None => {
            payload.step = Some(2);
            Ok(reply("name", greeting(locale).to_string(), payload, false))
        }
        Some(2) => {
            let name = answer(&payload.name, "name")?.to_string();
            payload.step = Some(3);
            let ask = ask_last_name(locale, &name);
            Ok(reply("last_name", ask, payload, false))
        }
        Some(3) => {
            let name = answer(&payload.name, "name")?.to_string();
            let last_name = answer(&payload.last_name, "last_name")?.to_string();
            payload.step = Some(4);
            let ask = script.final_question(locale, &name, &last_name);
            Ok(reply("pwd", ask, payload, false))
        }
        Some(4) => {
            let given = answer(&payload.pwd, "pwd")?.to_string();
            if script.validate(locale, &given) {
                payload.step = Some(5);
                Ok(reply("confirma", success(locale).to_string(), payload, true))
            } else {
                let attempt = payload.count.unwrap_or(0) + 1;
                payload.count = Some(1);
                if attempt < MAX_ATTEMPTS {
                    let name = answer(&payload.name, "name")?.to_string();
                    let ask = script.retry_message(locale, &name);
                    Ok(reply("pwd", ask, payload, false))
                } else {
                    Ok(reply("pwd", give_up(locale).to_string(), payload, true))
                }
            }
        }
        Some(5) => Err(Error::Validation(
            "conversation already ended, expected the payload to be discarded".to_string(),
        )),
        Some(other) => Err(Error::Validation(format!("unknown dialog step {other}"))),
    }
}

fn reply(
    id: &'static str,
    ask: String,
    payload: ConversationPayload,
    terminal: bool,
) -> StepperReply {
    StepperReply {
        conversation: Turn {
            id,
            ask: Ask::spoken(ask),
            payload,
            end_conversation: terminal.then_some(true),
        },
    }
}

fn answer<'a>(slot: &'a Option<SlotAnswer>, what: &str) -> Result<&'a str> {
    slot.as_ref()
        .map(|a| a.response.as_str())
        .ok_or_else(|| Error::Validation(format!("payload is missing the {what} answer")))
}

fn greeting(locale: Locale) -> &'static str {
    match locale {
        Locale::PtBr => "Olá, esta é a interação 1. Qual o seu nome?",
        Locale::EsUs => "Hola, esta es la interacción 1. ¿Cuál es su nombre?",
        Locale::EnUs => "Hello, this is the interaction 1. What's your name?",
        Locale::FrFr => "Bonjour, ceci est l'interaction 1. Quel est votre nom?",
        Locale::ItIt => "Ciao, questo è l'interazione 1. Qual è il tuo nome?",
        Locale::DeDe => "Hallo, dies ist die Interaktion 1. Was ist Ihr Name?",
        Locale::RuRu => "Здравствуйте, это взаимодействие 1. Каково ваше имя?",
        Locale::JaJp => "こんにちは、これはインタラクション1です。お名前は何ですか？",
    }
}

fn ask_last_name(locale: Locale, name: &str) -> String {
    match locale {
        Locale::PtBr => format!("{name}, esta é a interação 2. Qual o seu Sobrenome?"),
        Locale::EsUs => format!("{name}, esta es la interacción 2. ¿Cuál es su Apellido?"),
        Locale::EnUs => format!("{name}, this is the interaction 2. What is your last name?"),
        Locale::FrFr => format!("{name} c'est l'interaction 2. Quel est votre nom?"),
        Locale::ItIt => format!("{name} questo è l'interazione 2. Qual è il tuo cognome?"),
        Locale::DeDe => format!("{name} dies ist die Interaktion 2. Was ist Ihr Nachname?"),
        Locale::RuRu => format!("{name} это взаимодействие 2. Что такое ваша фамилия?"),
        Locale::JaJp => format!("{name}さん、これはインタラクション2です。苗字は何ですか？"),
    }
}

fn success(locale: Locale) -> &'static str {
    match locale {
        Locale::PtBr => "Sucesso! Esta é a interação 4, a conversa se encerra aqui.",
        Locale::EsUs => "Éxito! Esta es la interacción 4, la conversación se encierra aquí.",
        Locale::EnUs => "Success! This is interaction 4, the conversation ends here.",
        Locale::FrFr => "Succès! Ceci est l'interaction 4, la conversation se termine ici.",
        Locale::ItIt => "Successo! Questo è l'interazione 4, la conversazione finisce qui.",
        Locale::DeDe => "Erfolg! Dies ist die Interaktion 4, endet das Gespräch hier.",
        Locale::RuRu => "Успех! Это взаимодействие 4, разговор заканчивается.",
        Locale::JaJp => "成功です！これはインタラクション4です。会話はここで終わります。",
    }
}

fn give_up(locale: Locale) -> &'static str {
    match locale {
        Locale::PtBr => "Esta ainda é a interação 4, como você errou de novo a conversa encerra aqui.",
        Locale::EsUs => "Esta todavía es la interacción 4, como usted erró de nuevo la conversación se cierra aquí.",
        Locale::EnUs => "This is still interaction 4, as you missed again the conversation ends here.",
        Locale::FrFr => "Ceci est encore l'interaction 4, que vous avez manqué à nouveau la conversation se termine ici.",
        Locale::ItIt => "Questo è ancora l'interazione 4, come ti sei perso ancora una volta la conversazione finisce qui.",
        Locale::DeDe => "Dies ist immer noch die Interaktion 4, wie Sie verpasst erneut das Gespräch endet hier.",
        Locale::RuRu => "Это до сих пор взаимодействие 4, как вы пропустили снова разговор заканчивается.",
        Locale::JaJp => "これはまだインタラクション4です。また間違えたので、会話はここで終わります。",
    }
}
