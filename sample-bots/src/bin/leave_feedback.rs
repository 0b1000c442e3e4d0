//! Feedback-collecting sample bot Lambda.
//!
//! Same stepped dialog as the password bot, but the final answer is free
//! text capped at 50 characters. Accepted feedback is persisted to
//! DynamoDB keyed by a fresh UUID; a failed write never fails the turn.

use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::dialog::{advance, ConversationPayload, DialogScript, StepperReply};
use shared::storage::{put_feedback, FeedbackRecord};
use shared::{FeedbackBotConfig, Locale};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const MAX_FEEDBACK_CHARS: usize = 50;

struct FeedbackScript;

impl DialogScript for FeedbackScript {
    fn final_question(&self, locale: Locale, name: &str, last_name: &str) -> String {
        match locale {
            Locale::PtBr => {
                format!("{name} {last_name}, esta é a interação 3. Qual a seu feedback?")
            }
            Locale::EsUs => {
                format!("{name} {last_name}, esta es la interacción 3. ¿Cuál es tu opinión?")
            }
            Locale::EnUs => {
                format!("{name} {last_name}, this is the interaction 3. What is your feedback?")
            }
            Locale::FrFr => {
                format!("{name} {last_name} c'est l'interaction 3. Quel est votre avis?")
            }
            Locale::ItIt => {
                format!("{name} {last_name} questo è l'interazione 3. Qual è il tuo feedback?")
            }
            Locale::DeDe => {
                format!("{name} {last_name} dies ist die Interaktion 3. Was ist Ihr Feedback?")
            }
            Locale::RuRu => {
                format!("{name} {last_name} это взаимодействие 3. Каковы ваши отзывы?")
            }
            Locale::JaJp => {
                format!("{name} {last_name}さん、これはインタラクション3です。フィードバックをお聞かせください。")
            }
        }
    }

    fn retry_message(&self, locale: Locale, name: &str) -> String {
        match locale {
            Locale::PtBr => format!(
                "{name} esta é a interação 4 e seu feedback é muito longo, você tem mais uma chance."
            ),
            Locale::EsUs => format!(
                "{name} esta es la interacción 4, y sus comentarios son demasiado largos, tiene una oportunidad más."
            ),
            Locale::EnUs => format!(
                "{name} this is interaction 4 and your feedback is too long, you have one more chance."
            ),
            Locale::FrFr => format!(
                "{name} c'est l'interaction 4 et vos commentaires sont trop longs, vous avez encore une chance."
            ),
            Locale::ItIt => format!(
                "{name} questo è l'interazione 4 e il tuo feedback è troppo lungo, hai un'altra possibilità."
            ),
            Locale::DeDe => format!(
                "{name} dies ist die Interaktion 4 und Ihr Feedback ist zu lang, Sie haben noch eine Chance."
            ),
            Locale::RuRu => format!(
                "{name} это взаимодействие 4 и Ваш отзыв слишком длинный, у вас есть еще один шанс."
            ),
            Locale::JaJp => format!(
                "{name}さん、これはインタラクション4です。フィードバックが長すぎます。あと1回だけ入力できます。"
            ),
        }
    }

    fn validate(&self, _locale: Locale, answer: &str) -> bool {
        answer.chars().count() <= MAX_FEEDBACK_CHARS
    }
}

struct AppState {
    dynamo: DynamoClient,
    config: FeedbackBotConfig,
}

impl AppState {
    async fn new() -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            dynamo: DynamoClient::new(&aws_config),
            config: FeedbackBotConfig::from_env(),
        }
    }
}

fn collected_record(payload: &ConversationPayload) -> Option<FeedbackRecord> {
    Some(FeedbackRecord {
        first_name: payload.name.as_ref()?.response.clone(),
        last_name: payload.last_name.as_ref()?.response.clone(),
        feedback: payload.pwd.as_ref()?.response.clone(),
    })
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<ConversationPayload>,
) -> Result<StepperReply, Error> {
    let reply = advance(event.payload, &FeedbackScript)?;

    // Persistence never blocks the reply to the caller.
    if reply.payload().completed() {
        if let Some(table) = state.config.table_name.as_deref() {
            match collected_record(reply.payload()) {
                Some(record) => match put_feedback(&state.dynamo, table, &record).await {
                    Ok(id) => info!(table, uuid = %id, "feedback persisted"),
                    Err(e) => warn!(table, error = %e, "unable to persist feedback"),
                },
                None => warn!("completed conversation is missing answers, nothing to persist"),
            }
        }
    }

    Ok(reply)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::dialog::SlotAnswer;

    fn at_feedback_step(feedback: &str) -> ConversationPayload {
        let mut payload = ConversationPayload::new("en-US");
        payload.step = Some(4);
        payload.name = Some(SlotAnswer {
            response: "Ada".to_string(),
        });
        payload.last_name = Some(SlotAnswer {
            response: "Lovelace".to_string(),
        });
        payload.pwd = Some(SlotAnswer {
            response: feedback.to_string(),
        });
        payload
    }

    #[test]
    fn feedback_up_to_fifty_chars_is_accepted() {
        let reply = advance(at_feedback_step(&"x".repeat(50)), &FeedbackScript).unwrap();
        assert!(reply.payload().completed());
    }

    #[test]
    fn overlong_feedback_gets_one_retry() {
        let first = advance(at_feedback_step(&"x".repeat(51)), &FeedbackScript).unwrap();
        assert!(!first.is_final());
        assert_eq!(first.payload().count, Some(1));
        assert_eq!(
            first.conversation.ask.text,
            "Ada this is interaction 4 and your feedback is too long, you have one more chance."
        );

        let mut second_try = first.conversation.payload;
        second_try.pwd = Some(SlotAnswer {
            response: "y".repeat(60),
        });
        let second = advance(second_try, &FeedbackScript).unwrap();
        assert!(second.is_final());
        assert!(!second.payload().completed());
    }

    #[test]
    fn length_limit_counts_characters_not_bytes() {
        let reply = advance(at_feedback_step(&"é".repeat(50)), &FeedbackScript).unwrap();
        assert!(reply.payload().completed());
    }

    #[test]
    fn completed_payload_maps_to_a_record() {
        let reply = advance(at_feedback_step("Loved it"), &FeedbackScript).unwrap();
        let record = collected_record(reply.payload()).unwrap();
        assert_eq!(record.first_name, "Ada");
        assert_eq!(record.last_name, "Lovelace");
        assert_eq!(record.feedback, "Loved it");
    }

    #[test]
    fn question_asks_for_feedback_not_password() {
        let mut payload = ConversationPayload::new("en-US");
        payload.step = Some(3);
        payload.name = Some(SlotAnswer {
            response: "Ada".to_string(),
        });
        payload.last_name = Some(SlotAnswer {
            response: "Lovelace".to_string(),
        });
        let reply = advance(payload, &FeedbackScript).unwrap();
        assert_eq!(
            reply.conversation.ask.text,
            "Ada Lovelace, this is the interaction 3. What is your feedback?"
        );
    }
}
