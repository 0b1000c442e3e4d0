//! Custom resource provisioning the Amazon Lex v2 appointment bot.
//!
//! Create walks the model-building API end to end: bot, locale, slot type,
//! intent, slots, intent update, build, then resolves the bot alias.
//! Every wait on a transitional status carries an explicit deadline.
//! Delete removes the bot. When the deployment is configured for a brain
//! other than Amazon Lex, the resource is a no-op.

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_lexmodelsv2::error::BuildError;
use aws_sdk_lexmodelsv2::types::{
    BotLocaleStatus, BotStatus, DataPrivacy, DialogCodeHookSettings, FulfillmentCodeHookSettings,
    IntentClosingSetting, IntentConfirmationSetting, Message, MessageGroup, ObfuscationSetting,
    ObfuscationSettingType, PlainTextMessage, PromptSpecification, ResponseSpecification,
    SampleUtterance, SampleValue, SlotConstraint, SlotPriority, SlotTypeValue,
    SlotValueElicitationSetting, SlotValueResolutionStrategy, SlotValueSelectionSetting,
};
use aws_sdk_lexmodelsv2::Client as LexClient;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use shared::cfn::{run_custom_resource, CustomResourceEvent, RequestType, ResourceOutcome};
use shared::poll::{poll_until, PollPolicy, PollState};
use shared::{Error, LexBotConfig, Locale, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

const BOT_VERSION: &str = "DRAFT";
const INTENT_NAME: &str = "MakeAppointment";
const PROMPT_MAX_RETRIES: i32 = 5;

/// Creation settles in seconds; a model build can take minutes.
const CREATE_POLL: PollPolicy =
    PollPolicy::new(Duration::from_secs(2), Duration::from_secs(5 * 60));
const BUILD_POLL: PollPolicy =
    PollPolicy::new(Duration::from_secs(5), Duration::from_secs(15 * 60));

/// Everything language-specific about the appointment bot.
struct LanguagePack {
    locale: Locale,
    utterances: [&'static str; 3],
    appointment_types: [&'static str; 3],
    confirmation_prompt: &'static str,
    decline_response: &'static str,
    closing_response: &'static str,
    appointment_type_prompt: &'static str,
    date_prompt: &'static str,
    time_prompt: &'static str,
}

fn language_pack(language: &str) -> Result<&'static LanguagePack> {
    match language {
        "English" => Ok(&LanguagePack {
            locale: Locale::EnUs,
            utterances: [
                "I would like to book an appointment",
                "Book an appointment",
                "Book a {AppointmentType}",
            ],
            appointment_types: ["cleaning", "root canal", "whitening"],
            confirmation_prompt: "{Time} is available, should I go ahead and book your appointment?",
            decline_response: "Okay, I will not schedule an appointment.",
            closing_response: "Done.",
            appointment_type_prompt: "What type of appointment would you like to schedule?",
            date_prompt: "When should I schedule your appointment?",
            time_prompt: "At what time should I schedule your appointment?",
        }),
        "French" => Ok(&LanguagePack {
            locale: Locale::FrFr,
            utterances: [
                "Je souhaiterais prendre rendez-vous",
                "Prendre rendez-vous",
                "Réserver un {AppointmentType}",
            ],
            appointment_types: ["nettoyage", "traitement du canal radiculaire", "blanchiment"],
            confirmation_prompt:
                "Je peux prendre rendez-vous à {Time}, est-ce que je peux confirmer cette horaire ?",
            decline_response: "D'accord, je ne confirmerai pas ce rendez-vous.",
            closing_response: "Fini.",
            appointment_type_prompt: "Quel type de rendez-vous souhaitez-vous prendre ?",
            date_prompt: "Quand souhaitez-vous prendre rendez-vous ?",
            time_prompt: "À quelle heure souhaitez-vous prendre rendez-vous ?",
        }),
        "Italian" => Ok(&LanguagePack {
            locale: Locale::ItIt,
            utterances: [
                "Vorrei fissare un appuntamento",
                "Fissa un appuntamento",
                "Prenota un'operazione di {AppointmentType}",
            ],
            appointment_types: ["pulizia", "devitalizzazione", "sbiancamento"],
            confirmation_prompt:
                "L'orario {Time} è disponibile. Procedo con la prenotazione dell'appuntamento?",
            decline_response: "OK. Non programmerò un appuntamento.",
            closing_response: "Finito.",
            appointment_type_prompt: "Quale tipo di appuntamento vorresti programmare?",
            date_prompt: "Quando devo programmare il tuo appuntamento?",
            time_prompt: "A che ora devo programmare il tuo appuntamento?",
        }),
        "Spanish" => Ok(&LanguagePack {
            locale: Locale::EsUs,
            utterances: [
                "Querría pedir una cita",
                "Reservar una cita",
                "Pedir cita para {AppointmentType}",
            ],
            appointment_types: ["limpieza", "endodoncia", "blanqueamiento"],
            confirmation_prompt:
                "A las {Time} están libres, ¿quieres que pida la cita para esa hora?",
            decline_response: "Vale, no pediré la cita.",
            closing_response: "Terminado.",
            appointment_type_prompt: "¿Qué tipo de cita quieres pedir?",
            date_prompt: "¿Para cuándo quieres la cita?",
            time_prompt: "¿Para qué hora te pido la cita?",
        }),
        "German" => Ok(&LanguagePack {
            locale: Locale::DeDe,
            utterances: [
                "Ich möchte einen Termin buchen.",
                "Einen Termin buchen",
                "Einen Termin des Typs {AppointmentType} buchen",
            ],
            appointment_types: ["Reinigung", "Wurzelbehandlung", "Weißen"],
            confirmation_prompt: "{Time} ist verfügbar. Soll ich den Termin für Sie buchen?",
            decline_response: "OK, ich werde keinen Termin planen.",
            closing_response: "Fertig.",
            appointment_type_prompt: "Welchen Typ von Termin möchten Sie planen?",
            date_prompt: "Für welches Datum soll ich den Termin planen?",
            time_prompt: "Für welche Uhrzeit soll ich den Termin planen?",
        }),
        "Japanese" => Ok(&LanguagePack {
            locale: Locale::JaJp,
            utterances: ["歯医者を予約したい", "歯医者の予約をする", "{AppointmentType}の予約をする"],
            appointment_types: ["クリーニング", "虫歯治療", "ホワイトニング"],
            confirmation_prompt: "{Time}は予約可能です。予約してよろしいですか",
            decline_response: "わかりました。予約を行いませんでした。",
            closing_response: "予約が完了しました。",
            appointment_type_prompt: "どのような予約を行いたいですか？",
            date_prompt: "何日に予約を入れればいいですか？",
            time_prompt: "何時に予約を入れればいいですか？",
        }),
        other => Err(Error::Config(format!("unknown bot language {other:?}"))),
    }
}

fn built<T>(result: std::result::Result<T, BuildError>) -> Result<T> {
    result.map_err(|e| Error::Aws(format!("invalid Lex model input: {e}")))
}

fn plain_message(text: &str) -> Result<Message> {
    Ok(Message::builder()
        .plain_text_message(built(PlainTextMessage::builder().value(text).build())?)
        .build())
}

fn prompt(text: &str) -> Result<PromptSpecification> {
    built(
        PromptSpecification::builder()
            .message_groups(built(
                Ok(MessageGroup::builder().message(plain_message(text)?).build()),
            )?)
            .max_retries(PROMPT_MAX_RETRIES)
            .allow_interrupt(true)
            .build(),
    )
}

fn response(text: &str) -> Result<ResponseSpecification> {
    built(
        ResponseSpecification::builder()
            .message_groups(built(
                Ok(MessageGroup::builder().message(plain_message(text)?).build()),
            )?)
            .allow_interrupt(true)
            .build(),
    )
}

struct AppState {
    lex: LexClient,
    http: reqwest::Client,
    config: LexBotConfig,
}

impl AppState {
    async fn new() -> Result<Self> {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Ok(Self {
            lex: LexClient::new(&aws_config),
            http: reqwest::Client::new(),
            config: LexBotConfig::from_env()?,
        })
    }
}

async fn wait_for_bot(lex: &LexClient, bot_id: &str) -> Result<()> {
    poll_until("Lex bot creation", CREATE_POLL, move || async move {
        let response = lex
            .describe_bot()
            .bot_id(bot_id)
            .send()
            .await
            .map_err(|e| Error::Aws(format!("failed to describe bot {bot_id}: {e}")))?;

        match response.bot_status() {
            Some(BotStatus::Creating) => Ok(PollState::Pending),
            Some(BotStatus::Available) => Ok(PollState::Ready(())),
            other => Err(Error::Aws(format!(
                "bot {bot_id} entered unexpected status {other:?}"
            ))),
        }
    })
    .await
}

async fn wait_for_locale(lex: &LexClient, bot_id: &str, locale_id: &str) -> Result<()> {
    poll_until("Lex bot locale creation", CREATE_POLL, move || async move {
        match locale_status(lex, bot_id, locale_id).await? {
            BotLocaleStatus::Creating => Ok(PollState::Pending),
            BotLocaleStatus::Failed => Err(Error::Aws(format!(
                "locale {locale_id} of bot {bot_id} failed to create"
            ))),
            _ => Ok(PollState::Ready(())),
        }
    })
    .await
}

async fn wait_for_build(lex: &LexClient, bot_id: &str, locale_id: &str) -> Result<()> {
    poll_until("Lex bot locale build", BUILD_POLL, move || async move {
        match locale_status(lex, bot_id, locale_id).await? {
            BotLocaleStatus::Building | BotLocaleStatus::ReadyExpressTesting => {
                Ok(PollState::Pending)
            }
            BotLocaleStatus::Failed => Err(Error::Aws(format!(
                "locale {locale_id} of bot {bot_id} failed to build"
            ))),
            _ => Ok(PollState::Ready(())),
        }
    })
    .await
}

async fn locale_status(
    lex: &LexClient,
    bot_id: &str,
    locale_id: &str,
) -> Result<BotLocaleStatus> {
    let response = lex
        .describe_bot_locale()
        .bot_id(bot_id)
        .bot_version(BOT_VERSION)
        .locale_id(locale_id)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("failed to describe locale {locale_id}: {e}")))?;

    response
        .bot_locale_status()
        .cloned()
        .ok_or_else(|| Error::Aws(format!("locale {locale_id} reported no status")))
}

async fn create_bot(state: &AppState) -> Result<String> {
    let response = state
        .lex
        .create_bot()
        .bot_name(&state.config.bot_name)
        .description("Created by the serverless bot framework")
        .role_arn(&state.config.bot_role_arn)
        .data_privacy(built(Ok(DataPrivacy::builder()
            .child_directed(state.config.child_directed)
            .build()))?)
        .idle_session_ttl_in_seconds(300)
        .bot_tags("createdby", "serverless bot framework")
        .send()
        .await
        .map_err(|e| Error::Aws(format!("failed to create bot: {e}")))?;

    response
        .bot_id()
        .map(str::to_string)
        .ok_or_else(|| Error::Aws("create_bot returned no bot id".to_string()))
}

async fn create_locale(state: &AppState, bot_id: &str, pack: &LanguagePack) -> Result<()> {
    state
        .lex
        .create_bot_locale()
        .bot_id(bot_id)
        .bot_version(BOT_VERSION)
        .locale_id(pack.locale.lex_id())
        .description(format!("created {} locale", state.config.bot_language))
        .nlu_intent_confidence_threshold(0.4)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("failed to create bot locale: {e}")))?;
    Ok(())
}

async fn create_appointment_slot_type(
    state: &AppState,
    bot_id: &str,
    locale_id: &str,
    pack: &LanguagePack,
) -> Result<String> {
    let mut request = state
        .lex
        .create_slot_type()
        .slot_type_name("AppointmentTypeValue")
        .description("Types of appointment")
        .value_selection_setting(built(
            SlotValueSelectionSetting::builder()
                .resolution_strategy(SlotValueResolutionStrategy::OriginalValue)
                .build(),
        )?)
        .bot_id(bot_id)
        .bot_version(BOT_VERSION)
        .locale_id(locale_id);

    for value in pack.appointment_types {
        request = request.slot_type_values(
            SlotTypeValue::builder()
                .sample_value(built(SampleValue::builder().value(value).build())?)
                .build(),
        );
    }

    let response = request
        .send()
        .await
        .map_err(|e| Error::Aws(format!("failed to create slot type: {e}")))?;

    response
        .slot_type_id()
        .map(str::to_string)
        .ok_or_else(|| Error::Aws("create_slot_type returned no id".to_string()))
}

async fn create_appointment_intent(
    state: &AppState,
    bot_id: &str,
    locale_id: &str,
) -> Result<String> {
    let response = state
        .lex
        .create_intent()
        .intent_name(INTENT_NAME)
        .bot_id(bot_id)
        .bot_version(BOT_VERSION)
        .locale_id(locale_id)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("failed to create intent: {e}")))?;

    response
        .intent_id()
        .map(str::to_string)
        .ok_or_else(|| Error::Aws("create_intent returned no id".to_string()))
}

#[allow(clippy::too_many_arguments)]
async fn create_appointment_slot(
    state: &AppState,
    bot_id: &str,
    locale_id: &str,
    intent_id: &str,
    slot_name: &str,
    slot_type_id: &str,
    prompt_text: &str,
) -> Result<String> {
    let response = state
        .lex
        .create_slot()
        .slot_name(slot_name)
        .description(format!("{slot_name} information."))
        .slot_type_id(slot_type_id)
        .value_elicitation_setting(built(
            SlotValueElicitationSetting::builder()
                .slot_constraint(SlotConstraint::Required)
                .prompt_specification(prompt(prompt_text)?)
                .build(),
        )?)
        .obfuscation_setting(built(
            ObfuscationSetting::builder()
                .obfuscation_setting_type(ObfuscationSettingType::None)
                .build(),
        )?)
        .bot_id(bot_id)
        .bot_version(BOT_VERSION)
        .locale_id(locale_id)
        .intent_id(intent_id)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("failed to create slot {slot_name}: {e}")))?;

    response
        .slot_id()
        .map(str::to_string)
        .ok_or_else(|| Error::Aws(format!("create_slot {slot_name} returned no id")))
}

/// Attach utterances, confirmation/closing prompts, and slot priorities.
async fn update_appointment_intent(
    state: &AppState,
    bot_id: &str,
    locale_id: &str,
    intent_id: &str,
    pack: &LanguagePack,
    slot_ids: [&str; 3],
) -> Result<()> {
    let [appointment_slot_id, date_slot_id, time_slot_id] = slot_ids;

    let mut request = state
        .lex
        .update_intent()
        .intent_id(intent_id)
        .intent_name(INTENT_NAME)
        .description("MakeAppointment intent created by the serverless bot framework.")
        .dialog_code_hook(built(Ok(DialogCodeHookSettings::builder().enabled(false).build()))?)
        .fulfillment_code_hook(built(Ok(
            FulfillmentCodeHookSettings::builder().enabled(false).build(),
        ))?)
        .intent_confirmation_setting(built(Ok(
            IntentConfirmationSetting::builder()
                .prompt_specification(prompt(pack.confirmation_prompt)?)
                .declination_response(response(pack.decline_response)?)
                .build(),
        ))?)
        .intent_closing_setting(
            IntentClosingSetting::builder()
                .closing_response(response(pack.closing_response)?)
                .build(),
        )
        .bot_id(bot_id)
        .bot_version(BOT_VERSION)
        .locale_id(locale_id);

    for utterance in pack.utterances {
        request = request.sample_utterances(built(
            SampleUtterance::builder().utterance(utterance).build(),
        )?);
    }

    for (priority, slot_id) in [appointment_slot_id, date_slot_id, time_slot_id]
        .into_iter()
        .enumerate()
    {
        request = request.slot_priorities(built(
            SlotPriority::builder()
                .priority(priority as i32 + 1)
                .slot_id(slot_id)
                .build(),
        )?);
    }

    request
        .send()
        .await
        .map_err(|e| Error::Aws(format!("failed to update intent: {e}")))?;
    Ok(())
}

async fn bot_alias_id(state: &AppState, bot_id: &str) -> Result<String> {
    let response = state
        .lex
        .list_bot_aliases()
        .bot_id(bot_id)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("failed to list bot aliases: {e}")))?;

    response
        .bot_alias_summaries()
        .first()
        .and_then(|summary| summary.bot_alias_id())
        .map(str::to_string)
        .ok_or_else(|| Error::Aws(format!("bot {bot_id} has no alias")))
}

async fn create_resource(state: &AppState) -> Result<ResourceOutcome> {
    if !state.config.uses_lex() {
        info!(brain = %state.config.bot_brain, "brain is not Amazon Lex, skipping bot creation");
        return Ok(ResourceOutcome::default()
            .attribute("BotId", "")
            .attribute("BotAliasId", ""));
    }

    let pack = language_pack(&state.config.bot_language)?;
    let locale_id = pack.locale.lex_id();

    let bot_id = create_bot(state).await?;
    info!(bot_id = %bot_id, "created bot");
    wait_for_bot(&state.lex, &bot_id).await?;

    create_locale(state, &bot_id, pack).await?;
    wait_for_locale(&state.lex, &bot_id, locale_id).await?;
    info!(bot_id = %bot_id, locale_id, "created locale");

    let slot_type_id = create_appointment_slot_type(state, &bot_id, locale_id, pack).await?;
    let intent_id = create_appointment_intent(state, &bot_id, locale_id).await?;

    let time_slot_id = create_appointment_slot(
        state, &bot_id, locale_id, &intent_id, "Time", "AMAZON.Time", pack.time_prompt,
    )
    .await?;
    let date_slot_id = create_appointment_slot(
        state, &bot_id, locale_id, &intent_id, "Date", "AMAZON.Date", pack.date_prompt,
    )
    .await?;
    let appointment_slot_id = create_appointment_slot(
        state,
        &bot_id,
        locale_id,
        &intent_id,
        "AppointmentType",
        &slot_type_id,
        pack.appointment_type_prompt,
    )
    .await?;

    update_appointment_intent(
        state,
        &bot_id,
        locale_id,
        &intent_id,
        pack,
        [&appointment_slot_id, &date_slot_id, &time_slot_id],
    )
    .await?;

    state
        .lex
        .build_bot_locale()
        .bot_id(&bot_id)
        .bot_version(BOT_VERSION)
        .locale_id(locale_id)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("failed to start locale build: {e}")))?;
    wait_for_build(&state.lex, &bot_id, locale_id).await?;
    info!(bot_id = %bot_id, locale_id, "built locale");

    let alias_id = bot_alias_id(state, &bot_id).await?;

    Ok(ResourceOutcome::with_id(bot_id.clone())
        .attribute("BotId", bot_id)
        .attribute("BotAliasId", alias_id))
}

async fn delete_resource(state: &AppState, event: &CustomResourceEvent) -> Result<ResourceOutcome> {
    if !state.config.uses_lex() {
        info!("no bot to delete, skipped deleting");
        return Ok(ResourceOutcome::default());
    }

    let bot_id = event
        .physical_resource_id
        .clone()
        .ok_or_else(|| Error::Validation("delete event carries no physical resource id".into()))?;

    state
        .lex
        .delete_bot()
        .bot_id(&bot_id)
        .skip_resource_in_use_check(true)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("failed to delete bot {bot_id}: {e}")))?;

    info!(bot_id = %bot_id, "deleted bot");
    Ok(ResourceOutcome::with_id(bot_id))
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<CustomResourceEvent>,
) -> std::result::Result<(), LambdaError> {
    let state_for_handler = state.clone();
    run_custom_resource(&state.http, event.payload, move |event| async move {
        match event.request_type {
            RequestType::Create => create_resource(&state_for_handler).await,
            // The bot definition is driven entirely by environment
            // configuration; stack updates keep the existing bot.
            RequestType::Update => Ok(ResourceOutcome {
                physical_resource_id: event.physical_resource_id.clone(),
                data: serde_json::Map::new(),
            }),
            RequestType::Delete => delete_resource(&state_for_handler, &event).await,
        }
    })
    .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> std::result::Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);
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

    #[test]
    fn maps_languages_to_lex_locales() {
        assert_eq!(language_pack("English").unwrap().locale.lex_id(), "en_US");
        assert_eq!(language_pack("French").unwrap().locale.lex_id(), "fr_FR");
        assert_eq!(language_pack("Japanese").unwrap().locale.lex_id(), "ja_JP");
    }

    #[test]
    fn unknown_language_is_a_config_error() {
        assert!(matches!(language_pack("Esperanto"), Err(Error::Config(_))));
    }

    #[test]
    fn every_pack_is_fully_populated() {
        for language in ["English", "French", "Italian", "Spanish", "German", "Japanese"] {
            let pack = language_pack(language).unwrap();
            assert!(pack.utterances.iter().all(|u| !u.is_empty()));
            assert!(pack.appointment_types.iter().all(|t| !t.is_empty()));
            assert!(!pack.confirmation_prompt.is_empty());
            assert!(!pack.closing_response.is_empty());
        }
    }

    #[test]
    fn prompts_build_with_a_plain_text_message() {
        let prompt = prompt("When should I schedule your appointment?").unwrap();
        assert_eq!(prompt.max_retries(), PROMPT_MAX_RETRIES);
        assert_eq!(prompt.message_groups().len(), 1);
    }
}
