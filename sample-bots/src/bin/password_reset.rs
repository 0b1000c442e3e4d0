//! Password-reset sample bot Lambda.
//!
//! Walks the caller through name, last name, and a spoken password, and
//! validates the password against the per-locale phrases for "one two
//! three". One retry is allowed before the conversation is ended.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::dialog::{advance, ConversationPayload, DialogScript, StepperReply};
use shared::Locale;
use tracing_subscriber::EnvFilter;

struct PasswordScript;

/// Spoken forms of "one two three" accepted per locale, diacritic variants
/// included. The digit form is accepted everywhere.
fn accepted_phrases(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::PtBr => &["um dois tres", "um dois três"],
        Locale::EsUs => &["uno dos tres"],
        Locale::EnUs => &["one two three"],
        Locale::FrFr => &["un deux trois"],
        Locale::ItIt => &["uno due tre"],
        Locale::DeDe => &["eins zwei drei"],
        Locale::RuRu => &["один два три"],
        Locale::JaJp => &["いち に さん"],
    }
}

impl DialogScript for PasswordScript {
    fn final_question(&self, locale: Locale, name: &str, last_name: &str) -> String {
        match locale {
            Locale::PtBr => format!("{name} {last_name}, esta é a interação 3. Qual a sua senha?"),
            Locale::EsUs => {
                format!("{name} {last_name}, esta es la interacción 3. ¿Cuál es su contraseña?")
            }
            Locale::EnUs => {
                format!("{name} {last_name}, this is the interaction 3. What is your password?")
            }
            Locale::FrFr => {
                format!("{name} {last_name} c'est l'interaction 3. Quel est votre mot de passe?")
            }
            Locale::ItIt => {
                format!("{name} {last_name} questo è l'interazione 3. Qual è la vostra password?")
            }
            Locale::DeDe => {
                format!("{name} {last_name} dies ist die Interaktion 3. Was ist Ihr Passwort?")
            }
            Locale::RuRu => format!("{name} {last_name} это взаимодействие 3. Что такое пароль?"),
            Locale::JaJp => {
                format!("{name} {last_name}さん、これはインタラクション3です。パスワードは何ですか？")
            }
        }
    }

    fn retry_message(&self, locale: Locale, name: &str) -> String {
        match locale {
            Locale::PtBr => format!(
                "{name} esta é a interação 4 e a sua senha está inválida, você tem mais uma chance."
            ),
            Locale::EsUs => format!(
                "{name} esta es la interacción 4, y su contraseña está invalida usted tiene otra oportunidad."
            ),
            Locale::EnUs => format!(
                "{name} this is interaction 4 and your password is invalid, you have one more chance."
            ),
            Locale::FrFr => format!(
                "{name} c'est l'interaction 4 et votre mot de passe est invalide, vous avez une chance de plus."
            ),
            Locale::ItIt => format!(
                "{name} questo è l'interazione 4 e la tua password non è valida, si ha una possibilità in più."
            ),
            Locale::DeDe => format!(
                "{name} dies ist die Interaktion 4 und Ihr Kennwort ist ungültig, Sie haben noch eine"
            ),
            Locale::RuRu => format!(
                "{name} это взаимодействие 4 и ваш пароль неверен, у вас есть еще один шанс."
            ),
            Locale::JaJp => format!(
                "{name}さん、これはインタラクション4です。パスワードが正しくないため、あと1回だけ入力できます。"
            ),
        }
    }

    fn validate(&self, locale: Locale, answer: &str) -> bool {
        let normalized = answer.trim().to_lowercase();
        normalized == "1 2 3" || accepted_phrases(locale).contains(&normalized.as_str())
    }
}

async fn handler(event: LambdaEvent<ConversationPayload>) -> Result<StepperReply, Error> {
    Ok(advance(event.payload, &PasswordScript)?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::dialog::SlotAnswer;

    fn at_password_step(lang: &str, password: &str) -> ConversationPayload {
        let mut payload = ConversationPayload::new(lang);
        payload.step = Some(4);
        payload.name = Some(SlotAnswer {
            response: "Ada".to_string(),
        });
        payload.last_name = Some(SlotAnswer {
            response: "Lovelace".to_string(),
        });
        payload.pwd = Some(SlotAnswer {
            response: password.to_string(),
        });
        payload
    }

    #[test]
    fn first_turn_asks_for_the_name() {
        let reply = advance(ConversationPayload::new("en-US"), &PasswordScript).unwrap();
        assert_eq!(
            reply.conversation.ask.text,
            "Hello, this is the interaction 1. What's your name?"
        );
        assert_eq!(reply.payload().step, Some(2));
    }

    #[test]
    fn every_locale_accepts_its_phrases_and_digits() {
        for locale in Locale::SAMPLE_BOTS {
            for phrase in accepted_phrases(locale) {
                let reply = advance(at_password_step(locale.tag(), phrase), &PasswordScript)
                    .unwrap_or_else(|e| panic!("{locale} rejected {phrase:?}: {e}"));
                assert!(reply.is_final());
                assert!(reply.payload().completed(), "{locale} rejected {phrase:?}");
            }

            let reply = advance(at_password_step(locale.tag(), "1 2 3"), &PasswordScript).unwrap();
            assert!(reply.payload().completed(), "{locale} rejected digits");
        }
    }

    #[test]
    fn case_variants_are_accepted() {
        let reply = advance(at_password_step("en-US", "One Two THREE"), &PasswordScript).unwrap();
        assert!(reply.payload().completed());
    }

    #[test]
    fn phrases_from_other_locales_fail() {
        let reply = advance(at_password_step("en-US", "un deux trois"), &PasswordScript).unwrap();
        assert!(!reply.payload().completed());
        assert_eq!(reply.payload().count, Some(1));
    }

    #[test]
    fn success_ends_the_conversation() {
        let reply = advance(at_password_step("en-US", "one two three"), &PasswordScript).unwrap();
        assert!(reply.is_final());
        assert_eq!(
            reply.conversation.ask.text,
            "Success! This is interaction 4, the conversation ends here."
        );
    }

    #[test]
    fn second_failure_is_terminal() {
        let first = advance(at_password_step("en-US", "wrong"), &PasswordScript).unwrap();
        assert!(!first.is_final());
        assert_eq!(
            first.conversation.ask.text,
            "Ada this is interaction 4 and your password is invalid, you have one more chance."
        );

        let mut second_try = first.conversation.payload;
        second_try.pwd = Some(SlotAnswer {
            response: "still wrong".to_string(),
        });
        let second = advance(second_try, &PasswordScript).unwrap();
        assert!(second.is_final());
        assert!(!second.payload().completed());
    }
}
