//! Locale tags supported by the bot framework.
//!
//! The sample bots speak the dash form (`en-US`), Amazon Lex the underscore
//! form (`en_US`). Both parse to the same [`Locale`]. Unrecognized tags are
//! an explicit error, never silent empty output.

use crate::{Error, Result};

/// A supported language/region tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    EnUs,
    PtBr,
    EsUs,
    FrFr,
    ItIt,
    DeDe,
    RuRu,
    JaJp,
}

impl Locale {
    /// Every locale the framework knows about.
    pub const ALL: [Locale; 8] = [
        Locale::EnUs,
        Locale::PtBr,
        Locale::EsUs,
        Locale::FrFr,
        Locale::ItIt,
        Locale::DeDe,
        Locale::RuRu,
        Locale::JaJp,
    ];

    /// Locales the step-driven sample bots ship prompts for.
    pub const SAMPLE_BOTS: [Locale; 7] = [
        Locale::EnUs,
        Locale::PtBr,
        Locale::EsUs,
        Locale::FrFr,
        Locale::ItIt,
        Locale::DeDe,
        Locale::RuRu,
    ];

    /// Locales available as Amazon Lex bot locales.
    pub const LEX: [Locale; 6] = [
        Locale::EnUs,
        Locale::EsUs,
        Locale::FrFr,
        Locale::ItIt,
        Locale::DeDe,
        Locale::JaJp,
    ];

    /// Parse a locale tag in either `en-US` or `en_US` form.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "en-US" | "en_US" => Ok(Locale::EnUs),
            "pt-BR" | "pt_BR" => Ok(Locale::PtBr),
            "es-US" | "es_US" => Ok(Locale::EsUs),
            "fr-FR" | "fr_FR" => Ok(Locale::FrFr),
            "it-IT" | "it_IT" => Ok(Locale::ItIt),
            "de-DE" | "de_DE" => Ok(Locale::DeDe),
            "ru-RU" | "ru_RU" => Ok(Locale::RuRu),
            "ja-JP" | "ja_JP" => Ok(Locale::JaJp),
            other => Err(Error::UnsupportedLocale(other.to_string())),
        }
    }

    /// The dash-form tag used by the sample bot payloads.
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::EnUs => "en-US",
            Locale::PtBr => "pt-BR",
            Locale::EsUs => "es-US",
            Locale::FrFr => "fr-FR",
            Locale::ItIt => "it-IT",
            Locale::DeDe => "de-DE",
            Locale::RuRu => "ru-RU",
            Locale::JaJp => "ja-JP",
        }
    }

    /// The underscore-form id Amazon Lex uses for bot locales.
    pub fn lex_id(&self) -> &'static str {
        match self {
            Locale::EnUs => "en_US",
            Locale::PtBr => "pt_BR",
            Locale::EsUs => "es_US",
            Locale::FrFr => "fr_FR",
            Locale::ItIt => "it_IT",
            Locale::DeDe => "de_DE",
            Locale::RuRu => "ru_RU",
            Locale::JaJp => "ja_JP",
        }
    }

    /// Whether replies should use imperial units.
    pub fn uses_imperial_units(&self) -> bool {
        matches!(self, Locale::EnUs | Locale::EsUs)
    }
}

impl std::str::FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Locale::parse(s)
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
