use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the agent understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Urdu
    #[default]
    Ur,
    /// Punjabi
    Pa,
    /// Sindhi
    Sd,
    /// English
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Ur => "ur",
            Language::Pa => "pa",
            Language::Sd => "sd",
            Language::En => "en",
        }
    }

    /// Locale tag handed to the speech recognizer
    pub fn locale(&self) -> &'static str {
        match self {
            Language::Ur => "ur-PK",
            Language::Pa => "pa-PK",
            Language::Sd => "sd-PK",
            Language::En => "en-US",
        }
    }

    /// Greeting the timeline is seeded with on mount and reset
    pub fn greeting(&self) -> &'static str {
        match self {
            Language::Ur => "السلام علیکم! میں آپ کا زرعی مددگار ہوں۔ اپنی فصل کے بارے میں کچھ بھی پوچھیں۔",
            Language::Pa => "السلام علیکم! میں تہاڈا زرعی مددگار ہاں۔ اپنی فصل بارے کجھ وی پچھو۔",
            Language::Sd => "السلام عليڪم! مان توهان جو زرعي مددگار آهيان. پنهنجي فصل بابت ڪجهه به پڇو.",
            Language::En => "Hello! I am your farming assistant. Ask me anything about your crops.",
        }
    }

    /// Apology used when the agent could not be reached
    pub fn apology(&self) -> &'static str {
        match self {
            Language::Ur => "معذرت، ابھی جواب نہیں مل سکا۔ براہ کرم تھوڑی دیر بعد دوبارہ کوشش کریں۔",
            Language::Pa => "معافی، ہنے جواب نئیں مل سکیا۔ مہربانی کر کے کجھ چر بعد فیر کوشش کرو۔",
            Language::Sd => "معاف ڪجو، هن وقت جواب نه ملي سگهيو. مهرباني ڪري ٿوري دير کانپوءِ ٻيهر ڪوشش ڪريو.",
            Language::En => "Sorry, I could not get an answer right now. Please try again in a moment.",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ur" | "urdu" => Ok(Language::Ur),
            "pa" | "punjabi" => Ok(Language::Pa),
            "sd" | "sindhi" => Ok(Language::Sd),
            "en" | "english" => Ok(Language::En),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}
