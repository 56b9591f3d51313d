use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two locales prompts and user-facing messages are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Language {
    #[default]
    #[value(name = "ko")]
    #[serde(rename = "ko")]
    Korean,
    #[value(name = "en")]
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Korean => "ko",
            Language::English => "en",
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
            "ko" | "kr" | "korean" | "ko-kr" => Ok(Language::Korean),
            "en" | "english" | "en-us" | "en-gb" => Ok(Language::English),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}
