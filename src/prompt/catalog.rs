use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Tara,
    Jess,
    Leo,
    Leah,
    Dan,
    Mia,
    Zac,
    Zoe,
}

impl Voice {
    pub const ALL: [Voice; 8] = [
        Voice::Tara,
        Voice::Jess,
        Voice::Leo,
        Voice::Leah,
        Voice::Dan,
        Voice::Mia,
        Voice::Zac,
        Voice::Zoe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Tara => "tara",
            Voice::Jess => "jess",
            Voice::Leo => "leo",
            Voice::Leah => "leah",
            Voice::Dan => "dan",
            Voice::Mia => "mia",
            Voice::Zac => "zac",
            Voice::Zoe => "zoe",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emotion tags offered by the UI. The formatter itself accepts any tag text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Laugh,
    Chuckle,
    Sigh,
    Cough,
    Sniffle,
    Groan,
    Yawn,
    Gasp,
}

impl Emotion {
    pub const ALL: [Emotion; 8] = [
        Emotion::Laugh,
        Emotion::Chuckle,
        Emotion::Sigh,
        Emotion::Cough,
        Emotion::Sniffle,
        Emotion::Groan,
        Emotion::Yawn,
        Emotion::Gasp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Laugh => "laugh",
            Emotion::Chuckle => "chuckle",
            Emotion::Sigh => "sigh",
            Emotion::Cough => "cough",
            Emotion::Sniffle => "sniffle",
            Emotion::Groan => "groan",
            Emotion::Yawn => "yawn",
            Emotion::Gasp => "gasp",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
