//! The fixed vocabulary of tones (emotion labels) an entry can be written in.
//!
//! The same labels name the emotion columns of the seed dataset, either bare
//! (`happy`) or in the survey export layout (`Answer.f1.happy.raw`).
//! [`Tone::from_label`] accepts both.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum Tone {
    Afraid,
    Angry,
    Anxious,
    Ashamed,
    Awkward,
    Bored,
    Calm,
    Confused,
    Disgusted,
    Excited,
    Frustrated,
    Happy,
    Jealous,
    Nostalgic,
    Proud,
    Sad,
    Satisfied,
    Surprised,
}

impl Tone {
    pub const ALL: [Tone; 18] = [
        Tone::Afraid,
        Tone::Angry,
        Tone::Anxious,
        Tone::Ashamed,
        Tone::Awkward,
        Tone::Bored,
        Tone::Calm,
        Tone::Confused,
        Tone::Disgusted,
        Tone::Excited,
        Tone::Frustrated,
        Tone::Happy,
        Tone::Jealous,
        Tone::Nostalgic,
        Tone::Proud,
        Tone::Sad,
        Tone::Satisfied,
        Tone::Surprised,
    ];

    /// Lowercase label, as used on the command line and in prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Afraid => "afraid",
            Tone::Angry => "angry",
            Tone::Anxious => "anxious",
            Tone::Ashamed => "ashamed",
            Tone::Awkward => "awkward",
            Tone::Bored => "bored",
            Tone::Calm => "calm",
            Tone::Confused => "confused",
            Tone::Disgusted => "disgusted",
            Tone::Excited => "excited",
            Tone::Frustrated => "frustrated",
            Tone::Happy => "happy",
            Tone::Jealous => "jealous",
            Tone::Nostalgic => "nostalgic",
            Tone::Proud => "proud",
            Tone::Sad => "sad",
            Tone::Satisfied => "satisfied",
            Tone::Surprised => "surprised",
        }
    }

    /// Map a raw dataset column header onto a tone.
    ///
    /// Accepts a bare label in any case (`"Happy"`) or the survey layout
    /// `Answer.f1.<label>.raw`. Returns `None` for anything else.
    pub fn from_label(header: &str) -> Option<Tone> {
        let header = header.trim();
        let label = match header.split('.').collect::<Vec<_>>().as_slice() {
            ["Answer", "f1", label, "raw"] => *label,
            [label] => *label,
            _ => return None,
        };
        label.parse().ok()
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Tone::ALL
            .into_iter()
            .find(|tone| tone.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnsupportedTone(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("happy".parse::<Tone>().unwrap(), Tone::Happy);
        assert_eq!("  Nostalgic ".parse::<Tone>().unwrap(), Tone::Nostalgic);
    }

    #[test]
    fn rejects_unknown_tone() {
        let err = "reflective".parse::<Tone>().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedTone(ref t) if t == "reflective"));
    }

    #[test]
    fn maps_dataset_headers() {
        assert_eq!(Tone::from_label("Answer.f1.sad.raw"), Some(Tone::Sad));
        assert_eq!(Tone::from_label("proud"), Some(Tone::Proud));
        assert_eq!(Tone::from_label("Answer.f1.hopeful.raw"), None);
        assert_eq!(Tone::from_label("Answer"), None);
        assert_eq!(Tone::from_label("Answer.f1.sad"), None);
    }

    #[test]
    fn labels_round_trip_through_display() {
        for tone in Tone::ALL {
            assert_eq!(tone.to_string().parse::<Tone>().unwrap(), tone);
        }
    }

    #[test]
    fn clap_value_names_match_labels() {
        for tone in Tone::ALL {
            let value = tone.to_possible_value().unwrap();
            assert_eq!(value.get_name(), tone.as_str());
        }
    }
}
