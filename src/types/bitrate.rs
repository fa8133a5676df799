use std::{fmt::Display, str::FromStr};

use serde::Deserialize;

/// Audio bitrate of the transcoded output, in kbit/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Bitrate(u16);

impl Default for Bitrate {
    fn default() -> Self {
        Self(192)
    }
}

impl FromStr for Bitrate {
    type Err = Box<dyn std::error::Error + Sync + Send>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(num_prefix) = s.trim().to_lowercase().strip_suffix('k') {
            match num_prefix.parse()? {
                0 => Err(Box::from("Bitrate must be positive")),
                kbps => Ok(Self(kbps)),
            }
        } else {
            Err(Box::from("Bitrate does not end with 'K'"))
        }
    }
}

impl TryFrom<String> for Bitrate {
    type Error = Box<dyn std::error::Error + Sync + Send>;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for Bitrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}K", self.0)
    }
}
