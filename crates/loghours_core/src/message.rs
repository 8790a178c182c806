//! Messages sent back to the issuer of a slash command.

use serde::{Deserialize, Serialize};

/// Who gets to see a message in the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Visible to everyone in the channel.
    InChannel,
    /// Visible only to the user that issued the command.
    Ephemeral,
}

/// Body of both the synchronous reply and the deferred callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashResponse {
    pub response_type: ResponseType,
    pub text: String,
}

impl SlashResponse {
    pub fn in_channel(text: impl Into<String>) -> Self {
        SlashResponse {
            response_type: ResponseType::InChannel,
            text: text.into(),
        }
    }

    pub fn ephemeral(text: impl Into<String>) -> Self {
        SlashResponse {
            response_type: ResponseType::Ephemeral,
            text: text.into(),
        }
    }
}

pub const USAGE_TEXT: &str = concat!(
    "Whoops, not quite! :blob-salute:\n",
    "Follow this -> */loghours <name>;<month>;<description>;<hours>*\n",
    "Here's an example! -> */loghours Brian Adhitya;May;1-Went to GM!;2*",
);

pub const ACK_TEXT: &str = "Logging your hours... hang on!!! :dog-roll:";

pub const NOT_FOUND_TEXT: &str = "Your name wasn't found, or there isn't any available empty row found to log your hours. :blob-salute:";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_response_type() {
        let json = serde_json::to_string(&SlashResponse::in_channel("hi")).unwrap();
        assert_eq!(r#"{"response_type":"in_channel","text":"hi"}"#, json);

        let json = serde_json::to_string(&SlashResponse::ephemeral("psst")).unwrap();
        assert_eq!(r#"{"response_type":"ephemeral","text":"psst"}"#, json);
    }
}
