/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Wire protocol for mute-state gossip on the side channel.
//!
//! Frames are plain text, `"<action> <participant_id>"`. The side channel is
//! best-effort (at-least-once, order-preserving per sender), so every message
//! is self-contained and safe to re-deliver.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// What a gossip frame asserts about its subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MuteKind {
    /// The subject's microphone is muted.
    Mute,
    /// The subject's microphone is live.
    Unmute,
    /// The sender just joined the channel and asks currently-muted
    /// participants to re-announce themselves.
    StateQuery,
}

impl Display for MuteKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MuteKind::Mute => write!(f, "mute"),
            MuteKind::Unmute => write!(f, "unmute"),
            MuteKind::StateQuery => write!(f, "state"),
        }
    }
}

/// One mute-gossip message. Ephemeral: encoded, sent, decoded, dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuteMessage {
    pub kind: MuteKind,
    /// Session id of the participant the message is about. For `StateQuery`
    /// this is the querying participant itself.
    pub subject_id: String,
}

impl MuteMessage {
    pub fn mute(subject_id: impl Into<String>) -> Self {
        Self {
            kind: MuteKind::Mute,
            subject_id: subject_id.into(),
        }
    }

    pub fn unmute(subject_id: impl Into<String>) -> Self {
        Self {
            kind: MuteKind::Unmute,
            subject_id: subject_id.into(),
        }
    }

    pub fn state_query(subject_id: impl Into<String>) -> Self {
        Self {
            kind: MuteKind::StateQuery,
            subject_id: subject_id.into(),
        }
    }

    /// Encodes the message for the side channel.
    pub fn to_wire(&self) -> String {
        format!("{} {}", self.kind, self.subject_id)
    }
}

/// Why an inbound frame could not be decoded. The receiving client drops such
/// frames; the protocol never fails hard on garbage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MuteParseError {
    Empty,
    UnknownAction(String),
    MissingSubject,
}

impl Display for MuteParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MuteParseError::Empty => write!(f, "empty frame"),
            MuteParseError::UnknownAction(action) => write!(f, "unknown action {action:?}"),
            MuteParseError::MissingSubject => write!(f, "missing subject id"),
        }
    }
}

impl FromStr for MuteMessage {
    type Err = MuteParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(MuteParseError::Empty);
        }
        let (action, subject) = match raw.split_once(' ') {
            Some((action, subject)) => (action, subject.trim()),
            None => (raw, ""),
        };
        // "sendState" is the spelling used by older clients.
        let kind = match action {
            "mute" => MuteKind::Mute,
            "unmute" => MuteKind::Unmute,
            "state" | "sendState" => MuteKind::StateQuery,
            other => return Err(MuteParseError::UnknownAction(other.to_string())),
        };
        if subject.is_empty() {
            return Err(MuteParseError::MissingSubject);
        }
        Ok(MuteMessage {
            kind,
            subject_id: subject.to_string(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encodes_every_kind() {
        assert_eq!(MuteMessage::mute("PA1").to_wire(), "mute PA1");
        assert_eq!(MuteMessage::unmute("PA1").to_wire(), "unmute PA1");
        assert_eq!(MuteMessage::state_query("PA2").to_wire(), "state PA2");
    }

    #[test]
    fn parses_own_encoding() {
        let msg = MuteMessage::mute("PA77");
        assert_eq!(msg.to_wire().parse::<MuteMessage>(), Ok(msg));
    }

    #[test]
    fn accepts_legacy_state_spelling() {
        let msg: MuteMessage = "sendState PA9".parse().unwrap();
        assert_eq!(msg.kind, MuteKind::StateQuery);
        assert_eq!(msg.subject_id, "PA9");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!("".parse::<MuteMessage>(), Err(MuteParseError::Empty));
        assert_eq!(
            "   ".parse::<MuteMessage>(),
            Err(MuteParseError::Empty)
        );
        assert_eq!(
            "shout PA1".parse::<MuteMessage>(),
            Err(MuteParseError::UnknownAction("shout".to_string()))
        );
        assert_eq!(
            "mute".parse::<MuteMessage>(),
            Err(MuteParseError::MissingSubject)
        );
        assert_eq!(
            "mute   ".parse::<MuteMessage>(),
            Err(MuteParseError::MissingSubject)
        );
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let msg: MuteMessage = "  unmute PA3 \n".parse().unwrap();
        assert_eq!(msg, MuteMessage::unmute("PA3"));
    }
}
