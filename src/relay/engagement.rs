//! Engagement classification and mention stripping.

use poise::serenity_prelude::UserId;

/// How an inbound message engaged the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engagement {
    /// The message replies to one of the bot's own messages.
    Reply,
    /// The message mentions the bot directly.
    Mention,
}

impl Engagement {
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Engagement::Reply => "reply",
            Engagement::Mention => "mention",
        }
    }
}

/// Decide whether a message is addressed to the bot.
///
/// A reply to a bot-authored message wins over a direct mention when both
/// hold at once.
#[must_use]
pub fn classify(replied_to_bot: bool, mentions_bot: bool) -> Option<Engagement> {
    if replied_to_bot {
        Some(Engagement::Reply)
    } else if mentions_bot {
        Some(Engagement::Mention)
    } else {
        None
    }
}

/// Remove the bot's mention tokens from `content` and trim whitespace.
///
/// Discord renders mentions as `<@id>`, or `<@!id>` for nickname mentions;
/// both forms are stripped.
#[must_use]
pub fn strip_bot_mention(content: &str, bot_user_id: UserId) -> String {
    let mention = format!("<@{bot_user_id}>");
    let nick_mention = format!("<@!{bot_user_id}>");
    content
        .replace(&nick_mention, "")
        .replace(&mention, "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_ID: UserId = UserId::new(42);

    #[test]
    fn mention_engages() {
        assert_eq!(classify(false, true), Some(Engagement::Mention));
    }

    #[test]
    fn reply_to_bot_engages() {
        assert_eq!(classify(true, false), Some(Engagement::Reply));
    }

    #[test]
    fn reply_wins_over_mention() {
        assert_eq!(classify(true, true), Some(Engagement::Reply));
    }

    #[test]
    fn unrelated_message_does_not_engage() {
        assert_eq!(classify(false, false), None);
    }

    #[test]
    fn mention_token_is_stripped_and_trimmed() {
        assert_eq!(strip_bot_mention("<@42> hello", BOT_ID), "hello");
        assert_eq!(strip_bot_mention("hello <@42>", BOT_ID), "hello");
    }

    #[test]
    fn nickname_mention_token_is_stripped() {
        assert_eq!(strip_bot_mention("<@!42> hello", BOT_ID), "hello");
    }

    #[test]
    fn mention_only_message_leaves_empty_content() {
        assert_eq!(strip_bot_mention("<@42>", BOT_ID), "");
        assert_eq!(strip_bot_mention("  <@42>   ", BOT_ID), "");
    }

    #[test]
    fn other_mentions_are_preserved() {
        assert_eq!(
            strip_bot_mention("<@42> ask <@99> instead", BOT_ID),
            "ask <@99> instead"
        );
    }
}
