//!
//! Replay message reconstruction.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use crate::capture::CanonicalMessage;

/* --- start of code -------------------------------------------------------------------------- */

///
/// Rebuild the outbound message list from a stored split.
///
/// Pure concatenation: a system message when `system_prompt` is non-empty,
/// then `middle_messages` verbatim, then a user message when `user_message`
/// is non-empty. Nothing is reordered or deduplicated.
///
/// # Arguments
///  * `system_prompt` - system prompt to lead with
///  * `middle_messages` - stored conversation history
///  * `user_message` - final user turn
///
/// # Returns
///  * ordered message list, possibly empty
pub fn build_replay_messages(
    system_prompt: &str,
    middle_messages: &[CanonicalMessage],
    user_message: &str,
) -> Vec<CanonicalMessage> {
    let mut messages = Vec::with_capacity(middle_messages.len() + 2);

    if !system_prompt.is_empty() {
        messages.push(CanonicalMessage::system(system_prompt));
    }
    messages.extend_from_slice(middle_messages);
    if !user_message.is_empty() {
        messages.push(CanonicalMessage::user(user_message));
    }

    messages
}

/* --- tests ----------------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Role;

    #[test]
    fn test_empty_slots_are_skipped() {
        let middle = vec![CanonicalMessage::text(Role::Assistant, "x")];
        assert_eq!(build_replay_messages("", &middle, ""), middle);
        assert!(build_replay_messages("", &[], "").is_empty());
    }

    #[test]
    fn test_order_is_system_middle_user() {
        let middle = vec![CanonicalMessage::user("a"), CanonicalMessage::text(Role::Assistant, "b")];
        let messages = build_replay_messages("sys", &middle, "last");

        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
        assert_eq!(messages[3].content_text(), "last");
    }
}
