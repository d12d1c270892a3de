//! Keyword-matched assistant replies for the chat widget.

use chrono::Utc;
use serde::Serialize;

use crate::utils::unix_millis;

/// Keyword table scanned in order; the first key contained in the
/// lowercased message wins.
const RESPONSES: &[(&str, &str)] = &[
    (
        "hello",
        "Hello! I'm your AI assistant for polypharmacy risk assessment. How can I help you today?",
    ),
    (
        "help",
        "I can help you with:\n\u{2022} Understanding drug interactions\n\u{2022} Explaining risk factors\n\u{2022} Providing medication guidance\n\u{2022} Answering questions about polypharmacy\n\nWhat would you like to know?",
    ),
    (
        "drug interaction",
        "Drug interactions occur when medications affect each other's effectiveness or cause adverse effects. Common types include:\n\u{2022} Pharmacokinetic interactions (absorption, metabolism)\n\u{2022} Pharmacodynamic interactions (effects on body systems)\n\u{2022} Physical/chemical incompatibilities\n\nWould you like me to analyze specific medications?",
    ),
    (
        "risk factors",
        "Key risk factors for polypharmacy include:\n\u{2022} Age (especially 65+)\n\u{2022} Multiple chronic conditions\n\u{2022} Kidney/liver function impairment\n\u{2022} Number of medications (5+ increases risk)\n\u{2022} Drug-drug interactions\n\u{2022} Patient adherence issues\n\nWould you like to assess your specific risk factors?",
    ),
    (
        "medication safety",
        "Medication safety tips:\n\u{2022} Keep an updated medication list\n\u{2022} Review medications regularly with healthcare provider\n\u{2022} Understand each medication's purpose\n\u{2022} Report any new symptoms immediately\n\u{2022} Use one pharmacy when possible\n\u{2022} Ask about potential interactions\n\nDo you have specific medication concerns?",
    ),
];

#[derive(Debug, Clone, Serialize)]
pub struct AssistantReply {
    pub success: bool,
    pub response: String,
    pub conversation_id: String,
    pub timestamp: String,
}

/// Answer a chat message. A missing or empty conversation id gets a
/// fresh `conv_{millis}` id so the client can thread follow-ups.
pub fn respond(message: &str, conversation_id: Option<String>) -> AssistantReply {
    let lowered = message.to_lowercase();
    let response = RESPONSES
        .iter()
        .find(|(key, _)| lowered.contains(key))
        .map(|(_, reply)| (*reply).to_string())
        .unwrap_or_else(|| generic_reply(message));

    let conversation_id = conversation_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("conv_{}", unix_millis()));

    AssistantReply {
        success: true,
        response,
        conversation_id,
        timestamp: Utc::now().to_rfc3339(),
    }
}

fn generic_reply(message: &str) -> String {
    format!(
        "I understand you're asking about \"{}\". As your polypharmacy risk assessment assistant, I can help you with:\n\n\u{2022} Drug interaction analysis\n\u{2022} Risk factor assessment\n\u{2022} Medication safety guidance\n\u{2022} Polypharmacy management\n\nCould you be more specific about what you'd like to know?",
        message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_matches_hello_key() {
        let reply = respond("Hello there!", None);
        assert!(reply.success);
        assert!(reply.response.starts_with("Hello! I'm your AI assistant"));
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let reply = respond("what are the RISK FACTORS here?", None);
        assert!(reply.response.starts_with("Key risk factors for polypharmacy"));
    }

    #[test]
    fn first_listed_keyword_wins() {
        // Contains both "hello" and "help"; "hello" is listed first.
        let reply = respond("hello, I need help", None);
        assert!(reply.response.starts_with("Hello!"));
    }

    #[test]
    fn unknown_message_gets_the_generic_reply_with_echo() {
        let reply = respond("tell me about quantum pharmacology", None);
        assert!(reply
            .response
            .contains("\"tell me about quantum pharmacology\""));
        assert!(reply.response.contains("Could you be more specific"));
    }

    #[test]
    fn conversation_id_is_kept_or_minted() {
        let kept = respond("hello", Some("conv_42".to_string()));
        assert_eq!(kept.conversation_id, "conv_42");

        let minted = respond("hello", None);
        assert!(minted.conversation_id.starts_with("conv_"));

        let blank = respond("hello", Some("   ".to_string()));
        assert!(blank.conversation_id.starts_with("conv_"));
        assert_ne!(blank.conversation_id.trim(), "");
    }
}
