use base64::Engine;
use std::time::Duration;
use voicemail_ivr::nats::messages::{SessionResultMessage, TurnReplyMessage, TurnRequestMessage};
use voicemail_ivr::session::{ErrorCause, ErrorKind};
use voicemail_ivr::turn::{ControlEvent, InteractionDescriptor, PromptItem, TurnResponse};
use voicemail_ivr::{SessionReport, SessionResult};

#[test]
fn test_turn_request_serialization() {
    let descriptor = InteractionDescriptor::builder("ask-login")
        .audio("/prompts/original/ask-login.wav")
        .dtmf(4)
        .no_input_timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    let msg = TurnRequestMessage {
        session_id: "session-1".to_string(),
        sequence: 1,
        descriptor,
        timeout_ms: 15_000,
        timestamp: "2025-10-27T14:30:00Z".to_string(),
    };

    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("session-1"));
    assert!(json.contains("ask-login"));
    assert!(json.contains("builtin:dtmf/digits?length=4"));
    assert!(json.contains("\"sequence\":1"));
    assert!(json.contains("\"timeout_ms\":15000"));

    let deserialized: TurnRequestMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.sequence, 1);
    assert_eq!(deserialized.descriptor.id(), "ask-login");
    assert_eq!(
        deserialized.descriptor.prompt(),
        &[PromptItem::AudioSegment(
            "/prompts/original/ask-login.wav".to_string()
        )]
    );
    assert_eq!(
        deserialized.descriptor.no_input_timeout(),
        Duration::from_secs(10)
    );
}

#[test]
fn test_dtmf_reply_deserialization() {
    let json = r#"{
        "session_id": "session-1",
        "sequence": 2,
        "response": {
            "type": "recognition",
            "utterance": "4 0 6 9",
            "interpretation": "4069"
        }
    }"#;

    let reply: TurnReplyMessage = serde_json::from_str(json).unwrap();
    assert_eq!(reply.session_id, "session-1");
    assert_eq!(reply.sequence, 2);
    assert_eq!(reply.response, TurnResponse::dtmf("4069"));
}

#[test]
fn test_event_reply_deserialization() {
    let json = r#"{
        "session_id": "session-1",
        "sequence": 3,
        "response": {
            "type": "controlEvent",
            "category": "connection.disconnect.hangup"
        }
    }"#;

    let reply: TurnReplyMessage = serde_json::from_str(json).unwrap();
    assert_eq!(reply.response, TurnResponse::event(ControlEvent::hangup()));
}

#[test]
fn test_recording_reply_carries_base64_audio() {
    let reply = TurnReplyMessage {
        session_id: "session-1".to_string(),
        sequence: 4,
        response: TurnResponse::Recording {
            audio_bytes: vec![1, 2, 3, 4],
            mime_type: "audio/x-wav".to_string(),
            duration: Duration::from_millis(2500),
            termination_digit: Some('#'),
        },
    };

    let json = serde_json::to_value(&reply).unwrap();
    assert_eq!(json["response"]["type"], "recording");
    assert_eq!(
        json["response"]["audioBytes"],
        base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3, 4])
    );
    assert_eq!(json["response"]["duration"], 2500);

    let deserialized: TurnReplyMessage = serde_json::from_value(json).unwrap();
    assert_eq!(deserialized.response, reply.response);
}

#[test]
fn test_session_result_message() {
    let report = SessionReport {
        session_id: "session-1".to_string(),
        result: SessionResult::error(ErrorCause {
            kind: ErrorKind::HangUp,
            message: "caller hung up".to_string(),
            interaction: Some("main-menu".to_string()),
        }),
        started_at: chrono::Utc::now(),
        duration_secs: 12.5,
        turns: 6,
    };

    let msg = SessionResultMessage::from(&report);
    let json = serde_json::to_value(&msg).unwrap();

    assert_eq!(json["session_id"], "session-1");
    assert_eq!(json["turns"], 6);
    assert_eq!(json["result"]["status"], "error");
    assert_eq!(json["result"]["cause"]["kind"], "hangUp");
    assert_eq!(json["result"]["cause"]["interaction"], "main-menu");
}
