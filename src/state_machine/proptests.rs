//! Property-based tests for the session state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::conversation::{ConversationState, MessageDraft, MessageOrigin};
use crate::session::SessionId;
use crate::transport::{ChatResponse, CustomerRecord, Product, TransportError, TransportErrorKind};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new(SessionId::from("prop-session"))
}

/// Mirror of how the runtime applies store effects, so flag and message
/// invariants can be checked against a real conversation log.
fn apply_store_effects(conversation: &mut ConversationState, effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::Append { draft } => {
                conversation.append(draft.clone());
            }
            Effect::SetPendingReply(value) => conversation.set_pending_reply(*value),
            Effect::SetFormVisible(value) => conversation.set_form_visible(*value),
            Effect::SetFormSubmitting(value) => conversation.set_form_submitting(*value),
            Effect::SendChat { .. } | Effect::SubmitRecord { .. } => {}
        }
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_optional_text() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        "[a-zA-Z ]{1,30}".prop_map(Some),
    ]
}

fn arb_product() -> impl Strategy<Value = Product> {
    (
        proptest::option::of(1i64..100),
        "[a-zA-Z ]{1,20}",
        0.0f64..500.0,
    )
        .prop_map(|(id, name, price)| Product {
            id,
            name,
            description: String::new(),
            price,
            image_url: None,
        })
}

fn arb_chat_response() -> impl Strategy<Value = ChatResponse> {
    (
        arb_optional_text(),
        arb_optional_text(),
        proptest::collection::vec(arb_product(), 0..4),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(response, message, products, collect_info, show_form)| ChatResponse {
                response,
                message,
                products,
                collect_info,
                show_form,
            },
        )
}

fn arb_error_kind() -> impl Strategy<Value = TransportErrorKind> {
    prop_oneof![
        Just(TransportErrorKind::Network),
        Just(TransportErrorKind::Timeout),
        Just(TransportErrorKind::InvalidRequest),
        Just(TransportErrorKind::ServerError),
        Just(TransportErrorKind::InvalidResponse),
        Just(TransportErrorKind::Unknown),
    ]
}

fn arb_transport_error() -> impl Strategy<Value = TransportError> {
    (arb_error_kind(), "[a-z ]{1,20}")
        .prop_map(|(kind, message)| TransportError::new(kind, message))
}

fn arb_valid_record() -> impl Strategy<Value = CustomerRecord> {
    (
        "[A-Za-z]{1,12}",
        "[A-Za-z]{1,12}",
        1u32..120,
        "[0-9]{7,12}",
        proptest::option::of("[a-z]{3,8}"),
    )
        .prop_map(|(first_name, last_name, age, phone, email)| CustomerRecord {
            first_name,
            last_name,
            age,
            phone,
            email: email.map(|user| format!("{user}@example.com")),
        })
}

fn arb_record() -> impl Strategy<Value = CustomerRecord> {
    // Mostly valid, sometimes with a required field knocked out
    (arb_valid_record(), 0u8..8).prop_map(|(mut record, knock)| {
        match knock {
            0 => record.first_name = String::new(),
            1 => record.last_name = "  ".to_string(),
            2 => record.age = 0,
            3 => record.phone = String::new(),
            _ => {}
        }
        record
    })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        // Includes blank and whitespace-only texts
        "[a-zA-Z ]{0,30}".prop_map(|text| Event::MessageSubmitted { text }),
        arb_chat_response().prop_map(|response| Event::ReplyReceived { response }),
        arb_transport_error().prop_map(|error| Event::ReplyFailed { error }),
        arb_record().prop_map(|record| Event::FormSubmitted { record }),
        Just(Event::FormCancelled),
        Just(Event::RecordAccepted),
        arb_transport_error().prop_map(|error| Event::RecordRejected { error }),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: The message log only ever grows, in id order
    #[test]
    fn prop_messages_append_only(events in proptest::collection::vec(arb_event(), 0..20)) {
        let ctx = test_context();
        let mut state = ControllerState::Idle;
        let mut conversation = ConversationState::new();

        for event in events {
            match transition(&state, &ctx, event) {
                Ok(result) => {
                    let before: Vec<(u64, String)> = conversation
                        .messages()
                        .iter()
                        .map(|m| (m.id, m.text.clone()))
                        .collect();

                    state = result.new_state;
                    apply_store_effects(&mut conversation, &result.effects);

                    let after = conversation.messages();
                    prop_assert!(after.len() >= before.len());
                    for (i, (id, text)) in before.iter().enumerate() {
                        prop_assert_eq!(after[i].id, *id);
                        prop_assert_eq!(&after[i].text, text);
                    }
                    for pair in after.windows(2) {
                        prop_assert!(pair[0].id < pair[1].id);
                    }
                }
                Err(_) => { /* Refused events leave the log alone */ }
            }
        }
    }

    // Invariant 2: Store flags always agree with the controller state
    #[test]
    fn prop_flags_track_state(events in proptest::collection::vec(arb_event(), 0..20)) {
        let ctx = test_context();
        let mut state = ControllerState::Idle;
        let mut conversation = ConversationState::new();

        for event in events {
            if let Ok(result) = transition(&state, &ctx, event) {
                state = result.new_state;
                apply_store_effects(&mut conversation, &result.effects);
            }
            prop_assert_eq!(conversation.pending_reply(), state.pending_reply());
            prop_assert_eq!(conversation.form_visible(), state.form_visible());
            prop_assert_eq!(conversation.form_submitting(), state.form_submitting());
        }
    }

    // Invariant 3: Never two chat requests or two submissions in flight
    #[test]
    fn prop_single_flight(events in proptest::collection::vec(arb_event(), 0..20)) {
        let ctx = test_context();
        let mut state = ControllerState::Idle;
        let mut chat_in_flight = false;
        let mut submission_in_flight = false;

        for event in events {
            let resolves_chat =
                matches!(event, Event::ReplyReceived { .. } | Event::ReplyFailed { .. });
            let resolves_submission =
                matches!(event, Event::RecordAccepted | Event::RecordRejected { .. });

            if let Ok(result) = transition(&state, &ctx, event) {
                if resolves_chat {
                    chat_in_flight = false;
                }
                if resolves_submission {
                    submission_in_flight = false;
                }
                for effect in &result.effects {
                    match effect {
                        Effect::SendChat { .. } => {
                            prop_assert!(!chat_in_flight, "second chat request issued mid-flight");
                            chat_in_flight = true;
                        }
                        Effect::SubmitRecord { .. } => {
                            prop_assert!(
                                !submission_in_flight,
                                "second submission issued mid-flight"
                            );
                            submission_in_flight = true;
                        }
                        _ => {}
                    }
                }
                state = result.new_state;
                prop_assert_eq!(chat_in_flight, state.pending_reply());
                prop_assert_eq!(submission_in_flight, state.form_submitting());
            }
        }
    }

    // Invariant 4: A resolved reply always appends non-empty assistant text
    #[test]
    fn prop_reply_text_never_empty(response in arb_chat_response()) {
        let expecting_fallback = response.reply_text().is_none();
        let result = transition(
            &ControllerState::AwaitingReply,
            &test_context(),
            Event::ReplyReceived { response },
        )
        .unwrap();

        match &result.effects[0] {
            Effect::Append { draft } => {
                prop_assert!(!draft.text.is_empty());
                prop_assert_eq!(draft.origin, MessageOrigin::Assistant);
                if expecting_fallback {
                    prop_assert_eq!(draft.text.as_str(), replies::FALLBACK);
                }
            }
            other => prop_assert!(false, "expected Append first, got {:?}", other),
        }
    }

    // Invariant 5: The form prompt fires iff the backend flags asked for it
    #[test]
    fn prop_form_trigger_fidelity(response in arb_chat_response()) {
        let wants_form = response.collect_info || response.show_form;
        let result = transition(
            &ControllerState::AwaitingReply,
            &test_context(),
            Event::ReplyReceived { response },
        )
        .unwrap();

        let shows_form = result
            .effects
            .iter()
            .any(|e| matches!(e, Effect::SetFormVisible(true)));
        prop_assert_eq!(shows_form, wants_form);
        prop_assert_eq!(result.new_state == ControllerState::FormPrompted, wants_form);
        if !wants_form {
            prop_assert_eq!(result.new_state, ControllerState::Idle);
        }
    }

    // Invariant 6: Any chat failure recovers to an Idle that accepts input
    #[test]
    fn prop_failure_recovery(error in arb_transport_error()) {
        let ctx = test_context();
        let result = transition(
            &ControllerState::AwaitingReply,
            &ctx,
            Event::ReplyFailed { error },
        )
        .unwrap();

        prop_assert_eq!(result.new_state, ControllerState::Idle);
        let appended: Vec<_> = result
            .effects
            .iter()
            .filter_map(|e| match e {
                Effect::Append { draft } => Some(draft),
                _ => None,
            })
            .collect();
        prop_assert_eq!(appended.len(), 1);
        prop_assert_eq!(appended[0].text.as_str(), replies::CHAT_FAILURE);
        prop_assert_eq!(appended[0].origin, MessageOrigin::Assistant);

        let retry = transition(
            &result.new_state,
            &ctx,
            Event::MessageSubmitted { text: "retry".to_string() },
        );
        prop_assert!(retry.is_ok(), "recovery must leave the session usable");
    }

    // Invariant 7: Every transport effect carries the context's session id
    #[test]
    fn prop_session_id_threaded(events in proptest::collection::vec(arb_event(), 0..20)) {
        let ctx = test_context();
        let mut state = ControllerState::Idle;

        for event in events {
            if let Ok(result) = transition(&state, &ctx, event) {
                for effect in &result.effects {
                    match effect {
                        Effect::SendChat { session_id, .. }
                        | Effect::SubmitRecord { session_id, .. } => {
                            prop_assert_eq!(session_id, &ctx.session_id);
                        }
                        _ => {}
                    }
                }
                state = result.new_state;
            }
        }
    }

    // Invariant 8: Whitespace-only input is always a silent refusal
    #[test]
    fn prop_blank_messages_refused(text in "[ \t\n]{0,10}") {
        let result = transition(
            &ControllerState::Idle,
            &test_context(),
            Event::MessageSubmitted { text },
        );
        prop_assert!(matches!(result, Err(TransitionError::BlankMessage)));
    }

    // Invariant 9: Incomplete records never reach the transport
    #[test]
    fn prop_invalid_record_refused(record in arb_valid_record(), knock in 0u8..4) {
        let mut record = record;
        match knock {
            0 => record.first_name = String::new(),
            1 => record.last_name = String::new(),
            2 => record.age = 0,
            _ => record.phone = "   ".to_string(),
        }
        let result = transition(
            &ControllerState::FormPrompted,
            &test_context(),
            Event::FormSubmitted { record },
        );
        prop_assert!(matches!(result, Err(TransitionError::InvalidRecord(_))));
    }

    // Invariant 10: Complete records submit exactly as entered
    #[test]
    fn prop_valid_record_submits(record in arb_valid_record()) {
        let result = transition(
            &ControllerState::FormPrompted,
            &test_context(),
            Event::FormSubmitted { record: record.clone() },
        )
        .unwrap();

        prop_assert_eq!(result.new_state, ControllerState::AwaitingFormSubmit);
        // prop_assert! stringifies its condition into a format string, so
        // the brace pattern cannot sit inline
        let submitted = result
            .effects
            .iter()
            .any(|e| matches!(e, Effect::SubmitRecord { record: r, .. } if r == &record));
        prop_assert!(submitted, "record effect missing or altered");
    }
}

// ============================================================================
// Sequence Tests - Multi-Step Scenarios
// ============================================================================

/// Full happy path: browse, get products, hand off to sales, submit the form
#[test]
fn test_full_shopping_conversation() {
    let ctx = test_context();
    let mut state = ControllerState::Idle;
    let mut conversation = ConversationState::new();
    conversation.append(MessageDraft::assistant(replies::GREETING));

    // User asks for products
    let result = transition(
        &state,
        &ctx,
        Event::MessageSubmitted {
            text: "show me running shoes".to_string(),
        },
    )
    .unwrap();
    state = result.new_state;
    apply_store_effects(&mut conversation, &result.effects);
    assert_eq!(state, ControllerState::AwaitingReply);
    assert!(conversation.pending_reply());

    // Backend replies with a product card
    let response = ChatResponse {
        response: Some("Here are some great running shoes".to_string()),
        products: vec![Product {
            id: Some(3),
            name: "Trail Runner".to_string(),
            description: "Lightweight trail shoe".to_string(),
            price: 89.99,
            image_url: None,
        }],
        ..ChatResponse::default()
    };
    let result = transition(&state, &ctx, Event::ReplyReceived { response }).unwrap();
    state = result.new_state;
    apply_store_effects(&mut conversation, &result.effects);
    assert_eq!(state, ControllerState::Idle);
    assert_eq!(conversation.messages().len(), 3);
    assert_eq!(conversation.messages()[2].products.len(), 1);
    assert!(!conversation.pending_reply());

    // Sales handoff prompts the contact form
    let result = transition(
        &state,
        &ctx,
        Event::MessageSubmitted {
            text: "I want to talk to sales".to_string(),
        },
    )
    .unwrap();
    state = result.new_state;
    apply_store_effects(&mut conversation, &result.effects);

    let response = ChatResponse {
        response: Some("Happy to connect you with our team".to_string()),
        show_form: true,
        ..ChatResponse::default()
    };
    let result = transition(&state, &ctx, Event::ReplyReceived { response }).unwrap();
    state = result.new_state;
    apply_store_effects(&mut conversation, &result.effects);
    assert_eq!(state, ControllerState::FormPrompted);
    assert!(conversation.form_visible());

    // Submit the record
    let record = CustomerRecord {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        age: 36,
        phone: "555-0100".to_string(),
        email: None,
    };
    let result = transition(&state, &ctx, Event::FormSubmitted { record }).unwrap();
    state = result.new_state;
    apply_store_effects(&mut conversation, &result.effects);
    assert!(conversation.form_submitting());

    let result = transition(&state, &ctx, Event::RecordAccepted).unwrap();
    state = result.new_state;
    apply_store_effects(&mut conversation, &result.effects);
    assert_eq!(state, ControllerState::Idle);
    assert!(!conversation.form_visible());
    assert!(!conversation.form_submitting());
    assert_eq!(
        conversation.messages().last().map(|m| m.text.as_str()),
        Some(replies::FORM_THANKS)
    );
}

/// Submission failure keeps the form up; the second attempt goes through
#[test]
fn test_form_retry_cycle() {
    let ctx = test_context();
    let mut state = ControllerState::FormPrompted;
    let mut conversation = ConversationState::new();
    conversation.set_form_visible(true);

    let record = CustomerRecord {
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        age: 45,
        phone: "555-0199".to_string(),
        email: Some("grace@example.com".to_string()),
    };

    // First attempt fails server-side
    let result = transition(
        &state,
        &ctx,
        Event::FormSubmitted {
            record: record.clone(),
        },
    )
    .unwrap();
    state = result.new_state;
    apply_store_effects(&mut conversation, &result.effects);

    let result = transition(
        &state,
        &ctx,
        Event::RecordRejected {
            error: TransportError::server_error("insert failed"),
        },
    )
    .unwrap();
    state = result.new_state;
    apply_store_effects(&mut conversation, &result.effects);
    assert_eq!(state, ControllerState::FormPrompted);
    assert!(conversation.form_visible());
    assert!(!conversation.form_submitting());
    assert_eq!(
        conversation.messages().last().map(|m| m.text.as_str()),
        Some(replies::FORM_FAILURE)
    );

    // Second attempt succeeds
    let result = transition(&state, &ctx, Event::FormSubmitted { record }).unwrap();
    state = result.new_state;
    apply_store_effects(&mut conversation, &result.effects);

    let result = transition(&state, &ctx, Event::RecordAccepted).unwrap();
    state = result.new_state;
    apply_store_effects(&mut conversation, &result.effects);
    assert_eq!(state, ControllerState::Idle);
    assert!(!conversation.form_visible());
    assert_eq!(
        conversation.messages().last().map(|m| m.text.as_str()),
        Some(replies::FORM_THANKS)
    );
}
