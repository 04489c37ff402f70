//! Property-based tests for the dialog state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::stage::{upi_apps, UPI_APPS};
use super::transition::parse_payment_details;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::ToPdf), Just(Direction::ToText)]
}

fn arb_stage() -> impl Strategy<Value = Stage> {
    prop_oneof![
        Just(Stage::Menu),
        Just(Stage::UpiServiceAskApp { apps: upi_apps() }),
        proptest::sample::select(UPI_APPS.to_vec())
            .prop_map(|s| Stage::UpiAskDetails { service: s.to_string() }),
        Just(Stage::FileConvAskDirection),
        arb_direction().prop_map(|direction| Stage::FileConvProvideLink { direction }),
        Just(Stage::LensAskGenerateLink),
        Just(Stage::LensUploadLinkGenerated),
    ]
}

fn arb_message() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[0-9]{1,2}".prop_map(Event::user_message),
        "[a-zA-Z ;.@0-9]{0,30}".prop_map(Event::user_message),
        ("[a-z]{1,8}@[a-z]{2,6}", 0u32..100_000, "[a-zA-Z ]{0,12}")
            .prop_map(|(id, paise, note)| {
                Event::user_message(format!("{id};{}.{:02};{note}", paise / 100, paise % 100))
            }),
        Just(Event::Reset),
    ]
}

// ============================================================================
// Validity Checkers
// ============================================================================

/// Effects only appear together with the stage that waits on their link
fn effects_match_stage(result: &Transition) -> bool {
    match result.effects.as_slice() {
        [] => true,
        [Effect::IssueUploadLink { direction }] => {
            result.new_stage == Stage::FileConvProvideLink { direction: *direction }
        }
        [Effect::IssueLensUploadLink] => result.new_stage == Stage::LensUploadLinkGenerated,
        _ => false,
    }
}

/// Rejected input never moves the user
fn rejection_keeps_stage(before: &Stage, result: &Transition) -> bool {
    match result.reply {
        Reply::Invalid(_) => &result.new_stage == before && result.effects.is_empty(),
        _ => true,
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: effects and stage stay consistent along any conversation
    #[test]
    fn prop_conversations_keep_effects_consistent(
        start in arb_stage(),
        events in proptest::collection::vec(arb_message(), 0..20)
    ) {
        let mut stage = start;
        for event in events {
            let result = transition(&stage, event);
            prop_assert!(effects_match_stage(&result), "bad effects: {:?}", result);
            prop_assert!(rejection_keeps_stage(&stage, &result), "moved on rejection: {:?}", result);
            stage = result.new_stage;
        }
    }

    // Invariant 2: reset always lands on the menu without effects
    #[test]
    fn prop_reset_returns_to_menu(stage in arb_stage()) {
        let result = transition(&stage, Event::Reset);
        prop_assert_eq!(result.new_stage, Stage::Menu);
        prop_assert_eq!(result.reply, Reply::Menu);
        prop_assert!(result.effects.is_empty());
    }

    // Invariant 3: valid payment details always produce a well-formed link
    #[test]
    fn prop_payment_link_shape(
        upi_id in "[a-z0-9.]{1,12}@[a-z]{2,8}",
        paise in 0u64..10_000_000,
        note in "[a-zA-Z0-9 ]{0,20}"
    ) {
        let amount = format!("{}.{:02}", paise / 100, paise % 100);
        let stage = Stage::UpiAskDetails { service: "GooglePay".to_string() };
        let result = transition(&stage, Event::user_message(format!("{upi_id};{amount};{note}")));

        let Reply::PaymentLink { link } = result.reply.clone() else {
            return Err(TestCaseError::fail(format!("expected link, got {:?}", result.reply)));
        };
        prop_assert_eq!(result.new_stage, Stage::Menu);
        let prefix = format!("upi://pay?pa={upi_id}&am={amount}&cu=INR");
        prop_assert!(link.starts_with(&prefix));

        let note = note.trim();
        if note.is_empty() {
            prop_assert!(link.ends_with("&cu=INR"));
        } else {
            let expected_suffix = format!("&cu=INR&tn={note}");
            prop_assert!(link.ends_with(&expected_suffix));
        }
    }

    // Invariant 4: amounts that do not parse never produce a link
    #[test]
    fn prop_non_numeric_amount_rejected(upi_id in "[a-z]{1,8}@upi", amount in "[a-zA-Z]{1,8}") {
        prop_assume!(amount.parse::<f64>().is_err());
        let parsed = parse_payment_details(&format!("{upi_id};{amount}"));
        prop_assert_eq!(parsed, Err(InvalidInput::PaymentAmount));
    }

    // Invariant 5: app choice accepts exactly 1..=len
    #[test]
    fn prop_app_choice_range(choice in -5i64..10) {
        let stage = Stage::UpiServiceAskApp { apps: upi_apps() };
        let result = transition(&stage, Event::user_message(choice.to_string()));
        let in_range = (1..=4).contains(&choice);
        prop_assert_eq!(matches!(result.new_stage, Stage::UpiAskDetails { .. }), in_range);
    }
}
