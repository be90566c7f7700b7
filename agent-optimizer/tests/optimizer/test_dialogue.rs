//! Dialogue controller properties

use super::common::*;
use agent_optimizer::dialogue::{
    DialogueController, DialogueError, Phase, RequestStatus, Settlement, SubmitOutcome,
    ASSISTANT_INSTRUCTION, CLOSING_MESSAGE,
};
use agent_optimizer_sdk::{
    AnalysisOutcome, ChatRole, KpiReport, Speaker, TransportError, QUESTIONS,
};
use serde_json::Value;

fn answer_all(dialogue: &mut DialogueController) -> SubmitOutcome {
    let mut last = SubmitOutcome::Ignored;
    for answer in FIVE_ANSWERS {
        last = dialogue.submit_answer(answer);
    }
    last
}

fn assert_initial(dialogue: &DialogueController) {
    assert_eq!(dialogue.phase(), &Phase::Asking(0));
    assert_eq!(dialogue.turn_index(), 0);
    assert_eq!(dialogue.status(), RequestStatus::Idle);
    assert!(dialogue.answers().is_empty());
    assert_eq!(dialogue.transcript().len(), 1);
    assert_eq!(dialogue.transcript()[0].speaker, Speaker::SystemPrompt);
    assert_eq!(dialogue.transcript()[0].text, QUESTIONS[0].prompt);
    assert!(dialogue.report().is_empty());
    assert_eq!(dialogue.kpi_raw(), &Value::Null);
    assert!(dialogue.artifact().is_none());
    assert!(dialogue.error().is_none());
    assert!(!dialogue.has_pending_prompt());
}

// ============================================================================
// Turn progression
// ============================================================================

#[test]
fn test_answer_count_tracks_turn_index() {
    let mut dialogue = DialogueController::default();

    for (i, answer) in FIVE_ANSWERS.iter().enumerate() {
        assert_eq!(dialogue.answers().len(), dialogue.turn_index());
        assert_eq!(dialogue.answers().len(), i);

        let outcome = dialogue.submit_answer(answer);
        if i + 1 < QUESTIONS.len() {
            assert_eq!(outcome, SubmitOutcome::Advanced { index: i + 1 });
            assert_eq!(dialogue.answers().len(), i + 1);
            assert_eq!(dialogue.answers().len(), dialogue.turn_index());
        } else {
            assert!(matches!(outcome, SubmitOutcome::Finalize(_)));
        }
    }
}

#[test]
fn test_blank_submissions_do_not_mutate_state() {
    let mut dialogue = DialogueController::default();
    dialogue.submit_answer("Tech");
    let transcript_before = dialogue.transcript().to_vec();
    let answers_before = dialogue.answers().clone();

    for blank in ["", "   ", "\t\n"] {
        assert_eq!(dialogue.submit_answer(blank), SubmitOutcome::Ignored);
    }

    assert_eq!(dialogue.transcript(), transcript_before.as_slice());
    assert_eq!(dialogue.answers(), &answers_before);
    assert_eq!(dialogue.turn_index(), 1);
}

#[test]
fn test_transcript_alternates_prompt_and_answer() {
    let mut dialogue = DialogueController::default();
    dialogue.submit_answer("Tech");
    dialogue.submit_answer("reduce support cost");

    let entries = dialogue.transcript();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].text, QUESTIONS[0].prompt);
    assert_eq!(entries[1].text, "Tech");
    assert_eq!(entries[2].text, QUESTIONS[1].prompt);
    assert_eq!(entries[3].text, "reduce support cost");
    assert_eq!(entries[4].text, QUESTIONS[2].prompt);
}

#[test]
fn test_answers_ignored_after_completion() {
    let mut dialogue = DialogueController::default();
    answer_all(&mut dialogue);
    let len = dialogue.transcript().len();

    assert_eq!(dialogue.submit_answer("one more"), SubmitOutcome::Ignored);
    assert_eq!(dialogue.transcript().len(), len);
}

// ============================================================================
// Finalize
// ============================================================================

#[test]
fn test_finalize_issues_one_request_with_all_keys() {
    let mut dialogue = DialogueController::default();
    let request = match answer_all(&mut dialogue) {
        SubmitOutcome::Finalize(request) => request,
        other => panic!("expected finalize, got {:?}", other),
    };

    assert_eq!(request.payload.fields.len(), QUESTIONS.len());
    for (question, answer) in QUESTIONS.iter().zip(FIVE_ANSWERS) {
        assert_eq!(request.payload.get(question.key), Some(answer));
    }
    assert!(dialogue.is_in_flight());
    assert_eq!(dialogue.finalize(), Err(DialogueError::InFlight));
}

#[test]
fn test_finalize_rejected_while_incomplete() {
    let mut dialogue = DialogueController::default();
    dialogue.submit_answer("Tech");

    assert_eq!(
        dialogue.finalize(),
        Err(DialogueError::Incomplete {
            answered: 1,
            total: QUESTIONS.len()
        })
    );
    assert_eq!(dialogue.status(), RequestStatus::Idle);
}

#[test]
fn test_finalize_rejected_after_settle() {
    let mut dialogue = DialogueController::default();
    let SubmitOutcome::Finalize(request) = answer_all(&mut dialogue) else {
        panic!("expected finalize");
    };
    dialogue.settle(
        request.ticket,
        Ok(AnalysisOutcome::from_response(&sample_deck_response(2))),
    );

    assert_eq!(dialogue.finalize(), Err(DialogueError::AlreadySettled));
}

// ============================================================================
// Settlement
// ============================================================================

#[test]
fn test_success_stores_result_and_closes_transcript() {
    let mut dialogue = DialogueController::default();
    let SubmitOutcome::Finalize(request) = answer_all(&mut dialogue) else {
        panic!("expected finalize");
    };

    let applied = dialogue.settle(
        request.ticket,
        Ok(AnalysisOutcome::from_response(&sample_deck_response(2))),
    );

    assert!(applied);
    assert_eq!(dialogue.status(), RequestStatus::Settled(Settlement::Success));
    assert_eq!(dialogue.artifact(), Some("deck_123.pptx"));
    assert_eq!(dialogue.report(), &sample_report(2));
    let last = dialogue.transcript().last().unwrap();
    assert_eq!(last.speaker, Speaker::Assistant);
    assert_eq!(last.text, CLOSING_MESSAGE);
}

#[test]
fn test_failure_records_error_message() {
    let mut dialogue = DialogueController::default();
    let SubmitOutcome::Finalize(request) = answer_all(&mut dialogue) else {
        panic!("expected finalize");
    };

    dialogue.settle(
        request.ticket,
        Err(TransportError::Api {
            status: 500,
            message: "LLM quota exceeded".to_string(),
        }),
    );

    assert_eq!(dialogue.error(), Some("LLM quota exceeded"));
    assert_eq!(
        dialogue.status(),
        RequestStatus::Settled(Settlement::Failure("LLM quota exceeded".to_string()))
    );
    assert!(dialogue.report().is_empty());
}

#[test]
fn test_malformed_success_settles_with_empty_report() {
    let mut dialogue = DialogueController::default();
    let SubmitOutcome::Finalize(request) = answer_all(&mut dialogue) else {
        panic!("expected finalize");
    };

    dialogue.settle(
        request.ticket,
        Ok(AnalysisOutcome::from_response(&serde_json::json!({"kpi_values": {}}))),
    );

    assert_eq!(dialogue.status(), RequestStatus::Settled(Settlement::Success));
    assert_eq!(dialogue.report(), &KpiReport::Empty);
}

#[test]
fn test_stale_ticket_is_discarded_after_reset() {
    let mut dialogue = DialogueController::default();
    let SubmitOutcome::Finalize(first) = answer_all(&mut dialogue) else {
        panic!("expected finalize");
    };

    dialogue.reset();
    let SubmitOutcome::Finalize(second) = answer_all(&mut dialogue) else {
        panic!("expected finalize");
    };
    assert_ne!(first.ticket, second.ticket);

    let applied = dialogue.settle(
        first.ticket,
        Ok(AnalysisOutcome::from_response(&sample_deck_response(1))),
    );
    assert!(!applied);
    assert!(dialogue.is_in_flight());
    assert!(dialogue.report().is_empty());
}

// ============================================================================
// Reset
// ============================================================================

#[test]
fn test_reset_restores_initial_state() {
    let mut dialogue = DialogueController::default();
    assert_initial(&dialogue);

    // Mid-dialogue
    dialogue.submit_answer("Tech");
    dialogue.submit_answer("reduce support cost");
    dialogue.reset();
    assert_initial(&dialogue);

    // After a failure
    let SubmitOutcome::Finalize(request) = answer_all(&mut dialogue) else {
        panic!("expected finalize");
    };
    dialogue.settle(request.ticket, Err(TransportError::Timeout(120)));
    dialogue.reset();
    assert_initial(&dialogue);

    // After a success
    let SubmitOutcome::Finalize(request) = answer_all(&mut dialogue) else {
        panic!("expected finalize");
    };
    dialogue.settle(
        request.ticket,
        Ok(AnalysisOutcome::from_response(&sample_deck_response(2))),
    );
    dialogue.reset();
    assert_initial(&dialogue);
}

#[test]
fn test_reset_drops_pending_prompt() {
    let mut dialogue = DialogueController::new(std::time::Duration::from_secs(60));
    dialogue.submit_answer("Tech");
    assert!(dialogue.has_pending_prompt());

    dialogue.reset();
    assert_initial(&dialogue);
}

// ============================================================================
// Follow-up seeding
// ============================================================================

#[test]
fn test_conversation_starts_with_instruction_and_skips_opening_prompt() {
    let mut dialogue = DialogueController::default();
    dialogue.submit_answer("Tech");

    let conversation = dialogue.to_conversation();
    assert_eq!(conversation[0].role, ChatRole::System);
    assert_eq!(conversation[0].content, ASSISTANT_INSTRUCTION);
    assert_eq!(conversation[1].role, ChatRole::User);
    assert_eq!(conversation[1].content, "Tech");
    assert_eq!(conversation[2].role, ChatRole::Assistant);
    assert_eq!(conversation[2].content, QUESTIONS[1].prompt);
    assert_eq!(conversation.len(), 3);
}

#[test]
fn test_context_summary_has_one_line_per_question() {
    let mut dialogue = DialogueController::default();
    answer_all(&mut dialogue);

    let summary = dialogue.context_summary();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), QUESTIONS.len());
    assert_eq!(lines[0], format!("{} Tech", QUESTIONS[0].prompt));
    assert_eq!(lines[4], format!("{} ticket triage", QUESTIONS[4].prompt));
}
