//! End-to-end game flows through the public engine API.

use rubberstamp_engine::{Action, Event, GamePhase, ROUNDS, Rules, ScoreState, Stats};

use crate::common::{
    Driver, correct_action, reproducible_cards, seeded_engine, wait_for_spawn, wrong_action,
};

/// Drive one scripted game to its end, collecting a JSON snapshot per step.
fn scripted_run(seed: u64) -> Vec<serde_json::Value> {
    let mut driver = Driver::new(reproducible_cards(seed), Rules::default());
    driver.send(Event::Start);
    driver.send(Event::ConfirmBriefing);

    let mut step: u32 = 0;
    let mut snapshots = Vec::new();
    while driver.state.phase() != GamePhase::GameOver && step < 500 {
        match driver.state.phase() {
            GamePhase::RoundResults => driver.send(Event::AcknowledgeRoundResult),
            GamePhase::RoundTransition => driver.send(Event::AdvanceRound),
            _ => {
                if step % 2 == 0 || driver.state.queue().is_empty() {
                    driver.fire();
                } else if step % 7 == 0 {
                    driver.decide_head(wrong_action);
                } else {
                    driver.decide_head(correct_action);
                }
            }
        }
        snapshots.push(serde_json::to_value(driver.state.snapshot()).expect("serialize"));
        step += 1;
    }
    snapshots
}

#[test]
fn seeded_games_are_reproducible() {
    let first = scripted_run(2024);
    let second = scripted_run(2024);
    assert!(!first.is_empty());
    assert_eq!(first, second);

    let other = scripted_run(2025);
    assert_ne!(first, other, "different seeds produce different games");
}

#[tokio::test(start_paused = true)]
async fn perfect_play_reaches_full_autonomy_and_wrong_calls_end_it() {
    let mut engine = seeded_engine(17);
    engine.start();
    assert_eq!(engine.phase(), GamePhase::Briefing);
    engine.confirm_briefing();

    for round in &ROUNDS[..3] {
        assert_eq!(engine.snapshot().active_round, round);
        while engine.phase() == GamePhase::Playing {
            wait_for_spawn(&mut engine).await;
            while let Some(card) = engine.snapshot().head().cloned() {
                engine.decide(card.id, correct_action(&card));
                if engine.phase() != GamePhase::Playing {
                    break;
                }
            }
        }
        assert_eq!(engine.phase(), GamePhase::RoundResults);
        let snapshot = engine.snapshot();
        assert_eq!(Some(snapshot.round_stats.processed), round.target_card_count);
        assert_eq!(snapshot.round_stats.missed_errors, 0);
        assert_eq!(snapshot.round_stats.false_positives, 0);
        assert_eq!(snapshot.trust_score, ScoreState::MAX_TRUST);
        assert_eq!(snapshot.cognitive_load, 0);

        engine.acknowledge_round_result();
        engine.advance_round();
    }

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, GamePhase::Playing);
    assert_eq!(snapshot.active_round.agent_count, 16);
    assert_eq!(snapshot.next_round, None);
    assert_eq!(snapshot.stats.processed, 19);

    let mut wrong_calls = 0;
    while engine.phase() == GamePhase::Playing {
        wait_for_spawn(&mut engine).await;
        if let Some(card) = engine.snapshot().head().cloned() {
            engine.decide(card.id, wrong_action(&card));
            wrong_calls += 1;
        }
    }
    assert_eq!(engine.phase(), GamePhase::GameOver);
    // 100 trust drops 15 per wrong call: the seventh crosses zero.
    assert_eq!(wrong_calls, 7);
    assert!(!engine.has_pending_spawn());

    let stats = engine.snapshot().stats;
    assert_eq!(stats.processed, 26);
    assert_eq!(stats.missed_errors + stats.false_positives, 7);

    engine.restart();
    let fresh = engine.snapshot();
    assert_eq!(fresh.phase, GamePhase::Playing);
    assert_eq!(fresh.round.value(), 1);
    assert_eq!(fresh.stats, Stats::default());
    assert_eq!(fresh.trust_score, ScoreState::MAX_TRUST);
    assert!(fresh.cards.is_empty());
}

#[tokio::test(start_paused = true)]
async fn ignoring_the_backlog_never_completes_a_round() {
    let mut engine = seeded_engine(5);
    engine.start();
    engine.confirm_briefing();

    for _ in 0..20 {
        wait_for_spawn(&mut engine).await;
    }
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, GamePhase::Playing);
    assert_eq!(snapshot.cards.len(), 5);
    assert_eq!(snapshot.spawned_in_round, 5);
    assert_eq!(snapshot.trust_score, ScoreState::MAX_TRUST);
}

#[tokio::test(start_paused = true)]
async fn non_head_decisions_do_not_change_the_queue() {
    let mut engine = seeded_engine(8);
    engine.start();
    engine.confirm_briefing();
    wait_for_spawn(&mut engine).await;
    wait_for_spawn(&mut engine).await;

    let before = engine.snapshot();
    assert_eq!(before.cards.len(), 2);
    engine.decide(before.cards[1].id, Action::Reject);
    assert_eq!(engine.snapshot(), before);
}
