//! Wire shape of the serialized game snapshot.

use rubberstamp_engine::GamePhase;
use serde_json::Value;

use crate::common::{seeded_engine, wait_for_spawn};

fn keys(value: &Value) -> Vec<&str> {
    let mut keys: Vec<&str> = value
        .as_object()
        .expect("json object")
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    keys
}

#[tokio::test(start_paused = true)]
async fn snapshot_json_uses_camel_case_names() {
    let mut engine = seeded_engine(31);
    engine.start();
    engine.confirm_briefing();
    wait_for_spawn(&mut engine).await;

    let json = serde_json::to_value(engine.snapshot()).expect("serialize snapshot");
    assert_eq!(
        keys(&json),
        vec![
            "activeRoundConfig",
            "cards",
            "cognitiveLoad",
            "lastVerdict",
            "nextRound",
            "phase",
            "roundId",
            "roundStats",
            "spawnedInRound",
            "stats",
            "trustScore",
        ]
    );
    assert_eq!(
        keys(&json["stats"]),
        vec!["caughtErrors", "falsePositives", "missedErrors", "processed"]
    );
    assert_eq!(
        keys(&json["activeRoundConfig"]),
        vec![
            "agentCount",
            "description",
            "id",
            "spawnIntervalMs",
            "targetCardCount",
            "title",
        ]
    );
    assert_eq!(
        keys(&json["cards"][0]),
        vec![
            "address",
            "customerRef",
            "dueDate",
            "errorKind",
            "id",
            "itemName",
            "quantity",
            "spawnedAt",
            "totalAmount",
        ]
    );
    assert_eq!(json["spawnedInRound"], 1);
    assert_eq!(json["lastVerdict"], Value::Null);
}

#[tokio::test(start_paused = true)]
async fn phases_serialize_in_kebab_case() {
    let mut engine = seeded_engine(4);
    let phase_of = |engine: &rubberstamp_engine::Engine| {
        serde_json::to_value(engine.snapshot()).expect("serialize")["phase"].clone()
    };

    assert_eq!(phase_of(&engine), "idle");
    engine.start();
    assert_eq!(phase_of(&engine), "briefing");
    engine.confirm_briefing();
    assert_eq!(phase_of(&engine), "playing");

    while engine.phase() == GamePhase::Playing {
        wait_for_spawn(&mut engine).await;
        engine.approve();
    }
    let ended = phase_of(&engine);
    assert!(
        ended == "round-results" || ended == "gameover",
        "unexpected phase {ended}"
    );
    if ended == "round-results" {
        engine.acknowledge_round_result();
        assert_eq!(phase_of(&engine), "round-transition");
    }
}

#[test]
fn final_round_has_no_target() {
    let json = serde_json::to_value(&rubberstamp_engine::ROUNDS[3]).expect("serialize round");
    assert_eq!(json["targetCardCount"], Value::Null);
    assert_eq!(json["agentCount"], 16);
    assert_eq!(json["title"], "Full Autonomy");
}
