//! End-to-end correlation scenarios: decoded programs are planned into legs,
//! observations are fed to the engine in adversarial orders, and the emitted
//! journey events are checked against what a downstream consumer expects.

mod helpers;

use helpers::{identity, para, test_env, waypoint};
use pretty_assertions::assert_eq;
use xcm_tracker_logic::{
    plan_legs,
    types::{
        InboundObservation, Instruction, LegKind, LegStatus, Location, Outcome,
        OutboundObservation, TrappedAssets, Waypoint,
    },
    JourneyEvent,
};

fn planned_outbound(id: u8, from: u32, program: &[Instruction]) -> OutboundObservation {
    let origin = para(from);
    let legs = plan_legs(&origin, program).unwrap();
    let recipient = legs.last().expect("program must leave the origin").to.clone();
    OutboundObservation {
        identity: identity(id),
        recipient,
        legs,
        sent: waypoint(&origin, Outcome::Success),
        subscription: "test-subscription".to_string(),
    }
}

fn deposit(dest: Location) -> Instruction {
    Instruction::DepositReserveAsset {
        dest,
        xcm: vec![],
    }
}

#[tokio::test]
async fn planned_transfer_matches_receipt_delivered_out_of_order() {
    let env = test_env();
    let program = vec![deposit(Location::Parachain(2034))];
    let outbound = planned_outbound(0xaa, 1000, &program);

    // Receipt first, send second: the engine must be commutative.
    env.engine
        .on_inbound(InboundObservation {
            identity: identity(0xaa),
            network: para(2034),
            waypoint: waypoint(&para(2034), Outcome::Success),
        })
        .await
        .unwrap();
    env.engine.on_outbound(outbound).await.unwrap();

    let matched = env.sink.of_kind("matched");
    assert_eq!(matched.len(), 1);
    let JourneyEvent::Matched(journey) = &matched[0] else {
        panic!("expected a matched event");
    };
    assert_eq!(journey.origin.network, para(1000));
    assert_eq!(journey.destination.network, para(2034));
    assert_eq!(journey.legs.len(), 1);
    assert_eq!(journey.legs[0].kind, LegKind::Hrmp);
    assert_eq!(journey.leg_status, vec![LegStatus::Received]);
    assert!(env.store.is_empty());
}

#[tokio::test]
async fn multi_hop_plan_keeps_leg_order_and_marks_the_hop() {
    let env = test_env();
    let program = vec![Instruction::InitiateReserveWithdraw {
        reserve: Location::Parachain(2000),
        xcm: vec![deposit(Location::Parachain(3000))],
    }];
    let outbound = planned_outbound(0xbb, 1000, &program);
    assert_eq!(outbound.legs[0].kind, LegKind::Hop);
    assert_eq!(outbound.legs[1].kind, LegKind::Hrmp);
    assert_eq!(outbound.recipient, para(3000));

    env.engine.on_outbound(outbound).await.unwrap();
    env.engine
        .on_inbound(InboundObservation {
            identity: identity(0xbb),
            network: para(3000),
            waypoint: waypoint(&para(3000), Outcome::Success),
        })
        .await
        .unwrap();

    let matched = env.sink.of_kind("matched");
    let JourneyEvent::Matched(journey) = &matched[0] else {
        panic!("expected a matched event");
    };
    assert_eq!(journey.legs[0].from, para(1000));
    assert_eq!(journey.legs[0].to, para(2000));
    assert_eq!(journey.legs[1].from, para(2000));
    assert_eq!(journey.legs[1].to, para(3000));
}

#[tokio::test]
async fn concurrent_producers_never_double_match() {
    let env = test_env();
    let program = vec![deposit(Location::Parachain(2034))];

    // Duplicate sends and receipts race from independent tasks.
    let tasks: Vec<_> = (0..4)
        .flat_map(|_| {
            let send_engine = env.engine.clone();
            let receive_engine = env.engine.clone();
            let outbound = planned_outbound(0xcc, 1000, &program);
            let inbound = InboundObservation {
                identity: identity(0xcc),
                network: para(2034),
                waypoint: waypoint(&para(2034), Outcome::Success),
            };
            [
                tokio::spawn(async move { send_engine.on_outbound(outbound).await }),
                tokio::spawn(async move { receive_engine.on_inbound(inbound).await }),
            ]
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let matched = env.sink.of_kind("matched");
    assert!(
        matched.len() >= 1,
        "at least one pairing must correlate under the race"
    );
    // Duplicates may re-park and re-match, but no counterpart pair is ever
    // emitted twice: every match consumes one send and one receipt.
    assert!(matched.len() <= 4);
    assert_eq!(env.sink.of_kind("trapped").len(), 0);
}

#[tokio::test]
async fn failed_delivery_with_trapped_assets_is_reported() {
    let env = test_env();
    let program = vec![deposit(Location::Parachain(2034))];
    env.engine
        .on_outbound(planned_outbound(0xdd, 1000, &program))
        .await
        .unwrap();

    let trapped_payload = serde_json::json!({
        "assets": [{"id": "DOT", "fungible": "5000000000"}]
    });
    env.engine
        .on_inbound(InboundObservation {
            identity: identity(0xdd),
            network: para(2034),
            waypoint: Waypoint {
                outcome: Outcome::Fail,
                error: Some("UntrustedReserveLocation".to_string()),
                trapped: Some(TrappedAssets {
                    assets: trapped_payload.clone(),
                    origin: None,
                }),
                ..waypoint(&para(2034), Outcome::Fail)
            },
        })
        .await
        .unwrap();

    assert_eq!(env.sink.of_kind("matched").len(), 1);
    let trapped = env.sink.of_kind("trapped");
    assert_eq!(trapped.len(), 1);
    let JourneyEvent::Trapped { assets, journey } = &trapped[0] else {
        panic!("expected a trapped event");
    };
    assert_eq!(assets.assets, trapped_payload);
    assert_eq!(journey.destination.outcome, Outcome::Fail);
}

#[tokio::test]
async fn lost_message_times_out_exactly_once() {
    let env = test_env();
    env.engine
        .on_inbound(InboundObservation {
            identity: identity(0xee),
            network: para(2034),
            waypoint: waypoint(&para(2034), Outcome::Unknown),
        })
        .await
        .unwrap();

    let keys = env.expiry.keys();
    assert!(!keys.is_empty());

    // The collaborator may sweep every scheduled key; only the first sweep
    // finds the entry.
    for key in keys.iter().chain(keys.iter()) {
        env.engine.on_timeout_sweep(key).await.unwrap();
    }

    let timeouts = env.sink.of_kind("timeout");
    assert_eq!(timeouts.len(), 1);
    let JourneyEvent::Timeout { network, .. } = &timeouts[0] else {
        panic!("expected a timeout event");
    };
    assert_eq!(*network, para(2034));
    assert!(env.store.is_empty());
}

#[tokio::test]
async fn matched_journey_is_never_timed_out_afterwards() {
    let env = test_env();
    let program = vec![deposit(Location::Parachain(2034))];

    env.engine
        .on_inbound(InboundObservation {
            identity: identity(0xaf),
            network: para(2034),
            waypoint: waypoint(&para(2034), Outcome::Success),
        })
        .await
        .unwrap();
    env.engine
        .on_outbound(planned_outbound(0xaf, 1000, &program))
        .await
        .unwrap();

    for key in env.expiry.keys() {
        env.engine.on_timeout_sweep(&key).await.unwrap();
    }

    assert_eq!(env.sink.of_kind("matched").len(), 1);
    assert_eq!(env.sink.of_kind("timeout").len(), 0);
}
