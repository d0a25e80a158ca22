//! Leg planner: derives the ordered hop sequence a message must traverse
//! from its decoded program.
//!
//! The walk is an explicit work stack rather than recursion, so nesting depth
//! is bounded and auditable. Instructions that move execution to another
//! chain contribute a stop and have their nested program walked with the new
//! chain as origin; everything else is skipped. Adjacent stops are then
//! classified into legs, and intermediate same-consensus legs are collapsed
//! to hops.

use thiserror::Error;

use crate::types::{Instruction, Leg, LegKind, NetworkId};

/// Nesting bound for program walks. Real programs nest two or three levels;
/// anything deeper is rejected instead of walked.
pub const MAX_PLAN_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("program nesting exceeds the supported depth of {max_depth}")]
    MaxDepth { max_depth: usize },
}

struct Frame<'a> {
    program: &'a [Instruction],
    next: usize,
    origin: NetworkId,
}

/// Plan the legs of a message sent from `origin` with the given decoded
/// program, using the default depth bound.
///
/// An empty plan is a valid outcome: the program never leaves the origin
/// chain and the message is not tracked as multi-hop.
pub fn plan_legs(origin: &NetworkId, program: &[Instruction]) -> Result<Vec<Leg>, PlanError> {
    plan_legs_bounded(origin, program, MAX_PLAN_DEPTH)
}

/// Same as [`plan_legs`] with an explicit depth bound.
pub fn plan_legs_bounded(
    origin: &NetworkId,
    program: &[Instruction],
    max_depth: usize,
) -> Result<Vec<Leg>, PlanError> {
    let mut stops = vec![origin.clone()];
    let mut stack = vec![Frame {
        program,
        next: 0,
        origin: origin.clone(),
    }];

    while let Some(frame) = stack.last_mut() {
        if frame.next >= frame.program.len() {
            stack.pop();
            continue;
        }
        let program = frame.program;
        let origin = frame.origin.clone();
        let index = frame.next;
        frame.next += 1;

        let instruction = &program[index];
        let Some((dest, nested)) = instruction.stop(&origin) else {
            continue;
        };
        if stack.len() >= max_depth {
            return Err(PlanError::MaxDepth { max_depth });
        }
        if dest != origin {
            stops.push(dest.clone());
        } else {
            tracing::debug!(origin = %origin, "nested program stays on chain, stop skipped");
        }
        stack.push(Frame {
            program: nested,
            next: 0,
            origin: dest,
        });
    }

    Ok(legs_from_stops(&stops))
}

fn legs_from_stops(stops: &[NetworkId]) -> Vec<Leg> {
    let mut legs: Vec<Leg> = stops
        .windows(2)
        .map(|pair| {
            let (kind, relay) = classify(&pair[0], &pair[1]);
            Leg {
                from: pair[0].clone(),
                to: pair[1].clone(),
                relay,
                kind,
            }
        })
        .collect();

    // Intermediate legs whose destination forwards the message within the
    // same consensus are hops, not terminals. A single leg is never
    // reclassified.
    if legs.len() >= 2 {
        for i in 0..legs.len() - 1 {
            if legs[i].to.same_consensus(&legs[i + 1].to) {
                legs[i].kind = LegKind::Hop;
            }
        }
    }

    legs
}

fn classify(from: &NetworkId, to: &NetworkId) -> (LegKind, Option<NetworkId>) {
    if !from.same_consensus(to) {
        (LegKind::Bridge, None)
    } else if from.is_relay() || to.is_relay() {
        (LegKind::Vmp, None)
    } else {
        (LegKind::Hrmp, Some(from.relay()))
    }
}
