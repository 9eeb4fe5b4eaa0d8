// Route failure and reuse rejection types.
//
// None of these are fatal. A `RouteFailure` degrades the router to "no
// reflected path, proxy parked at origin"; a `ReuseRejection` is silent and
// only causes a full search. Config errors live next to the config in
// `config.rs`.

use crate::types::Vec3;
use thiserror::Error;

/// Why the graph could not connect origin and target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("the waypoint graph is empty")]
    EmptyGraph,
    #[error("no graph node is visible from the origin")]
    OriginUnlinked,
    #[error("no graph node is visible from the target")]
    TargetUnlinked,
    #[error("the search found no route")]
    SearchExhausted,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum RouteFailure {
    #[error("no target position available")]
    NoTargetResolved,

    #[error("no route from {origin} to {target}: {reason}")]
    NoDirectOrGraphPath {
        origin: Vec3,
        target: Vec3,
        reason: FailureReason,
    },
}

/// Why a cached path was not reused.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ReuseRejection {
    #[error("no cached path")]
    Empty,
    #[error("origin moved {0:.2} m from the cached origin")]
    OriginMoved(f32),
    #[error("target moved {0:.2} m from the cached target")]
    TargetMoved(f32),
    #[error("segment {0} of the candidate is blocked")]
    SegmentBlocked(usize),
    #[error("candidate length {candidate:.2} exceeds the growth limit {limit:.2}")]
    TooLongVersusCached { candidate: f32, limit: f32 },
    #[error("candidate length {candidate:.2} exceeds the detour limit {limit:.2}")]
    DetourTooLong { candidate: f32, limit: f32 },
}
