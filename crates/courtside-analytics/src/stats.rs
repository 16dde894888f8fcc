use courtside_core::{FrameIndex, PlayerSlot, Series, TrackId, TrackSeries, Vector2};
use serde::{Deserialize, Serialize};

use crate::mini_court::CourtScale;

const MPS_TO_KMH: f64 = 3.6;

/// Running statistics of one player.
///
/// Speeds are in km/h. Averages are `None` while there is nothing to average, which is
/// a different claim from an average of zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Number of shots hit by the player
    pub shots: u32,
    /// Sum of the ball speeds of the player's shots
    pub total_shot_speed: f64,
    /// Ball speed of the player's most recent shot
    pub last_shot_speed: f64,
    pub average_shot_speed: Option<f64>,
    /// Number of opponent shots during which the player's movement was measured
    pub movements: u32,
    /// Sum of the player's movement speeds while the opponent's shots travelled
    pub total_movement_speed: f64,
    /// Most recent movement speed
    pub last_movement_speed: f64,
    pub average_movement_speed: Option<f64>,
}

impl PlayerStats {
    fn with_shot(mut self, speed: f64) -> Self {
        self.shots += 1;
        self.total_shot_speed += speed;
        self.last_shot_speed = speed;
        self.average_shot_speed = Some(self.total_shot_speed / self.shots as f64);
        self
    }

    fn with_movement(mut self, speed: f64) -> Self {
        self.movements += 1;
        self.total_movement_speed += speed;
        self.last_movement_speed = speed;
        self.average_movement_speed = Some(self.total_movement_speed / self.movements as f64);
        self
    }
}

/// Snapshot of both players' statistics, valid from `frame` until the next snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatsRecord {
    pub frame: FrameIndex,
    pub players: [PlayerStats; 2],
}

impl PlayerStatsRecord {
    pub fn zero(frame: FrameIndex) -> Self {
        Self {
            frame,
            players: [PlayerStats::default(); 2],
        }
    }

    pub fn player(&self, slot: PlayerSlot) -> &PlayerStats {
        &self.players[slot.index()]
    }

    /// The next snapshot: a copy of this one with the shot's contributions applied.
    fn with_shot(&self, shot: &ShotSummary) -> Self {
        let mut next = *self;
        next.frame = shot.start;
        let shooter = shot.shooter.index();
        next.players[shooter] = next.players[shooter].with_shot(shot.ball_speed);
        if let Some(speed) = shot.opponent_speed {
            let opponent = shot.shooter.opponent().index();
            next.players[opponent] = next.players[opponent].with_movement(speed);
        }
        next
    }
}

/// Measurements of the ball flight between two consecutive shots.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShotSummary {
    /// Frame of the shot
    pub start: FrameIndex,
    /// Frame of the next shot
    pub end: FrameIndex,
    /// Player closest to the ball at `start`
    pub shooter: PlayerSlot,
    /// Average ball speed until `end`, in km/h
    pub ball_speed: f64,
    /// Average movement speed of the other player until `end`, in km/h, if it was
    /// visible at both frames
    pub opponent_speed: Option<f64>,
}

/// Statistics of a whole match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    /// Track id behind each player slot
    pub slots: [Option<TrackId>; 2],
    pub shots: Vec<ShotSummary>,
    /// Zero snapshot at frame 0 followed by one snapshot per shot
    pub records: Vec<PlayerStatsRecord>,
    /// One forward-filled snapshot per frame
    pub per_frame: Vec<PlayerStatsRecord>,
}

impl MatchStats {
    /// Statistics as known at `frame`.
    pub fn at(&self, frame: FrameIndex) -> Option<&PlayerStatsRecord> {
        self.per_frame.get(frame)
    }
}

/// Turns shot events and projected positions into per-player statistics.
#[derive(Clone, Debug)]
pub struct StatsAggregator {
    frame_rate: f64,
    scale: CourtScale,
}

impl StatsAggregator {
    pub fn new(frame_rate: f64, scale: CourtScale) -> Self {
        Self { frame_rate, scale }
    }

    /// Average speed in km/h of a move between two canvas positions over `frames`.
    pub fn speed_kmh(&self, from: Vector2, to: Vector2, frames: usize) -> f64 {
        let meters = self.scale.pixels_to_meters((to - from).norm());
        let seconds = frames as f64 / self.frame_rate;
        meters / seconds * MPS_TO_KMH
    }

    /// Assigns the player slots in ascending track id order.
    pub fn assign_slots(players: &TrackSeries<Vector2>) -> [Option<TrackId>; 2] {
        let mut ids = players.ids();
        [ids.next(), ids.next()]
    }

    /// Measures every pair of consecutive shots.
    ///
    /// Pairs without a ball position at either end, or without any player at the
    /// first shot, are skipped.
    pub fn summarize(
        &self,
        shots: &[FrameIndex],
        ball: &Series<Vector2>,
        players: &TrackSeries<Vector2>,
    ) -> Vec<ShotSummary> {
        let slots = Self::assign_slots(players);
        let position = |slot: PlayerSlot, frame: FrameIndex| {
            slots[slot.index()].and_then(|id| players.get(id, frame).copied())
        };

        shots
            .windows(2)
            .filter_map(|pair| {
                let (start, end) = (pair[0], pair[1]);
                let (Some(&ball_start), Some(&ball_end)) = (ball.get(start), ball.get(end)) else {
                    log::debug!("No ball position for shot {}..{}, skipping", start, end);
                    return None;
                };

                let Some(shooter) = PlayerSlot::ALL
                    .into_iter()
                    .filter_map(|slot| {
                        position(slot, start).map(|p| (slot, (p - ball_start).norm()))
                    })
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(slot, _)| slot)
                else {
                    log::debug!("No player visible at shot frame {}, skipping", start);
                    return None;
                };

                let frames = end - start;
                let opponent = shooter.opponent();
                let opponent_speed = match (position(opponent, start), position(opponent, end)) {
                    (Some(from), Some(to)) => Some(self.speed_kmh(from, to, frames)),
                    _ => None,
                };

                Some(ShotSummary {
                    start,
                    end,
                    shooter,
                    ball_speed: self.speed_kmh(ball_start, ball_end, frames),
                    opponent_speed,
                })
            })
            .collect()
    }

    /// Computes the per-shot snapshots and the dense per-frame table.
    pub fn aggregate(
        &self,
        shots: &[FrameIndex],
        ball: &Series<Vector2>,
        players: &TrackSeries<Vector2>,
        num_frames: usize,
    ) -> MatchStats {
        let summaries = self.summarize(shots, ball, players);
        let initial = PlayerStatsRecord::zero(0);
        let records: Vec<_> = std::iter::once(initial)
            .chain(summaries.iter().scan(initial, |state, shot| {
                *state = state.with_shot(shot);
                Some(*state)
            }))
            .collect();
        let per_frame = forward_fill(&records, num_frames);

        log::debug!(
            "Aggregated {} of {} shot intervals over {} frames",
            summaries.len(),
            shots.len().saturating_sub(1),
            num_frames
        );
        MatchStats {
            slots: Self::assign_slots(players),
            shots: summaries,
            records,
            per_frame,
        }
    }
}

/// Expands sparse snapshots to one per frame, each frame taking the latest snapshot at
/// or before it (a zero snapshot before the first one).
pub fn forward_fill(records: &[PlayerStatsRecord], num_frames: usize) -> Vec<PlayerStatsRecord> {
    let mut filled = Vec::with_capacity(num_frames);
    let mut current = PlayerStatsRecord::zero(0);
    let mut pending = records.iter().peekable();
    for frame in 0..num_frames {
        while let Some(record) = pending.next_if(|r| r.frame <= frame) {
            current = *record;
        }
        filled.push(PlayerStatsRecord { frame, ..current });
    }
    filled
}
