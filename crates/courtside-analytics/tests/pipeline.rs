use std::collections::BTreeMap;

use approx::assert_relative_eq;
use courtside_analytics::{MatchAnalyzer, MiniCourtLayout};
use courtside_core::{
    AnalyticsError, AnalyticsSettings, BoundingBox, MatchDetections, PlayerSlot, TrackId, Vector2,
};

const NUM_FRAMES: usize = 300;
const ZOOM: f64 = 2.0;

fn layout() -> MiniCourtLayout {
    let settings = AnalyticsSettings::default();
    MiniCourtLayout::new(&settings.mini_court, &settings.court)
}

/// A perspective-free camera: the reference canvas zoomed and shifted.
fn to_source(canvas: Vector2) -> Vector2 {
    canvas * ZOOM + Vector2::new(-3000.0, 100.0)
}

fn player_box(foot_canvas: Vector2, height_m: f64) -> BoundingBox {
    let foot = to_source(foot_canvas);
    let height_px = ZOOM * layout().scale().pixels_per_meter() * height_m;
    BoundingBox::new(foot.x - 20.0, foot.y - height_px, foot.x + 20.0, foot.y)
}

/// Ball height per frame: a flat start, then four 60-frame legs in alternating
/// directions, then flat again.
fn ball_y(frame: usize) -> f64 {
    let mut y = 400.0;
    for f in 0..=frame {
        y += match f {
            10..=69 | 130..=189 => 8.0,
            70..=129 | 190..=249 => -8.0,
            _ => 0.0,
        };
    }
    y
}

fn detections() -> MatchDetections {
    let far = Vector2::new(1700.0, 80.0);
    let near = Vector2::new(1760.0, 515.0);
    let players = (0..NUM_FRAMES)
        .map(|_| {
            BTreeMap::from([
                (TrackId::new(1), BoundingBox::new(5000.0, 100.0, 5040.0, 180.0)),
                (TrackId::new(3), player_box(far, 1.88)),
                (TrackId::new(8), player_box(near, 1.91)),
            ])
        })
        .collect();
    let ball = (0..NUM_FRAMES)
        .map(|frame| {
            if frame % 10 == 5 {
                return None;
            }
            let y = ball_y(frame);
            Some(BoundingBox::new(600.0, y - 5.0, 610.0, y + 5.0))
        })
        .collect();
    let court_keypoints = layout()
        .keypoints
        .iter()
        .flat_map(|&k| {
            let s = to_source(k);
            [s.x, s.y]
        })
        .collect();

    MatchDetections {
        players,
        ball,
        court_keypoints,
    }
}

fn analyzer() -> MatchAnalyzer {
    MatchAnalyzer::new(&AnalyticsSettings::default()).unwrap()
}

#[test_log::test]
fn test_full_match() {
    let analysis = analyzer().analyze(&detections()).unwrap();

    assert_eq!(analysis.num_frames, NUM_FRAMES);
    assert_eq!(
        analysis.players.ids().collect::<Vec<_>>(),
        vec![TrackId::new(3), TrackId::new(8)]
    );

    // The gaps in the ball track are filled
    assert_eq!(analysis.ball_trajectory.len(), NUM_FRAMES);
    assert_relative_eq!(analysis.ball_trajectory[65].mid_y(), ball_y(65), epsilon = 1e-9);

    assert_eq!(analysis.shot_frames, vec![71, 131, 191]);

    // Player boxes match their real heights, so projection lands back on the canvas
    let far = analysis.player_positions.get(TrackId::new(3), 42).unwrap();
    assert_relative_eq!(far.x, 1700.0, epsilon = 1e-6);
    assert_relative_eq!(far.y, 80.0, epsilon = 1e-6);
    let near = analysis.player_positions.get(TrackId::new(8), 42).unwrap();
    assert_relative_eq!(near.x, 1760.0, epsilon = 1e-6);
    assert_relative_eq!(near.y, 515.0, epsilon = 1e-6);
    assert_eq!(analysis.ball_positions.present_count(), NUM_FRAMES);

    let stats = &analysis.stats;
    assert_eq!(stats.slots, [Some(TrackId::new(3)), Some(TrackId::new(8))]);
    assert_eq!(stats.shots.len(), 2);
    assert_eq!(stats.records.len(), 3);
    assert_eq!(stats.per_frame.len(), NUM_FRAMES);

    let last = stats.at(NUM_FRAMES - 1).unwrap();
    let total_shots: u32 = PlayerSlot::ALL.iter().map(|&s| last.player(s).shots).sum();
    assert_eq!(total_shots, 2);
    for slot in PlayerSlot::ALL {
        let player = last.player(slot);
        match player.average_shot_speed {
            Some(avg) => assert_relative_eq!(
                avg,
                player.total_shot_speed / player.shots as f64,
                epsilon = 1e-9
            ),
            None => assert_eq!(player.shots, 0),
        }
    }
    // Nothing is known before the first measured shot
    let first = stats.at(analysis.shot_frames[0] - 1).unwrap();
    assert_eq!(first.player(PlayerSlot::One).shots, 0);
    assert_eq!(first.player(PlayerSlot::Two).shots, 0);
}

#[test]
fn test_cached_detections_give_the_same_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("detections.json");
    let fresh = detections();
    fresh.save(&path).unwrap();
    let cached = MatchDetections::load(&path).unwrap();

    let analyzer = analyzer();
    assert_eq!(
        analyzer.analyze(&cached).unwrap(),
        analyzer.analyze(&fresh).unwrap()
    );
}

#[test]
fn test_analysis_is_deterministic() {
    let analyzer = analyzer();
    let input = detections();
    let a = serde_json::to_string(&analyzer.analyze(&input).unwrap()).unwrap();
    let b = serde_json::to_string(&analyzer.analyze(&input).unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test_log::test]
fn test_no_ball_degrades_to_empty_outputs() {
    let mut no_ball = detections();
    no_ball.ball = vec![None; NUM_FRAMES];
    let analysis = analyzer().analyze(&no_ball).unwrap();

    assert!(analysis.ball_trajectory.is_empty());
    assert!(analysis.shot_frames.is_empty());
    assert_eq!(analysis.ball_positions.len(), NUM_FRAMES);
    assert_eq!(analysis.ball_positions.present_count(), 0);
    assert_eq!(analysis.stats.records.len(), 1);
    assert_eq!(analysis.stats.per_frame.len(), NUM_FRAMES);
    assert_eq!(analysis.stats.at(NUM_FRAMES - 1).unwrap().players[0].average_shot_speed, None);
}

#[test]
fn test_contract_violations_are_errors() {
    let analyzer = analyzer();

    let mut short_ball = detections();
    short_ball.ball.pop();
    assert_eq!(
        analyzer.analyze(&short_ball),
        Err(AnalyticsError::FrameCountMismatch {
            ball: NUM_FRAMES - 1,
            players: NUM_FRAMES
        })
    );

    let mut few_keypoints = detections();
    few_keypoints.court_keypoints.truncate(26);
    assert_eq!(
        analyzer.analyze(&few_keypoints),
        Err(AnalyticsError::KeypointCount {
            expected: 28,
            found: 26
        })
    );

    let settings = AnalyticsSettings {
        frame_rate: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        MatchAnalyzer::new(&settings),
        Err(AnalyticsError::InvalidSettings(_))
    ));
}
