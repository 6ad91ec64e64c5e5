// Arena level 1 definition ("Suzu vs The Hats").
// Positions are fixed; there is no procedural placement.
use super::geometry::{Point, Rect, Size};
use super::{EdgePolicy, LevelDesc};
use std::sync::OnceLock;

pub fn level1() -> &'static LevelDesc {
    static LD: OnceLock<LevelDesc> = OnceLock::new();
    LD.get_or_init(|| LevelDesc {
        name: "Suzu vs The Hats".to_owned(),
        player_start: Point::new(570, 440),
        player_size: Size::new(60, 60),
        player_speed: 10,
        hat_size: Size::new(40, 40),
        hats: vec![Point::new(200, 150), Point::new(800, 300), Point::new(500, 500)],
        // Decorative only: nothing checks the player against these.
        obstacles: vec![
            Rect::new(300, 200, 150, 30),
            Rect::new(600, 400, 30, 150),
            Rect::new(400, 100, 200, 30),
            Rect::new(100, 350, 30, 200),
        ],
        time_limit_s: 60,
        hats_to_win: 3,
        ambient_volume: 0.3,
        edge_policy: EdgePolicy::Reject,
        next_page: Some("level2.html".to_owned()),
    })
}
