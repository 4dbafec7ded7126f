// tests/app_frame_tests.rs

//! Drives `App` frame by frame through the headless driver.

use shell2d::backends::{BackendEvent, DrawCommand, PixelRect};
use shell2d::{
    App, Bounds, Color, Config, ConfigurationError, HeadlessDriver, KeySymbol, NamedColor, Screen,
    StandardPoint, Widget,
};
use test_log::test;

fn config(width_px: u32, height_px: u32, standard_width: u32, standard_height: u32) -> Config {
    let mut config = Config::default();
    config.window.width_px = width_px;
    config.window.height_px = height_px;
    config.canvas.standard_width = standard_width;
    config.canvas.standard_height = standard_height;
    config
}

fn open_app() -> App<HeadlessDriver> {
    App::from_config(&config(800, 600, 400, 300)).unwrap()
}

fn key(c: char) -> BackendEvent {
    BackendEvent::Key {
        symbol: KeySymbol::Char(c),
    }
}

fn press(x: i32, y: i32) -> BackendEvent {
    BackendEvent::MouseButtonPress { x, y }
}

fn motion(x: i32, y: i32) -> BackendEvent {
    BackendEvent::MouseMove { x, y }
}

#[test]
fn draw_rect_reaches_backend_in_device_pixels() {
    let mut app = open_app();
    assert_eq!(app.scale().ratio(), 2.0);

    app.draw_rect(NamedColor::Red, 10.0, 10.0, 50.0, 20.0).unwrap();
    app.tick().unwrap();

    assert_eq!(
        app.driver().presented_frames(),
        &[vec![DrawCommand::FillRect {
            rect: PixelRect::new(20, 20, 100, 40),
            color: Color::Named(NamedColor::Red),
        }]]
    );
}

#[test]
fn mismatched_aspect_ratio_fails_before_opening() {
    let err = App::<HeadlessDriver>::from_config(&config(800, 600, 400, 400))
        .err()
        .unwrap();
    assert_eq!(
        err.downcast_ref::<ConfigurationError>(),
        Some(&ConfigurationError::AspectRatioMismatch {
            device_width: 800,
            device_height: 600,
            standard_width: 400,
            standard_height: 400,
        })
    );
}

#[test]
fn driver_size_must_match_canvas_ratio() {
    let result = App::new(HeadlessDriver::new(1000, 600), &Config::default());
    assert!(matches!(
        result.err(),
        Some(ConfigurationError::AspectRatioMismatch { .. })
    ));
}

#[test]
fn close_request_is_permanent() {
    let mut app = open_app();
    app.driver_mut().queue_frame(vec![BackendEvent::CloseRequested]);
    app.driver_mut().queue_frame(vec![key('a'), press(10, 10)]);

    assert!(!app.close_requested());
    app.tick().unwrap();
    assert!(app.close_requested());
    app.tick().unwrap();
    app.tick().unwrap();
    assert!(app.close_requested());
    assert_eq!(app.report_key(), None);
}

#[test]
fn held_key_is_reported_on_the_first_frame_only() {
    let mut app = open_app();
    for events in [
        vec![key('a')],
        vec![key('a')],
        vec![key('a')],
        vec![key('b')],
        vec![key('b')],
        vec![],
        vec![key('a')],
    ] {
        app.driver_mut().queue_frame(events);
    }

    let mut reports = Vec::new();
    for _ in 0..7 {
        app.tick().unwrap();
        reports.push(app.report_key());
        // Reading again in the same frame gives the same answer.
        assert_eq!(app.report_key(), *reports.last().unwrap());
    }

    let a = Some(KeySymbol::Char('a'));
    let b = Some(KeySymbol::Char('b'));
    assert_eq!(reports, vec![a, None, None, b, None, None, a]);
    assert_eq!(app.last_real_key(), Some(KeySymbol::Char('b')));
}

#[test]
fn key_held_across_idle_frames_is_reported_again_after_a_gap() {
    // A driver reports a held key once. Only a new press after an idle frame
    // shows up again.
    let mut app = open_app();
    for events in [vec![key('a')], vec![], vec![], vec![key('a')]] {
        app.driver_mut().queue_frame(events);
    }
    let mut reports = Vec::new();
    for _ in 0..4 {
        app.tick().unwrap();
        reports.push(app.report_key());
    }
    let a = Some(KeySymbol::Char('a'));
    assert_eq!(reports, vec![a, None, None, a]);
}

#[test]
fn clicks_are_converted_to_standard_units() {
    let mut app = open_app();
    app.driver_mut().queue_frame(vec![press(101, 51)]);
    app.tick().unwrap();

    assert_eq!(app.report_click(), Some(StandardPoint::new(50, 26)));
    assert_eq!(app.report_motion(), None);
}

#[test]
fn motion_goes_idle_when_the_pointer_stops() {
    let mut app = open_app();
    app.driver_mut().queue_frame(vec![motion(10, 10), motion(12, 12)]);
    app.driver_mut().queue_frame(vec![]);
    app.tick().unwrap();
    assert_eq!(app.report_motion(), Some(StandardPoint::new(6, 6)));

    app.tick().unwrap();
    assert_eq!(app.report_motion(), None);
    assert_eq!(app.last_real_motion(), Some(StandardPoint::new(6, 6)));
}

#[test]
fn every_tick_presents_and_paces_at_the_configured_rate() {
    let mut app = open_app();
    for _ in 0..3 {
        app.tick().unwrap();
    }
    assert_eq!(app.frame_count(), 3);
    assert_eq!(app.driver().presented_frames().len(), 3);
    assert_eq!(app.driver().ticks(), &[60, 60, 60]);
}

#[test]
fn text_dimensions_are_in_standard_units() {
    let mut app = open_app();
    // 10 units -> 20 px; headless width is round(0.6 * 20) = 12 px per char.
    let (width, height) = app.text_dimensions("abcd", 10.0, None).unwrap();
    assert_eq!((width, height), (24, 10));
}

#[test]
fn close_releases_the_backend_once() {
    let mut app = open_app();
    app.close().unwrap();
    assert!(app.driver().is_cleaned_up());
    app.close().unwrap();
    assert!(app.close_requested());
}

#[test]
fn title_and_canvas_size_come_from_config() {
    let mut cfg = config(1200, 900, 400, 300);
    cfg.window.title = "demo".to_string();
    let app = App::<HeadlessDriver>::from_config(&cfg).unwrap();
    assert_eq!(app.title(), "demo");
    assert_eq!(app.driver().title(), "demo");
    assert_eq!((app.standard_width(), app.standard_height()), (400, 300));
    assert_eq!(app.scale().ratio(), 3.0);
}

#[test]
fn configured_icon_is_loaded_and_applied() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("icon.png");
    image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]))
        .save(&path)
        .unwrap();

    let mut cfg = config(800, 600, 400, 300);
    cfg.window.icon = Some(path);
    let app = App::<HeadlessDriver>::from_config(&cfg).unwrap();
    let icon = app.driver().icon().unwrap();
    assert_eq!((icon.width(), icon.height()), (4, 4));
}

#[test]
fn missing_icon_is_an_error() {
    let mut cfg = config(800, 600, 400, 300);
    cfg.window.icon = Some("/no/such/icon.png".into());
    assert!(App::<HeadlessDriver>::from_config(&cfg).is_err());
}

struct Plain;

impl Screen<HeadlessDriver> for Plain {
    fn name(&self) -> &str {
        "plain"
    }

    fn draw(&mut self, app: &mut App<HeadlessDriver>) -> anyhow::Result<()> {
        self.clear(app)
    }
}

#[test]
fn screen_clear_covers_the_whole_canvas() {
    let mut app = open_app();
    let mut screen = Plain;
    assert_eq!(screen.name(), "plain");
    screen.draw(&mut app).unwrap();
    assert_eq!(
        app.driver().frame_commands(),
        &[DrawCommand::FillRect {
            rect: PixelRect::new(0, 0, 800, 600),
            color: Color::BLACK,
        }]
    );
}

struct Tile(Bounds);

impl Widget<HeadlessDriver> for Tile {
    fn bounds(&self) -> Bounds {
        self.0
    }

    fn draw(&mut self, app: &mut App<HeadlessDriver>) -> anyhow::Result<()> {
        app.draw_rect(Color::WHITE, self.0.x, self.0.y, self.0.width, self.0.height)
    }
}

#[test]
fn widget_edges_are_not_inside() {
    let tile = Tile(Bounds::new(10.0, 10.0, 20.0, 20.0));
    assert!(!tile.contains_point(10.0, 15.0));
    assert!(!tile.contains_point(15.0, 30.0));
    assert!(tile.contains_point(10.5, 15.0));

    let mut app = open_app();
    let mut tile = tile;
    tile.draw(&mut app).unwrap();
    assert_eq!(app.driver().frame_commands().len(), 1);
}
