// Whole-loop tests: a manual host clock and a surface that records draw calls.

use backdrop_engine::{
    Backdrop, EffectProfile, EngineError, FrameHandle, Host, InputEvent, LoopState, PowerMode, Result, Rgb,
    Rgba, Surface, SurfaceConfig,
};

#[derive(Default)]
struct ManualHost {
    next: i32,
    pending: Vec<FrameHandle>,
    listening: bool,
    attaches: usize,
    fail_requests: bool,
}

impl Host for ManualHost {
    fn request_frame(&mut self) -> Result<FrameHandle> {
        if self.fail_requests {
            return Err(EngineError::Host("display went away".into()));
        }
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending.push(handle);
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|&h| h != handle);
    }

    fn attach_listeners(&mut self) -> Result<()> {
        self.listening = true;
        self.attaches += 1;
        Ok(())
    }

    fn detach_listeners(&mut self) {
        self.listening = false;
    }
}

#[derive(Default)]
struct Recorder {
    configured: Vec<SurfaceConfig>,
    clears: usize,
    fades: usize,
    circles: Vec<(f32, f32, Rgba)>,
    lines: usize,
    glyphs: Vec<(char, f32, f32, Rgba)>,
}

impl Surface for Recorder {
    fn configure(&mut self, config: &SurfaceConfig) {
        self.configured.push(*config);
    }
    fn clear(&mut self) {
        self.clears += 1;
    }
    fn fade(&mut self, _background: Rgb, _alpha: f32) {
        self.fades += 1;
    }
    fn circle(&mut self, x: f32, y: f32, _radius: f32, color: Rgba, _glow: f32) {
        self.circles.push((x, y, color));
    }
    fn line(&mut self, _from: (f32, f32), _to: (f32, f32), _color: Rgba, _width: f32) {
        self.lines += 1;
    }
    fn glyph(&mut self, glyph: char, x: f32, y: f32, _size: f32, color: Rgba, _glow: f32) {
        self.glyphs.push((glyph, x, y, color));
    }
}

type TestBackdrop = Backdrop<ManualHost, Recorder>;

fn backdrop(profile: EffectProfile) -> TestBackdrop {
    Backdrop::new(profile, PowerMode::Full, 7, ManualHost::default(), Recorder::default()).unwrap()
}

/// Fire the oldest pending frame, the way the browser would.
fn fire(bd: &mut TestBackdrop, now: f64) -> bool {
    if bd.host().pending.is_empty() {
        return false;
    }
    bd.host_mut().pending.remove(0);
    bd.frame(now).unwrap();
    true
}

fn run(bd: &mut TestBackdrop, frames: usize) {
    for n in 0..frames {
        fire(bd, n as f64 * 1000.0 / 60.0);
    }
}

#[test]
fn start_configures_and_schedules() {
    let mut bd = backdrop(EffectProfile::constellation());
    bd.start(1920.0, 1080.0, 1.0).unwrap();

    assert_eq!(bd.state(), LoopState::Running);
    assert!(bd.host().listening);
    assert_eq!(bd.host().pending.len(), 1);
    assert_eq!(bd.surface().configured.len(), 1);
    assert_eq!(bd.world().pool().active_count(), 138);
}

#[test]
fn particle_frames_draw_every_live_entity() {
    let mut bd = backdrop(EffectProfile::constellation());
    bd.start(800.0, 600.0, 2.0).unwrap();
    run(&mut bd, 5);

    assert_eq!(bd.surface().clears, 5);
    assert_eq!(bd.surface().circles.len(), 5 * 32);
    assert!(bd.surface().lines > 0);
    assert_eq!(bd.host().pending.len(), 1);
}

#[test]
fn entity_bounds_hold_across_many_frames() {
    let mut bd = backdrop(EffectProfile::constellation());
    bd.start(640.0, 480.0, 1.0).unwrap();

    let moves = [(10.0, 10.0), (320.0, 240.0), (320.0, 240.0), (639.0, 1.0)];
    for n in 0..600 {
        if n % 50 == 0 {
            let (x, y) = moves[(n / 50) % moves.len()];
            bd.handle(InputEvent::PointerMove { x, y }).unwrap();
            bd.handle(InputEvent::Scroll { offset: n as f32 }).unwrap();
        }
        bd.advance();

        let pool = bd.world().pool();
        assert!(pool.active_count() <= pool.capacity());
        for &i in pool.active() {
            assert!((0.0..=1.0).contains(&pool.opacity[i]), "opacity {}", pool.opacity[i]);
            assert!(pool.life[i] <= pool.max_life[i]);
            assert!((0.0..640.0).contains(&pool.x[i]), "x {}", pool.x[i]);
            assert!((0.0..480.0).contains(&pool.y[i]), "y {}", pool.y[i]);
        }
    }

    assert!(!bd.surface().circles.is_empty());
    for &(_, _, color) in &bd.surface().circles {
        assert!((0.0..=1.0).contains(&color.a));
    }
}

#[test]
fn rain_spawns_glyphs_within_capacity() {
    let mut bd = backdrop(EffectProfile::matrix());
    bd.start(400.0, 320.0, 1.0).unwrap();
    let capacity = bd.world().pool().capacity();
    assert_eq!(bd.world().columns().len(), 20);

    bd.handle(InputEvent::PointerMove { x: 200.0, y: 160.0 }).unwrap();
    for _ in 0..400 {
        bd.advance();
        let pool = bd.world().pool();
        assert!(pool.active_count() <= capacity);
        for &i in pool.active() {
            assert!(pool.y[i] < 320.0);
        }
    }

    assert!(bd.world().pool().active_count() > 0);
    assert!(bd.surface().fades > 0);
    assert!(!bd.surface().glyphs.is_empty());
}

#[test]
fn stop_is_a_complete_teardown() {
    let mut bd = backdrop(EffectProfile::constellation());
    bd.start(800.0, 600.0, 1.0).unwrap();
    run(&mut bd, 3);

    bd.stop();
    assert_eq!(bd.state(), LoopState::Stopped);
    assert!(bd.host().pending.is_empty());
    assert!(!bd.host().listening);

    let before = *bd.input();
    bd.handle(InputEvent::PointerMove { x: 5.0, y: 5.0 }).unwrap();
    assert_eq!(*bd.input(), before);

    // A callback already queued by the host must not revive the loop
    bd.frame(100.0).unwrap();
    assert!(bd.host().pending.is_empty());

    bd.start(800.0, 600.0, 1.0).unwrap();
    assert_eq!(bd.state(), LoopState::Stopped);
    assert_eq!(bd.host().attaches, 1);
}

#[test]
fn hidden_page_pauses_the_loop() {
    let mut bd = backdrop(EffectProfile::constellation());
    bd.start(800.0, 600.0, 1.0).unwrap();

    bd.handle(InputEvent::Visibility { hidden: true }).unwrap();
    assert_eq!(bd.state(), LoopState::Paused);
    assert!(bd.host().pending.is_empty());
    assert!(bd.host().listening);

    // Input still lands while paused
    bd.handle(InputEvent::PointerMove { x: 40.0, y: 50.0 }).unwrap();
    assert!(bd.input().pointer.present);

    bd.handle(InputEvent::Visibility { hidden: false }).unwrap();
    assert_eq!(bd.state(), LoopState::Running);
    assert_eq!(bd.host().pending.len(), 1);
}

#[test]
fn resize_reconfigures_only_on_change() {
    let mut bd = backdrop(EffectProfile::constellation());
    bd.start(800.0, 600.0, 1.0).unwrap();

    bd.handle(InputEvent::Resize { width: 800.0, height: 600.0, dpr: 1.0 }).unwrap();
    assert_eq!(bd.surface().configured.len(), 1);

    bd.handle(InputEvent::Resize { width: 1920.0, height: 1080.0, dpr: 2.0 }).unwrap();
    assert_eq!(bd.surface().configured.len(), 2);
    let config = bd.surface().configured[1];
    assert_eq!((config.backing_width, config.backing_height), (3840, 2160));
    assert_eq!(bd.world().pool().active_count(), 138);
}

#[test]
fn low_power_runs_fewer_entities_at_lower_rate() {
    let mut bd = Backdrop::new(
        EffectProfile::constellation(),
        PowerMode::Low,
        7,
        ManualHost::default(),
        Recorder::default(),
    )
    .unwrap();
    bd.start(1920.0, 1080.0, 1.0).unwrap();
    assert_eq!(bd.world().pool().active_count(), 69);

    run(&mut bd, 60);
    assert_eq!(bd.world().frame(), 30);
}

#[test]
fn failed_frame_request_stops_the_loop() {
    let mut bd = backdrop(EffectProfile::constellation());
    bd.start(800.0, 600.0, 1.0).unwrap();
    bd.host_mut().pending.clear();
    bd.host_mut().fail_requests = true;

    assert!(bd.frame(0.0).is_err());
    assert_eq!(bd.state(), LoopState::Stopped);
    assert!(!bd.host().listening);
}

#[test]
fn invalid_profile_is_rejected_up_front() {
    let mut profile = EffectProfile::constellation();
    profile.friction = 1.5;
    let err = Backdrop::new(profile, PowerMode::Full, 1, ManualHost::default(), Recorder::default())
        .err()
        .unwrap();
    assert!(matches!(err, EngineError::InvalidProfile(_)));
}

#[test]
fn profile_json_drives_the_loop() {
    let profile = EffectProfile::from_json(r#"{ "preset": "matrix", "column_spacing": 40 }"#).unwrap();
    let mut bd = backdrop(profile);
    bd.start(400.0, 200.0, 1.0).unwrap();
    assert_eq!(bd.world().columns().len(), 10);

    run(&mut bd, 2);
    assert_eq!(bd.surface().fades, 2);
}

#[test]
fn failed_start_leaves_no_listeners() {
    let host = ManualHost { fail_requests: true, ..Default::default() };
    let mut bd = Backdrop::new(EffectProfile::constellation(), PowerMode::Full, 7, host, Recorder::default()).unwrap();

    assert!(bd.start(800.0, 600.0, 1.0).is_err());
    assert!(!bd.host().listening);
    assert!(bd.host().pending.is_empty());

    bd.stop();
    assert_eq!(bd.state(), LoopState::Stopped);
    assert!(!bd.host().listening);
}

#[test]
fn failed_resume_stops_the_loop() {
    let mut bd = backdrop(EffectProfile::constellation());
    bd.start(800.0, 600.0, 1.0).unwrap();
    bd.handle(InputEvent::Visibility { hidden: true }).unwrap();

    bd.host_mut().fail_requests = true;
    assert!(bd.handle(InputEvent::Visibility { hidden: false }).is_err());
    assert_eq!(bd.state(), LoopState::Stopped);
    assert!(!bd.host().listening);
}

#[test]
fn runaway_profile_values_never_reach_the_loop() {
    let err = EffectProfile::from_json(r#"{ "size_range": [1.0, 1e39] }"#).unwrap_err();
    assert!(matches!(err, EngineError::InvalidProfile(_)));

    let mut profile = EffectProfile::constellation();
    profile.life_decay = -1.0;
    assert!(Backdrop::new(profile, PowerMode::Full, 1, ManualHost::default(), Recorder::default()).is_err());
}
