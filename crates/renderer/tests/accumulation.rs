//! End-to-end accumulation scenarios driven through the public session API
//! and the CPU reference compositor, mirroring what the window event loop
//! does with the GPU pipeline each frame.

use std::time::{Duration, Instant};

use petalfall_renderer::{PixelCanvas, Session, StrokeParams};

const SIZE: usize = 48;
const FRAME: f32 = 1.0 / 60.0;

/// One event-loop tick: advance the session clock, then shade a frame with
/// exactly the values the uniform upload would carry.
fn tick(canvas: &mut PixelCanvas, session: &mut Session, now: Instant) {
    session.advance(FRAME);
    let (cx, cy) = session.cursor();
    let (sa, sb) = session.seeds();
    canvas.step(&StrokeParams {
        cursor: [cx, cy],
        seed: [sa, sb],
        time: session.elapsed(),
        ratio: 1.0,
        clean: session.clean(now),
    });
}

#[test]
fn click_grows_a_persistent_flower() {
    let mut session = Session::new(Some(11));
    let mut canvas = PixelCanvas::new(SIZE, SIZE);
    let start = Instant::now();

    // Before any click the session is settled and nothing draws.
    for i in 0..5 {
        tick(&mut canvas, &mut session, start + i * Duration::from_millis(16));
    }
    assert!(canvas.is_blank());

    session.plant(0.5, 0.45);
    for i in 0..80 {
        tick(&mut canvas, &mut session, start + i * Duration::from_millis(16));
    }
    assert!(!canvas.is_blank(), "grown flower must be baked into the buffer");

    // Idle frames leave the settled image untouched.
    let settled = canvas.snapshot();
    for i in 80..95 {
        tick(&mut canvas, &mut session, start + i * Duration::from_millis(16));
    }
    assert_eq!(canvas.snapshot(), settled);
}

#[test]
fn resize_suppression_blanks_then_stays_cleared() {
    let mut session = Session::new(Some(23));
    let mut canvas = PixelCanvas::new(SIZE, SIZE);
    let start = Instant::now();

    session.plant(0.4, 0.5);
    for i in 0..80 {
        tick(&mut canvas, &mut session, start + i * Duration::from_millis(16));
    }
    assert!(!canvas.is_blank());

    // Resize: targets are recreated blank and suppression is armed.
    let resize_at = start + Duration::from_secs(2);
    canvas.resize(SIZE, SIZE);
    session.begin_suppression(resize_at);

    // Inside the window the presented frame is forced blank.
    tick(&mut canvas, &mut session, resize_at + Duration::from_millis(10));
    assert!(canvas.is_blank());

    // After the window lifts, the blank frame has already replaced the
    // history, so the old garden does not reappear.
    tick(&mut canvas, &mut session, resize_at + Duration::from_millis(60));
    assert!(canvas.is_blank());

    // The garden still accepts new clicks afterwards.
    session.plant(0.6, 0.5);
    for i in 0..80 {
        tick(
            &mut canvas,
            &mut session,
            resize_at + Duration::from_millis(70) + i * Duration::from_millis(16),
        );
    }
    assert!(!canvas.is_blank(), "garden must keep working after a resize");
}

#[test]
fn external_reset_clears_accumulated_flowers() {
    let mut session = Session::new(Some(5));
    let mut canvas = PixelCanvas::new(SIZE, SIZE);
    let start = Instant::now();

    session.plant(0.5, 0.5);
    for i in 0..80 {
        tick(&mut canvas, &mut session, start + i * Duration::from_millis(16));
    }
    assert!(!canvas.is_blank());

    let reset_at = start + Duration::from_secs(3);
    assert!(session.notice_reset(1, reset_at));
    tick(&mut canvas, &mut session, reset_at + Duration::from_millis(5));
    assert!(canvas.is_blank());
    tick(&mut canvas, &mut session, reset_at + Duration::from_millis(80));
    assert!(canvas.is_blank(), "reset must be permanent, not a one-frame blink");

    // Replaying the same counter value must not blank again.
    let later = reset_at + Duration::from_millis(100);
    session.plant(0.3, 0.6);
    for i in 0..80 {
        tick(&mut canvas, &mut session, later + i * Duration::from_millis(16));
    }
    assert!(!canvas.is_blank());
    assert!(!session.notice_reset(1, later));
}
