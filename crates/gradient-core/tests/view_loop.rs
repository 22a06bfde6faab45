//! Animation Loop Tests
//!
//! Lifecycle of a mounted canvas view driven by a hand-stepped scheduler: single-flight frame
//! requests, clock resets, and cancellation on unmount.

use gradient_core::systems::renderer::{RenderInputs, RendererConfig};
use gradient_core::systems::scheduler::{FrameScheduler, ManualScheduler};
use gradient_core::systems::view::{CanvasView, LoopState};
use gradient_core::{CanvasSize, Effects, GradientDescriptor};

fn small_inputs() -> RenderInputs {
    RenderInputs::new(
        GradientDescriptor::default(),
        Effects::default(),
        CanvasSize::new(16, 16),
    )
}

fn view() -> CanvasView {
    CanvasView::new(
        small_inputs(),
        RendererConfig {
            seed: Some(1),
            ..RendererConfig::default()
        },
    )
}

/// Fires every due request at `now` and returns how many frames were drawn.
fn pump(view: &mut CanvasView, sched: &mut ManualScheduler, now: f64) -> usize {
    let mut drawn = 0;
    for request in sched.take_due() {
        if view.on_frame(request, now, sched).unwrap().is_some() {
            drawn += 1;
        }
    }
    drawn
}

/// Mounting keeps exactly one request in flight; unmounting leaves none behind.
#[test]
fn mount_and_unmount_leave_no_pending_frames() {
    let mut sched = ManualScheduler::new();
    let mut v = view();
    assert_eq!(v.state(), LoopState::Idle);

    v.mount(&mut sched);
    v.mount(&mut sched);
    assert_eq!(sched.pending(), 1);

    for i in 0..5 {
        assert_eq!(pump(&mut v, &mut sched, i as f64 / 60.0), 1);
        assert_eq!(sched.pending(), 1);
    }
    assert_eq!(v.renderer().stats().frames, 5);

    v.unmount(&mut sched);
    assert_eq!(v.state(), LoopState::Disposed);
    assert_eq!(sched.pending(), 0);
    assert_eq!(sched.total_requested(), sched.total_cancelled() + 5);
}

/// Frames delivered after unmount are ignored and schedule nothing.
#[test]
fn stale_frames_after_unmount_are_ignored() {
    let mut sched = ManualScheduler::new();
    let mut v = view();
    v.mount(&mut sched);
    let due = sched.take_due();
    v.unmount(&mut sched);

    for request in due {
        assert!(v.on_frame(request, 0.0, &mut sched).unwrap().is_none());
    }
    assert_eq!(sched.pending(), 0);

    v.mount(&mut sched);
    assert_eq!(sched.pending(), 0, "a disposed view cannot be remounted");
}

/// Changing inputs cancels the outstanding request and issues a new one.
#[test]
fn input_changes_replace_the_request() {
    let mut sched = ManualScheduler::new();
    let mut v = view();
    v.mount(&mut sched);

    let mut next = small_inputs();
    next.effects = Effects::new(2.0, 0.1);
    v.set_inputs(next.clone(), &mut sched);
    assert_eq!(sched.pending(), 1);
    assert_eq!(sched.total_cancelled(), 1);
    assert_eq!(v.inputs(), &next);
}

/// Effects-only edits keep the animation clock; gradient edits restart it.
#[test]
fn clock_resets_only_on_gradient_changes() {
    let mut sched = ManualScheduler::new();
    let mut v = view();
    v.mount(&mut sched);
    pump(&mut v, &mut sched, 10.0);
    pump(&mut v, &mut sched, 12.0);
    assert_eq!(v.elapsed(12.0), 2.0);

    let mut blurred = v.inputs().clone();
    blurred.effects = Effects::new(4.0, 0.0);
    v.set_inputs(blurred.clone(), &mut sched);
    assert_eq!(v.elapsed(12.5), 2.5);

    let mut turned = blurred;
    turned.gradient = turned.gradient.with_angle(200.0);
    v.set_inputs(turned, &mut sched);
    assert_eq!(v.elapsed(13.0), 0.0);

    pump(&mut v, &mut sched, 13.0);
    assert_eq!(v.elapsed(14.0), 1.0);
}
