//! # Keyframe Timeline
//!
//! User-anchored keyframes interpolated by position (0 to 100) with playback and scrubbing.
//! This drives the gradient's colors and angle directly, independently of the
//! [`AnimationClock`](crate::animation::AnimationClock).

use crate::color::Color;
use crate::errors::EditError;
use crate::types::{ColorStops, GradientDescriptor};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const MIN_KEYFRAMES: usize = 2;
pub const DEFAULT_DURATION_MS: f64 = 3000.0;
const MIN_DURATION_MS: f64 = 100.0;
const DISPLAY_FPS: f64 = 30.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub id: u64,
    /// Percent of the cycle, `0..=100`.
    pub position: f32,
    pub color_stops: ColorStops,
    pub angle_degrees: f32,
}

/// Interpolated colors and angle at one timeline position.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeValues {
    pub color_stops: ColorStops,
    pub angle_degrees: f32,
}

impl From<&Keyframe> for KeyframeValues {
    fn from(kf: &Keyframe) -> Self {
        Self {
            color_stops: kf.color_stops.clone(),
            angle_degrees: kf.angle_degrees,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Playback {
    Paused,
    /// Wall-clock timestamp that corresponds to position 0 of the current cycle.
    Playing { cycle_start_ms: f64 },
}

#[derive(Clone, Debug)]
pub struct Timeline {
    keyframes: Vec<Keyframe>,
    position: f32,
    playback: Playback,
    duration_ms: f64,
    next_id: u64,
}

fn clamp_position(position: f32) -> f32 {
    if position.is_nan() {
        0.0
    } else {
        position.clamp(0.0, 100.0)
    }
}

impl Timeline {
    /// Two keyframes: the gradient as-is at 0, reversed colors rotated 180° at 100.
    pub fn from_gradient(gradient: &GradientDescriptor) -> Self {
        let angle = gradient.angle_degrees();
        Self {
            keyframes: vec![
                Keyframe {
                    id: 1,
                    position: 0.0,
                    color_stops: gradient.color_stops.clone(),
                    angle_degrees: angle,
                },
                Keyframe {
                    id: 2,
                    position: 100.0,
                    color_stops: gradient.color_stops.reversed(),
                    angle_degrees: angle + 180.0,
                },
            ],
            position: 0.0,
            playback: Playback::Paused,
            duration_ms: DEFAULT_DURATION_MS,
            next_id: 3,
        }
    }

    pub fn new(keyframes: Vec<Keyframe>) -> Result<Self, EditError> {
        if keyframes.len() < MIN_KEYFRAMES {
            return Err(EditError::TooFewKeyframes);
        }
        let next_id = keyframes.iter().map(|k| k.id).max().unwrap_or(0) + 1;
        let keyframes = keyframes
            .into_iter()
            .map(|k| Keyframe {
                position: clamp_position(k.position),
                ..k
            })
            .collect();
        Ok(Self {
            keyframes,
            position: 0.0,
            playback: Playback::Paused,
            duration_ms: DEFAULT_DURATION_MS,
            next_id,
        })
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn keyframe(&self, id: u64) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.id == id)
    }

    fn sorted(&self) -> Vec<&Keyframe> {
        let mut sorted: Vec<&Keyframe> = self.keyframes.iter().collect();
        sorted.sort_by(|a, b| a.position.total_cmp(&b.position));
        sorted
    }

    /// Colors and angle at `position`.
    ///
    /// Positions outside every keyframe pair clamp to the first or last keyframe. Color lists
    /// of different lengths are matched by index, the shorter one repeating its last color.
    pub fn interpolate(&self, position: f32) -> KeyframeValues {
        let position = clamp_position(position);
        let sorted = self.sorted();
        let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
            return KeyframeValues {
                color_stops: ColorStops::default(),
                angle_degrees: 0.0,
            };
        };

        let (before, after) = sorted
            .windows(2)
            .find(|pair| position >= pair[0].position && position <= pair[1].position)
            .map(|pair| (pair[0], pair[1]))
            .unwrap_or((*first, *last));

        if before.position == after.position {
            return before.into();
        }

        let t = (position - before.position) / (after.position - before.position);
        // Exact anchors return the keyframe itself, without padding
        if t <= 0.0 {
            return before.into();
        }
        if t >= 1.0 {
            return after.into();
        }

        let len = before.color_stops.len().max(after.color_stops.len());
        let pick = |stops: &ColorStops, i: usize| stops[i.min(stops.len() - 1)];
        let colors: Vec<Color> = (0..len)
            .map(|i| pick(&before.color_stops, i).lerp(&pick(&after.color_stops, i), t))
            .collect();

        KeyframeValues {
            // len >= 2 because both inputs hold at least two stops
            color_stops: ColorStops::new(colors).unwrap_or_else(|_| before.color_stops.clone()),
            angle_degrees: before.angle_degrees + t * (after.angle_degrees - before.angle_degrees),
        }
    }

    pub fn current(&self) -> KeyframeValues {
        self.interpolate(self.position)
    }

    /// Current colors and angle applied on top of `gradient`.
    pub fn apply_to(&self, gradient: &GradientDescriptor) -> GradientDescriptor {
        let values = self.current();
        gradient
            .with_stops(values.color_stops)
            .with_angle(values.angle_degrees)
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn set_duration_ms(&mut self, duration_ms: f64, now_ms: f64) {
        let duration_ms = if duration_ms.is_finite() {
            duration_ms.max(MIN_DURATION_MS)
        } else {
            DEFAULT_DURATION_MS
        };
        self.duration_ms = duration_ms;
        self.realign(now_ms);
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.playback, Playback::Playing { .. })
    }

    /// Starts playback from the current position.
    pub fn play(&mut self, now_ms: f64) {
        self.playback = Playback::Playing {
            cycle_start_ms: now_ms,
        };
        self.realign(now_ms);
    }

    pub fn pause(&mut self) {
        self.playback = Playback::Paused;
    }

    pub fn toggle_playback(&mut self, now_ms: f64) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play(now_ms);
        }
    }

    fn realign(&mut self, now_ms: f64) {
        if let Playback::Playing { .. } = self.playback {
            self.playback = Playback::Playing {
                cycle_start_ms: now_ms - self.position as f64 / 100.0 * self.duration_ms,
            };
        }
    }

    /// Moves the playhead while playing. Returns the new position.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        if let Playback::Playing { cycle_start_ms } = self.playback {
            let elapsed = (now_ms - cycle_start_ms).max(0.0);
            self.position = ((elapsed % self.duration_ms) / self.duration_ms * 100.0) as f32;
        }
        self.position
    }

    /// Jumps to `position` and pauses.
    pub fn scrub(&mut self, position: f32) {
        self.position = clamp_position(position);
        self.pause();
    }

    pub fn skip_to_start(&mut self, now_ms: f64) {
        self.position = 0.0;
        self.realign(now_ms);
    }

    pub fn skip_to_end(&mut self, now_ms: f64) {
        self.position = 100.0;
        self.realign(now_ms);
    }

    /// Moves the playhead onto a keyframe.
    pub fn jump_to_keyframe(&mut self, id: u64) -> Result<(), EditError> {
        let position = self
            .keyframe(id)
            .map(|k| k.position)
            .ok_or(EditError::UnknownKeyframe(id))?;
        self.scrub(position);
        Ok(())
    }

    /// Adds a keyframe at the playhead holding `gradient`'s colors and angle.
    pub fn add_keyframe(&mut self, gradient: &GradientDescriptor) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.keyframes.push(Keyframe {
            id,
            position: self.position,
            color_stops: gradient.color_stops.clone(),
            angle_degrees: gradient.angle_degrees(),
        });
        debug!(id, position = self.position, "keyframe added");
        id
    }

    pub fn remove_keyframe(&mut self, id: u64) -> Result<Keyframe, EditError> {
        let index = self
            .keyframes
            .iter()
            .position(|k| k.id == id)
            .ok_or(EditError::UnknownKeyframe(id))?;
        if self.keyframes.len() <= MIN_KEYFRAMES {
            warn!(id, "refusing to drop below two keyframes");
            return Err(EditError::TooFewKeyframes);
        }
        Ok(self.keyframes.remove(index))
    }

    /// Overwrites a keyframe's colors and angle with `gradient`'s.
    pub fn update_from_current(
        &mut self,
        id: u64,
        gradient: &GradientDescriptor,
    ) -> Result<(), EditError> {
        let kf = self
            .keyframes
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or(EditError::UnknownKeyframe(id))?;
        kf.color_stops = gradient.color_stops.clone();
        kf.angle_degrees = gradient.angle_degrees();
        Ok(())
    }

    /// Drags a keyframe to `position`, clamped to `0..=100`.
    pub fn move_keyframe(&mut self, id: u64, position: f32) -> Result<(), EditError> {
        let kf = self
            .keyframes
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or(EditError::UnknownKeyframe(id))?;
        kf.position = clamp_position(position);
        Ok(())
    }

    /// `seconds:frames` (30 fps) for a position in this timeline's cycle.
    pub fn format_time(&self, position: f32) -> String {
        format_time(position, self.duration_ms)
    }
}

/// `seconds:frames` at 30 fps, frames zero-padded to two digits.
pub fn format_time(position: f32, duration_ms: f64) -> String {
    let ms = (clamp_position(position) as f64 / 100.0 * duration_ms).max(0.0);
    let seconds = (ms / 1000.0).floor() as u64;
    let frames = ((ms % 1000.0) * DISPLAY_FPS / 1000.0).floor() as u64;
    format!("{seconds}:{frames:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_uses_thirty_fps() {
        assert_eq!(format_time(0.0, 3000.0), "0:00");
        assert_eq!(format_time(100.0, 3000.0), "3:00");
        assert_eq!(format_time(50.0, 3000.0), "1:15");
    }

    #[test]
    fn advance_wraps_around_the_cycle() {
        let mut tl = Timeline::from_gradient(&GradientDescriptor::default());
        tl.play(1000.0);
        assert!((tl.advance(1000.0 + 1500.0) - 50.0).abs() < 1e-4);
        assert!((tl.advance(1000.0 + 3750.0) - 25.0).abs() < 1e-4);
    }
}
