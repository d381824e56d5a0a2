use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    /// Holds the value of the earlier keyframe until the next one.
    Step,
    #[default]
    Linear,
    /// Hermite spline through keyframe tangents.
    CubicSpline,
}

/// A single sample of a track.
///
/// The interpolation mode applies to the segment that starts at this
/// keyframe. `tangents` holds `(in, out)` and is only read in
/// [`InterpolationMode::CubicSpline`] segments; a cubic segment missing
/// tangents on either end falls back to linear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
    pub interpolation: InterpolationMode,
    pub tangents: Option<(T, T)>,
}

const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last segment a track was sampled in, so monotonic playback
/// finds the next segment in constant time.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Time-ordered keyframes for one property.
///
/// Keyframe times are kept sorted. [`KeyframeTrack::add_keyframe`] appends
/// in constant time when called in time order; an out-of-order time is
/// inserted at its sorted position, and a time equal to an existing
/// keyframe's replaces that keyframe.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    keyframes: Vec<Keyframe<T>>,
    /// Mode given to keyframes added through [`KeyframeTrack::add_keyframe`].
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(interpolation: InterpolationMode) -> Self {
        Self {
            keyframes: Vec::new(),
            interpolation,
        }
    }

    /// Builds a track from parallel time and value arrays. Extra entries on
    /// the longer side are ignored.
    #[must_use]
    pub fn from_samples(times: &[f32], values: &[T], interpolation: InterpolationMode) -> Self {
        let mut track = Self::new(interpolation);
        for (&time, &value) in times.iter().zip(values) {
            track.add_keyframe(time, value);
        }
        track
    }

    /// Builds a cubic track from glTF-style triplets: for every time, three
    /// values `(in_tangent, value, out_tangent)`.
    #[must_use]
    pub fn from_cubic_triplets(times: &[f32], triplets: &[T]) -> Self {
        let mut track = Self::new(InterpolationMode::CubicSpline);
        for (&time, chunk) in times.iter().zip(triplets.chunks_exact(3)) {
            track.add_cubic_keyframe(time, chunk[0], chunk[1], chunk[2]);
        }
        track
    }

    pub fn add_keyframe(&mut self, time: f32, value: T) {
        self.insert(Keyframe {
            time,
            value,
            interpolation: self.interpolation,
            tangents: None,
        });
    }

    pub fn add_cubic_keyframe(&mut self, time: f32, in_tangent: T, value: T, out_tangent: T) {
        self.insert(Keyframe {
            time,
            value,
            interpolation: InterpolationMode::CubicSpline,
            tangents: Some((in_tangent, out_tangent)),
        });
    }

    /// Inserts `keyframe` at its sorted position.
    pub fn insert(&mut self, keyframe: Keyframe<T>) {
        match self.keyframes.last() {
            Some(last) if keyframe.time <= last.time => {}
            _ => {
                self.keyframes.push(keyframe);
                return;
            }
        }

        let idx = self.keyframes.partition_point(|k| k.time < keyframe.time);
        if self.keyframes[idx].time == keyframe.time {
            self.keyframes[idx] = keyframe;
        } else {
            log::debug!("Keyframe at {} inserted out of order", keyframe.time);
            self.keyframes.insert(idx, keyframe);
        }
    }

    #[inline]
    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Time of the last keyframe, or 0 when empty.
    pub fn length(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Samples at `time` with a binary search. `None` for an empty track.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        let mut cursor = KeyframeCursor::default();
        self.sample_with_cursor(time, &mut cursor)
    }

    /// Samples at `time`, starting the segment search from `cursor` and
    /// updating it to the segment found.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;

        // NaN compares false against every keyframe; treat it as the start.
        if time.is_nan() || time <= first.time {
            cursor.last_index = 0;
            return Some(first.value);
        }
        if time >= last.time {
            cursor.last_index = self.keyframes.len() - 1;
            return Some(last.value);
        }

        let index = self.find_segment(time, cursor);
        cursor.last_index = index;
        Some(self.sample_segment(index, time))
    }

    /// Index `i` with `keyframes[i].time <= time < keyframes[i + 1].time`.
    ///
    /// `time` must lie strictly inside the track's range.
    fn find_segment(&self, time: f32, cursor: &KeyframeCursor) -> usize {
        let keys = &self.keyframes;
        let len = keys.len();
        let i = cursor.last_index.min(len - 2);

        let found = if time >= keys[i].time {
            // Forward playback: scan a few segments ahead.
            (i..(i + MAX_SCAN_OFFSET + 1).min(len - 1)).find(|&idx| time < keys[idx + 1].time)
        } else {
            // Reverse playback: scan a few segments back.
            (i.saturating_sub(MAX_SCAN_OFFSET)..i)
                .rev()
                .find(|&idx| time >= keys[idx].time)
        };

        // Large jump (scrub or loop reset): fall back to binary search.
        found.unwrap_or_else(|| keys.partition_point(|k| k.time <= time).saturating_sub(1))
    }

    fn sample_segment(&self, index: usize, time: f32) -> T {
        let k0 = &self.keyframes[index];
        let k1 = &self.keyframes[index + 1];
        let dt = k1.time - k0.time;

        let t = if dt > 1e-6 { ((time - k0.time) / dt).clamp(0.0, 1.0) } else { 0.0 };
        if t == 0.0 {
            return k0.value;
        }

        match k0.interpolation {
            InterpolationMode::Step => k0.value,
            InterpolationMode::Linear => T::interpolate_linear(k0.value, k1.value, t),
            InterpolationMode::CubicSpline => match (k0.tangents, k1.tangents) {
                (Some((_, out_tangent0)), Some((in_tangent1, _))) => {
                    T::interpolate_cubic(k0.value, out_tangent0, in_tangent1, k1.value, t, dt)
                }
                _ => T::interpolate_linear(k0.value, k1.value, t),
            },
        }
    }
}

impl<T: Interpolatable> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self::new(InterpolationMode::Linear)
    }
}
