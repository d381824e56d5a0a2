use glam::Vec3;

/// A polyline authored in the modeler, in the owning node's local space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub points: Vec<Vec3>,
    /// When set, the last point connects back to the first.
    pub closed: bool,
}

impl Path {
    #[must_use]
    pub fn new(points: Vec<Vec3>, closed: bool) -> Self {
        Self { points, closed }
    }

    fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        let closing = if self.closed && self.points.len() > 1 {
            self.points.last().copied().zip(self.points.first().copied())
        } else {
            None
        };
        self.points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(closing)
    }

    /// Total length along all segments.
    pub fn length(&self) -> f32 {
        self.segments().map(|(a, b)| a.distance(b)).sum()
    }

    /// Point at `distance` along the path, clamped to its ends.
    ///
    /// Returns `None` for an empty path.
    pub fn point_at(&self, distance: f32) -> Option<Vec3> {
        let first = *self.points.first()?;
        if distance <= 0.0 {
            return Some(first);
        }

        let mut remaining = distance;
        let mut last = first;
        for (a, b) in self.segments() {
            let len = a.distance(b);
            if remaining <= len && len > 0.0 {
                return Some(a.lerp(b, remaining / len));
            }
            remaining -= len;
            last = b;
        }
        Some(last)
    }
}
