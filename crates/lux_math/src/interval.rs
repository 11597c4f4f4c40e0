/// A closed range of ray parameters or coordinates.
///
/// `min > max` means empty; [`Interval::EMPTY`] is the identity for
/// [`Interval::surrounding`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const EMPTY: Interval = Interval::new(f32::INFINITY, f32::NEG_INFINITY);
    pub const UNIVERSE: Interval = Interval::new(f32::NEG_INFINITY, f32::INFINITY);

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn size(self) -> f32 {
        self.max - self.min
    }

    pub fn is_empty(self) -> bool {
        self.min > self.max
    }

    /// Inclusive membership.
    pub fn contains(self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Exclusive membership, used for hit acceptance.
    pub fn surrounds(self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    pub fn encloses(self, other: Interval) -> bool {
        self.min <= other.min && other.max <= self.max
    }

    /// Grow by `delta`, half on each side.
    pub fn padded(self, delta: f32) -> Interval {
        let half = 0.5 * delta;
        Interval::new(self.min - half, self.max + half)
    }

    pub fn shifted(self, offset: f32) -> Interval {
        Interval::new(self.min + offset, self.max + offset)
    }

    /// Smallest interval covering both inputs.
    pub fn surrounding(a: Interval, b: Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_vs_surrounds() {
        let t = Interval::new(0.001, 10.0);

        assert!(t.contains(0.001) && t.contains(10.0));
        assert!(!t.surrounds(0.001) && !t.surrounds(10.0));
        assert!(t.surrounds(5.0));
        assert!(!t.contains(-1.0) && !t.surrounds(11.0));
    }

    #[test]
    fn test_empty_and_universe() {
        assert!(Interval::EMPTY.is_empty());
        assert!(!Interval::EMPTY.contains(0.0));
        assert!(Interval::UNIVERSE.contains(1e30));
        assert_eq!(Interval::UNIVERSE.size(), f32::INFINITY);
        assert_eq!(Interval::default(), Interval::EMPTY);
    }

    #[test]
    fn test_padded_and_shifted() {
        let degenerate = Interval::new(2.0, 2.0).padded(0.5);
        assert_eq!(degenerate, Interval::new(1.75, 2.25));

        assert_eq!(Interval::new(-1.0, 1.0).shifted(3.0), Interval::new(2.0, 4.0));
    }

    #[test]
    fn test_surrounding_and_encloses() {
        let a = Interval::new(1.0, 2.0);
        let b = Interval::new(-3.0, 0.0);
        let hull = Interval::surrounding(a, b);

        assert_eq!(hull, Interval::new(-3.0, 2.0));
        assert!(hull.encloses(a) && hull.encloses(b));
        assert!(!a.encloses(hull));
        assert_eq!(Interval::surrounding(Interval::EMPTY, a), a);
    }
}
