use serde::{Deserialize, Serialize};

/// Valid-limit grid for the block-range endpoint: `min`, `min + step`,
/// `min + 2 * step`, ... capped at `max` (which is always valid).
///
/// An out-of-grid limit is not an error; the route replies with a redirect
/// to the sanitized value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageSizeGrid {
    pub min: u64,
    pub max: u64,
    pub step: u64,
}

impl Default for PageSizeGrid {
    fn default() -> Self {
        Self { min: 30, max: 80, step: 5 }
    }
}

impl PageSizeGrid {
    pub fn is_valid(&self, limit: u64) -> bool {
        limit == self.max || (limit >= self.min && limit <= self.max && (limit - self.min) % self.step == 0)
    }

    /// Clamps into `[min, max]`, then snaps down onto the grid.
    pub fn sanitize(&self, limit: u64) -> u64 {
        let clamped = limit.clamp(self.min, self.max);
        if clamped == self.max {
            return self.max;
        }
        self.min + ((clamped - self.min) / self.step) * self.step
    }
}

/// Accepted limit range for cursor endpoints. Anything outside redirects to
/// the configured preset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u64,
    pub max: u64,
    pub preset: u64,
}

impl Default for CountRange {
    fn default() -> Self {
        Self { min: 10, max: 100, preset: 25 }
    }
}

impl CountRange {
    pub fn is_valid(&self, limit: u64) -> bool {
        limit >= self.min && limit <= self.max
    }
}

/// Hard clamp applied by the store adapter to every paged query, independent
/// of what the routes validated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StorePageWindow {
    pub min: u64,
    pub max: u64,
}

impl Default for StorePageWindow {
    fn default() -> Self {
        Self { min: 10, max: 4096 }
    }
}

impl StorePageWindow {
    pub fn clamp(&self, limit: u64) -> u64 {
        limit.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(30, true)]
    #[case(35, true)]
    #[case(75, true)]
    #[case(80, true)]
    #[case(29, false)]
    #[case(81, false)]
    #[case(33, false)]
    #[case(0, false)]
    fn page_size_grid_membership(#[case] limit: u64, #[case] valid: bool) {
        assert_eq!(PageSizeGrid::default().is_valid(limit), valid);
    }

    #[rstest]
    #[case(29, 30)]
    #[case(100, 80)]
    #[case(0, 30)]
    #[case(33, 30)]
    #[case(47, 45)]
    #[case(80, 80)]
    fn page_size_grid_sanitizes(#[case] limit: u64, #[case] expected: u64) {
        let grid = PageSizeGrid::default();
        assert_eq!(grid.sanitize(limit), expected);
        assert!(grid.is_valid(grid.sanitize(limit)));
    }

    #[test]
    fn count_range_bounds_are_inclusive() {
        let range = CountRange::default();
        assert!(range.is_valid(10));
        assert!(range.is_valid(100));
        assert!(!range.is_valid(9));
        assert!(!range.is_valid(101));
    }

    #[test]
    fn store_window_clamps_both_sides() {
        let window = StorePageWindow::default();
        assert_eq!(window.clamp(0), 10);
        assert_eq!(window.clamp(25), 25);
        assert_eq!(window.clamp(1 << 32), 4096);
    }
}
