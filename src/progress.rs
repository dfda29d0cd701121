//! Score and level progress.

use crate::config::level_target;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub score: u32,
    pub level: u32,
    /// Points earned toward `target` this level; clamped at `target`.
    pub progress: u32,
    pub target: u32,
    complete: bool,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    pub fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            progress: 0,
            target: level_target(1),
            complete: false,
        }
    }

    /// Add `points` to score and progress. Returns true exactly once per level,
    /// on the call that reaches the target.
    pub fn add(&mut self, points: u32) -> bool {
        self.score = self.score.saturating_add(points);
        if self.complete {
            return false;
        }
        self.progress = self.progress.saturating_add(points);
        if self.progress >= self.target {
            self.progress = self.target;
            self.complete = true;
            return true;
        }
        false
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Fraction of the level target reached, in 0.0..=1.0.
    pub fn fraction(&self) -> f32 {
        if self.target == 0 {
            return 1.0;
        }
        (self.progress as f32 / self.target as f32).min(1.0)
    }

    /// Move to the next level; score carries over.
    pub fn advance(&mut self) {
        self.level += 1;
        self.target = level_target(self.level);
        self.progress = 0;
        self.complete = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_once_and_clamps() {
        let mut p = Progress::new();
        assert!(!p.add(60));
        assert!(p.add(110));
        assert_eq!(p.progress, 100);
        assert_eq!(p.score, 170);
        assert!(!p.add(50));
        assert_eq!(p.score, 220);
        assert!((p.fraction() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn advance_raises_target() {
        let mut p = Progress::new();
        p.add(100);
        p.advance();
        assert_eq!(p.level, 2);
        assert_eq!(p.target, 200);
        assert_eq!(p.progress, 0);
        assert!(!p.is_complete());
        assert_eq!(p.score, 100);
    }
}
