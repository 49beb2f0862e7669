/// Receives the counts of one resolved match and returns the points awarded.
pub trait ScoreSink {
    fn on_match(&mut self, matched: usize, floating: usize) -> u32;
}

#[derive(Clone, Debug)]
pub struct Scoreboard {
    base_points: u32,
    bonus_points: u32,
    score: u32,
    matches: u32,
}

impl Scoreboard {
    pub fn new(base_points: u32, bonus_points: u32) -> Self {
        Self {
            base_points,
            bonus_points,
            score: 0,
            matches: 0,
        }
    }

    pub fn points_for(&self, matched: usize, floating: usize) -> u32 {
        let matched_points = (matched as u32).saturating_mul(self.base_points);
        let floating_points = (floating as u32).saturating_mul(self.bonus_points);
        matched_points.saturating_add(floating_points)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn matches(&self) -> u32 {
        self.matches
    }
}

impl ScoreSink for Scoreboard {
    fn on_match(&mut self, matched: usize, floating: usize) -> u32 {
        let points = self.points_for(matched, floating);
        if points > 0 {
            self.score = self.score.saturating_add(points);
            self.matches += 1;
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floating_pieces_earn_bonus() {
        let mut scoreboard = Scoreboard::new(10, 20);

        let points = scoreboard.on_match(3, 2);

        assert_eq!(points, 70);
        assert_eq!(scoreboard.score(), 70);
        assert_eq!(scoreboard.matches(), 1);
    }

    #[test]
    fn test_score_accumulates() {
        let mut scoreboard = Scoreboard::new(10, 20);

        scoreboard.on_match(3, 0);
        scoreboard.on_match(4, 1);

        assert_eq!(scoreboard.score(), 30 + 60);
        assert_eq!(scoreboard.matches(), 2);
    }

    #[test]
    fn test_zero_points_not_counted_as_match() {
        let mut scoreboard = Scoreboard::new(0, 0);

        assert_eq!(scoreboard.on_match(5, 5), 0);
        assert_eq!(scoreboard.matches(), 0);
    }
}
