use crate::games::SessionRng;

use super::types::{Color, Piece, PieceId};

pub trait PieceFactory {
    fn create(&mut self, color: Color) -> Piece;

    fn create_random(&mut self, rng: &mut SessionRng) -> Piece {
        let color = Color::random(rng);
        self.create(color)
    }
}

/// Issues ids 1, 2, 3, ... in creation order.
#[derive(Debug, Default)]
pub struct SequentialPieceFactory {
    next_id: u32,
}

impl SequentialPieceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> u32 {
        self.next_id
    }
}

impl PieceFactory for SequentialPieceFactory {
    fn create(&mut self, color: Color) -> Piece {
        self.next_id += 1;
        Piece::new(PieceId::new(self.next_id), color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_sequential() {
        let mut factory = SequentialPieceFactory::new();

        let first = factory.create(Color::Red);
        let second = factory.create(Color::Blue);

        assert_eq!(first.id.value(), 1);
        assert_eq!(second.id.value(), 2);
        assert_eq!(second.color, Color::Blue);
        assert_eq!(factory.created(), 2);
    }

    #[test]
    fn test_random_colors_cover_palette() {
        let mut factory = SequentialPieceFactory::new();
        let mut rng = SessionRng::new(42);

        let colors: HashSet<Color> = (0..500)
            .map(|_| factory.create_random(&mut rng).color)
            .collect();

        assert_eq!(colors.len(), Color::ALL.len());
    }
}
