/// Creatures and their on-screen layout.
///
/// Positions live in the fixed logical canvas (800×600). The presentation
/// layer scales them to whatever surface it draws on. Items avoid the sky
/// band at the top and the seabed at the bottom.

use rand::Rng;

pub const LOGICAL_W: f32 = 800.0;
pub const LOGICAL_H: f32 = 600.0;

const ITEM_MARGIN_X: f32 = 50.0;
const ITEM_TOP: f32 = 120.0;
const ITEM_BOTTOM_RESERVE: f32 = 100.0;

/// Vertical bob amplitude in logical units.
pub const BOB_AMPLITUDE: f32 = 4.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Creature {
    Mermaid,
    Shark,
    Crab,
    Turtle,
}

impl Creature {
    pub const ALL: [Creature; 4] = [
        Creature::Mermaid,
        Creature::Shark,
        Creature::Crab,
        Creature::Turtle,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Creature {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn glyph(self) -> char {
        match self {
            Creature::Mermaid => '🧜',
            Creature::Shark   => '🦈',
            Creature::Crab    => '🦀',
            Creature::Turtle  => '🐢',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Creature::Mermaid => "mermaid",
            Creature::Shark   => "shark",
            Creature::Crab    => "crab",
            Creature::Turtle  => "turtle",
        }
    }
}

/// One creature instance in the round's layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Item {
    pub x: f32,
    pub y: f32,
    pub bob_offset: f32,
    pub bob_speed: f32,
}

impl Item {
    /// Vertical position including the bob at time `now_ms`.
    pub fn bobbed_y(&self, now_ms: u64) -> f32 {
        self.y + (now_ms as f32 * self.bob_speed + self.bob_offset).sin() * BOB_AMPLITUDE
    }
}

/// Scatter `count` items across the open water.
pub fn layout<R: Rng + ?Sized>(rng: &mut R, count: u32) -> Vec<Item> {
    let span_x = LOGICAL_W - 2.0 * ITEM_MARGIN_X;
    let span_y = LOGICAL_H - ITEM_TOP - ITEM_BOTTOM_RESERVE;
    (0..count)
        .map(|_| Item {
            x: ITEM_MARGIN_X + rng.gen::<f32>() * span_x,
            y: ITEM_TOP + rng.gen::<f32>() * span_y,
            bob_offset: rng.gen::<f32>() * std::f32::consts::TAU,
            bob_speed: 0.003 + rng.gen::<f32>() * 0.005,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn layout_has_requested_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..=10 {
            assert_eq!(layout(&mut rng, n).len(), n as usize);
        }
    }

    #[test]
    fn layout_stays_in_open_water() {
        let mut rng = StdRng::seed_from_u64(99);
        for item in layout(&mut rng, 200) {
            assert!(item.x >= 50.0 && item.x < 750.0, "x={}", item.x);
            assert!(item.y >= 120.0 && item.y < 500.0, "y={}", item.y);
            assert!(item.bob_offset >= 0.0 && item.bob_offset < std::f32::consts::TAU);
            assert!(item.bob_speed >= 0.003 && item.bob_speed < 0.008);
        }
    }

    #[test]
    fn bob_stays_within_amplitude() {
        let item = Item { x: 100.0, y: 200.0, bob_offset: 1.0, bob_speed: 0.005 };
        for t in (0..10_000).step_by(37) {
            let y = item.bobbed_y(t);
            assert!((y - 200.0).abs() <= BOB_AMPLITUDE + 1e-3);
        }
    }

    #[test]
    fn random_creature_covers_all_kinds() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let c = Creature::random(&mut rng);
            let idx = Creature::ALL.iter().position(|k| *k == c).unwrap();
            seen[idx] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
