//! Dice rolls, the only nondeterminism source in a battle

use rand::Rng;

/// Sum of `dice` rolls of a `sides`-sided die
pub fn roll(rng: &mut impl Rng, dice: u32, sides: u32) -> i32 {
    (0..dice).map(|_| rng.gen_range(1..=sides as i32)).sum()
}

/// Attack roll die
pub fn d20(rng: &mut impl Rng) -> i32 {
    roll(rng, 1, 20)
}
