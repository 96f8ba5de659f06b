use log::trace;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use tetrad_core::{Shape, Snapshot};
use tetrad_engine::{apply, lock};

use crate::strategy::{Decision, Strategy};
use crate::RunnerError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Randomizer {
    /// Each shape drawn independently.
    Uniform,
    /// Shuffled runs of all seven shapes.
    #[default]
    SevenBag,
}

/// Deterministic shape stream for one game.
#[derive(Clone, Debug)]
pub struct ShapeSource {
    randomizer: Randomizer,
    rng: StdRng,
    bag: [Shape; 7],
    bag_idx: usize,
}

impl ShapeSource {
    pub fn new(randomizer: Randomizer, seed: u64) -> Self {
        Self {
            randomizer,
            rng: StdRng::seed_from_u64(seed),
            bag: Shape::ALL,
            // refill on first draw
            bag_idx: Shape::ALL.len(),
        }
    }

    pub fn randomizer(&self) -> Randomizer {
        self.randomizer
    }

    pub fn next_shape(&mut self) -> Shape {
        match self.randomizer {
            Randomizer::Uniform => Shape::ALL[self.rng.gen_range(0..Shape::ALL.len())],
            Randomizer::SevenBag => {
                if self.bag_idx >= self.bag.len() {
                    self.bag = Shape::ALL;
                    self.bag.shuffle(&mut self.rng);
                    self.bag_idx = 0;
                }
                let shape = self.bag[self.bag_idx];
                self.bag_idx += 1;
                shape
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub pieces_placed: usize,
    pub lines_cleared: usize,
    /// A spawn failed before `max_pieces` was reached.
    pub topped_out: bool,
}

/// Play from `board` until a spawn fails or `max_pieces` pieces are placed.
///
/// Errors only if the strategy hands back an action that does not belong
/// to the snapshot it was asked about.
pub fn play_game<S: Strategy + ?Sized>(
    board: &Snapshot,
    strategy: &S,
    source: &mut ShapeSource,
    max_pieces: usize,
) -> Result<GameResult, RunnerError> {
    let mut board = board.clone();
    let mut result = GameResult::default();

    while result.pieces_placed < max_pieces {
        let shape = source.next_shape();
        let Some(mut s) = board.spawn(shape) else {
            result.topped_out = true;
            break;
        };
        let lines = loop {
            match strategy.decide(&s) {
                Some(Decision::Drop(d)) => {
                    board = apply(&s, &d)?;
                    break d.lines_cleared();
                }
                Some(Decision::Step(a)) => {
                    let next = apply(&s, &a)?;
                    if a.is_landed() {
                        board = next;
                        break a.lines_cleared();
                    }
                    s = next;
                }
                None => {
                    let (next, lines) = lock(&s)?;
                    board = next;
                    break lines;
                }
            }
        };
        trace!("placed {:?}, {} lines", shape, lines);
        result.pieces_placed += 1;
        result.lines_cleared += lines;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{GreedyDrop, GreedyStep};
    use tetrad_core::CellSet;
    use tetrad_engine::drop_actions;

    #[test]
    fn test_same_seed_same_stream() {
        for randomizer in [Randomizer::Uniform, Randomizer::SevenBag] {
            let mut a = ShapeSource::new(randomizer, 7);
            let mut b = ShapeSource::new(randomizer, 7);
            for _ in 0..50 {
                assert_eq!(a.next_shape(), b.next_shape());
            }
        }
    }

    #[test]
    fn test_seven_bag_deals_each_shape_once() {
        let mut source = ShapeSource::new(Randomizer::SevenBag, 3);
        for _ in 0..4 {
            let mut bag: Vec<Shape> = (0..7).map(|_| source.next_shape()).collect();
            bag.sort_by_key(|s| *s as u8);
            let mut all = Shape::ALL.to_vec();
            all.sort_by_key(|s| *s as u8);
            assert_eq!(bag, all);
        }
    }

    #[test]
    fn test_max_pieces_respected() {
        let mut source = ShapeSource::new(Randomizer::SevenBag, 1);
        let r = play_game(&Snapshot::default(), &GreedyDrop::default(), &mut source, 12)
            .expect("fresh actions");
        assert_eq!(r.pieces_placed, 12);
        assert!(!r.topped_out);
    }

    #[test]
    fn test_step_strategy_plays() {
        let mut source = ShapeSource::new(Randomizer::Uniform, 5);
        let r = play_game(&Snapshot::default(), &GreedyStep::default(), &mut source, 6)
            .expect("fresh actions");
        assert_eq!(r.pieces_placed, 6);
    }

    #[test]
    fn test_full_board_tops_out() {
        let mut set = CellSet::new(10, 20);
        for y in 0..20 {
            for x in 1..10 {
                set.insert_cell(x, y);
            }
        }
        let mut source = ShapeSource::new(Randomizer::SevenBag, 0);
        let r = play_game(
            &Snapshot::from_occupied(set),
            &GreedyDrop::default(),
            &mut source,
            10,
        )
        .expect("no actions taken");
        assert_eq!(r, GameResult {
            pieces_placed: 0,
            lines_cleared: 0,
            topped_out: true,
        });
    }

    /// Plans against a different board than the one it is shown.
    struct Confused;

    impl Strategy for Confused {
        fn decide(&self, snapshot: &Snapshot) -> Option<Decision> {
            let elsewhere = snapshot.spawn(Shape::I)?.apply_move(tetrad_core::Move::Down)?;
            drop_actions(&elsewhere).into_iter().next().map(Decision::Drop)
        }
    }

    #[test]
    fn test_stale_decision_is_an_error() {
        let mut source = ShapeSource::new(Randomizer::SevenBag, 0);
        let err = play_game(&Snapshot::default(), &Confused, &mut source, 3).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::Engine(tetrad_engine::EngineError::StaleAction)
        ));
    }
}
