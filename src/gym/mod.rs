pub mod boost_game;

pub use boost_game::{BoostGame, GameState};
