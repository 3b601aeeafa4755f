pub mod scorer;

pub use scorer::score;
