pub mod actions;
pub mod choices;
pub mod damage;
pub mod dispatch;
pub mod effects;
pub mod engine;
pub mod field;
pub mod log;
pub mod pokemon;
pub mod queue;
pub mod rng;
pub mod side;
pub mod state;

#[cfg(test)]
mod tests;
