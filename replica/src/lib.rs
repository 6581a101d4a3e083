pub mod clock;
pub mod compare;
pub mod error;
pub mod executor;
pub mod journal;
pub mod logging;
pub mod plan;
pub mod reconciler;
pub mod run;
pub mod storage;
pub mod walker;

#[cfg(test)]
mod tests;
