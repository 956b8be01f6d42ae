pub mod event;
pub mod input;
pub mod save;
pub mod schedule;
pub mod step;
pub mod world;
