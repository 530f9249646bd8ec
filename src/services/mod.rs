/// Game controller and its control loop.
pub mod controller;
/// High score bookkeeping over the persistent store.
pub mod high_score;
/// Owning tokio task around the controller.
pub mod runner;
