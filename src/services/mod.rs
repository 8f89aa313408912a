pub mod health;
pub mod notifier;
pub mod subscription;
pub mod sweeper;
