pub mod task;
pub mod user;

pub use task::{Task, TaskCreate, TaskQuery, TaskToggle, TaskUpdate};
pub use user::{User, UserCredentials};
