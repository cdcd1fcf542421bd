pub mod bank;
pub mod catalog;
pub mod collaborators;
pub mod config;
pub mod pipeline;
pub mod question;
pub mod report;
pub mod resume;
pub mod selector;
pub mod session;

pub use config::InterviewConfig;
pub use session::{Collaborators, Interviewer, Phase};
