pub mod error;
pub mod preprocess;
pub mod presentation;
pub mod state;
pub mod workflow;

pub use error::WorkflowError;
pub use state::WorkflowState;
pub use workflow::{Applied, CaptureWorkflow, ProcessingCompletion, ProcessingTicket};
