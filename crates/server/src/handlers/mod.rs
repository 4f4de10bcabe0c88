mod ask;
mod documents;
mod health;

pub use ask::{ask_handler, AskRequest};
pub use documents::{
    delete_handler, list_handler, upload_handler, MessageResponse, UploadResponse,
};
pub use health::{health_handler, HealthResponse, ServiceStatus};
