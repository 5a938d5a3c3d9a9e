pub mod admission_request;
pub mod admission_response;
pub mod clients;
pub mod constants;
pub mod errors;
pub mod logger;
mod message;
pub mod quantity;
pub mod settings;
pub mod validator;
pub mod validators;

pub use validator::Validator;
