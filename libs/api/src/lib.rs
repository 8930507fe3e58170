pub mod path;
pub mod request;
