pub mod config;
pub mod headers;
pub mod interceptor;
