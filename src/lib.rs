//! Request construction and execution for the documented dashboard API.
//!
//! The building blocks are plain functions: [`template::resolve_path`],
//! [`query::build_query`], [`token::infer_country`] / [`token::strip_country_suffix`],
//! [`request::ApiClient::execute`] and [`curl::format_curl`]. [`form::TesterForm`] ties
//! them together the way an interactive front end uses them.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod curl;
pub mod error;
pub mod form;
pub mod query;
pub mod request;
pub mod settings;
pub mod template;
pub mod token;
pub mod types;

pub use error::ApiError;
