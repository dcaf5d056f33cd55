pub mod error;
pub mod mutation;
pub mod query;
pub mod repo;
pub mod rules;
pub mod service;
