pub mod domain;
pub mod fetch;
pub mod presentation;
