pub mod document;
pub mod engine_config;
pub mod index_model;
pub mod paging;
pub mod search;
pub mod status;
