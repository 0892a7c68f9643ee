pub mod link_service;
pub mod object_store;
