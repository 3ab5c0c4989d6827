pub mod batch;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod presentation;
pub mod routes;
pub mod schema;
pub mod scoring;
pub mod state;
pub mod store;

pub mod utils {
    pub mod json;
}
