//! HTTP 서버 구성

pub mod starters;
pub mod state;

pub use starters::{build_cors, json_config, path_config, query_config, start_api_server};
pub use state::AppState;
