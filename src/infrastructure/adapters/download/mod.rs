//! Download Adapter - 模型文件下载

mod http_model_fetcher;

pub use http_model_fetcher::{HttpModelFetcher, HttpModelFetcherConfig};
