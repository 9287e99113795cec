//! Storage Adapter - 对象存储

mod s3_store;

pub use s3_store::{S3ObjectStore, S3StoreConfig};
