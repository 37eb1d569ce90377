//! Live adapters that talk to real HTTP servers and S3.

pub mod http;
pub mod s3;
