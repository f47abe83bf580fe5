//! src/lib.rs
pub mod cache;
pub mod collection;
pub mod configuration;
pub mod count_docs;
pub mod counters;
pub mod docno;
pub mod error;
pub mod file_splitter;
pub mod functions;
pub mod job;
pub mod mappers;
pub mod master;
pub mod pair;
pub mod registry;
pub mod storage;
pub mod telemetry;
pub mod worker;
