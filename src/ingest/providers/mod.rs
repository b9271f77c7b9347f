// src/ingest/providers/mod.rs
pub mod codeforces;
