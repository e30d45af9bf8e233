// src/lib.rs

//! jobwatch: watches job listings and notifies on new postings from tracked companies.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
