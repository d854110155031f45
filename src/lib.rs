//! Mergington Activities: extracurricular activity registration service
//!
//! Teachers log in against a JSON credential file and receive a bearer token;
//! with it they can sign students up for activities or remove them. Anyone can
//! list the activities. Everything lives in memory and resets on restart.

pub mod models;
pub mod seed;
// In-memory activity store (rosters behind a lock)
pub mod storage;
pub mod credentials;
pub mod auth;
pub mod error;
pub mod config;
// REST API module: Axum HTTP handlers
pub mod rest;
