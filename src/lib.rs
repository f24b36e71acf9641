#![doc(test(attr(deny(warnings))))]

//! Racao Core tracks pet-food purchases stored by a remote collection
//! endpoint: draft validation, the HTTP resource client, the in-memory list
//! state with its monthly views, and the shell that presents them.

pub mod cli;
pub mod client;
pub mod config;
pub mod currency;
pub mod errors;
pub mod purchase;
pub mod service;
pub mod store;
pub mod utils;
pub mod validation;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Racao Core tracing initialized.");
    });
}
