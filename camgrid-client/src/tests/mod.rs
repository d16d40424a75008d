//! Integration tests for the client core: full event sequences through
//! [crate::CamGridClient], with the side channel simulated by a pumped queue
//! so every handler runs to completion before the next frame lands.

mod session_tests;
mod zoom_tests;
