//! tests/mod.rs
//! Pruebas unitarias y de integración (SQLite en memoria + telefonía simulada).

mod support;
mod webhook_tests;
