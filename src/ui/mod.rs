//! UI module - reusable widgets shared across views

pub mod components;
