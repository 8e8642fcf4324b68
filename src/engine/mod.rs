//! Core engine components

pub mod lua_runtime;
