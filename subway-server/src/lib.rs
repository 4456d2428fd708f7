//! Subway line management server.
//!
//! A web application that manages subway lines, where each line is an
//! ordered chain of sections between stations. The core is the section
//! chain algorithm: inserting a section (possibly splitting an existing
//! one), removing the terminal section, and deriving the station order.

pub mod domain;
pub mod service;
pub mod store;
pub mod web;
