//! Hide-and-seek reachability server.
//!
//! Given a start stop and a hiding window, finds every transit stop a hider
//! can reach before the seekers set off, the fastest way to each, and which
//! of them are valid hiding spots.

pub mod config;
pub mod domain;
pub mod geometry;
pub mod search;
pub mod timetable;
pub mod web;
