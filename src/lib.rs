//! Page mascot: a timer-driven character controller for a web-style page,
//! plus a small Bevy page that hosts it.
pub mod mascot;
pub mod page;
