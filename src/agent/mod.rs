//! Persona agents.
//!
//! The [`Persona`] trait is the plug-in point; [`Agent`] runs the shared
//! evaluation lifecycle around it.

pub mod contract;
pub mod lifecycle;
pub mod tools;

pub use contract::Persona;
pub use lifecycle::Agent;
pub use tools::ToolConfig;
