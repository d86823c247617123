//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod debate_service;
pub mod moderate;
pub mod persona_turn;
pub mod reasoning_loop;
pub mod run_debate;
