//! Test suites for the rigd daemon core.

mod controller_behaviour;
mod support;
