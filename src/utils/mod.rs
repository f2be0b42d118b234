//! Small helpers shared by the kernels and the team runtime.

pub mod thread;
