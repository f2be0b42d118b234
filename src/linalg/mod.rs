//! Team triangular solves and the small kernels they are built from.
//!
//! [`trsv`] holds the solves themselves. [`vector`], [`gemv`] and [`inner_trsm`] are the
//! collaborators they delegate to: elementwise fill and scale of the right-hand side, the rank
//! update that applies a solved panel to the remaining rows, and the serial microkernel that
//! solves a panel's diagonal block.

pub mod gemv;
pub mod inner_trsm;
pub mod trsv;
pub mod vector;
