//! Cell grid to mark plan.

pub(crate) mod compiler;
pub(crate) mod plan;
