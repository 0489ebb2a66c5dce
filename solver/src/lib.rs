pub mod assignment;
pub mod rtv;
pub mod rv;

pub use assignment::{solve as solve_assignment, Assignment};
pub use rtv::{build_rtv_graph, RtvGraph};
pub use rv::{build_rr_graph, build_rv_graph, RrGraph, RvGraph};
