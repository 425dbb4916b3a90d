mod edit_flow;
mod filter_flow;
mod selection_flow;
pub mod support;
