pub mod constraint;
pub mod constraints;
pub mod engine;
pub mod heuristics;
pub mod search;
pub mod store;
pub mod trail;
pub mod work_list;
