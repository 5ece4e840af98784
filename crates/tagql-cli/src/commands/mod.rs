pub mod annotate;
pub mod check;
pub mod cst;
pub mod dialects;
pub mod plan;
