pub mod all_different;
pub mod circuit;
pub mod element;
pub mod not_equal;
