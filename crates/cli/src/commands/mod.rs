pub mod clone;
