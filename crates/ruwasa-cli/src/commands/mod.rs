pub mod design;
pub mod project;
pub mod simulate;
