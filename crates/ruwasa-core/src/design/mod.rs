pub mod boq;
pub mod hydraulics;

pub use boq::{generate_boq, BoqCategory, BoqItem};
pub use hydraulics::{size_system, DesignInput, DesignOutput, HydraulicDesign};
