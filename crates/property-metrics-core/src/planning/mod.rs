pub mod cil;
pub mod development;
pub mod loft;
