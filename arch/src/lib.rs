pub mod alu;
pub mod field;
pub mod inst;
pub mod symbol;
