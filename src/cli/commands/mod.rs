pub mod entities;
pub mod serve;
