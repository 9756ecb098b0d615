pub mod playtype;
pub mod track;
