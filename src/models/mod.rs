pub mod extinction;
pub mod nebular;
