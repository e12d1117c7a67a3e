pub mod text;
pub mod toast;
