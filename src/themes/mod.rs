// Themes — the keyword vocabulary and the compiled matcher built from it.

pub mod matcher;
pub mod vocabulary;
