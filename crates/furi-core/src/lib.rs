pub mod compound;
pub mod markup;
pub mod pipeline;
pub mod romaji;
pub mod ruby;
pub mod segment;
pub mod settings;
pub mod tokenizer;
pub mod unicode;
