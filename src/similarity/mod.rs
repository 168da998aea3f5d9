// Similarity engine: pairwise cosine similarity between target and candidate vectors.

pub mod cosine;
pub mod matrix;

pub use cosine::cosine_similarity;
pub use matrix::SimilarityMatrix;
