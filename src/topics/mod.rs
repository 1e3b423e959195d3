// Text analysis: title keywords and TF-IDF document vectors.

pub mod keywords;
pub mod tfidf;
