//! TF-IDF weighting of category tag text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Largest vocabulary kept after fitting.
pub const MAX_VOCABULARY: usize = 50;

/// English stop-words removed before counting.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "been",
    "before", "behind", "being", "below", "beside", "besides", "between", "beyond", "both",
    "but", "by", "can", "cannot", "could", "do", "done", "down", "due", "during", "each", "eg",
    "either", "else", "elsewhere", "enough", "etc", "even", "ever", "every", "everyone",
    "everything", "everywhere", "except", "few", "for", "former", "from", "further", "had",
    "has", "have", "he", "hence", "her", "here", "hers", "herself", "him", "himself", "his",
    "how", "however", "ie", "if", "in", "indeed", "into", "is", "it", "its", "itself", "last",
    "latter", "least", "less", "many", "may", "me", "meanwhile", "might", "mine", "more",
    "moreover", "most", "mostly", "much", "must", "my", "myself", "namely", "neither", "never",
    "nevertheless", "next", "no", "nobody", "none", "nor", "not", "nothing", "now", "nowhere",
    "of", "off", "often", "on", "once", "one", "only", "onto", "or", "other", "others",
    "otherwise", "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps", "please",
    "rather", "same", "seem", "seemed", "seeming", "seems", "several", "she", "should", "since",
    "so", "some", "somehow", "someone", "something", "sometime", "sometimes", "somewhere",
    "still", "such", "than", "that", "the", "their", "them", "themselves", "then", "thence",
    "there", "thereafter", "thereby", "therefore", "therein", "these", "they", "this", "those",
    "though", "through", "throughout", "thru", "thus", "to", "together", "too", "toward",
    "towards", "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
    "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
    "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while", "whither",
    "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without",
    "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Split `text` into lower-cased word tokens of at least two characters.
///
/// Word characters are alphanumerics and `_`, so `art_gallery` stays one
/// token.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_lowercase)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
}

#[expect(
    clippy::cast_precision_loss,
    reason = "corpus and term counts are far below 2^52"
)]
fn as_count(n: usize) -> f64 {
    n as f64
}

/// Term-frequency times smoothed inverse-document-frequency, L2-normalised
/// per document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: Vec<String>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and IDF weights from `documents`.
    ///
    /// The vocabulary keeps the [`MAX_VOCABULARY`] most frequent terms
    /// across the corpus, breaking ties alphabetically, and is stored in
    /// alphabetical order. IDF is `ln((1 + n) / (1 + df)) + 1`.
    pub fn fit<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut n_documents = 0usize;
        for document in documents {
            n_documents += 1;
            let mut seen: Vec<String> = Vec::new();
            for token in tokenize(document) {
                *frequency.entry(token.clone()).or_default() += 1;
                if !seen.contains(&token) {
                    seen.push(token);
                }
            }
            for token in seen {
                *document_frequency.entry(token).or_default() += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = frequency.into_iter().collect();
        // BTreeMap iteration is alphabetical, so the stable sort breaks
        // frequency ties alphabetically.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(MAX_VOCABULARY);
        let mut vocabulary: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        vocabulary.sort_unstable();

        let n = as_count(n_documents);
        let idf = vocabulary
            .iter()
            .map(|term| {
                let df = as_count(document_frequency.get(term).copied().unwrap_or_default());
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        Self { vocabulary, idf }
    }

    /// Number of output columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.vocabulary.len()
    }

    /// Vocabulary in column order.
    #[must_use]
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Append the weighted, normalised term vector for `document` to `out`.
    ///
    /// Terms outside the vocabulary are ignored; a document with no known
    /// terms yields zeros.
    pub fn transform_into(&self, document: &str, out: &mut Vec<f64>) {
        let mut counts = vec![0usize; self.vocabulary.len()];
        for token in tokenize(document) {
            if let Ok(idx) = self.vocabulary.binary_search(&token) {
                if let Some(count) = counts.get_mut(idx) {
                    *count += 1;
                }
            }
        }
        let weights: Vec<f64> = counts
            .iter()
            .zip(&self.idf)
            .map(|(count, idf)| as_count(*count) * idf)
            .collect();
        let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            out.extend(weights.iter().map(|w| w / norm));
        } else {
            out.extend(weights);
        }
    }
}
