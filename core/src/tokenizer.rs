use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\w+").expect("valid regex");
}

/// Tokenize one line of document text into lowercased terms.
///
/// Terms are maximal runs of word characters; anything else only delimits,
/// so no empty term is ever produced. Pure and stateless, safe to call from
/// any number of mapper tasks concurrently.
pub fn tokenize(line: &str) -> Vec<String> {
    let lowered = line.to_lowercase();
    WORD.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}
