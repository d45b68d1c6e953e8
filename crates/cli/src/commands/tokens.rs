//! `scour tokens` — token estimation and keyword tokenization.

use scour_agent::token::estimate_tokens;
use scour_retrieval::tokenize;
use std::path::Path;

pub fn run(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    // A path argument analyzes the file's contents; anything else is text
    let text = if Path::new(input).is_file() {
        std::fs::read_to_string(input)?
    } else {
        input.to_string()
    };

    let chars = text.chars().count();
    let estimated = estimate_tokens(&text);
    let keyword_tokens = tokenize(&text);

    println!("Characters:        {chars}");
    println!("Estimated tokens:  {estimated}  (~4 chars/token heuristic)");
    println!("Keyword tokens:    {}", keyword_tokens.len());

    let preview: Vec<&str> = keyword_tokens.iter().take(20).map(String::as_str).collect();
    if !preview.is_empty() {
        println!("First tokens:      {}", preview.join(" | "));
        if keyword_tokens.len() > preview.len() {
            println!("                   ... and {} more", keyword_tokens.len() - preview.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_runs() {
        assert!(run("hello token world").is_ok());
    }

    #[test]
    fn file_contents_are_analyzed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.txt");
        std::fs::write(&path, "some file contents").unwrap();
        assert!(run(path.to_str().unwrap()).is_ok());
    }
}
