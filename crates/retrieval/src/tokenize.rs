//! Keyword tokenizer for BM25 scoring.
//!
//! A lightweight script-range filter, not a segmentation algorithm:
//! - ASCII alphanumeric runs become single lowercased tokens
//! - Runs of kana/kanji become character bigrams (a lone character stays
//!   as-is), which raises hit rates for unsegmented Japanese text
//! - Everything else is a delimiter

/// Tokenize text for keyword scoring.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut ascii_run = String::new();
    let mut cjk_run: Vec<char> = Vec::new();

    let flush_ascii = |run: &mut String, tokens: &mut Vec<String>| {
        if !run.is_empty() {
            tokens.push(run.to_lowercase());
            run.clear();
        }
    };
    let flush_cjk = |run: &mut Vec<char>, tokens: &mut Vec<String>| {
        match run.len() {
            0 => {}
            1 => tokens.push(run[0].to_string()),
            _ => {
                for pair in run.windows(2) {
                    tokens.push(pair.iter().collect());
                }
            }
        }
        run.clear();
    };

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            flush_cjk(&mut cjk_run, &mut tokens);
            ascii_run.push(c);
        } else if is_cjk(c) {
            flush_ascii(&mut ascii_run, &mut tokens);
            cjk_run.push(c);
        } else {
            flush_ascii(&mut ascii_run, &mut tokens);
            flush_cjk(&mut cjk_run, &mut tokens);
        }
    }
    flush_ascii(&mut ascii_run, &mut tokens);
    flush_cjk(&mut cjk_run, &mut tokens);

    tokens
}

/// Hiragana, katakana (plus the prolonged sound mark), and CJK ideographs.
fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}' // hiragana
        | '\u{30A0}'..='\u{30FF}' // katakana + ー
        | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
    )
}
