// Run with: cargo fuzz run fuzz_comment_text
// Grapheme counting and trimming: emoji sequences, combining marks, zero-width joiners.
#![no_main]

use commentary::domain::{CommentText, MAX_COMMENT_GRAPHEMES};
use libfuzzer_sys::fuzz_target;
use unicode_segmentation::UnicodeSegmentation;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data).to_string();

    if let Ok(text) = CommentText::parse(input) {
        let text = text.as_ref();
        assert!(!text.trim().is_empty());
        assert!(text.graphemes(true).count() <= MAX_COMMENT_GRAPHEMES);
    }
});
