// Run with: cargo fuzz run fuzz_comment_record_json
// Rows as PostgREST returns them: nullable pin flags, odd timestamps, bad uuids.
#![no_main]

use commentary::domain::{Comment, CommentRecord};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(record) = serde_json::from_slice::<CommentRecord>(data) {
        let comment = Comment::from(record);
        let _ = serde_json::to_vec(&CommentRecord::from(&comment));
    }
});
