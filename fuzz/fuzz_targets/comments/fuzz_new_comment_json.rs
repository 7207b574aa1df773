// Run with: cargo fuzz run fuzz_new_comment_json
// Arbitrary add-comment input: text, parent_id string parsing.
#![no_main]

use commentary::domain::{ActorId, NewComment};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use uuid::Uuid;

fuzz_target!(|data: &[u8]| {
    if let Ok(v) = serde_json::from_slice::<Value>(data) {
        let text = v.get("text").and_then(|s| s.as_str()).unwrap_or("").to_string();
        let parent_id = v
            .get("parent_id")
            .and_then(|s| s.as_str())
            .and_then(|s| Uuid::parse_str(s).ok());

        if let Ok(comment) =
            NewComment::new(Uuid::new_v4(), ActorId::from(Uuid::new_v4()), text, parent_id)
        {
            assert_eq!(comment.is_reply(), parent_id.is_some());
        }
    }
});
