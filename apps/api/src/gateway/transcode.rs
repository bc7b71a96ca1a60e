//! Streaming Transcoder — converts the upstream's incrementally emitted
//! JSON-array stream into the OpenAI-style SSE delta payloads the client
//! consumes.
//!
//! The upstream wire format is an unbounded JSON array: `[` on its own line,
//! one chunk object per line (possibly with a trailing comma), `]` at the
//! end. Transport reads do not align with line boundaries, so bytes are
//! accumulated and only complete lines are parsed; the final partial segment
//! is held back until more bytes arrive. A segment that fails to parse is
//! dropped silently — partial fragments are expected and recoverable.

use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<StreamCandidate>,
}

#[derive(Debug, Deserialize)]
struct StreamCandidate {
    #[serde(default)]
    content: StreamContent,
}

#[derive(Debug, Default, Deserialize)]
struct StreamContent {
    #[serde(default)]
    parts: Vec<StreamPart>,
}

#[derive(Debug, Deserialize)]
struct StreamPart {
    #[serde(default)]
    text: String,
}

/// Line-buffering accumulator over the upstream byte stream.
///
/// The carry holds at most one incomplete trailing segment between reads and
/// is kept as raw bytes so a UTF-8 code point split across reads survives
/// until its line completes. Whatever is left in the carry at end-of-stream
/// cannot be a complete JSON value and is discarded.
#[derive(Debug, Default)]
pub struct StreamTranscoder {
    carry: Vec<u8>,
}

impl StreamTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one upstream read and returns the text fragments completed by
    /// it, in emission order.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.carry.extend_from_slice(chunk);

        let mut fragments = Vec::new();
        while let Some(pos) = self.carry.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.carry.drain(..=pos).collect();
            if let Some(text) = std::str::from_utf8(&line).ok().and_then(parse_segment) {
                fragments.push(text);
            }
        }
        fragments
    }
}

/// Parses one complete line of the upstream array stream. Returns `None`
/// for blank lines, array punctuation, segments that do not form a complete
/// JSON value, and chunks carrying no text.
fn parse_segment(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line == "[" || line == "]" || line == "," {
        return None;
    }

    // Chunk objects inside the array carry a trailing comma.
    let object = line.strip_suffix(',').unwrap_or(line);
    let chunk: StreamChunk = serde_json::from_str(object).ok()?;

    let text: String = chunk
        .candidates
        .into_iter()
        .next()?
        .content
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect();

    (!text.is_empty()).then_some(text)
}

/// Wraps one text fragment as the SSE event payload the client-side stream
/// consumer depends on: `{"choices":[{"delta":{"content": text}}]}`.
pub fn delta_payload(text: &str) -> String {
    json!({ "choices": [{ "delta": { "content": text } }] }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_CHUNK: &str = r#"{"candidates":[{"content":{"parts":[{"text":"Hello"}]}}]}"#;

    fn feed(transcoder: &mut StreamTranscoder, text: &str) -> Vec<String> {
        transcoder.push_chunk(text.as_bytes())
    }

    #[test]
    fn test_fragment_split_across_three_reads_emits_once() {
        let mut transcoder = StreamTranscoder::new();
        let mut fragments = Vec::new();

        fragments.extend(feed(&mut transcoder, "[\n"));
        let (a, rest) = HELLO_CHUNK.split_at(15);
        let (b, c) = rest.split_at(20);
        fragments.extend(feed(&mut transcoder, a));
        fragments.extend(feed(&mut transcoder, b));
        fragments.extend(feed(&mut transcoder, &format!("{c},\n")));
        fragments.extend(feed(&mut transcoder, "]\n"));

        assert_eq!(fragments, ["Hello"]);
    }

    #[test]
    fn test_chunk_boundary_independence() {
        let wire = format!(
            "[\n{},\n{},\n{}\n]\n",
            r#"{"candidates":[{"content":{"parts":[{"text":"One "}]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":"two "}]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":"three"}]}}]}"#,
        );

        // Whole thing in a single read.
        let mut transcoder = StreamTranscoder::new();
        let whole: String = transcoder.push_chunk(wire.as_bytes()).concat();
        assert_eq!(whole, "One two three");

        // One byte at a time.
        let mut transcoder = StreamTranscoder::new();
        let mut bytewise = String::new();
        for byte in wire.as_bytes() {
            bytewise.extend(transcoder.push_chunk(std::slice::from_ref(byte)));
        }
        assert_eq!(bytewise, "One two three");

        // Every split point of the wire into two reads.
        for split in 0..wire.len() {
            let mut transcoder = StreamTranscoder::new();
            let mut out = String::new();
            out.extend(transcoder.push_chunk(&wire.as_bytes()[..split]));
            out.extend(transcoder.push_chunk(&wire.as_bytes()[split..]));
            assert_eq!(out, "One two three", "split at byte {split}");
        }
    }

    #[test]
    fn test_array_punctuation_lines_are_skipped() {
        let mut transcoder = StreamTranscoder::new();
        assert!(feed(&mut transcoder, "[\n").is_empty());
        assert!(feed(&mut transcoder, ",\n").is_empty());
        assert!(feed(&mut transcoder, "]\n").is_empty());
        assert!(feed(&mut transcoder, "\n").is_empty());
    }

    #[test]
    fn test_malformed_segment_is_dropped_stream_continues() {
        let mut transcoder = StreamTranscoder::new();
        let mut fragments = feed(&mut transcoder, "{\"candidates\": garbage}\n");
        fragments.extend(feed(&mut transcoder, &format!("{HELLO_CHUNK}\n")));
        assert_eq!(fragments, ["Hello"]);
    }

    #[test]
    fn test_incomplete_trailing_segment_is_never_emitted() {
        let mut transcoder = StreamTranscoder::new();
        // No newline: the segment stays in the carry and is discarded when
        // the caller drops the transcoder at end-of-stream.
        assert!(feed(&mut transcoder, HELLO_CHUNK).is_empty());
    }

    #[test]
    fn test_empty_text_fragments_are_not_emitted() {
        let mut transcoder = StreamTranscoder::new();
        let fragments = feed(
            &mut transcoder,
            "{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"\"}]}}]}\n",
        );
        assert!(fragments.is_empty());
    }

    #[test]
    fn test_multibyte_char_split_across_reads_survives() {
        let chunk = r#"{"candidates":[{"content":{"parts":[{"text":"héllo"}]}}]}"#;
        let bytes = chunk.as_bytes();
        // Split inside the two-byte 'é' sequence.
        let split = chunk.find('é').unwrap() + 1;

        let mut transcoder = StreamTranscoder::new();
        let mut fragments = transcoder.push_chunk(&bytes[..split]);
        fragments.extend(transcoder.push_chunk(&bytes[split..]));
        fragments.extend(transcoder.push_chunk(b"\n"));
        assert_eq!(fragments, ["héllo"]);
    }

    #[test]
    fn test_multiple_parts_concatenate_in_order() {
        let mut transcoder = StreamTranscoder::new();
        let fragments = feed(
            &mut transcoder,
            "{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"a\"},{\"text\":\"b\"}]}}]}\n",
        );
        assert_eq!(fragments, ["ab"]);
    }

    #[test]
    fn test_delta_payload_shape() {
        assert_eq!(
            delta_payload("Hello"),
            r#"{"choices":[{"delta":{"content":"Hello"}}]}"#
        );
    }
}
