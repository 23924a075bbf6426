//! Decoding of serialized object output.
//!
//! Every entry point takes the capsule by value, hands borrowed results to
//! `consume` and releases the capsule once `consume` returns. A rented block
//! goes back to its pool on every path, unwinding included, because the
//! capsule is dropped with the frame.
//!
//! Frames are produced by our own callbacks, so malformed input is not
//! reported as an error. Array decoding leaves a bad token's slot empty and
//! keeps going; pair and single-token decoding give up on the whole frame.

use crate::config::SessionConfig;
use kvobj_resp::{RespReader, ARRAY_SENTINEL, ERROR_SENTINEL};
use kvobj_storage::ObjectOutput;
use tracing::debug;

/// Decoded array reply.
///
/// At most one of `elements` and `error` is set. Both are `None` when the
/// frame could not be decoded at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArrayOutput<'a> {
    /// Tokens in order. A null or malformed token leaves its slot `None`.
    /// In scan mode slot 0 holds the cursor.
    pub elements: Option<Vec<Option<&'a [u8]>>>,
    /// Message of an error frame.
    pub error: Option<String>,
}

impl<'a> ArrayOutput<'a> {
    /// Returns true if the frame was an error frame.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Number of slots; zero when nothing was decoded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.as_ref().map_or(0, Vec::len)
    }

    /// Returns true if no slots were decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The token in slot `index`, if set.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a [u8]> {
        self.elements.as_ref()?.get(index).copied().flatten()
    }
}

/// Decoded field/value reply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PairOutput<'a> {
    /// Pairs in order; `None` when any token failed to decode.
    pub pairs: Option<Vec<(&'a [u8], &'a [u8])>>,
    /// Message of an error frame.
    pub error: Option<String>,
}

impl PairOutput<'_> {
    /// Returns true if the frame was an error frame.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Number of decoded pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.as_ref().map_or(0, Vec::len)
    }

    /// Returns true if no pairs were decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decodes an array reply (or an error frame, or a lone token).
///
/// With `is_scan` the frame is `[cursor, [items...]]` and the cursor lands
/// in slot 0 ahead of the items.
pub fn process_resp_array_output<R>(
    output: ObjectOutput<'_>,
    is_scan: bool,
    consume: impl FnOnce(ArrayOutput<'_>) -> R,
) -> R {
    let result = consume(decode_array(output.as_bytes(), is_scan));
    output.release();
    result
}

/// Decodes an array reply of alternating fields and values.
///
/// # Panics
///
/// Debug builds panic when the array holds an odd number of tokens.
pub fn process_resp_array_output_as_pairs<R>(
    output: ObjectOutput<'_>,
    consume: impl FnOnce(PairOutput<'_>) -> R,
) -> R {
    let result = consume(decode_pairs(output.as_bytes()));
    output.release();
    result
}

/// Decodes a reply holding exactly one length-prefixed token.
pub fn process_resp_single_token_output<R>(
    output: ObjectOutput<'_>,
    consume: impl FnOnce(Option<&[u8]>) -> R,
) -> R {
    let token = read_token(&mut RespReader::new(output.as_bytes()));
    let result = consume(token);
    output.release();
    result
}

fn decode_array(bytes: &[u8], is_scan: bool) -> ArrayOutput<'_> {
    let mut reader = RespReader::new(bytes);
    match reader.peek() {
        Some(ERROR_SENTINEL) => ArrayOutput {
            elements: None,
            error: read_error_message(&mut reader),
        },
        Some(ARRAY_SENTINEL) => ArrayOutput {
            elements: read_elements(&mut reader, is_scan),
            error: None,
        },
        _ => ArrayOutput {
            elements: read_token(&mut reader).map(|token| vec![Some(token)]),
            error: None,
        },
    }
}

fn decode_pairs(bytes: &[u8]) -> PairOutput<'_> {
    let mut reader = RespReader::new(bytes);
    match reader.peek() {
        Some(ERROR_SENTINEL) => PairOutput {
            pairs: None,
            error: read_error_message(&mut reader),
        },
        Some(ARRAY_SENTINEL) => PairOutput {
            pairs: read_pairs(&mut reader),
            error: None,
        },
        other => {
            debug!(leading = ?other, "pair output is not an array");
            PairOutput::default()
        }
    }
}

fn read_elements<'a>(reader: &mut RespReader<'a>, is_scan: bool) -> Option<Vec<Option<&'a [u8]>>> {
    let mut slots = Vec::new();
    if is_scan {
        read_array_length(reader)?;
        slots.push(Some(read_token(reader)?));
    }

    let count = read_array_length(reader)?;
    let expected = slots.len() + count;
    slots.reserve(count.min(reader.remaining().len()));

    for index in 0..count {
        match reader.read_nullable_bulk() {
            Ok(token) => slots.push(token),
            Err(err) => {
                debug!(index, %err, "malformed token in array output");
                slots.push(None);
                if !reader.skip_line() {
                    slots.resize(expected, None);
                    break;
                }
            }
        }
    }
    Some(slots)
}

fn read_pairs<'a>(reader: &mut RespReader<'a>) -> Option<Vec<(&'a [u8], &'a [u8])>> {
    let count = read_array_length(reader)?;
    debug_assert!(
        count % 2 == 0,
        "pair output must hold an even number of tokens, got {count}"
    );

    let mut pairs = Vec::with_capacity((count / 2).min(reader.remaining().len()));
    for _ in 0..count / 2 {
        let field = read_token(reader)?;
        let value = read_token(reader)?;
        pairs.push((field, value));
    }
    Some(pairs)
}

fn read_array_length(reader: &mut RespReader<'_>) -> Option<usize> {
    reader
        .read_unsigned_array_length()
        .inspect_err(|err| debug!(%err, "malformed array header"))
        .ok()
}

fn read_token<'a>(reader: &mut RespReader<'a>) -> Option<&'a [u8]> {
    reader
        .read_bulk()
        .inspect_err(|err| debug!(%err, "malformed token"))
        .ok()
}

fn read_error_message(reader: &mut RespReader<'_>) -> Option<String> {
    reader
        .read_error()
        .inspect_err(|err| debug!(%err, "unterminated error frame"))
        .ok()
        .map(|message| String::from_utf8_lossy(message).into_owned())
}

/// Reusable inline storage for footer capsules.
#[derive(Debug, Clone)]
pub struct FooterBuffer {
    buf: Vec<u8>,
}

impl FooterBuffer {
    /// A buffer sized by `config.footer_capacity`.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_capacity(config.footer_capacity)
    }

    /// A buffer of `bytes` bytes.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: vec![0; bytes],
        }
    }

    /// Inline capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// A fresh, empty footer capsule over this buffer.
    pub fn output(&mut self) -> ObjectOutput<'_> {
        ObjectOutput::inline(&mut self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvobj_resp::{encode_array, encode_error, encode_scan_reply, RespWriter};
    use kvobj_storage::MemoryPool;
    use kvobj_testkit::generators::{
        array_frame_strategy, malformed_frame_strategy, pair_list_strategy,
    };
    use proptest::prelude::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn owned(output: ArrayOutput<'_>) -> (Option<Vec<Option<Vec<u8>>>>, Option<String>) {
        let elements = output
            .elements
            .map(|slots| slots.into_iter().map(|s| s.map(<[u8]>::to_vec)).collect());
        (elements, output.error)
    }

    fn decode_inline(
        frame: &[u8],
        is_scan: bool,
    ) -> (Option<Vec<Option<Vec<u8>>>>, Option<String>) {
        let pool = MemoryPool::new();
        let mut buf = vec![0u8; frame.len()];
        let mut output = ObjectOutput::inline(&mut buf);
        output.write(&pool, frame);
        process_resp_array_output(output, is_scan, owned)
    }

    fn some(bytes: &[u8]) -> Option<Vec<u8>> {
        Some(bytes.to_vec())
    }

    #[test]
    fn array_reply_round_trips() {
        let (elements, error) = decode_inline(&encode_array(&["a", "b"]), false);
        assert_eq!(elements, Some(vec![some(b"a"), some(b"b")]));
        assert_eq!(error, None);
    }

    #[test]
    fn scan_reply_puts_cursor_first() {
        let (elements, _) = decode_inline(&encode_scan_reply(b"17", &["x", "y"]), true);
        assert_eq!(elements, Some(vec![some(b"17"), some(b"x"), some(b"y")]));
    }

    #[test]
    fn scan_with_bad_cursor_fails() {
        let mut writer = RespWriter::new();
        writer.write_array_length(2);
        writer.write_integer(17);
        writer.write_array(&["x"]);
        let (elements, error) = decode_inline(writer.as_bytes(), true);
        assert_eq!(elements, None);
        assert_eq!(error, None);
    }

    #[test]
    fn error_frame_carries_message() {
        let (elements, error) = decode_inline(&encode_error("bad type"), false);
        assert_eq!(elements, None);
        assert_eq!(error.as_deref(), Some("bad type"));
    }

    #[test]
    fn unterminated_error_frame_yields_nothing() {
        let (elements, error) = decode_inline(b"-bad type", false);
        assert_eq!(elements, None);
        assert_eq!(error, None);
    }

    #[test]
    fn malformed_token_leaves_empty_slot() {
        let mut writer = RespWriter::new();
        writer.write_array_length(3);
        writer.write_bulk(b"a");
        writer.write_integer(5);
        writer.write_bulk(b"c");
        let (elements, _) = decode_inline(writer.as_bytes(), false);
        assert_eq!(elements, Some(vec![some(b"a"), None, some(b"c")]));
    }

    #[test]
    fn null_token_leaves_empty_slot() {
        let mut writer = RespWriter::new();
        writer.write_array_length(2);
        writer.write_null_bulk();
        writer.write_bulk(b"v");
        let (elements, _) = decode_inline(writer.as_bytes(), false);
        assert_eq!(elements, Some(vec![None, some(b"v")]));
    }

    #[test]
    fn truncated_array_pads_missing_slots() {
        let (elements, _) = decode_inline(b"*3\r\n$1\r\na\r\n", false);
        assert_eq!(elements, Some(vec![some(b"a"), None, None]));
    }

    #[test]
    fn lone_token_becomes_single_element() {
        let (elements, _) = decode_inline(b"$3\r\nabc\r\n", false);
        assert_eq!(elements, Some(vec![some(b"abc")]));
    }

    #[test]
    fn empty_output_fails_soft() {
        let (elements, error) = decode_inline(b"", false);
        assert_eq!(elements, None);
        assert_eq!(error, None);
    }

    #[test]
    fn accessors_report_slots() {
        let frame = encode_array(&["a", "b"]);
        let pool = MemoryPool::new();
        let mut output = ObjectOutput::rented(pool.rent(frame.len()));
        output.write(&pool, &frame);
        process_resp_array_output(output, false, |decoded| {
            assert_eq!(decoded.len(), 2);
            assert!(!decoded.is_error());
            assert_eq!(decoded.get(1), Some(&b"b"[..]));
            assert_eq!(decoded.get(2), None);
        });
    }

    #[test]
    fn pairs_decode_in_order() {
        let pool = MemoryPool::new();
        let mut buf = [0u8; 64];
        let mut output = ObjectOutput::inline(&mut buf);
        output.write(&pool, &encode_array(&["f1", "v1", "f2", "v2"]));
        let pairs = process_resp_array_output_as_pairs(output, |decoded| {
            decoded.pairs.map(|pairs| {
                pairs
                    .into_iter()
                    .map(|(f, v)| (f.to_vec(), v.to_vec()))
                    .collect::<Vec<_>>()
            })
        });
        assert_eq!(
            pairs,
            Some(vec![
                (b"f1".to_vec(), b"v1".to_vec()),
                (b"f2".to_vec(), b"v2".to_vec()),
            ])
        );
    }

    #[test]
    fn pairs_abort_on_malformed_token() {
        let mut writer = RespWriter::new();
        writer.write_array_length(2);
        writer.write_bulk(b"f");
        writer.write_integer(1);
        let pool = MemoryPool::new();
        let mut buf = [0u8; 64];
        let mut output = ObjectOutput::inline(&mut buf);
        output.write(&pool, writer.as_bytes());
        process_resp_array_output_as_pairs(output, |decoded| {
            assert_eq!(decoded.pairs, None);
            assert_eq!(decoded.error, None);
        });
    }

    #[test]
    fn pairs_reject_non_array_frame() {
        let pool = MemoryPool::new();
        let mut buf = [0u8; 16];
        let mut output = ObjectOutput::inline(&mut buf);
        output.write(&pool, b"$1\r\na\r\n");
        process_resp_array_output_as_pairs(output, |decoded| {
            assert_eq!(decoded, PairOutput::default());
        });
    }

    #[test]
    fn pairs_carry_error_frame() {
        let pool = MemoryPool::new();
        let mut buf = [0u8; 32];
        let mut output = ObjectOutput::inline(&mut buf);
        output.write(&pool, &encode_error("bad type"));
        process_resp_array_output_as_pairs(output, |decoded| {
            assert!(decoded.is_error());
            assert_eq!(decoded.error.as_deref(), Some("bad type"));
            assert!(decoded.is_empty());
        });
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "even number")]
    fn odd_pair_count_asserts() {
        let pool = MemoryPool::new();
        let mut buf = [0u8; 64];
        let mut output = ObjectOutput::inline(&mut buf);
        output.write(&pool, &encode_array(&["a", "b", "c"]));
        process_resp_array_output_as_pairs(output, |_| ());
    }

    #[test]
    fn single_token_decodes() {
        let pool = MemoryPool::new();
        let mut buf = [0u8; 16];
        let mut output = ObjectOutput::inline(&mut buf);
        output.write(&pool, b"$2\r\nhi\r\n");
        let token = process_resp_single_token_output(output, |token| token.map(<[u8]>::to_vec));
        assert_eq!(token, Some(b"hi".to_vec()));
    }

    #[test]
    fn single_token_rejects_other_frames() {
        for frame in [&b"*1\r\n$1\r\na\r\n"[..], b"$-1\r\n", b":3\r\n", b""] {
            let pool = MemoryPool::new();
            let mut buf = [0u8; 16];
            let mut output = ObjectOutput::inline(&mut buf);
            output.write(&pool, frame);
            let rejected = process_resp_single_token_output(output, |token| token.is_none());
            assert!(rejected);
        }
    }

    #[test]
    fn rented_output_is_released_once() {
        let pool = MemoryPool::new();
        let mut buf = [0u8; 2];
        let mut output = ObjectOutput::inline(&mut buf);
        output.write(&pool, &encode_array(&["spills", "past", "inline"]));
        assert!(!output.is_inline());

        let count = process_resp_array_output(output, false, |decoded| decoded.len());
        assert_eq!(count, 3);
        let stats = pool.stats();
        assert_eq!(stats.rented, 1);
        assert_eq!(stats.returned, 1);
        assert_eq!(stats.outstanding(), 0);
    }

    #[test]
    fn rented_output_is_released_on_error_frame() {
        let pool = MemoryPool::new();
        let mut output = ObjectOutput::rented(pool.rent(16));
        output.write(&pool, &encode_error("bad type"));
        process_resp_array_output(output, false, |decoded| assert!(decoded.is_error()));
        assert_eq!(pool.stats().returned, 1);
        assert_eq!(pool.stats().outstanding(), 0);
    }

    #[test]
    fn rented_output_is_released_when_consumer_panics() {
        let pool = MemoryPool::new();
        let mut output = ObjectOutput::rented(pool.rent(16));
        output.write(&pool, b"$1\r\na\r\n");
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            process_resp_single_token_output(output, |token| {
                assert!(token.is_none(), "consumer failed");
            })
        }));
        assert!(outcome.is_err());
        assert_eq!(pool.stats().returned, 1);
        assert_eq!(pool.stats().outstanding(), 0);
    }

    #[test]
    fn overflowing_length_header_fails_soft() {
        const HUGE: &[u8] = b"$18446744073709551591\r\n";

        let (elements, error) = decode_inline(HUGE, false);
        assert_eq!(elements, None);
        assert_eq!(error, None);

        let mut frame = b"*2\r\n".to_vec();
        frame.extend_from_slice(HUGE);
        frame.extend_from_slice(b"$1\r\na\r\n");
        let (elements, _) = decode_inline(&frame, false);
        assert_eq!(elements, Some(vec![None, some(b"a")]));

        let pool = MemoryPool::new();
        let mut footer = FooterBuffer::with_capacity(frame.len());
        let mut output = footer.output();
        output.write(&pool, &frame);
        process_resp_array_output_as_pairs(output, |decoded| assert_eq!(decoded.pairs, None));

        let mut output = footer.output();
        output.write(&pool, HUGE);
        let rejected = process_resp_single_token_output(output, |token| token.is_none());
        assert!(rejected);
    }

    #[test]
    fn footer_buffer_follows_config() {
        let mut footer = FooterBuffer::new(&SessionConfig::new().footer_capacity(32));
        assert_eq!(footer.capacity(), 32);
        let output = footer.output();
        assert!(output.is_inline());
        assert!(output.is_empty());
        assert_eq!(output.capacity(), 32);
    }

    proptest! {
        #[test]
        fn malformed_frames_fail_soft(frame in malformed_frame_strategy(), spill in any::<bool>()) {
            let pool = MemoryPool::new();
            let odd_pairs = RespReader::new(&frame)
                .read_unsigned_array_length()
                .is_ok_and(|count| count % 2 == 1);
            let capacity = if spill { 1 } else { frame.len().max(1) };
            let mut footer = FooterBuffer::with_capacity(capacity);

            for round in 0..4 {
                let mut output = footer.output();
                output.write(&pool, &frame);
                match round {
                    0 => process_resp_array_output(output, false, |decoded| decoded.len()),
                    1 => process_resp_array_output(output, true, |decoded| decoded.len()),
                    2 if odd_pairs => {
                        output.release();
                        0
                    }
                    2 => process_resp_array_output_as_pairs(output, |decoded| decoded.len()),
                    _ => process_resp_single_token_output(output, |token| {
                        token.map_or(0, <[u8]>::len)
                    }),
                };
            }
            prop_assert_eq!(pool.stats().outstanding(), 0);
        }

        #[test]
        fn array_tokens_decode_in_order(case in array_frame_strategy(12), spill in any::<bool>()) {
            let (tokens, frame) = case;
            let pool = MemoryPool::new();
            let mut footer = FooterBuffer::with_capacity(if spill { 1 } else { frame.len() });
            let mut output = footer.output();
            output.write(&pool, &frame);

            let (elements, error) = process_resp_array_output(output, false, owned);
            let expected: Vec<_> = tokens.into_iter().map(Some).collect();
            prop_assert_eq!(elements, Some(expected));
            prop_assert_eq!(error, None);
            prop_assert_eq!(pool.stats().outstanding(), 0);
        }

        #[test]
        fn pair_tokens_decode_in_order(pairs in pair_list_strategy(8)) {
            let flat: Vec<&[u8]> = pairs
                .iter()
                .flat_map(|(f, v)| [f.as_slice(), v.as_slice()])
                .collect();
            let frame = encode_array(&flat);
            let pool = MemoryPool::new();
            let mut footer = FooterBuffer::with_capacity(frame.len());
            let mut output = footer.output();
            output.write(&pool, &frame);

            let decoded = process_resp_array_output_as_pairs(output, |decoded| {
                decoded.pairs.map(|p| {
                    p.into_iter().map(|(f, v)| (f.to_vec(), v.to_vec())).collect::<Vec<_>>()
                })
            });
            prop_assert_eq!(decoded, Some(pairs));
        }
    }
}
