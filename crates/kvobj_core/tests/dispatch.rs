//! End-to-end dispatch and decode against a scripted engine.

use kvobj_core::{
    process_resp_array_output, process_resp_array_output_as_pairs,
    process_resp_single_token_output, CoreError, ObjectStatus, SessionConfig, StorageSession,
};
use kvobj_resp::{encode_array, encode_error, encode_scan_reply};
use kvobj_storage::{ArgSlice, EngineStatus, MemoryPool, RecordFlags};
use kvobj_testkit::prelude::*;
use proptest::prelude::*;

fn session() -> StorageSession<ScriptedResolver> {
    StorageSession::new(SessionConfig::default(), ScriptedResolver::new()).unwrap()
}

fn owned_elements(output: kvobj_core::ArrayOutput<'_>) -> Option<Vec<Option<Vec<u8>>>> {
    output
        .elements
        .map(|slots| slots.into_iter().map(|s| s.map(<[u8]>::to_vec)).collect())
}

#[test]
fn rmw_creates_absent_key() {
    let reply = ScriptedReply::new(EngineStatus::created()).with_header(1);
    let mut ctx = ScriptedContext::new().reply(reply);
    let (status, header) = session()
        .rmw_object_store_operation(b"myset", ArgSlice::new(b"SADD member"), &mut ctx)
        .unwrap();

    assert_eq!(status, ObjectStatus::Ok);
    assert_eq!(header.result, 1);
    assert_eq!(ctx.calls().len(), 1);
    assert_eq!(ctx.calls()[0].key, b"myset");
}

#[test]
fn rmw_on_wrong_type_reports_wrong_type() {
    let mut ctx = ScriptedContext::new().reply(ScriptedReply::wrong_type());
    let (status, _) = session()
        .rmw_object_store_operation(b"a-string", ArgSlice::default(), &mut ctx)
        .unwrap();
    assert_eq!(status, ObjectStatus::WrongType);
}

#[test]
fn scan_returns_cursor_and_members() {
    let frame = encode_scan_reply(b"12", &["a", "b", "c"]);
    let mut ctx = ScriptedContext::new()
        .reply(ScriptedReply::new(EngineStatus::found()).with_bytes(frame));
    let mut session = session();
    let mut footer = session.footer_buffer();
    let mut output = footer.output();

    let status = session
        .object_scan(b"myset", ArgSlice::new(b"0"), &mut ctx, &mut output)
        .unwrap();
    assert_eq!(status, ObjectStatus::Ok);
    assert_eq!(ctx.calls()[0].input, b"0");

    let elements = process_resp_array_output(output, true, owned_elements);
    let expected: Vec<Option<Vec<u8>>> = ["12", "a", "b", "c"]
        .iter()
        .map(|s| Some(s.as_bytes().to_vec()))
        .collect();
    assert_eq!(elements, Some(expected));
}

#[test]
fn members_spill_and_release_once() {
    let pool = MemoryPool::new();
    let members: Vec<String> = (0..32).map(|i| format!("member-{i:04}")).collect();
    let reply = ScriptedReply::new(EngineStatus::found())
        .with_bytes(encode_array(&members));
    let mut ctx = ScriptedContext::new().with_pool(pool.clone()).reply(reply);
    let mut session = StorageSession::new(
        SessionConfig::new().footer_capacity(64),
        ScriptedResolver::new(),
    )
    .unwrap();
    let mut footer = session.footer_buffer();
    let mut output = footer.output();

    let status = session
        .read_object_store_operation_with_output(
            b"myset",
            ArgSlice::default(),
            &mut ctx,
            &mut output,
        )
        .unwrap();
    assert_eq!(status, ObjectStatus::Ok);
    assert!(!output.is_inline());

    let count = process_resp_array_output(output, false, |decoded| decoded.len());
    assert_eq!(count, members.len());
    assert_eq!(pool.stats().rented, 1);
    assert_eq!(pool.stats().returned, 1);
}

#[test]
fn hash_fields_decode_as_pairs() {
    let mut ctx = ScriptedContext::new().reply(
        ScriptedReply::new(EngineStatus::found())
            .with_bytes(encode_array(&["name", "kv", "kind", "hash"])),
    );
    let mut session = session();
    let mut footer = session.footer_buffer();
    let mut output = footer.output();

    session
        .read_object_store_operation_with_output(b"h", ArgSlice::default(), &mut ctx, &mut output)
        .unwrap();
    let fields = process_resp_array_output_as_pairs(output, |decoded| {
        decoded
            .pairs
            .unwrap_or_default()
            .into_iter()
            .map(|(f, _)| String::from_utf8_lossy(f).into_owned())
            .collect::<Vec<_>>()
    });
    assert_eq!(fields, ["name", "kind"]);
}

#[test]
fn single_token_reply_decodes() {
    let mut ctx = ScriptedContext::new().reply(
        ScriptedReply::new(EngineStatus::found().with_record(RecordFlags {
            in_place_updated: true,
            ..RecordFlags::NONE
        }))
        .with_bytes(b"$5\r\nvalue\r\n".to_vec()),
    );
    let mut session = session();
    let mut footer = session.footer_buffer();
    let mut output = footer.output();

    let status = session
        .rmw_object_store_operation_with_output(b"k", ArgSlice::default(), &mut ctx, &mut output)
        .unwrap();
    assert_eq!(status, ObjectStatus::Ok);
    let token = process_resp_single_token_output(output, |token| token.map(<[u8]>::to_vec));
    assert_eq!(token, Some(b"value".to_vec()));
}

#[test]
fn error_frame_reaches_caller() {
    let reply = ScriptedReply::new(EngineStatus::found())
        .with_bytes(encode_error("bad type"));
    let mut ctx = ScriptedContext::new().reply(reply);
    let mut session = session();
    let mut footer = session.footer_buffer();
    let mut output = footer.output();

    session
        .rmw_object_store_operation_with_output(b"k", ArgSlice::default(), &mut ctx, &mut output)
        .unwrap();
    let error = process_resp_array_output(output, false, |decoded| {
        assert!(decoded.elements.is_none());
        decoded.error
    });
    assert_eq!(error.as_deref(), Some("bad type"));
}

#[test]
fn pending_scan_resolves_before_translation() {
    let mut ctx = ScriptedContext::new().reply(
        ScriptedReply::new(EngineStatus::found())
            .with_bytes(encode_scan_reply(b"0", &["x"]))
            .deferred(),
    );
    let mut session = session();
    let mut footer = session.footer_buffer();
    let mut output = footer.output();

    let status = session
        .object_scan(b"k", ArgSlice::new(b"0"), &mut ctx, &mut output)
        .unwrap();
    assert_eq!(status, ObjectStatus::Ok);
    assert_eq!(session.resolver().completions(), 1);
    assert_eq!(process_resp_array_output(output, true, |d| d.len()), 2);
}

#[test]
fn disabled_store_is_fatal_and_untouched() {
    let mut ctx = ScriptedContext::without_session()
        .reply(ScriptedReply::new(EngineStatus::created()).with_header(1));
    let mut session = session();

    let err = session
        .rmw_object_store_operation(b"k", ArgSlice::default(), &mut ctx)
        .unwrap_err();
    assert_eq!(err, CoreError::ObjectStoreDisabled);
    assert!(err.is_fatal());
    assert!(ctx.calls().is_empty());
    assert_eq!(session.resolver().completions(), 0);
}

proptest! {
    #[test]
    fn read_header_never_ok_with_mutation_flags(
        record in record_flags_strategy(),
        result in any::<i32>(),
    ) {
        prop_assume!(record.any());
        let reply = ScriptedReply::new(EngineStatus::found().with_record(record))
            .with_header(result);
        let mut ctx = ScriptedContext::new().reply(reply);
        let (status, header) = session()
            .read_object_store_operation(b"k", ArgSlice::default(), &mut ctx)
            .unwrap();
        prop_assert_eq!(status, ObjectStatus::NotFound);
        prop_assert_eq!(header.result, result);
    }

    #[test]
    fn footer_reads_round_trip(case in array_frame_strategy(16), capacity in 1usize..128) {
        let (tokens, frame) = case;
        let pool = MemoryPool::new();
        let mut ctx = ScriptedContext::new()
            .with_pool(pool.clone())
            .reply(ScriptedReply::new(EngineStatus::found()).with_bytes(frame));
        let mut session = StorageSession::new(
            SessionConfig::new().footer_capacity(capacity),
            ScriptedResolver::new(),
        )
        .unwrap();
        let mut footer = session.footer_buffer();
        let mut output = footer.output();

        let status = session
            .read_object_store_operation_with_output(
                b"k",
                ArgSlice::default(),
                &mut ctx,
                &mut output,
            )
            .unwrap();
        prop_assert_eq!(status, ObjectStatus::Ok);

        let elements = process_resp_array_output(output, false, owned_elements);
        let expected: Vec<_> = tokens.into_iter().map(Some).collect();
        prop_assert_eq!(elements, Some(expected));
        prop_assert_eq!(pool.stats().outstanding(), 0);
    }
}
