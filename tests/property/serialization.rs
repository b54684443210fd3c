//! Property-based tests for the store wire protocol.
//!
//! Uses proptest to verify:
//! 1. Any valid `StoreRequest` survives encode → decode.
//! 2. Any valid `StoreResponse` survives encode → decode.
//! 3. Random bytes never cause a panic in either decoder.
//! 4. Task documents built from any name convert back to the same task.

use proptest::prelude::*;
use tasklist_proto::document::{Document, DocumentFields, DocumentId};
use tasklist_proto::store::{
    StoreOp, StoreOutcome, StoreRequest, StoreResponse, decode_request, decode_response,
    encode_request, encode_response,
};
use tasklist_proto::task::Task;

/// Strategy for generating arbitrary `DocumentId` values.
fn arb_document_id() -> impl Strategy<Value = DocumentId> {
    "[0-9a-f]{1,32}".prop_map(DocumentId::new)
}

/// Strategy for generating arbitrary field maps.
fn arb_fields() -> impl Strategy<Value = DocumentFields> {
    prop::collection::btree_map("[a-z_]{1,12}", ".{0,64}", 0..4)
}

/// Strategy for generating arbitrary collection names.
fn arb_collection() -> impl Strategy<Value = String> {
    "[a-z]{1,16}"
}

/// Strategy for generating arbitrary `StoreOp` values.
fn arb_op() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        arb_collection().prop_map(|collection| StoreOp::ListCollection { collection }),
        (arb_collection(), arb_fields())
            .prop_map(|(collection, fields)| StoreOp::AddDocument { collection, fields }),
        (arb_collection(), arb_document_id(), arb_fields()).prop_map(
            |(collection, id, fields)| StoreOp::UpdateDocument {
                collection,
                id,
                fields
            }
        ),
        (arb_collection(), arb_document_id())
            .prop_map(|(collection, id)| StoreOp::DeleteDocument { collection, id }),
    ]
}

/// Strategy for generating arbitrary `StoreOutcome` values.
fn arb_outcome() -> impl Strategy<Value = StoreOutcome> {
    prop_oneof![
        prop::collection::vec(
            (arb_document_id(), arb_fields()).prop_map(|(id, f)| Document::new(id, f)),
            0..8
        )
        .prop_map(StoreOutcome::Documents),
        arb_document_id().prop_map(StoreOutcome::Added),
        Just(StoreOutcome::Done),
        ".*".prop_map(StoreOutcome::Error),
    ]
}

proptest! {
    #[test]
    fn request_round_trip(request_id in 1u64.., op in arb_op()) {
        let request = StoreRequest { request_id, op };
        let bytes = encode_request(&request).unwrap();
        prop_assert_eq!(decode_request(&bytes).unwrap(), request);
    }

    #[test]
    fn response_round_trip(request_id in any::<u64>(), outcome in arb_outcome()) {
        let response = StoreResponse { request_id, outcome };
        let bytes = encode_response(&response).unwrap();
        prop_assert_eq!(decode_response(&bytes).unwrap(), response);
    }

    #[test]
    fn random_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode_request(&bytes);
        let _ = decode_response(&bytes);
    }

    #[test]
    fn task_document_conversion(id in arb_document_id(), name in ".{1,128}") {
        let doc = Document::new(id.clone(), Task::fields(&name));
        let task = Task::from_document(doc).unwrap();
        prop_assert_eq!(task, Task::new(id, name));
    }
}
