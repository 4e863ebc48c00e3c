//! Request encoding tests

use hostdb::attributes::AttributeId;
use hostdb::constants::{ors, DATABASE_SERVER_ID, MAX_CORRELATION_ID, MIN_MESSAGE_LENGTH};
use hostdb::request::{RequestContext, RequestMessage};
use hostdb::{
    CorrelationIds, Cp037Converter, Error, FetchAttributes, FunctionId, NoAttributes,
    PrepareAttributes, RequestEncoder, RetrieveLobDataAttributes, TextConverter,
};

fn context() -> RequestContext {
    RequestContext {
        rpb_handle: 0,
        base_ors: ors::SEND_REPLY_IMMED | ors::SQLCA,
    }
}

#[test]
fn test_prepare_request_layout() {
    let mut encoder = RequestEncoder::new();
    let attrs = PrepareAttributes::new("STMT0001", "SELECT * FROM QSYS2.SYSTABLES");
    let request = encoder
        .encode(FunctionId::Prepare, &attrs, &context(), &Cp037Converter)
        .unwrap();
    assert_eq!(request.correlation_id, 1);

    let message = RequestMessage::parse(&request.bytes).unwrap();
    assert_eq!(message.header.length as usize, request.bytes.len());
    assert_eq!(message.header.server_id, DATABASE_SERVER_ID);
    assert_eq!(message.header.template_length, 20);
    assert_eq!(message.function().unwrap(), FunctionId::Prepare);
    assert_eq!(message.template.parameter_count, 2);
    assert_eq!(message.template.ors_bitmap, ors::SEND_REPLY_IMMED | ors::SQLCA);

    let name = message
        .parameter(AttributeId::StatementName.codepoint())
        .unwrap();
    assert_eq!(&name.payload[..2], &37u16.to_be_bytes());
    assert_eq!(
        Cp037Converter.decode(37, &name.payload[2..]).unwrap(),
        "STMT0001"
    );

    let params: usize = message.parameters.iter().map(|p| p.payload.len() + 6).sum();
    assert_eq!(request.bytes.len(), MIN_MESSAGE_LENGTH + params);
}

#[test]
fn test_rpb_handle_fills_template() {
    let mut encoder = RequestEncoder::new();
    let ctx = RequestContext {
        rpb_handle: 3,
        ..context()
    };
    let request = encoder
        .encode(FunctionId::Fetch, &FetchAttributes::new("CRSR0001"), &ctx, &Cp037Converter)
        .unwrap();
    let message = RequestMessage::parse(&request.bytes).unwrap();
    assert_eq!(message.template.rpb_handle, 3);
    assert_eq!(message.template.return_ors_handle, 3);
    assert_eq!(message.template.fill_ors_handle, 3);
    assert_ne!(message.template.ors_bitmap & ors::RESULT_DATA, 0);
}

#[test]
fn test_correlation_ids_are_sequential_and_wrap() {
    let mut encoder = RequestEncoder::with_ids(CorrelationIds::starting_at(MAX_CORRELATION_ID - 1));
    let ids: Vec<u32> = (0..3)
        .map(|_| {
            encoder
                .encode(FunctionId::Commit, &NoAttributes, &context(), &Cp037Converter)
                .unwrap()
                .correlation_id
        })
        .collect();
    assert_eq!(ids, vec![MAX_CORRELATION_ID - 1, MAX_CORRELATION_ID, 1]);
}

#[test]
fn test_rejected_attributes_send_nothing() {
    let mut encoder = RequestEncoder::new();
    let attrs = RetrieveLobDataAttributes::default();
    let err = encoder
        .encode(FunctionId::RetrieveLobData, &attrs, &context(), &Cp037Converter)
        .unwrap_err();
    assert!(matches!(err, Error::MissingAttribute { .. }));
    assert!(err.is_application_error());
    assert_eq!(encoder.next_correlation_id(), 1);
}

#[test]
fn test_parse_rejects_trailing_bytes() {
    let mut encoder = RequestEncoder::new();
    let request = encoder
        .encode(FunctionId::Rollback, &NoAttributes, &context(), &Cp037Converter)
        .unwrap();
    let mut bytes = request.bytes.to_vec();
    assert_eq!(bytes.len(), MIN_MESSAGE_LENGTH);
    bytes.push(0);
    assert!(RequestMessage::parse(&bytes).unwrap_err().is_framing());
}
