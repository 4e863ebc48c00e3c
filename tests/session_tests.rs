//! Session tests against scripted servers

mod common;

use bytes::Bytes;
use common::{data_format, result_data, sqlca, Field, MockTransport, ReplyBuilder};
use hostdb::constants::{codepoint, ors};
use hostdb::{
    CloseCursorAttributes, Config, Error, ExecuteImmediateAttributes, FetchAttributes,
    FetchStatus, FormatCollector, FunctionId, LobCollector, OpenAndDescribeAttributes,
    PrepareAttributes, RetrieveLobDataAttributes, RowCollector, Session, SessionState,
    SqlcaCollector, StreamTransport, Transport,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

fn format() -> Vec<u8> {
    data_format(
        &[Field {
            sql_type: 496,
            length: 4,
            name: "ID",
        }],
        0,
        0,
    )
}

fn row(id: u32) -> [u8; 4] {
    id.to_be_bytes()
}

#[tokio::test]
async fn test_query_lifecycle() {
    let transport = MockTransport::remote();
    let mut session = Session::new(transport.clone(), Config::new("host"));

    let (r1, r2) = (row(1), row(2));
    transport.push(ReplyBuilder::new(1).param(codepoint::SUPER_EXTENDED_DATA_FORMAT, &format()).build());
    transport.push(
        ReplyBuilder::new(2)
            .param(codepoint::SUPER_EXTENDED_DATA_FORMAT, &format())
            .param(codepoint::EXTENDED_RESULT_DATA, &result_data(&[&r1[..]]))
            .compress()
            .build(),
    );
    transport.push(
        ReplyBuilder::new(3)
            .rc(2, 700)
            .param(codepoint::EXTENDED_RESULT_DATA, &result_data(&[&r2[..]]))
            .build(),
    );
    transport.push(ReplyBuilder::new(4).build());
    transport.push(ReplyBuilder::new(5).build());

    let mut formats = FormatCollector::default();
    session
        .prepare_and_describe(
            &PrepareAttributes::new("STMT0001", "SELECT ID FROM T1"),
            &mut formats,
            None,
        )
        .await
        .unwrap();
    assert_eq!(formats.data_format.as_ref().unwrap().fields.len(), 1);

    let mut rows = RowCollector::default();
    let status = session
        .open_describe_fetch(
            &OpenAndDescribeAttributes::new("STMT0001", "CRSR0001"),
            &mut formats,
            &mut rows,
        )
        .await
        .unwrap();
    assert_eq!(status, FetchStatus::Rows(1));

    let status = session
        .fetch(&FetchAttributes::new("CRSR0001"), &mut rows)
        .await
        .unwrap();
    assert!(status.is_end_of_data());
    assert_eq!(rows.rows, vec![r1.to_vec(), r2.to_vec()]);

    session
        .close_cursor(&CloseCursorAttributes::new("CRSR0001"))
        .await
        .unwrap();
    session.commit().await.unwrap();

    let functions: Vec<FunctionId> = transport
        .sent()
        .iter()
        .map(|m| m.function().unwrap())
        .collect();
    assert_eq!(
        functions,
        vec![
            FunctionId::PrepareAndDescribe,
            FunctionId::OpenDescribeFetch,
            FunctionId::Fetch,
            FunctionId::CloseCursor,
            FunctionId::Commit,
        ]
    );
    let sent = transport.sent();
    assert!(sent.iter().all(|m| m.template.ors_bitmap & ors::REPLY_RLE_COMPRESSED != 0));
    assert_eq!(
        sent.iter().map(|m| m.header.correlation_id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_local_session_does_not_ask_for_compression() {
    let transport = MockTransport::local();
    let mut session = Session::new(transport.clone(), Config::new("localhost"));
    assert!(!session.compression_enabled());
    transport.push(ReplyBuilder::new(1).build());
    session.rollback().await.unwrap();
    assert_eq!(
        transport.sent()[0].template.ors_bitmap & ors::REPLY_RLE_COMPRESSED,
        0
    );
}

#[tokio::test]
async fn test_server_error_then_recovery() {
    let transport = MockTransport::remote();
    let mut session = Session::new(transport.clone(), Config::new("host"));
    session.set_sqlca_callback(Some(Box::new(SqlcaCollector::default())));

    transport.push(
        ReplyBuilder::new(1)
            .rc(2, -204)
            .text(codepoint::MESSAGE_ID, "SQL0204")
            .param(codepoint::SQLCA, &sqlca(-204, "42704", 0))
            .build(),
    );
    transport.push(
        ReplyBuilder::new(2)
            .param(codepoint::SQLCA, &sqlca(0, "00000", 2))
            .build(),
    );

    let err = session
        .execute_immediate(&ExecuteImmediateAttributes::new("DELETE FROM NOPE"))
        .await
        .unwrap_err();
    assert_eq!(err.server_error().unwrap().sqlstate(), Some("42704"));
    assert!(!session.is_broken());

    let reply = session
        .execute_immediate(&ExecuteImmediateAttributes::new("DELETE FROM T1"))
        .await
        .unwrap();
    assert_eq!(reply.update_count(), Some(2));
    assert_eq!(reply.sqlca.unwrap().sqlstate, "00000");
    assert_ne!(transport.sent()[1].template.ors_bitmap & ors::SQLCA, 0);
}

#[tokio::test]
async fn test_malformed_reply_breaks_session() {
    let transport = MockTransport::remote();
    let mut session = Session::new(transport.clone(), Config::new("host"));

    let mut block = 8u32.to_be_bytes().to_vec();
    block.extend([0x1B, 0x41, 0x42, 0x00, 0x00]);
    let mut builder = ReplyBuilder::new(1).param(codepoint::RLE_COMPRESSED_DATA, &block);
    builder.compressed = true;
    transport.push(builder.build());

    let err = session.commit().await.unwrap_err();
    assert!(matches!(err, Error::MalformedRun(_)));
    assert!(session.is_broken());

    transport.push(ReplyBuilder::new(2).build());
    assert!(matches!(
        session.commit().await,
        Err(Error::ConnectionClosed)
    ));
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn test_lob_retrieval() {
    let transport = MockTransport::remote();
    let mut session =
        Session::new(transport.clone(), Config::new("host").lob_segment_size(3));

    let mut payload = 37u16.to_be_bytes().to_vec();
    payload.extend(7u32.to_be_bytes());
    payload.extend(b"ABCDEFG");
    transport.push(
        ReplyBuilder::new(1)
            .param(codepoint::CURRENT_LOB_LENGTH, &7u64.to_be_bytes())
            .param(codepoint::LOB_DATA, &payload)
            .build(),
    );

    let mut lob = LobCollector::default();
    let length = session
        .retrieve_lob_data(&RetrieveLobDataAttributes::new(0x100, 0, 7), &mut lob)
        .await
        .unwrap();
    assert_eq!(length, Some(7));
    assert_eq!(lob.data, b"ABCDEFG");
    assert_eq!(lob.segments, 3);
}

/// Answer every request with a clean reply echoing its correlation id
async fn echo_server(mut stream: DuplexStream, replies: usize) {
    for _ in 0..replies {
        let mut prefix = [0u8; 4];
        stream.read_exact(&mut prefix).await.unwrap();
        let length = u32::from_be_bytes(prefix) as usize;
        let mut rest = vec![0u8; length - 4];
        stream.read_exact(&mut rest).await.unwrap();
        let correlation = u32::from_be_bytes([rest[8], rest[9], rest[10], rest[11]]);

        let reply: Bytes = ReplyBuilder::new(correlation)
            .param(codepoint::SQLCA, &sqlca(0, "00000", correlation as i32))
            .build();
        stream.write_all(&reply).await.unwrap();
    }
}

#[tokio::test]
async fn test_session_over_stream_transport() {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let server = tokio::spawn(echo_server(server, 3));

    let transport = StreamTransport::new(client, true);
    let mut session = Session::new(transport, Config::new("localhost"));
    for expected in 1..=3 {
        let reply = session.commit().await.unwrap();
        assert_eq!(reply.correlation_id, expected);
        assert_eq!(reply.update_count(), Some(expected as i32));
    }
    server.await.unwrap();
    assert!(session.transport().is_connected());

    // the server hung up
    let err = session.commit().await.unwrap_err();
    assert!(err.is_fatal());
    assert!(session.is_broken());
}
