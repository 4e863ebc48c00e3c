//! Session orchestration
//!
//! A [`Session`] drives one connection to the database host server. Every
//! operation validates its attributes, encodes the request, sends it, reads
//! the reply and decodes it into callbacks and a scalar result.
//!
//! # Example
//!
//! ```rust,no_run
//! use hostdb::{Config, ExecuteImmediateAttributes, Session, TcpTransport};
//!
//! # async fn example() -> hostdb::Result<()> {
//! let config: Config = "ibmi.example.com".parse()?;
//! let transport = TcpTransport::connect(&config).await?;
//! // The transport must already be signed on to the database server
//! let mut session = Session::new(transport, config);
//!
//! let reply = session
//!     .execute_immediate(&ExecuteImmediateAttributes::new("DELETE FROM MYLIB.T1"))
//!     .await?;
//! println!("{:?} rows deleted", reply.update_count());
//! session.commit().await?;
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::attributes::{
    ChangeDescriptorAttributes, CloseCursorAttributes, DescribeAttributes,
    DescribeParameterMarkerAttributes, DescriptorHandle, ExecuteAttributes,
    ExecuteImmediateAttributes, FetchAttributes, NoAttributes, OpenAndDescribeAttributes,
    PackageAttributes, PrepareAndExecuteAttributes, PrepareAttributes,
    RequestAttributes, RequestParameterBlockAttributes, RetrieveLobDataAttributes,
    ServerAttributeSettings,
};
use crate::callback::{
    DescribeCallback, FetchCallback, LobDataCallback, PackageCallback, ParameterMarkerCallback,
    SqlcaCallback, WarningCallback,
};
use crate::config::Config;
use crate::constants::{ors, FunctionId};
use crate::error::{Error, Result};
use crate::message::MessageHeader;
use crate::reply::{decode_reply, Reply, ReplyHandlers, ScratchBuffers, ServerAttributes};
use crate::request::{Request, RequestContext, RequestEncoder};
use crate::text::{Cp037Converter, TextConverter};
use crate::transport::Transport;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Requests can be sent
    Ready,
    /// A framing or I/O error made the byte stream unusable
    Broken,
}

/// Outcome of a fetch-type operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// Rows were delivered to the fetch callback
    Rows(u64),
    /// The cursor is exhausted; rows that came with this reply were
    /// delivered before it was reported
    EndOfData,
}

impl FetchStatus {
    fn from_reply(reply: &Reply) -> Self {
        if reply.is_end_of_data() {
            FetchStatus::EndOfData
        } else {
            FetchStatus::Rows(reply.rows_received)
        }
    }

    /// Whether the cursor is exhausted
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, FetchStatus::EndOfData)
    }
}

/// A connection to the database host server
pub struct Session<T: Transport> {
    transport: T,
    config: Config,
    encoder: RequestEncoder,
    converter: Box<dyn TextConverter>,
    scratch: ScratchBuffers,
    state: SessionState,
    compression: bool,
    current_rpb: u16,
    /// Correlation id of the active stream fetch
    streaming: Option<u32>,
    warning_callback: Option<Box<dyn WarningCallback>>,
    sqlca_callback: Option<Box<dyn SqlcaCallback>>,
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("compression", &self.compression)
            .field("current_rpb", &self.current_rpb)
            .field("streaming", &self.streaming)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Session<T> {
    /// Create a session over a signed-on transport
    ///
    /// Reply compression is decided here, once: it is used when the config
    /// asks for it and the peer is not on this machine.
    pub fn new(transport: T, config: Config) -> Self {
        let compression = config.compression && !transport.is_local();
        debug!(
            compression,
            local = transport.is_local(),
            message_info = config.message_info,
            "session created"
        );
        Self {
            scratch: ScratchBuffers::new(config.lob_segment_size),
            transport,
            config,
            encoder: RequestEncoder::new(),
            converter: Box::new(Cp037Converter),
            state: SessionState::Ready,
            compression,
            current_rpb: 0,
            streaming: None,
            warning_callback: None,
            sqlca_callback: None,
        }
    }

    /// Use a different text converter
    pub fn with_converter(mut self, converter: Box<dyn TextConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Use a preset request encoder (and its correlation id sequence)
    pub fn with_encoder(mut self, encoder: RequestEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Register or remove the warning callback
    pub fn set_warning_callback(&mut self, callback: Option<Box<dyn WarningCallback>>) {
        self.warning_callback = callback;
    }

    /// Register or remove the SQLCA callback
    ///
    /// Requests only ask for a SQLCA while one is registered.
    pub fn set_sqlca_callback(&mut self, callback: Option<Box<dyn SqlcaCallback>>) {
        self.sqlca_callback = callback;
    }

    /// Session configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a fatal error made the session unusable
    pub fn is_broken(&self) -> bool {
        self.state == SessionState::Broken
    }

    /// Whether replies are requested RLE compressed
    pub fn compression_enabled(&self) -> bool {
        self.compression
    }

    /// Request parameter block requests run against (0 = none)
    pub fn current_rpb_handle(&self) -> u16 {
        self.current_rpb
    }

    /// Whether a stream fetch is active
    pub fn is_streaming(&self) -> bool {
        self.streaming.is_some()
    }

    /// Correlation id the next request will get
    pub fn next_correlation_id(&self) -> u32 {
        self.encoder.next_correlation_id()
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Close the transport
    pub async fn close(&mut self) -> Result<()> {
        self.streaming = None;
        self.state = SessionState::Broken;
        self.transport.close().await
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Prepare a statement
    pub async fn prepare(&mut self, attrs: &PrepareAttributes) -> Result<Reply> {
        self.run(FunctionId::Prepare, attrs, ReplyHandlers::default())
            .await
    }

    /// Describe the result columns of a prepared statement
    pub async fn describe(
        &mut self,
        attrs: &DescribeAttributes,
        describe: &mut dyn DescribeCallback,
    ) -> Result<Reply> {
        let handlers = ReplyHandlers {
            describe: Some(describe),
            ..Default::default()
        };
        self.run(FunctionId::Describe, attrs, handlers).await
    }

    /// Prepare and describe a statement in one round trip
    ///
    /// The parameter marker format is asked for when the statement text
    /// contains a `?` marker.
    pub async fn prepare_and_describe(
        &mut self,
        attrs: &PrepareAttributes,
        describe: &mut dyn DescribeCallback,
        markers: Option<&mut dyn ParameterMarkerCallback>,
    ) -> Result<Reply> {
        let handlers = ReplyHandlers {
            describe: Some(describe),
            parameter_marker: markers.map(|m| m as &mut dyn ParameterMarkerCallback),
            ..Default::default()
        };
        self.run(FunctionId::PrepareAndDescribe, attrs, handlers)
            .await
    }

    /// Prepare and execute a statement in one round trip
    pub async fn prepare_and_execute(
        &mut self,
        attrs: &PrepareAndExecuteAttributes,
    ) -> Result<Reply> {
        self.run(FunctionId::PrepareAndExecute, attrs, ReplyHandlers::default())
            .await
    }

    /// Execute a prepared statement
    pub async fn execute(&mut self, attrs: &ExecuteAttributes) -> Result<Reply> {
        self.run(FunctionId::Execute, attrs, ReplyHandlers::default())
            .await
    }

    /// Execute a statement without preparing it
    pub async fn execute_immediate(&mut self, attrs: &ExecuteImmediateAttributes) -> Result<Reply> {
        self.run(FunctionId::ExecuteImmediate, attrs, ReplyHandlers::default())
            .await
    }

    /// Execute a prepared statement, or open and describe it when it is a query
    pub async fn execute_or_open_and_describe(
        &mut self,
        attrs: &ExecuteAttributes,
        describe: &mut dyn DescribeCallback,
        fetch: &mut dyn FetchCallback,
    ) -> Result<Reply> {
        let handlers = ReplyHandlers {
            describe: Some(describe),
            fetch: Some(fetch),
            ..Default::default()
        };
        self.run(FunctionId::ExecuteOrOpenAndDescribe, attrs, handlers)
            .await
    }

    /// Open a cursor and describe its columns
    pub async fn open_and_describe(
        &mut self,
        attrs: &OpenAndDescribeAttributes,
        describe: &mut dyn DescribeCallback,
    ) -> Result<Reply> {
        let handlers = ReplyHandlers {
            describe: Some(describe),
            ..Default::default()
        };
        self.run(FunctionId::OpenAndDescribe, attrs, handlers)
            .await
    }

    /// Open a cursor, describe it and fetch the first block of rows
    pub async fn open_describe_fetch(
        &mut self,
        attrs: &OpenAndDescribeAttributes,
        describe: &mut dyn DescribeCallback,
        fetch: &mut dyn FetchCallback,
    ) -> Result<FetchStatus> {
        let handlers = ReplyHandlers {
            describe: Some(describe),
            fetch: Some(fetch),
            ..Default::default()
        };
        let reply = self
            .run(FunctionId::OpenDescribeFetch, attrs, handlers)
            .await?;
        Ok(FetchStatus::from_reply(&reply))
    }

    // =========================================================================
    // Cursors
    // =========================================================================

    /// Fetch the next block of rows
    pub async fn fetch(
        &mut self,
        attrs: &FetchAttributes,
        fetch: &mut dyn FetchCallback,
    ) -> Result<FetchStatus> {
        let handlers = ReplyHandlers {
            fetch: Some(fetch),
            ..Default::default()
        };
        let reply = self.run(FunctionId::Fetch, attrs, handlers).await?;
        Ok(FetchStatus::from_reply(&reply))
    }

    /// Read the next block of a server-driven stream fetch
    ///
    /// The first call sends the request; later calls read the next reply of
    /// the stream without sending anything. End of data ends the stream.
    pub async fn stream_fetch(
        &mut self,
        attrs: &FetchAttributes,
        fetch: &mut dyn FetchCallback,
    ) -> Result<FetchStatus> {
        let handlers = ReplyHandlers {
            fetch: Some(fetch),
            ..Default::default()
        };
        let result = match self.streaming {
            Some(correlation_id) => {
                self.check_ready()?;
                trace!(correlation_id, "reading next stream fetch reply");
                self.receive_reply(correlation_id, handlers).await
            }
            None => {
                let request = self.encode(FunctionId::StreamFetch, attrs)?;
                let correlation_id = request.correlation_id;
                let result = self.exchange(request, handlers).await;
                if result.is_ok() {
                    self.streaming = Some(correlation_id);
                }
                result
            }
        };

        match result {
            Ok(reply) => {
                let status = FetchStatus::from_reply(&reply);
                if status.is_end_of_data() {
                    self.streaming = None;
                }
                Ok(status)
            }
            Err(e) => {
                self.streaming = None;
                Err(e)
            }
        }
    }

    /// End an active stream fetch
    ///
    /// Stream replies still in flight are read and discarded until the reply
    /// to this request arrives.
    pub async fn end_stream_fetch(&mut self) -> Result<Reply> {
        let Some(stream_id) = self.streaming.take() else {
            return self
                .run(FunctionId::EndStreamFetch, &NoAttributes, ReplyHandlers::default())
                .await;
        };

        let request = self.encode(FunctionId::EndStreamFetch, &NoAttributes)?;
        let correlation_id = request.correlation_id;
        if let Err(e) = self.transport.send(&request.bytes).await {
            return Err(self.fail(e));
        }

        loop {
            let bytes = match self.transport.receive().await {
                Ok(bytes) => bytes,
                Err(e) => return Err(self.fail(e)),
            };
            let header = match MessageHeader::parse(&bytes) {
                Ok(header) => header,
                Err(e) => return Err(self.fail(e)),
            };
            if header.correlation_id == stream_id && stream_id != correlation_id {
                trace!(correlation_id = stream_id, "discarding stream fetch reply");
                continue;
            }
            return self.decode(bytes, correlation_id, ReplyHandlers::default());
        }
    }

    /// Close a cursor
    pub async fn close_cursor(&mut self, attrs: &CloseCursorAttributes) -> Result<Reply> {
        self.run(FunctionId::CloseCursor, attrs, ReplyHandlers::default())
            .await
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Commit the current unit of work
    pub async fn commit(&mut self) -> Result<Reply> {
        self.run(FunctionId::Commit, &NoAttributes, ReplyHandlers::default())
            .await
    }

    /// Roll back the current unit of work
    pub async fn rollback(&mut self) -> Result<Reply> {
        self.run(FunctionId::Rollback, &NoAttributes, ReplyHandlers::default())
            .await
    }

    // =========================================================================
    // Packages
    // =========================================================================

    /// Create an SQL package
    pub async fn create_package(&mut self, attrs: &PackageAttributes) -> Result<Reply> {
        self.run(FunctionId::CreatePackage, attrs, ReplyHandlers::default())
            .await
    }

    /// Clear an SQL package
    pub async fn clear_package(&mut self, attrs: &PackageAttributes) -> Result<Reply> {
        self.run(FunctionId::ClearPackage, attrs, ReplyHandlers::default())
            .await
    }

    /// Delete an SQL package
    pub async fn delete_package(&mut self, attrs: &PackageAttributes) -> Result<Reply> {
        self.run(FunctionId::DeletePackage, attrs, ReplyHandlers::default())
            .await
    }

    /// Retrieve the contents of an SQL package
    pub async fn retrieve_package(
        &mut self,
        attrs: &PackageAttributes,
        package: &mut dyn PackageCallback,
    ) -> Result<Reply> {
        let handlers = ReplyHandlers {
            package: Some(package),
            ..Default::default()
        };
        self.run(FunctionId::RetrievePackage, attrs, handlers)
            .await
    }

    // =========================================================================
    // Descriptors
    // =========================================================================

    /// Describe the parameter markers of a prepared statement
    pub async fn describe_parameter_marker(
        &mut self,
        attrs: &DescribeParameterMarkerAttributes,
        markers: &mut dyn ParameterMarkerCallback,
    ) -> Result<Reply> {
        let handlers = ReplyHandlers {
            parameter_marker: Some(markers),
            ..Default::default()
        };
        self.run(FunctionId::DescribeParameterMarker, attrs, handlers)
            .await
    }

    /// Change a parameter marker descriptor
    pub async fn change_descriptor(&mut self, attrs: &ChangeDescriptorAttributes) -> Result<Reply> {
        self.run(FunctionId::ChangeDescriptor, attrs, ReplyHandlers::default())
            .await
    }

    /// Delete a parameter marker descriptor
    pub async fn delete_descriptor(&mut self, handle: u16) -> Result<Reply> {
        self.run(
            FunctionId::DeleteDescriptor,
            &DescriptorHandle::new(handle),
            ReplyHandlers::default(),
        )
        .await
    }

    // =========================================================================
    // Request parameter blocks
    // =========================================================================

    /// Create request parameter block `handle` and make it current
    pub async fn create_request_parameter_block(
        &mut self,
        handle: u16,
        attrs: &RequestParameterBlockAttributes,
    ) -> Result<Reply> {
        let reply = self
            .run_with_rpb(FunctionId::CreateRpb, handle, attrs)
            .await?;
        self.current_rpb = handle;
        Ok(reply)
    }

    /// Reset request parameter block `handle` and make it current
    pub async fn reset_request_parameter_block(
        &mut self,
        handle: u16,
        attrs: &RequestParameterBlockAttributes,
    ) -> Result<Reply> {
        let reply = self
            .run_with_rpb(FunctionId::ResetRpb, handle, attrs)
            .await?;
        self.current_rpb = handle;
        Ok(reply)
    }

    /// Delete request parameter block `handle`
    pub async fn delete_request_parameter_block(&mut self, handle: u16) -> Result<Reply> {
        let reply = self
            .run_with_rpb(FunctionId::DeleteRpb, handle, &NoAttributes)
            .await?;
        if self.current_rpb == handle {
            self.current_rpb = 0;
        }
        Ok(reply)
    }

    // =========================================================================
    // LOBs and server attributes
    // =========================================================================

    /// Retrieve a piece of LOB data through a locator
    ///
    /// Returns the current LOB length when the server sent one.
    pub async fn retrieve_lob_data(
        &mut self,
        attrs: &RetrieveLobDataAttributes,
        lob: &mut dyn LobDataCallback,
    ) -> Result<Option<u64>> {
        let handlers = ReplyHandlers {
            lob: Some(lob),
            ..Default::default()
        };
        let reply = self
            .run(FunctionId::RetrieveLobData, attrs, handlers)
            .await?;
        Ok(reply.lob_length)
    }

    /// Set server attributes for the connection
    pub async fn set_server_attributes(
        &mut self,
        attrs: &ServerAttributeSettings,
    ) -> Result<Option<ServerAttributes>> {
        let reply = self
            .run(FunctionId::SetServerAttributes, attrs, ReplyHandlers::default())
            .await?;
        Ok(reply.server_attributes)
    }

    // =========================================================================
    // Request/reply plumbing
    // =========================================================================

    fn check_ready(&self) -> Result<()> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Broken => Err(Error::ConnectionClosed),
        }
    }

    /// Mark the session broken when `e` leaves the byte stream unusable
    fn fail(&mut self, e: Error) -> Error {
        if e.is_fatal() {
            warn!(error = %e, "session broken");
            self.state = SessionState::Broken;
            self.streaming = None;
        } else if e.is_server_error() {
            debug!(error = %e, "request failed");
        }
        e
    }

    fn base_ors(&self) -> u32 {
        let mut bits = ors::SEND_REPLY_IMMED;
        if self.sqlca_callback.is_some() {
            bits |= ors::SQLCA;
        }
        if self.compression {
            bits |= ors::REPLY_RLE_COMPRESSED;
        }
        if self.config.message_info {
            bits |= ors::MESSAGE_INFO;
        }
        bits
    }

    fn encode_with_rpb<A: RequestAttributes + ?Sized>(
        &mut self,
        function: FunctionId,
        rpb_handle: u16,
        attrs: &A,
    ) -> Result<Request> {
        self.check_ready()?;
        if self.streaming.is_some() {
            return Err(Error::invalid(
                function.name(),
                "a stream fetch is active; end it first",
            ));
        }
        let ctx = RequestContext {
            rpb_handle,
            base_ors: self.base_ors(),
        };
        self.encoder
            .encode(function, attrs, &ctx, self.converter.as_ref())
    }

    fn encode<A: RequestAttributes + ?Sized>(
        &mut self,
        function: FunctionId,
        attrs: &A,
    ) -> Result<Request> {
        let rpb = self.current_rpb;
        self.encode_with_rpb(function, rpb, attrs)
    }

    async fn run<A: RequestAttributes + ?Sized>(
        &mut self,
        function: FunctionId,
        attrs: &A,
        handlers: ReplyHandlers<'_>,
    ) -> Result<Reply> {
        let request = self.encode(function, attrs)?;
        self.exchange(request, handlers).await
    }

    async fn run_with_rpb<A: RequestAttributes + ?Sized>(
        &mut self,
        function: FunctionId,
        rpb_handle: u16,
        attrs: &A,
    ) -> Result<Reply> {
        if rpb_handle == 0 {
            return Err(Error::missing(function.name(), "request parameter block handle"));
        }
        let request = self.encode_with_rpb(function, rpb_handle, attrs)?;
        self.exchange(request, ReplyHandlers::default()).await
    }

    async fn exchange(&mut self, request: Request, handlers: ReplyHandlers<'_>) -> Result<Reply> {
        if let Err(e) = self.transport.send(&request.bytes).await {
            return Err(self.fail(e));
        }
        self.receive_reply(request.correlation_id, handlers).await
    }

    async fn receive_reply(
        &mut self,
        correlation_id: u32,
        handlers: ReplyHandlers<'_>,
    ) -> Result<Reply> {
        let bytes = match self.transport.receive().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail(e)),
        };
        self.decode(bytes, correlation_id, handlers)
    }

    fn decode(
        &mut self,
        bytes: Bytes,
        correlation_id: u32,
        mut ops: ReplyHandlers<'_>,
    ) -> Result<Reply> {
        let mut handlers = ReplyHandlers {
            warning: self
                .warning_callback
                .as_deref_mut()
                .map(|cb| cb as &mut dyn WarningCallback),
            sqlca: self
                .sqlca_callback
                .as_deref_mut()
                .map(|cb| cb as &mut dyn SqlcaCallback),
            describe: ops.describe.as_deref_mut().map(|cb| cb as &mut dyn DescribeCallback),
            parameter_marker: ops
                .parameter_marker
                .as_deref_mut()
                .map(|cb| cb as &mut dyn ParameterMarkerCallback),
            fetch: ops.fetch.as_deref_mut().map(|cb| cb as &mut dyn FetchCallback),
            package: ops.package.as_deref_mut().map(|cb| cb as &mut dyn PackageCallback),
            lob: ops.lob.as_deref_mut().map(|cb| cb as &mut dyn LobDataCallback),
        };
        let result = decode_reply(
            bytes,
            correlation_id,
            self.converter.as_ref(),
            &mut self.scratch,
            &mut handlers,
        );
        result.map_err(|e| self.fail(e))
    }
}
