#![warn(missing_docs)]

//! # hostdb
//!
//! A pure Rust client for the database host server request/reply protocol.
//!
//! The crate implements the wire layer of the protocol: request encoding with
//! codepoint-tagged parameters, reply decoding with RLE decompression, and a
//! session that owns correlation ids and server-side handles. Sign-on happens
//! before a session is created; the transport handed to [`Session::new`] must
//! already be connected to the database server.
//!
//! ## Features
//!
//! - **Pure Rust** - No native client libraries required
//! - **Async/await** - Built on Tokio
//! - **TLS** - rustls-based secure connections
//! - **Callbacks** - Rows, formats, packages and LOB data are delivered as
//!   they are decoded, through session-owned buffers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hostdb::{
//!     Config, FetchAttributes, FormatCollector, OpenAndDescribeAttributes, PrepareAttributes,
//!     RowCollector, Session, TcpTransport,
//! };
//!
//! #[tokio::main]
//! async fn main() -> hostdb::Result<()> {
//!     let config: Config = "ibmi.example.com".parse()?;
//!     let transport = TcpTransport::connect(&config).await?;
//!     let mut session = Session::new(transport, config);
//!
//!     let mut formats = FormatCollector::default();
//!     session
//!         .prepare_and_describe(
//!             &PrepareAttributes::new("STMT0001", "SELECT ID, NAME FROM MYLIB.USERS"),
//!             &mut formats,
//!             None,
//!         )
//!         .await?;
//!
//!     let mut rows = RowCollector::default();
//!     let mut status = session
//!         .open_describe_fetch(
//!             &OpenAndDescribeAttributes::new("STMT0001", "CRSR0001"),
//!             &mut formats,
//!             &mut rows,
//!         )
//!         .await?;
//!     while !status.is_end_of_data() {
//!         status = session
//!             .fetch(&FetchAttributes::new("CRSR0001"), &mut rows)
//!             .await?;
//!     }
//!     println!("{} rows", rows.rows.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! [`Error::is_framing`] errors and I/O errors break the session; every later
//! call fails with [`Error::ConnectionClosed`]. Server errors
//! ([`Error::Server`]) and attribute validation errors leave it usable.
//! Warnings are never errors: they go to the [`WarningCallback`].

pub mod attributes;
pub mod buffer;
pub mod callback;
pub mod config;
pub mod constants;
pub mod error;
pub mod message;
pub mod reply;
pub mod request;
pub mod rle;
pub mod session;
pub mod text;
pub mod transport;

// Re-export commonly used types
pub use attributes::{
    ChangeDescriptorAttributes, CloseCursorAttributes, DescribeAttributes,
    DescribeParameterMarkerAttributes, DescriptorHandle, ExecuteAttributes,
    ExecuteImmediateAttributes, FetchAttributes, FetchScroll, NoAttributes,
    OpenAndDescribeAttributes, PackageAttributes, PrepareAndExecuteAttributes, PrepareAttributes,
    RequestAttributes, RequestParameterBlockAttributes, RetrieveLobDataAttributes,
    ServerAttributeSettings,
};
pub use callback::{
    DescribeCallback, FetchCallback, FormatCollector, LobCollector, LobDataCallback,
    PackageCallback, PackageCollector, ParameterMarkerCallback, RowCollector, SqlcaCallback,
    SqlcaCollector, WarningCallback, WarningCollector,
};
pub use config::Config;
pub use constants::FunctionId;
pub use error::{Error, Result, ServerError};
pub use reply::{decode_reply, DataFormat, FieldDescription, Reply, ServerAttributes, Sqlca};
pub use request::{CorrelationIds, RequestEncoder};
pub use session::{FetchStatus, Session, SessionState};
pub use text::{Cp037Converter, TextConverter};
pub use transport::{StreamTransport, TcpTransport, TlsConfig, TlsTransport, Transport};
