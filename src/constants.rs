//! Host server protocol constants
//!
//! Message layout sizes, server and function identifiers, ORS bitmap flags,
//! reply codepoints and well-known CCSIDs used by the database host server.

// =============================================================================
// Message Layout
// =============================================================================

/// Size of the fixed message header (both directions)
pub const HEADER_LENGTH: usize = 20;

/// Size of the request and reply templates
pub const TEMPLATE_LENGTH: usize = 20;

/// Smallest possible message: header plus template, no parameters
pub const MIN_MESSAGE_LENGTH: usize = HEADER_LENGTH + TEMPLATE_LENGTH;

/// Size of a parameter entry's `ll` + codepoint prefix
pub const PARAMETER_HEADER_LENGTH: usize = 6;

/// Server id of the database host server
pub const DATABASE_SERVER_ID: u16 = 0xE004;

/// Req/rep id carried by every database server reply
pub const REPLY_ID: u16 = 0x2800;

/// Escape byte of the reply RLE scheme
pub const RLE_ESCAPE: u8 = 0x1B;

/// Largest correlation id before wrapping back to 1
pub const MAX_CORRELATION_ID: u32 = 0x7FFF_FFFF;

/// Return code class used for "end of data" on fetch
pub const END_OF_DATA_CLASS: u16 = 2;

/// Return code used for "end of data" on fetch
pub const END_OF_DATA_RETURN_CODE: i32 = 700;

// =============================================================================
// Function Ids
// =============================================================================

/// Request function ids (header req/rep id on requests)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum FunctionId {
    /// Prepare a statement
    Prepare = 0x1800,
    /// Describe a prepared statement's result columns
    Describe = 0x1801,
    /// Describe a prepared statement's parameter markers
    DescribeParameterMarker = 0x1802,
    /// Prepare then describe in one round trip
    PrepareAndDescribe = 0x1803,
    /// Open a cursor and describe it
    OpenAndDescribe = 0x1804,
    /// Execute a prepared statement
    Execute = 0x1805,
    /// Execute a statement without preparing it
    ExecuteImmediate = 0x1806,
    /// Commit the current unit of work
    Commit = 0x1807,
    /// Roll back the current unit of work
    Rollback = 0x1808,
    /// Prepare then execute in one round trip
    PrepareAndExecute = 0x1809,
    /// Close an open cursor
    CloseCursor = 0x180A,
    /// Fetch rows from an open cursor
    Fetch = 0x180B,
    /// Open, describe and fetch the first block
    OpenDescribeFetch = 0x180E,
    /// Create an SQL package
    CreatePackage = 0x180F,
    /// Clear an SQL package
    ClearPackage = 0x1810,
    /// Delete an SQL package
    DeletePackage = 0x1811,
    /// Execute, or open and describe when the statement is a query
    ExecuteOrOpenAndDescribe = 0x1812,
    /// Return the contents of an SQL package
    RetrievePackage = 0x1815,
    /// Retrieve a piece of LOB data through a locator
    RetrieveLobData = 0x1816,
    /// Start a server-driven stream of fetch replies
    StreamFetch = 0x1819,
    /// End a stream fetch
    EndStreamFetch = 0x181A,
    /// Create a request parameter block
    CreateRpb = 0x1D00,
    /// Delete a request parameter block
    DeleteRpb = 0x1D02,
    /// Reset a request parameter block
    ResetRpb = 0x1D03,
    /// Change a parameter marker descriptor
    ChangeDescriptor = 0x1E00,
    /// Delete a parameter marker descriptor
    DeleteDescriptor = 0x1E01,
    /// Set server attributes for the connection
    SetServerAttributes = 0x1F80,
}

impl FunctionId {
    /// Human readable operation name, used in errors and logs
    pub fn name(self) -> &'static str {
        match self {
            FunctionId::Prepare => "prepare",
            FunctionId::Describe => "describe",
            FunctionId::DescribeParameterMarker => "describe parameter marker",
            FunctionId::PrepareAndDescribe => "prepare and describe",
            FunctionId::OpenAndDescribe => "open and describe",
            FunctionId::Execute => "execute",
            FunctionId::ExecuteImmediate => "execute immediate",
            FunctionId::Commit => "commit",
            FunctionId::Rollback => "rollback",
            FunctionId::PrepareAndExecute => "prepare and execute",
            FunctionId::CloseCursor => "close cursor",
            FunctionId::Fetch => "fetch",
            FunctionId::OpenDescribeFetch => "open describe fetch",
            FunctionId::CreatePackage => "create package",
            FunctionId::ClearPackage => "clear package",
            FunctionId::DeletePackage => "delete package",
            FunctionId::ExecuteOrOpenAndDescribe => "execute or open and describe",
            FunctionId::RetrievePackage => "retrieve package",
            FunctionId::RetrieveLobData => "retrieve LOB data",
            FunctionId::StreamFetch => "stream fetch",
            FunctionId::EndStreamFetch => "end stream fetch",
            FunctionId::CreateRpb => "create request parameter block",
            FunctionId::DeleteRpb => "delete request parameter block",
            FunctionId::ResetRpb => "reset request parameter block",
            FunctionId::ChangeDescriptor => "change descriptor",
            FunctionId::DeleteDescriptor => "delete descriptor",
            FunctionId::SetServerAttributes => "set server attributes",
        }
    }
}

impl TryFrom<u16> for FunctionId {
    type Error = crate::error::Error;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x1800 => Ok(FunctionId::Prepare),
            0x1801 => Ok(FunctionId::Describe),
            0x1802 => Ok(FunctionId::DescribeParameterMarker),
            0x1803 => Ok(FunctionId::PrepareAndDescribe),
            0x1804 => Ok(FunctionId::OpenAndDescribe),
            0x1805 => Ok(FunctionId::Execute),
            0x1806 => Ok(FunctionId::ExecuteImmediate),
            0x1807 => Ok(FunctionId::Commit),
            0x1808 => Ok(FunctionId::Rollback),
            0x1809 => Ok(FunctionId::PrepareAndExecute),
            0x180A => Ok(FunctionId::CloseCursor),
            0x180B => Ok(FunctionId::Fetch),
            0x180E => Ok(FunctionId::OpenDescribeFetch),
            0x180F => Ok(FunctionId::CreatePackage),
            0x1810 => Ok(FunctionId::ClearPackage),
            0x1811 => Ok(FunctionId::DeletePackage),
            0x1812 => Ok(FunctionId::ExecuteOrOpenAndDescribe),
            0x1815 => Ok(FunctionId::RetrievePackage),
            0x1816 => Ok(FunctionId::RetrieveLobData),
            0x1819 => Ok(FunctionId::StreamFetch),
            0x181A => Ok(FunctionId::EndStreamFetch),
            0x1D00 => Ok(FunctionId::CreateRpb),
            0x1D02 => Ok(FunctionId::DeleteRpb),
            0x1D03 => Ok(FunctionId::ResetRpb),
            0x1E00 => Ok(FunctionId::ChangeDescriptor),
            0x1E01 => Ok(FunctionId::DeleteDescriptor),
            0x1F80 => Ok(FunctionId::SetServerAttributes),
            _ => Err(crate::error::Error::framing(format!(
                "unknown function id {:#06x}",
                value
            ))),
        }
    }
}

// =============================================================================
// ORS Bitmap
// =============================================================================

/// Operational result set flags (request template `orsBitmap`)
#[allow(missing_docs)]
pub mod ors {
    pub const SEND_REPLY_IMMED: u32 = 0x8000_0000;
    pub const MESSAGE_ID: u32 = 0x4000_0000;
    pub const FIRST_LEVEL_TEXT: u32 = 0x2000_0000;
    pub const SECOND_LEVEL_TEXT: u32 = 0x1000_0000;
    pub const DATA_FORMAT: u32 = 0x0800_0000;
    pub const RESULT_DATA: u32 = 0x0400_0000;
    pub const SQLCA: u32 = 0x0200_0000;
    pub const SERVER_ATTRIBUTES: u32 = 0x0100_0000;
    pub const PARAMETER_MARKER_FORMAT: u32 = 0x0080_0000;
    pub const TRANSLATION_TABLES: u32 = 0x0040_0000;
    pub const DATA_SOURCE_INFORMATION: u32 = 0x0020_0000;
    pub const PACKAGE_INFORMATION: u32 = 0x0010_0000;
    pub const REQUST_RLE_COMPRESSED: u32 = 0x0008_0000;
    pub const REPLY_RLE_COMPRESSED: u32 = 0x0004_0000;
    pub const EXTENDED_COLUMN_DESCRIPTORS: u32 = 0x0002_0000;
    pub const REPLY_VARLEN_COLUMN_COMPRESSED: u32 = 0x0001_0000;
    pub const RETURN_RESULT_SET_ATTRIBUTES: u32 = 0x0000_8000;

    /// All three message information flags
    pub const MESSAGE_INFO: u32 = MESSAGE_ID | FIRST_LEVEL_TEXT | SECOND_LEVEL_TEXT;
}

// =============================================================================
// Reply Codepoints
// =============================================================================

/// Codepoints of reply parameters
#[allow(missing_docs)]
pub mod codepoint {
    pub const MESSAGE_ID: u16 = 0x3801;
    pub const FIRST_LEVEL_TEXT: u16 = 0x3802;
    pub const SECOND_LEVEL_TEXT: u16 = 0x3803;
    pub const SERVER_ATTRIBUTES: u16 = 0x3804;
    pub const SQLCA: u16 = 0x3807;
    pub const PACKAGE_INFO: u16 = 0x380B;
    pub const EXTENDED_RESULT_DATA: u16 = 0x380E;
    pub const LOB_DATA: u16 = 0x380F;
    pub const CURRENT_LOB_LENGTH: u16 = 0x3810;
    pub const EXTENDED_COLUMN_DESCRIPTORS: u16 = 0x3811;
    pub const SUPER_EXTENDED_DATA_FORMAT: u16 = 0x3812;
    pub const SUPER_EXTENDED_PARAMETER_MARKER_FORMAT: u16 = 0x3813;
    pub const RLE_COMPRESSED_DATA: u16 = 0x3832;
}

/// Codepoints of variable-length sub-records inside format blocks
#[allow(missing_docs)]
pub mod field_codepoint {
    pub const FIELD_NAME: u16 = 0x3840;
    pub const UDT_NAME: u16 = 0x3841;
}

/// Codepoints of variable-length sub-records inside extended column descriptors
#[allow(missing_docs)]
pub mod column_codepoint {
    pub const BASE_COLUMN_NAME: u16 = 0x3900;
    pub const BASE_TABLE_NAME: u16 = 0x3901;
    pub const COLUMN_LABEL: u16 = 0x3902;
    pub const BASE_SCHEMA_NAME: u16 = 0x3904;
    pub const UDT_NAME: u16 = 0x3905;
}

// =============================================================================
// CCSIDs
// =============================================================================

/// Coded character set ids with built-in handling
#[allow(missing_docs)]
pub mod ccsid {
    pub const EBCDIC_US: u16 = 37;
    pub const ASCII: u16 = 367;
    pub const LATIN1: u16 = 819;
    pub const UTF8: u16 = 1208;
    pub const UCS2: u16 = 13488;
    pub const UTF16: u16 = 1200;
    pub const BINARY: u16 = 65535;
}
