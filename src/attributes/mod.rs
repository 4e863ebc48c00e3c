//! Per-operation request attributes
//!
//! Every request takes a set of optional, named attributes. Each operation
//! family has its own struct with `Option` fields; only the fields that are
//! set become parameters, in the order given by the struct's `RECOGNIZED`
//! list.

mod cursor;
mod descriptor;
mod lob;
mod package;
mod rpb;
mod server;
mod statement;

pub use cursor::{CloseCursorAttributes, FetchAttributes, FetchScroll};
pub use descriptor::{ChangeDescriptorAttributes, DescriptorHandle};
pub use lob::RetrieveLobDataAttributes;
pub use package::PackageAttributes;
pub use rpb::RequestParameterBlockAttributes;
pub use server::ServerAttributeSettings;
pub use statement::{
    DescribeAttributes, DescribeParameterMarkerAttributes, ExecuteAttributes,
    ExecuteImmediateAttributes, OpenAndDescribeAttributes, PrepareAndExecuteAttributes,
    PrepareAttributes,
};

use crate::error::{Error, Result};
use crate::message::ParameterList;
use crate::text::TextConverter;

/// Named request attributes and their codepoints
///
/// Codepoints are only unique within a family: the descriptor and server
/// attribute requests reuse values of the statement family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum AttributeId {
    // Statement family
    PackageLibrary,
    PackageName,
    TranslateIndicator,
    StatementName,
    StatementText,
    PrepareOption,
    OpenAttributes,
    DescribeOption,
    CursorName,
    BlockingFactor,
    ScrollableCursorFlag,
    FetchScrollOption,
    HoldIndicator,
    ReuseIndicator,
    ParameterMarkerData,
    StatementType,
    QueryTimeoutLimit,
    LobLocatorHandle,
    RequestedSize,
    StartOffset,
    CompressionIndicator,
    ExtendedParameterMarkerData,
    ReturnCurrentLengthIndicator,
    ColumnIndex,
    ExtendedColumnDescriptorOption,
    ResultSetHoldabilityOption,
    ExtendedStatementText,
    CompressedFunctionParameters,
    VariableFieldCompression,
    FetchBufferSize,

    // Descriptor family
    ParameterMarkerDataFormat,
    ExtendedParameterMarkerDataFormat,

    // Server attribute family
    DefaultClientCcsid,
    LanguageFeatureId,
    ClientFunctionalLevel,
    NlssIdentifier,
    DrdaPackageSize,
    DateFormat,
    DateSeparator,
    TimeFormat,
    TimeSeparator,
    DecimalSeparator,
    NamingConvention,
    IgnoreDecimalDataError,
    CommitmentControlLevel,
    DefaultSqlLibraryName,
    AsciiCcsidForTranslationTable,
    AmbiguousSelectOption,
    PackageAddStatementAllowed,
    UseExtendedFormats,
    LobFieldThreshold,
    DataCompressionParameter,
    TrueAutoCommitIndicator,
    ClientSupportInformation,
    RdbName,
    MaximumDecimalPrecision,
    MaximumDecimalScale,
    MinimumDivideScale,
    HexConstantParserOption,
    InputLocatorType,
    LocatorPersistence,
    EwlmCorrelator,
    OptimizationGoal,
    QueryStorageLimit,
    DecfloatRoundingMode,
}

impl AttributeId {
    /// Codepoint the attribute is sent under
    pub fn codepoint(self) -> u16 {
        use AttributeId::*;
        match self {
            PackageLibrary => 0x3801,
            PackageName => 0x3804,
            TranslateIndicator => 0x3805,
            StatementName => 0x3806,
            StatementText => 0x3807,
            PrepareOption => 0x3808,
            OpenAttributes => 0x3809,
            DescribeOption => 0x380A,
            CursorName => 0x380B,
            BlockingFactor => 0x380C,
            ScrollableCursorFlag => 0x380D,
            FetchScrollOption => 0x380E,
            HoldIndicator => 0x380F,
            ReuseIndicator => 0x3810,
            ParameterMarkerData => 0x3811,
            StatementType => 0x3812,
            QueryTimeoutLimit => 0x3817,
            LobLocatorHandle => 0x3818,
            RequestedSize => 0x3819,
            StartOffset => 0x381A,
            CompressionIndicator => 0x381B,
            ExtendedParameterMarkerData => 0x381F,
            ReturnCurrentLengthIndicator => 0x3821,
            ColumnIndex => 0x3828,
            ExtendedColumnDescriptorOption => 0x3829,
            ResultSetHoldabilityOption => 0x3830,
            ExtendedStatementText => 0x3831,
            CompressedFunctionParameters => 0x3832,
            VariableFieldCompression => 0x3833,
            FetchBufferSize => 0x3834,

            ParameterMarkerDataFormat => 0x3801,
            ExtendedParameterMarkerDataFormat => 0x381E,

            DefaultClientCcsid => 0x3801,
            LanguageFeatureId => 0x3802,
            ClientFunctionalLevel => 0x3803,
            NlssIdentifier => 0x3804,
            DrdaPackageSize => 0x3806,
            DateFormat => 0x3807,
            DateSeparator => 0x3808,
            TimeFormat => 0x3809,
            TimeSeparator => 0x380A,
            DecimalSeparator => 0x380B,
            NamingConvention => 0x380C,
            IgnoreDecimalDataError => 0x380D,
            CommitmentControlLevel => 0x380E,
            DefaultSqlLibraryName => 0x380F,
            AsciiCcsidForTranslationTable => 0x3810,
            AmbiguousSelectOption => 0x3811,
            PackageAddStatementAllowed => 0x3812,
            UseExtendedFormats => 0x3821,
            LobFieldThreshold => 0x3822,
            DataCompressionParameter => 0x3823,
            TrueAutoCommitIndicator => 0x3824,
            ClientSupportInformation => 0x3825,
            RdbName => 0x3826,
            MaximumDecimalPrecision => 0x3827,
            MaximumDecimalScale => 0x3828,
            MinimumDivideScale => 0x3829,
            HexConstantParserOption => 0x382A,
            InputLocatorType => 0x382B,
            LocatorPersistence => 0x3830,
            EwlmCorrelator => 0x3831,
            OptimizationGoal => 0x3834,
            QueryStorageLimit => 0x3835,
            DecfloatRoundingMode => 0x3836,
        }
    }
}

/// The attribute set of one request
pub trait RequestAttributes: Send + Sync {
    /// Attributes this request understands, in emission order
    fn recognized(&self) -> &'static [AttributeId];

    /// Reject invalid combinations before anything is encoded
    fn validate(&self, _operation: &'static str) -> Result<()> {
        Ok(())
    }

    /// Append the set attributes to `list` in recognized order
    fn write_parameters(
        &self,
        list: &mut ParameterList,
        converter: &dyn TextConverter,
    ) -> Result<()>;

    /// Parameter marker descriptor handle for the template
    fn descriptor_handle(&self) -> u16 {
        0
    }

    /// Whether extended column descriptors were asked for
    fn extended_column_descriptors(&self) -> bool {
        false
    }

    /// Statement text, used to look for parameter markers
    fn statement_text(&self) -> Option<&str> {
        None
    }
}

/// Requests that carry no parameters (commit, rollback, ...)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAttributes;

impl RequestAttributes for NoAttributes {
    fn recognized(&self) -> &'static [AttributeId] {
        &[]
    }

    fn write_parameters(&self, _list: &mut ParameterList, _converter: &dyn TextConverter) -> Result<()> {
        Ok(())
    }
}

/// Statement text may be sent single-byte or wide, never both
pub(crate) fn check_statement_text(
    operation: &'static str,
    text: &Option<String>,
    extended: &Option<String>,
    required: bool,
) -> Result<()> {
    match (text, extended) {
        (Some(_), Some(_)) => Err(Error::invalid(
            operation,
            "statement text and extended statement text are mutually exclusive",
        )),
        (None, None) if required => Err(Error::missing(operation, "statement text")),
        _ => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::text::Cp037Converter;

    /// Codepoints emitted by a fully populated attribute set
    pub fn emitted(attrs: &dyn RequestAttributes) -> Vec<u16> {
        let mut list = ParameterList::new();
        attrs.write_parameters(&mut list, &Cp037Converter).unwrap();
        list.iter().map(|p| p.codepoint).collect()
    }

    /// Codepoints of the recognized list
    pub fn recognized(attrs: &dyn RequestAttributes) -> Vec<u16> {
        attrs.recognized().iter().map(|a| a.codepoint()).collect()
    }
}
