//! Attributes of the statement requests
//!
//! Prepare, describe, execute and open requests all name a statement in a
//! package and share most of their attributes, but each has its own set of
//! recognized options.

use super::cursor::FetchScroll;
use super::{check_statement_text, AttributeId, RequestAttributes};
use crate::error::{Error, Result};
use crate::message::ParameterList;
use crate::text::TextConverter;

use AttributeId as A;

fn check_marker_data(
    operation: &'static str,
    data: &Option<Vec<u8>>,
    extended: &Option<Vec<u8>>,
) -> Result<()> {
    if data.is_some() && extended.is_some() {
        return Err(Error::invalid(
            operation,
            "parameter marker data and extended parameter marker data are mutually exclusive",
        ));
    }
    Ok(())
}

// =============================================================================
// Prepare
// =============================================================================

/// Attributes of prepare and prepare-and-describe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareAttributes {
    /// SQL package name
    pub package_name: Option<String>,
    /// Library of the SQL package
    pub package_library: Option<String>,
    /// Translate indicator
    pub translate_indicator: Option<u8>,
    /// Statement name
    pub statement_name: Option<String>,
    /// Statement text, sent single-byte
    pub statement_text: Option<String>,
    /// Statement type
    pub statement_type: Option<u16>,
    /// Prepare option
    pub prepare_option: Option<u8>,
    /// Open attributes
    pub open_attributes: Option<u8>,
    /// Ask for extended column descriptors
    pub extended_column_descriptors: Option<bool>,
    /// Statement text, sent as UTF-16
    pub extended_statement_text: Option<String>,
    /// Pre-compressed function parameters
    pub compressed_function_parameters: Option<Vec<u8>>,
}

impl PrepareAttributes {
    /// Attributes recognized by prepare, in emission order
    pub const RECOGNIZED: &'static [AttributeId] = &[
        A::PackageName,
        A::PackageLibrary,
        A::TranslateIndicator,
        A::StatementName,
        A::StatementText,
        A::StatementType,
        A::PrepareOption,
        A::OpenAttributes,
        A::ExtendedColumnDescriptorOption,
        A::ExtendedStatementText,
        A::CompressedFunctionParameters,
    ];

    /// Prepare `text` under `statement_name`
    pub fn new(statement_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            statement_name: Some(statement_name.into()),
            statement_text: Some(text.into()),
            ..Default::default()
        }
    }
}

impl RequestAttributes for PrepareAttributes {
    fn recognized(&self) -> &'static [AttributeId] {
        Self::RECOGNIZED
    }

    fn validate(&self, operation: &'static str) -> Result<()> {
        check_statement_text(
            operation,
            &self.statement_text,
            &self.extended_statement_text,
            true,
        )
    }

    fn write_parameters(&self, list: &mut ParameterList, conv: &dyn TextConverter) -> Result<()> {
        list.push_text(A::PackageName.codepoint(), self.package_name.as_deref(), conv)?;
        list.push_text(A::PackageLibrary.codepoint(), self.package_library.as_deref(), conv)?;
        list.push_byte(A::TranslateIndicator.codepoint(), self.translate_indicator);
        list.push_text(A::StatementName.codepoint(), self.statement_name.as_deref(), conv)?;
        list.push_text(A::StatementText.codepoint(), self.statement_text.as_deref(), conv)?;
        list.push_short(A::StatementType.codepoint(), self.statement_type);
        list.push_byte(A::PrepareOption.codepoint(), self.prepare_option);
        list.push_byte(A::OpenAttributes.codepoint(), self.open_attributes);
        list.push_flag(
            A::ExtendedColumnDescriptorOption.codepoint(),
            self.extended_column_descriptors,
        );
        list.push_wide_text(
            A::ExtendedStatementText.codepoint(),
            self.extended_statement_text.as_deref(),
        );
        list.push_binary(
            A::CompressedFunctionParameters.codepoint(),
            self.compressed_function_parameters.as_deref(),
        );
        Ok(())
    }

    fn extended_column_descriptors(&self) -> bool {
        self.extended_column_descriptors.unwrap_or(false)
    }

    fn statement_text(&self) -> Option<&str> {
        self.statement_text
            .as_deref()
            .or(self.extended_statement_text.as_deref())
    }
}

// =============================================================================
// Describe
// =============================================================================

/// Attributes of describe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeAttributes {
    /// SQL package name
    pub package_name: Option<String>,
    /// Library of the SQL package
    pub package_library: Option<String>,
    /// Translate indicator
    pub translate_indicator: Option<u8>,
    /// Statement name
    pub statement_name: Option<String>,
    /// Describe option
    pub describe_option: Option<u8>,
    /// Ask for extended column descriptors
    pub extended_column_descriptors: Option<bool>,
}

impl DescribeAttributes {
    /// Attributes recognized by describe, in emission order
    pub const RECOGNIZED: &'static [AttributeId] = &[
        A::PackageName,
        A::PackageLibrary,
        A::TranslateIndicator,
        A::StatementName,
        A::DescribeOption,
        A::ExtendedColumnDescriptorOption,
    ];

    /// Describe the statement called `statement_name`
    pub fn new(statement_name: impl Into<String>) -> Self {
        Self {
            statement_name: Some(statement_name.into()),
            ..Default::default()
        }
    }
}

impl RequestAttributes for DescribeAttributes {
    fn recognized(&self) -> &'static [AttributeId] {
        Self::RECOGNIZED
    }

    fn write_parameters(&self, list: &mut ParameterList, conv: &dyn TextConverter) -> Result<()> {
        list.push_text(A::PackageName.codepoint(), self.package_name.as_deref(), conv)?;
        list.push_text(A::PackageLibrary.codepoint(), self.package_library.as_deref(), conv)?;
        list.push_byte(A::TranslateIndicator.codepoint(), self.translate_indicator);
        list.push_text(A::StatementName.codepoint(), self.statement_name.as_deref(), conv)?;
        list.push_byte(A::DescribeOption.codepoint(), self.describe_option);
        list.push_flag(
            A::ExtendedColumnDescriptorOption.codepoint(),
            self.extended_column_descriptors,
        );
        Ok(())
    }

    fn extended_column_descriptors(&self) -> bool {
        self.extended_column_descriptors.unwrap_or(false)
    }
}

// =============================================================================
// Execute
// =============================================================================

/// Attributes of execute and execute-or-open-and-describe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteAttributes {
    /// SQL package name
    pub package_name: Option<String>,
    /// Library of the SQL package
    pub package_library: Option<String>,
    /// Translate indicator
    pub translate_indicator: Option<u8>,
    /// Statement name
    pub statement_name: Option<String>,
    /// Statement type
    pub statement_type: Option<u16>,
    /// Cursor name
    pub cursor_name: Option<String>,
    /// Open attributes
    pub open_attributes: Option<u8>,
    /// Describe option
    pub describe_option: Option<u8>,
    /// Rows per fetch block
    pub blocking_factor: Option<u32>,
    /// Scrollable cursor flag
    pub scrollable_cursor_flag: Option<u16>,
    /// Hold indicator
    pub hold_indicator: Option<u8>,
    /// Parameter marker values
    pub parameter_marker_data: Option<Vec<u8>>,
    /// Parameter marker values, extended layout
    pub extended_parameter_marker_data: Option<Vec<u8>>,
    /// Query timeout in seconds
    pub query_timeout_limit: Option<u32>,
    /// Result set holdability
    pub result_set_holdability_option: Option<u8>,
    /// Ask for extended column descriptors
    pub extended_column_descriptors: Option<bool>,
    /// Parameter marker descriptor handle (template)
    pub descriptor_handle: u16,
}

impl ExecuteAttributes {
    /// Attributes recognized by execute, in emission order
    pub const RECOGNIZED: &'static [AttributeId] = &[
        A::PackageName,
        A::PackageLibrary,
        A::TranslateIndicator,
        A::StatementName,
        A::StatementType,
        A::CursorName,
        A::OpenAttributes,
        A::DescribeOption,
        A::BlockingFactor,
        A::ScrollableCursorFlag,
        A::HoldIndicator,
        A::ParameterMarkerData,
        A::ExtendedParameterMarkerData,
        A::QueryTimeoutLimit,
        A::ResultSetHoldabilityOption,
        A::ExtendedColumnDescriptorOption,
    ];

    /// Execute the statement called `statement_name`
    pub fn new(statement_name: impl Into<String>) -> Self {
        Self {
            statement_name: Some(statement_name.into()),
            ..Default::default()
        }
    }
}

impl RequestAttributes for ExecuteAttributes {
    fn recognized(&self) -> &'static [AttributeId] {
        Self::RECOGNIZED
    }

    fn validate(&self, operation: &'static str) -> Result<()> {
        check_marker_data(
            operation,
            &self.parameter_marker_data,
            &self.extended_parameter_marker_data,
        )
    }

    fn write_parameters(&self, list: &mut ParameterList, conv: &dyn TextConverter) -> Result<()> {
        list.push_text(A::PackageName.codepoint(), self.package_name.as_deref(), conv)?;
        list.push_text(A::PackageLibrary.codepoint(), self.package_library.as_deref(), conv)?;
        list.push_byte(A::TranslateIndicator.codepoint(), self.translate_indicator);
        list.push_text(A::StatementName.codepoint(), self.statement_name.as_deref(), conv)?;
        list.push_short(A::StatementType.codepoint(), self.statement_type);
        list.push_text(A::CursorName.codepoint(), self.cursor_name.as_deref(), conv)?;
        list.push_byte(A::OpenAttributes.codepoint(), self.open_attributes);
        list.push_byte(A::DescribeOption.codepoint(), self.describe_option);
        list.push_int(A::BlockingFactor.codepoint(), self.blocking_factor);
        list.push_short(A::ScrollableCursorFlag.codepoint(), self.scrollable_cursor_flag);
        list.push_byte(A::HoldIndicator.codepoint(), self.hold_indicator);
        list.push_binary(
            A::ParameterMarkerData.codepoint(),
            self.parameter_marker_data.as_deref(),
        );
        list.push_binary(
            A::ExtendedParameterMarkerData.codepoint(),
            self.extended_parameter_marker_data.as_deref(),
        );
        list.push_int(A::QueryTimeoutLimit.codepoint(), self.query_timeout_limit);
        list.push_byte(
            A::ResultSetHoldabilityOption.codepoint(),
            self.result_set_holdability_option,
        );
        list.push_flag(
            A::ExtendedColumnDescriptorOption.codepoint(),
            self.extended_column_descriptors,
        );
        Ok(())
    }

    fn descriptor_handle(&self) -> u16 {
        self.descriptor_handle
    }

    fn extended_column_descriptors(&self) -> bool {
        self.extended_column_descriptors.unwrap_or(false)
    }
}

// =============================================================================
// Prepare and execute
// =============================================================================

/// Attributes of prepare-and-execute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareAndExecuteAttributes {
    /// SQL package name
    pub package_name: Option<String>,
    /// Library of the SQL package
    pub package_library: Option<String>,
    /// Translate indicator
    pub translate_indicator: Option<u8>,
    /// Statement name
    pub statement_name: Option<String>,
    /// Statement text, sent single-byte
    pub statement_text: Option<String>,
    /// Statement type
    pub statement_type: Option<u16>,
    /// Prepare option
    pub prepare_option: Option<u8>,
    /// Open attributes
    pub open_attributes: Option<u8>,
    /// Cursor name
    pub cursor_name: Option<String>,
    /// Hold indicator
    pub hold_indicator: Option<u8>,
    /// Parameter marker values
    pub parameter_marker_data: Option<Vec<u8>>,
    /// Parameter marker values, extended layout
    pub extended_parameter_marker_data: Option<Vec<u8>>,
    /// Query timeout in seconds
    pub query_timeout_limit: Option<u32>,
    /// Statement text, sent as UTF-16
    pub extended_statement_text: Option<String>,
    /// Parameter marker descriptor handle (template)
    pub descriptor_handle: u16,
}

impl PrepareAndExecuteAttributes {
    /// Attributes recognized by prepare-and-execute, in emission order
    pub const RECOGNIZED: &'static [AttributeId] = &[
        A::PackageName,
        A::PackageLibrary,
        A::TranslateIndicator,
        A::StatementName,
        A::StatementText,
        A::StatementType,
        A::PrepareOption,
        A::OpenAttributes,
        A::CursorName,
        A::HoldIndicator,
        A::ParameterMarkerData,
        A::ExtendedParameterMarkerData,
        A::QueryTimeoutLimit,
        A::ExtendedStatementText,
    ];

    /// Prepare and execute `text` under `statement_name`
    pub fn new(statement_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            statement_name: Some(statement_name.into()),
            statement_text: Some(text.into()),
            ..Default::default()
        }
    }
}

impl RequestAttributes for PrepareAndExecuteAttributes {
    fn recognized(&self) -> &'static [AttributeId] {
        Self::RECOGNIZED
    }

    fn validate(&self, operation: &'static str) -> Result<()> {
        check_statement_text(
            operation,
            &self.statement_text,
            &self.extended_statement_text,
            true,
        )?;
        check_marker_data(
            operation,
            &self.parameter_marker_data,
            &self.extended_parameter_marker_data,
        )
    }

    fn write_parameters(&self, list: &mut ParameterList, conv: &dyn TextConverter) -> Result<()> {
        list.push_text(A::PackageName.codepoint(), self.package_name.as_deref(), conv)?;
        list.push_text(A::PackageLibrary.codepoint(), self.package_library.as_deref(), conv)?;
        list.push_byte(A::TranslateIndicator.codepoint(), self.translate_indicator);
        list.push_text(A::StatementName.codepoint(), self.statement_name.as_deref(), conv)?;
        list.push_text(A::StatementText.codepoint(), self.statement_text.as_deref(), conv)?;
        list.push_short(A::StatementType.codepoint(), self.statement_type);
        list.push_byte(A::PrepareOption.codepoint(), self.prepare_option);
        list.push_byte(A::OpenAttributes.codepoint(), self.open_attributes);
        list.push_text(A::CursorName.codepoint(), self.cursor_name.as_deref(), conv)?;
        list.push_byte(A::HoldIndicator.codepoint(), self.hold_indicator);
        list.push_binary(
            A::ParameterMarkerData.codepoint(),
            self.parameter_marker_data.as_deref(),
        );
        list.push_binary(
            A::ExtendedParameterMarkerData.codepoint(),
            self.extended_parameter_marker_data.as_deref(),
        );
        list.push_int(A::QueryTimeoutLimit.codepoint(), self.query_timeout_limit);
        list.push_wide_text(
            A::ExtendedStatementText.codepoint(),
            self.extended_statement_text.as_deref(),
        );
        Ok(())
    }

    fn descriptor_handle(&self) -> u16 {
        self.descriptor_handle
    }

    fn statement_text(&self) -> Option<&str> {
        self.statement_text
            .as_deref()
            .or(self.extended_statement_text.as_deref())
    }
}

// =============================================================================
// Execute immediate
// =============================================================================

/// Attributes of execute-immediate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteImmediateAttributes {
    /// SQL package name
    pub package_name: Option<String>,
    /// Library of the SQL package
    pub package_library: Option<String>,
    /// Translate indicator
    pub translate_indicator: Option<u8>,
    /// Statement text, sent single-byte
    pub statement_text: Option<String>,
    /// Statement type
    pub statement_type: Option<u16>,
    /// Prepare option
    pub prepare_option: Option<u8>,
    /// Open attributes
    pub open_attributes: Option<u8>,
    /// Hold indicator
    pub hold_indicator: Option<u8>,
    /// Query timeout in seconds
    pub query_timeout_limit: Option<u32>,
    /// Statement text, sent as UTF-16
    pub extended_statement_text: Option<String>,
}

impl ExecuteImmediateAttributes {
    /// Attributes recognized by execute-immediate, in emission order
    pub const RECOGNIZED: &'static [AttributeId] = &[
        A::PackageName,
        A::PackageLibrary,
        A::TranslateIndicator,
        A::StatementText,
        A::StatementType,
        A::PrepareOption,
        A::OpenAttributes,
        A::HoldIndicator,
        A::QueryTimeoutLimit,
        A::ExtendedStatementText,
    ];

    /// Execute `text` without preparing it first
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            statement_text: Some(text.into()),
            ..Default::default()
        }
    }
}

impl RequestAttributes for ExecuteImmediateAttributes {
    fn recognized(&self) -> &'static [AttributeId] {
        Self::RECOGNIZED
    }

    fn validate(&self, operation: &'static str) -> Result<()> {
        check_statement_text(
            operation,
            &self.statement_text,
            &self.extended_statement_text,
            true,
        )
    }

    fn write_parameters(&self, list: &mut ParameterList, conv: &dyn TextConverter) -> Result<()> {
        list.push_text(A::PackageName.codepoint(), self.package_name.as_deref(), conv)?;
        list.push_text(A::PackageLibrary.codepoint(), self.package_library.as_deref(), conv)?;
        list.push_byte(A::TranslateIndicator.codepoint(), self.translate_indicator);
        list.push_text(A::StatementText.codepoint(), self.statement_text.as_deref(), conv)?;
        list.push_short(A::StatementType.codepoint(), self.statement_type);
        list.push_byte(A::PrepareOption.codepoint(), self.prepare_option);
        list.push_byte(A::OpenAttributes.codepoint(), self.open_attributes);
        list.push_byte(A::HoldIndicator.codepoint(), self.hold_indicator);
        list.push_int(A::QueryTimeoutLimit.codepoint(), self.query_timeout_limit);
        list.push_wide_text(
            A::ExtendedStatementText.codepoint(),
            self.extended_statement_text.as_deref(),
        );
        Ok(())
    }

    fn statement_text(&self) -> Option<&str> {
        self.statement_text
            .as_deref()
            .or(self.extended_statement_text.as_deref())
    }
}

// =============================================================================
// Open and describe
// =============================================================================

/// Attributes of open-and-describe and open-describe-fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenAndDescribeAttributes {
    /// SQL package name
    pub package_name: Option<String>,
    /// Library of the SQL package
    pub package_library: Option<String>,
    /// Translate indicator
    pub translate_indicator: Option<u8>,
    /// Statement name
    pub statement_name: Option<String>,
    /// Cursor name
    pub cursor_name: Option<String>,
    /// Open attributes
    pub open_attributes: Option<u8>,
    /// Describe option
    pub describe_option: Option<u8>,
    /// Rows per fetch block
    pub blocking_factor: Option<u32>,
    /// Scrollable cursor flag
    pub scrollable_cursor_flag: Option<u16>,
    /// Initial scroll position
    pub fetch_scroll: Option<FetchScroll>,
    /// Hold indicator
    pub hold_indicator: Option<u8>,
    /// Parameter marker values
    pub parameter_marker_data: Option<Vec<u8>>,
    /// Parameter marker values, extended layout
    pub extended_parameter_marker_data: Option<Vec<u8>>,
    /// Query timeout in seconds
    pub query_timeout_limit: Option<u32>,
    /// Variable field compression
    pub variable_field_compression: Option<u8>,
    /// Result set holdability
    pub result_set_holdability_option: Option<u8>,
    /// Ask for extended column descriptors
    pub extended_column_descriptors: Option<bool>,
    /// Fetch buffer size in bytes
    pub fetch_buffer_size: Option<u32>,
    /// Parameter marker descriptor handle (template)
    pub descriptor_handle: u16,
}

impl OpenAndDescribeAttributes {
    /// Attributes recognized by open-and-describe, in emission order
    pub const RECOGNIZED: &'static [AttributeId] = &[
        A::PackageName,
        A::PackageLibrary,
        A::TranslateIndicator,
        A::StatementName,
        A::CursorName,
        A::OpenAttributes,
        A::DescribeOption,
        A::BlockingFactor,
        A::ScrollableCursorFlag,
        A::FetchScrollOption,
        A::HoldIndicator,
        A::ParameterMarkerData,
        A::ExtendedParameterMarkerData,
        A::QueryTimeoutLimit,
        A::VariableFieldCompression,
        A::ResultSetHoldabilityOption,
        A::ExtendedColumnDescriptorOption,
        A::FetchBufferSize,
    ];

    /// Open `cursor_name` over the statement called `statement_name`
    pub fn new(statement_name: impl Into<String>, cursor_name: impl Into<String>) -> Self {
        Self {
            statement_name: Some(statement_name.into()),
            cursor_name: Some(cursor_name.into()),
            ..Default::default()
        }
    }
}

impl RequestAttributes for OpenAndDescribeAttributes {
    fn recognized(&self) -> &'static [AttributeId] {
        Self::RECOGNIZED
    }

    fn validate(&self, operation: &'static str) -> Result<()> {
        check_marker_data(
            operation,
            &self.parameter_marker_data,
            &self.extended_parameter_marker_data,
        )
    }

    fn write_parameters(&self, list: &mut ParameterList, conv: &dyn TextConverter) -> Result<()> {
        list.push_text(A::PackageName.codepoint(), self.package_name.as_deref(), conv)?;
        list.push_text(A::PackageLibrary.codepoint(), self.package_library.as_deref(), conv)?;
        list.push_byte(A::TranslateIndicator.codepoint(), self.translate_indicator);
        list.push_text(A::StatementName.codepoint(), self.statement_name.as_deref(), conv)?;
        list.push_text(A::CursorName.codepoint(), self.cursor_name.as_deref(), conv)?;
        list.push_byte(A::OpenAttributes.codepoint(), self.open_attributes);
        list.push_byte(A::DescribeOption.codepoint(), self.describe_option);
        list.push_int(A::BlockingFactor.codepoint(), self.blocking_factor);
        list.push_short(A::ScrollableCursorFlag.codepoint(), self.scrollable_cursor_flag);
        if let Some(scroll) = self.fetch_scroll {
            list.push(scroll.parameter());
        }
        list.push_byte(A::HoldIndicator.codepoint(), self.hold_indicator);
        list.push_binary(
            A::ParameterMarkerData.codepoint(),
            self.parameter_marker_data.as_deref(),
        );
        list.push_binary(
            A::ExtendedParameterMarkerData.codepoint(),
            self.extended_parameter_marker_data.as_deref(),
        );
        list.push_int(A::QueryTimeoutLimit.codepoint(), self.query_timeout_limit);
        list.push_byte(
            A::VariableFieldCompression.codepoint(),
            self.variable_field_compression,
        );
        list.push_byte(
            A::ResultSetHoldabilityOption.codepoint(),
            self.result_set_holdability_option,
        );
        list.push_flag(
            A::ExtendedColumnDescriptorOption.codepoint(),
            self.extended_column_descriptors,
        );
        list.push_int(A::FetchBufferSize.codepoint(), self.fetch_buffer_size);
        Ok(())
    }

    fn descriptor_handle(&self) -> u16 {
        self.descriptor_handle
    }

    fn extended_column_descriptors(&self) -> bool {
        self.extended_column_descriptors.unwrap_or(false)
    }
}

// =============================================================================
// Describe parameter marker
// =============================================================================

/// Attributes of describe-parameter-marker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeParameterMarkerAttributes {
    /// SQL package name
    pub package_name: Option<String>,
    /// Library of the SQL package
    pub package_library: Option<String>,
    /// Translate indicator
    pub translate_indicator: Option<u8>,
    /// Statement name
    pub statement_name: Option<String>,
    /// Ask for extended column descriptors
    pub extended_column_descriptors: Option<bool>,
}

impl DescribeParameterMarkerAttributes {
    /// Attributes recognized by describe-parameter-marker, in emission order
    pub const RECOGNIZED: &'static [AttributeId] = &[
        A::PackageName,
        A::PackageLibrary,
        A::TranslateIndicator,
        A::StatementName,
        A::ExtendedColumnDescriptorOption,
    ];

    /// Describe the parameter markers of `statement_name`
    pub fn new(statement_name: impl Into<String>) -> Self {
        Self {
            statement_name: Some(statement_name.into()),
            ..Default::default()
        }
    }
}

impl RequestAttributes for DescribeParameterMarkerAttributes {
    fn recognized(&self) -> &'static [AttributeId] {
        Self::RECOGNIZED
    }

    fn write_parameters(&self, list: &mut ParameterList, conv: &dyn TextConverter) -> Result<()> {
        list.push_text(A::PackageName.codepoint(), self.package_name.as_deref(), conv)?;
        list.push_text(A::PackageLibrary.codepoint(), self.package_library.as_deref(), conv)?;
        list.push_byte(A::TranslateIndicator.codepoint(), self.translate_indicator);
        list.push_text(A::StatementName.codepoint(), self.statement_name.as_deref(), conv)?;
        list.push_flag(
            A::ExtendedColumnDescriptorOption.codepoint(),
            self.extended_column_descriptors,
        );
        Ok(())
    }

    fn extended_column_descriptors(&self) -> bool {
        self.extended_column_descriptors.unwrap_or(false)
    }
}
