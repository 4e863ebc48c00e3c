//! Request parameter block attributes
//!
//! A request parameter block (RPB) stores attributes on the server so later
//! requests that name its handle do not have to resend them.

use super::{check_statement_text, AttributeId, RequestAttributes};
use crate::error::Result;
use crate::message::ParameterList;
use crate::text::TextConverter;

use AttributeId as A;

/// Attributes of create and reset request parameter block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParameterBlockAttributes {
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
    /// Prepare option
    pub prepare_option: Option<u8>,
    /// Open attributes
    pub open_attributes: Option<u8>,
    /// Statement text, sent single-byte
    pub statement_text: Option<String>,
    /// Statement type
    pub statement_type: Option<u16>,
    /// Describe option
    pub describe_option: Option<u8>,
    /// Rows per fetch block
    pub blocking_factor: Option<u32>,
    /// Scrollable cursor flag
    pub scrollable_cursor_flag: Option<u16>,
    /// Hold indicator
    pub hold_indicator: Option<u8>,
    /// Result set holdability
    pub result_set_holdability_option: Option<u8>,
    /// Statement text, sent as UTF-16
    pub extended_statement_text: Option<String>,
}

impl RequestParameterBlockAttributes {
    /// Attributes recognized by the RPB requests, in emission order
    pub const RECOGNIZED: &'static [AttributeId] = &[
        A::PackageName,
        A::PackageLibrary,
        A::TranslateIndicator,
        A::StatementName,
        A::CursorName,
        A::PrepareOption,
        A::OpenAttributes,
        A::StatementText,
        A::StatementType,
        A::DescribeOption,
        A::BlockingFactor,
        A::ScrollableCursorFlag,
        A::HoldIndicator,
        A::ResultSetHoldabilityOption,
        A::ExtendedStatementText,
    ];
}

impl RequestAttributes for RequestParameterBlockAttributes {
    fn recognized(&self) -> &'static [AttributeId] {
        Self::RECOGNIZED
    }

    fn validate(&self, operation: &'static str) -> Result<()> {
        check_statement_text(
            operation,
            &self.statement_text,
            &self.extended_statement_text,
            false,
        )
    }

    fn write_parameters(&self, list: &mut ParameterList, conv: &dyn TextConverter) -> Result<()> {
        list.push_text(A::PackageName.codepoint(), self.package_name.as_deref(), conv)?;
        list.push_text(A::PackageLibrary.codepoint(), self.package_library.as_deref(), conv)?;
        list.push_byte(A::TranslateIndicator.codepoint(), self.translate_indicator);
        list.push_text(A::StatementName.codepoint(), self.statement_name.as_deref(), conv)?;
        list.push_text(A::CursorName.codepoint(), self.cursor_name.as_deref(), conv)?;
        list.push_byte(A::PrepareOption.codepoint(), self.prepare_option);
        list.push_byte(A::OpenAttributes.codepoint(), self.open_attributes);
        list.push_text(A::StatementText.codepoint(), self.statement_text.as_deref(), conv)?;
        list.push_short(A::StatementType.codepoint(), self.statement_type);
        list.push_byte(A::DescribeOption.codepoint(), self.describe_option);
        list.push_int(A::BlockingFactor.codepoint(), self.blocking_factor);
        list.push_short(A::ScrollableCursorFlag.codepoint(), self.scrollable_cursor_flag);
        list.push_byte(A::HoldIndicator.codepoint(), self.hold_indicator);
        list.push_byte(
            A::ResultSetHoldabilityOption.codepoint(),
            self.result_set_holdability_option,
        );
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
