//! Server attribute settings
//!
//! Sent once after sign-on to fix the job's formats, naming convention,
//! commitment control level and client capabilities. The reply may carry the
//! resulting server attributes.

use super::{AttributeId, RequestAttributes};
use crate::error::Result;
use crate::message::ParameterList;
use crate::text::TextConverter;

use AttributeId as A;

/// Attributes of set-server-attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ServerAttributeSettings {
    pub default_client_ccsid: Option<u16>,
    pub language_feature_id: Option<String>,
    pub client_functional_level: Option<String>,
    pub nlss_identifier: Option<u16>,
    pub translate_indicator: Option<u8>,
    pub drda_package_size: Option<u16>,
    pub date_format: Option<u16>,
    pub date_separator: Option<u16>,
    pub time_format: Option<u16>,
    pub time_separator: Option<u16>,
    pub decimal_separator: Option<u16>,
    pub naming_convention: Option<u16>,
    pub ignore_decimal_data_error: Option<u16>,
    pub commitment_control_level: Option<u16>,
    pub default_sql_library_name: Option<String>,
    pub ascii_ccsid_for_translation_table: Option<u16>,
    pub ambiguous_select_option: Option<u16>,
    pub package_add_statement_allowed: Option<u16>,
    pub use_extended_formats: Option<u8>,
    pub lob_field_threshold: Option<u32>,
    pub data_compression_parameter: Option<u16>,
    pub true_auto_commit_indicator: Option<u16>,
    pub client_support_information: Option<u32>,
    pub rdb_name: Option<String>,
    pub maximum_decimal_precision: Option<u16>,
    pub maximum_decimal_scale: Option<u16>,
    pub minimum_divide_scale: Option<u16>,
    pub hex_constant_parser_option: Option<u16>,
    pub input_locator_type: Option<u16>,
    pub locator_persistence: Option<u16>,
    pub ewlm_correlator: Option<Vec<u8>>,
    pub optimization_goal: Option<u8>,
    pub query_storage_limit: Option<u32>,
    pub decfloat_rounding_mode: Option<u16>,
}

impl ServerAttributeSettings {
    /// Attributes recognized by set-server-attributes, in emission order
    pub const RECOGNIZED: &'static [AttributeId] = &[
        A::DefaultClientCcsid,
        A::LanguageFeatureId,
        A::ClientFunctionalLevel,
        A::NlssIdentifier,
        A::TranslateIndicator,
        A::DrdaPackageSize,
        A::DateFormat,
        A::DateSeparator,
        A::TimeFormat,
        A::TimeSeparator,
        A::DecimalSeparator,
        A::NamingConvention,
        A::IgnoreDecimalDataError,
        A::CommitmentControlLevel,
        A::DefaultSqlLibraryName,
        A::AsciiCcsidForTranslationTable,
        A::AmbiguousSelectOption,
        A::PackageAddStatementAllowed,
        A::UseExtendedFormats,
        A::LobFieldThreshold,
        A::DataCompressionParameter,
        A::TrueAutoCommitIndicator,
        A::ClientSupportInformation,
        A::RdbName,
        A::MaximumDecimalPrecision,
        A::MaximumDecimalScale,
        A::MinimumDivideScale,
        A::HexConstantParserOption,
        A::InputLocatorType,
        A::LocatorPersistence,
        A::EwlmCorrelator,
        A::OptimizationGoal,
        A::QueryStorageLimit,
        A::DecfloatRoundingMode,
    ];
}

impl RequestAttributes for ServerAttributeSettings {
    fn recognized(&self) -> &'static [AttributeId] {
        Self::RECOGNIZED
    }

    fn write_parameters(&self, list: &mut ParameterList, conv: &dyn TextConverter) -> Result<()> {
        list.push_short(A::DefaultClientCcsid.codepoint(), self.default_client_ccsid);
        list.push_text(
            A::LanguageFeatureId.codepoint(),
            self.language_feature_id.as_deref(),
            conv,
        )?;
        list.push_text(
            A::ClientFunctionalLevel.codepoint(),
            self.client_functional_level.as_deref(),
            conv,
        )?;
        list.push_short(A::NlssIdentifier.codepoint(), self.nlss_identifier);
        list.push_byte(A::TranslateIndicator.codepoint(), self.translate_indicator);
        list.push_short(A::DrdaPackageSize.codepoint(), self.drda_package_size);
        list.push_short(A::DateFormat.codepoint(), self.date_format);
        list.push_short(A::DateSeparator.codepoint(), self.date_separator);
        list.push_short(A::TimeFormat.codepoint(), self.time_format);
        list.push_short(A::TimeSeparator.codepoint(), self.time_separator);
        list.push_short(A::DecimalSeparator.codepoint(), self.decimal_separator);
        list.push_short(A::NamingConvention.codepoint(), self.naming_convention);
        list.push_short(
            A::IgnoreDecimalDataError.codepoint(),
            self.ignore_decimal_data_error,
        );
        list.push_short(
            A::CommitmentControlLevel.codepoint(),
            self.commitment_control_level,
        );
        list.push_text(
            A::DefaultSqlLibraryName.codepoint(),
            self.default_sql_library_name.as_deref(),
            conv,
        )?;
        list.push_short(
            A::AsciiCcsidForTranslationTable.codepoint(),
            self.ascii_ccsid_for_translation_table,
        );
        list.push_short(
            A::AmbiguousSelectOption.codepoint(),
            self.ambiguous_select_option,
        );
        list.push_short(
            A::PackageAddStatementAllowed.codepoint(),
            self.package_add_statement_allowed,
        );
        list.push_byte(A::UseExtendedFormats.codepoint(), self.use_extended_formats);
        list.push_int(A::LobFieldThreshold.codepoint(), self.lob_field_threshold);
        list.push_short(
            A::DataCompressionParameter.codepoint(),
            self.data_compression_parameter,
        );
        list.push_short(
            A::TrueAutoCommitIndicator.codepoint(),
            self.true_auto_commit_indicator,
        );
        list.push_int(
            A::ClientSupportInformation.codepoint(),
            self.client_support_information,
        );
        list.push_text(A::RdbName.codepoint(), self.rdb_name.as_deref(), conv)?;
        list.push_short(
            A::MaximumDecimalPrecision.codepoint(),
            self.maximum_decimal_precision,
        );
        list.push_short(A::MaximumDecimalScale.codepoint(), self.maximum_decimal_scale);
        list.push_short(A::MinimumDivideScale.codepoint(), self.minimum_divide_scale);
        list.push_short(
            A::HexConstantParserOption.codepoint(),
            self.hex_constant_parser_option,
        );
        list.push_short(A::InputLocatorType.codepoint(), self.input_locator_type);
        list.push_short(A::LocatorPersistence.codepoint(), self.locator_persistence);
        list.push_binary(A::EwlmCorrelator.codepoint(), self.ewlm_correlator.as_deref());
        list.push_byte(A::OptimizationGoal.codepoint(), self.optimization_goal);
        list.push_int(A::QueryStorageLimit.codepoint(), self.query_storage_limit);
        list.push_short(
            A::DecfloatRoundingMode.codepoint(),
            self.decfloat_rounding_mode,
        );
        Ok(())
    }
}
