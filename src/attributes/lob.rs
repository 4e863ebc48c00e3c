//! LOB retrieval attributes

use super::{AttributeId, RequestAttributes};
use crate::error::{Error, Result};
use crate::message::ParameterList;
use crate::text::TextConverter;

use AttributeId as A;

/// Attributes of retrieve-LOB-data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrieveLobDataAttributes {
    /// Translate indicator
    pub translate_indicator: Option<u8>,
    /// Locator handle returned in a result row
    pub lob_locator_handle: Option<u32>,
    /// Number of bytes or characters wanted
    pub requested_size: Option<u32>,
    /// Offset to start reading at
    pub start_offset: Option<u32>,
    /// Compression indicator
    pub compression_indicator: Option<u8>,
    /// Ask for the current LOB length in the reply
    pub return_current_length: Option<bool>,
    /// Column index of the LOB in its result set
    pub column_index: Option<u32>,
}

impl RetrieveLobDataAttributes {
    /// Attributes recognized by retrieve-LOB-data, in emission order
    pub const RECOGNIZED: &'static [AttributeId] = &[
        A::TranslateIndicator,
        A::LobLocatorHandle,
        A::RequestedSize,
        A::StartOffset,
        A::CompressionIndicator,
        A::ReturnCurrentLengthIndicator,
        A::ColumnIndex,
    ];

    /// Read `size` units at `offset` from the LOB behind `locator`
    pub fn new(locator: u32, offset: u32, size: u32) -> Self {
        Self {
            lob_locator_handle: Some(locator),
            requested_size: Some(size),
            start_offset: Some(offset),
            ..Default::default()
        }
    }
}

impl RequestAttributes for RetrieveLobDataAttributes {
    fn recognized(&self) -> &'static [AttributeId] {
        Self::RECOGNIZED
    }

    fn validate(&self, operation: &'static str) -> Result<()> {
        match self.lob_locator_handle {
            None => return Err(Error::missing(operation, "LOB locator handle")),
            Some(0) => return Err(Error::invalid(operation, "LOB locator handle is zero")),
            Some(_) => {}
        }
        if self.requested_size.is_none() {
            return Err(Error::missing(operation, "requested size"));
        }
        Ok(())
    }

    fn write_parameters(&self, list: &mut ParameterList, _conv: &dyn TextConverter) -> Result<()> {
        list.push_byte(A::TranslateIndicator.codepoint(), self.translate_indicator);
        list.push_int(A::LobLocatorHandle.codepoint(), self.lob_locator_handle);
        list.push_int(A::RequestedSize.codepoint(), self.requested_size);
        list.push_int(A::StartOffset.codepoint(), self.start_offset);
        list.push_byte(A::CompressionIndicator.codepoint(), self.compression_indicator);
        list.push_flag(
            A::ReturnCurrentLengthIndicator.codepoint(),
            self.return_current_length,
        );
        list.push_int(A::ColumnIndex.codepoint(), self.column_index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::test_support::{emitted, recognized};

    #[test]
    fn test_lob_emits_in_recognized_order() {
        let attrs = RetrieveLobDataAttributes {
            translate_indicator: Some(0xF1),
            compression_indicator: Some(0xF0),
            return_current_length: Some(true),
            column_index: Some(2),
            ..RetrieveLobDataAttributes::new(0x0102_0304, 0, 32768)
        };
        assert!(attrs.validate("retrieve LOB data").is_ok());
        assert_eq!(emitted(&attrs), recognized(&attrs));
    }

    #[test]
    fn test_lob_requires_locator_and_size() {
        assert!(RetrieveLobDataAttributes::default()
            .validate("retrieve LOB data")
            .is_err());

        let no_size = RetrieveLobDataAttributes {
            lob_locator_handle: Some(7),
            ..Default::default()
        };
        assert!(matches!(
            no_size.validate("retrieve LOB data"),
            Err(Error::MissingAttribute {
                attribute: "requested size",
                ..
            })
        ));

        let zero = RetrieveLobDataAttributes::new(0, 0, 10);
        assert!(matches!(
            zero.validate("retrieve LOB data"),
            Err(Error::InvalidAttribute { .. })
        ));
    }
}
