//! Parameter marker descriptor attributes

use super::{AttributeId, RequestAttributes};
use crate::error::{Error, Result};
use crate::message::ParameterList;
use crate::text::TextConverter;

use AttributeId as A;

/// Attributes of change-descriptor
///
/// Registers a parameter marker format under `descriptor_handle` so later
/// executes can refer to it instead of resending the format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeDescriptorAttributes {
    /// Descriptor handle being changed (template)
    pub descriptor_handle: u16,
    /// Parameter marker data format
    pub parameter_marker_data_format: Option<Vec<u8>>,
    /// Parameter marker data format, extended layout
    pub extended_parameter_marker_data_format: Option<Vec<u8>>,
}

impl ChangeDescriptorAttributes {
    /// Attributes recognized by change-descriptor, in emission order
    pub const RECOGNIZED: &'static [AttributeId] = &[
        A::ParameterMarkerDataFormat,
        A::ExtendedParameterMarkerDataFormat,
    ];
}

impl RequestAttributes for ChangeDescriptorAttributes {
    fn recognized(&self) -> &'static [AttributeId] {
        Self::RECOGNIZED
    }

    fn validate(&self, operation: &'static str) -> Result<()> {
        if self.descriptor_handle == 0 {
            return Err(Error::missing(operation, "descriptor handle"));
        }
        match (
            &self.parameter_marker_data_format,
            &self.extended_parameter_marker_data_format,
        ) {
            (None, None) => Err(Error::missing(operation, "parameter marker data format")),
            (Some(_), Some(_)) => Err(Error::invalid(
                operation,
                "only one parameter marker data format may be sent",
            )),
            _ => Ok(()),
        }
    }

    fn write_parameters(&self, list: &mut ParameterList, _conv: &dyn TextConverter) -> Result<()> {
        list.push_binary(
            A::ParameterMarkerDataFormat.codepoint(),
            self.parameter_marker_data_format.as_deref(),
        );
        list.push_binary(
            A::ExtendedParameterMarkerDataFormat.codepoint(),
            self.extended_parameter_marker_data_format.as_deref(),
        );
        Ok(())
    }

    fn descriptor_handle(&self) -> u16 {
        self.descriptor_handle
    }
}

/// A bare descriptor handle, used by delete-descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DescriptorHandle {
    /// Handle to release
    pub handle: u16,
}

impl DescriptorHandle {
    /// Wrap a handle
    pub fn new(handle: u16) -> Self {
        Self { handle }
    }
}

impl RequestAttributes for DescriptorHandle {
    fn recognized(&self) -> &'static [AttributeId] {
        &[]
    }

    fn validate(&self, operation: &'static str) -> Result<()> {
        if self.handle == 0 {
            return Err(Error::missing(operation, "descriptor handle"));
        }
        Ok(())
    }

    fn write_parameters(&self, _list: &mut ParameterList, _conv: &dyn TextConverter) -> Result<()> {
        Ok(())
    }

    fn descriptor_handle(&self) -> u16 {
        self.handle
    }
}
