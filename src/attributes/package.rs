//! SQL package attributes

use super::{AttributeId, RequestAttributes};
use crate::error::{Error, Result};
use crate::message::ParameterList;
use crate::text::TextConverter;

use AttributeId as A;

/// Attributes of create, clear, delete and retrieve package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageAttributes {
    /// SQL package name
    pub package_name: Option<String>,
    /// Library of the SQL package
    pub package_library: Option<String>,
    /// Translate indicator
    pub translate_indicator: Option<u8>,
}

impl PackageAttributes {
    /// Attributes recognized by the package requests, in emission order
    pub const RECOGNIZED: &'static [AttributeId] =
        &[A::PackageName, A::PackageLibrary, A::TranslateIndicator];

    /// Package `name` in `library`
    pub fn new(name: impl Into<String>, library: impl Into<String>) -> Self {
        Self {
            package_name: Some(name.into()),
            package_library: Some(library.into()),
            translate_indicator: None,
        }
    }
}

impl RequestAttributes for PackageAttributes {
    fn recognized(&self) -> &'static [AttributeId] {
        Self::RECOGNIZED
    }

    fn validate(&self, operation: &'static str) -> Result<()> {
        if self.package_name.is_none() {
            return Err(Error::missing(operation, "package name"));
        }
        if self.package_library.is_none() {
            return Err(Error::missing(operation, "package library"));
        }
        Ok(())
    }

    fn write_parameters(&self, list: &mut ParameterList, conv: &dyn TextConverter) -> Result<()> {
        list.push_text(A::PackageName.codepoint(), self.package_name.as_deref(), conv)?;
        list.push_text(A::PackageLibrary.codepoint(), self.package_library.as_deref(), conv)?;
        list.push_byte(A::TranslateIndicator.codepoint(), self.translate_indicator);
        Ok(())
    }
}
