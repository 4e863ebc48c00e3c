//! Fetch and close-cursor attributes

use super::{AttributeId, RequestAttributes};
use crate::error::Result;
use crate::message::{Parameter, ParameterList, ParameterValue};
use crate::text::TextConverter;

use AttributeId as A;

/// Scroll orientation of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchScroll {
    /// Next row
    Next,
    /// Previous row
    Previous,
    /// First row
    First,
    /// Last row
    Last,
    /// Before the first row
    BeforeFirst,
    /// After the last row
    AfterLast,
    /// Current row again
    Current,
    /// Move by a signed number of rows
    Relative(i32),
    /// Move to an absolute row number
    Absolute(i32),
}

impl FetchScroll {
    /// Orientation code sent on the wire
    pub fn orientation(self) -> u16 {
        match self {
            FetchScroll::Next => 0,
            FetchScroll::Previous => 1,
            FetchScroll::First => 2,
            FetchScroll::Last => 3,
            FetchScroll::BeforeFirst => 4,
            FetchScroll::AfterLast => 5,
            FetchScroll::Current => 6,
            FetchScroll::Relative(_) => 7,
            FetchScroll::Absolute(_) => 8,
        }
    }

    /// Row distance, only for relative and absolute positioning
    pub fn distance(self) -> Option<i32> {
        match self {
            FetchScroll::Relative(n) | FetchScroll::Absolute(n) => Some(n),
            _ => None,
        }
    }

    /// Rebuild from an orientation code and optional distance
    pub fn from_wire(orientation: u16, distance: Option<i32>) -> Option<Self> {
        Some(match (orientation, distance) {
            (0, None) => FetchScroll::Next,
            (1, None) => FetchScroll::Previous,
            (2, None) => FetchScroll::First,
            (3, None) => FetchScroll::Last,
            (4, None) => FetchScroll::BeforeFirst,
            (5, None) => FetchScroll::AfterLast,
            (6, None) => FetchScroll::Current,
            (7, Some(n)) => FetchScroll::Relative(n),
            (8, Some(n)) => FetchScroll::Absolute(n),
            _ => return None,
        })
    }

    pub(crate) fn parameter(self) -> Parameter {
        Parameter::new(
            A::FetchScrollOption.codepoint(),
            ParameterValue::Scroll {
                orientation: self.orientation(),
                distance: self.distance(),
            },
        )
    }
}

/// Attributes of fetch and stream fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchAttributes {
    /// Cursor name
    pub cursor_name: Option<String>,
    /// Scroll orientation
    pub fetch_scroll: Option<FetchScroll>,
    /// Rows per fetch block
    pub blocking_factor: Option<u32>,
    /// Fetch buffer size in bytes
    pub fetch_buffer_size: Option<u32>,
    /// Variable field compression
    pub variable_field_compression: Option<u8>,
}

impl FetchAttributes {
    /// Attributes recognized by fetch, in emission order
    pub const RECOGNIZED: &'static [AttributeId] = &[
        A::CursorName,
        A::FetchScrollOption,
        A::BlockingFactor,
        A::FetchBufferSize,
        A::VariableFieldCompression,
    ];

    /// Fetch the next block from `cursor_name`
    pub fn new(cursor_name: impl Into<String>) -> Self {
        Self {
            cursor_name: Some(cursor_name.into()),
            ..Default::default()
        }
    }
}

impl RequestAttributes for FetchAttributes {
    fn recognized(&self) -> &'static [AttributeId] {
        Self::RECOGNIZED
    }

    fn write_parameters(&self, list: &mut ParameterList, conv: &dyn TextConverter) -> Result<()> {
        list.push_text(A::CursorName.codepoint(), self.cursor_name.as_deref(), conv)?;
        if let Some(scroll) = self.fetch_scroll {
            list.push(scroll.parameter());
        }
        list.push_int(A::BlockingFactor.codepoint(), self.blocking_factor);
        list.push_int(A::FetchBufferSize.codepoint(), self.fetch_buffer_size);
        list.push_byte(
            A::VariableFieldCompression.codepoint(),
            self.variable_field_compression,
        );
        Ok(())
    }
}

/// Attributes of close-cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseCursorAttributes {
    /// Cursor name
    pub cursor_name: Option<String>,
    /// Keep the cursor around for reuse
    pub reuse_indicator: Option<u8>,
}

impl CloseCursorAttributes {
    /// Attributes recognized by close-cursor, in emission order
    pub const RECOGNIZED: &'static [AttributeId] = &[A::CursorName, A::ReuseIndicator];

    /// Close `cursor_name`
    pub fn new(cursor_name: impl Into<String>) -> Self {
        Self {
            cursor_name: Some(cursor_name.into()),
            ..Default::default()
        }
    }
}

impl RequestAttributes for CloseCursorAttributes {
    fn recognized(&self) -> &'static [AttributeId] {
        Self::RECOGNIZED
    }

    fn write_parameters(&self, list: &mut ParameterList, conv: &dyn TextConverter) -> Result<()> {
        list.push_text(A::CursorName.codepoint(), self.cursor_name.as_deref(), conv)?;
        list.push_byte(A::ReuseIndicator.codepoint(), self.reuse_indicator);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::test_support::{emitted, recognized};

    #[test]
    fn test_scroll_codes() {
        assert_eq!(FetchScroll::Next.orientation(), 0);
        assert_eq!(FetchScroll::Next.distance(), None);
        assert_eq!(FetchScroll::Relative(-5).orientation(), 7);
        assert_eq!(FetchScroll::Absolute(12).distance(), Some(12));
        assert_eq!(FetchScroll::from_wire(8, Some(12)), Some(FetchScroll::Absolute(12)));
        assert_eq!(FetchScroll::from_wire(3, None), Some(FetchScroll::Last));
        assert_eq!(FetchScroll::from_wire(7, None), None);
    }

    #[test]
    fn test_scroll_parameter_length() {
        assert_eq!(FetchScroll::First.parameter().ll(), 8);
        assert_eq!(FetchScroll::Relative(3).parameter().ll(), 12);
    }

    #[test]
    fn test_fetch_emits_in_recognized_order() {
        let attrs = FetchAttributes {
            cursor_name: Some("CRSR0001".into()),
            fetch_scroll: Some(FetchScroll::Absolute(10)),
            blocking_factor: Some(128),
            fetch_buffer_size: Some(32768),
            variable_field_compression: Some(0xE8),
        };
        assert_eq!(emitted(&attrs), recognized(&attrs));
    }

    #[test]
    fn test_close_cursor() {
        let attrs = CloseCursorAttributes {
            reuse_indicator: Some(0xF0),
            ..CloseCursorAttributes::new("CRSR0001")
        };
        assert_eq!(emitted(&attrs), recognized(&attrs));
    }
}
