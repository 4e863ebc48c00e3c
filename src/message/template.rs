//! Request and reply templates
//!
//! Both templates are 20 bytes and follow the message header directly.

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::constants::{END_OF_DATA_CLASS, END_OF_DATA_RETURN_CODE};
use crate::error::Result;

/// Request template (20 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestTemplate {
    /// ORS bitmap selecting what the reply should contain
    pub ors_bitmap: u32,
    /// Handle the results are returned in
    pub return_ors_handle: u16,
    /// Handle the request fills
    pub fill_ors_handle: u16,
    /// Handle the results are based on
    pub based_on_ors_handle: u16,
    /// Request parameter block handle
    pub rpb_handle: u16,
    /// Parameter marker descriptor handle
    pub pm_descriptor_handle: u16,
    /// Number of parameters following the template
    pub parameter_count: u16,
}

impl RequestTemplate {
    /// Read a request template from a buffer
    pub fn read(buf: &mut ReadBuffer) -> Result<Self> {
        let ors_bitmap = buf.read_u32_be()?;
        buf.skip(4)?; // reserved
        Ok(Self {
            ors_bitmap,
            return_ors_handle: buf.read_u16_be()?,
            fill_ors_handle: buf.read_u16_be()?,
            based_on_ors_handle: buf.read_u16_be()?,
            rpb_handle: buf.read_u16_be()?,
            pm_descriptor_handle: buf.read_u16_be()?,
            parameter_count: buf.read_u16_be()?,
        })
    }

    /// Write the template to a buffer
    pub fn write(&self, buf: &mut WriteBuffer) -> Result<()> {
        buf.write_u32_be(self.ors_bitmap)?;
        buf.write_u32_be(0)?;
        buf.write_u16_be(self.return_ors_handle)?;
        buf.write_u16_be(self.fill_ors_handle)?;
        buf.write_u16_be(self.based_on_ors_handle)?;
        buf.write_u16_be(self.rpb_handle)?;
        buf.write_u16_be(self.pm_descriptor_handle)?;
        buf.write_u16_be(self.parameter_count)?;
        Ok(())
    }
}

/// Reply template (20 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplyTemplate {
    /// ORS bitmap echoed by the server
    pub ors_bitmap: u32,
    /// Non-zero when the parameter area may be RLE compressed
    pub compressed: u32,
    /// Handle the results were returned in
    pub return_ors_handle: u16,
    /// Function id of the returned data
    pub return_data_function_id: u16,
    /// Function id of the request
    pub request_data_function_id: u16,
    /// Return code class (0 = success)
    pub rc_class: u16,
    /// Return code (negative = error, positive = warning)
    pub return_code: i32,
}

impl ReplyTemplate {
    /// Read a reply template from a buffer
    pub fn read(buf: &mut ReadBuffer) -> Result<Self> {
        Ok(Self {
            ors_bitmap: buf.read_u32_be()?,
            compressed: buf.read_u32_be()?,
            return_ors_handle: buf.read_u16_be()?,
            return_data_function_id: buf.read_u16_be()?,
            request_data_function_id: buf.read_u16_be()?,
            rc_class: buf.read_u16_be()?,
            return_code: buf.read_i32_be()?,
        })
    }

    /// Write the template to a buffer
    pub fn write(&self, buf: &mut WriteBuffer) -> Result<()> {
        buf.write_u32_be(self.ors_bitmap)?;
        buf.write_u32_be(self.compressed)?;
        buf.write_u16_be(self.return_ors_handle)?;
        buf.write_u16_be(self.return_data_function_id)?;
        buf.write_u16_be(self.request_data_function_id)?;
        buf.write_u16_be(self.rc_class)?;
        buf.write_i32_be(self.return_code)?;
        Ok(())
    }

    /// Whether the server may have compressed the parameter area
    pub fn is_compressed(&self) -> bool {
        self.compressed != 0
    }

    /// Non-zero class with a non-negative return code
    pub fn is_warning(&self) -> bool {
        self.rc_class != 0 && self.return_code >= 0
    }

    /// Non-zero class with a negative return code
    pub fn is_error(&self) -> bool {
        self.rc_class != 0 && self.return_code < 0
    }

    /// Fetch reached the end of the result set
    pub fn is_end_of_data(&self) -> bool {
        self.rc_class == END_OF_DATA_CLASS && self.return_code == END_OF_DATA_RETURN_CODE
    }
}
