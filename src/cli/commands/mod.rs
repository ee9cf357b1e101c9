//! Command handlers

mod batch;
mod convert;

pub(crate) use batch::cmd_batch;
pub(crate) use convert::cmd_convert;
