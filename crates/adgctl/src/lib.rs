pub mod cmd_codec;
pub mod cmd_drum;
pub mod cmd_macro;
pub mod cmd_modify;
pub mod cmd_sampler;
pub mod common;
