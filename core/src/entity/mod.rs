pub mod context;
pub mod endpoint_sip;
pub mod extensions;
pub mod line_extension;
pub mod linefeatures;
pub mod rightcall;
pub mod trunkfeatures;
pub mod user_line;
pub mod userfeatures;
pub mod voicemail;
