//! C ABI for the ambient weather FX engine and barometer gauge.
//!
//! Every function returns a [`WxFxErrorCode`] (0 = success) and writes results through
//! out-parameters. On failure a human-readable message is available from
//! [`wxfx_get_last_error`] on the same thread.
//!
//! Instances are opaque heap handles:
//!
//! - [`WxFxFieldInstance`] - particle field (`wxfx_field_*`). Step it once per host frame,
//!   then fetch the recorded draw calls with [`wxfx_field_get_draw_commands`].
//! - [`WxFxGaugeInstance`] - animated barometer (`wxfx_gauge_*`).
//!
//! The C header `WxFxFFI.h` is generated by `cbindgen` at build time.

pub mod error;
pub mod field;
pub mod gauge;
mod helpers;

pub use error::{wxfx_get_last_error, wxfx_get_last_error_code, WxFxErrorCode};
pub use field::{
    wxfx_field_destroy, wxfx_field_get_draw_commands, wxfx_field_live_count, wxfx_field_new,
    wxfx_field_resize, wxfx_field_set, wxfx_field_set_reduced_motion, wxfx_field_step,
    WxFxDrawCommand, WxFxFieldInstance, WxFxUpdate, WXFX_MODE_KEEP,
};
pub use gauge::{
    wxfx_gauge_destroy, wxfx_gauge_new, wxfx_gauge_submit, wxfx_gauge_tick, WxFxGaugeInstance,
    WxFxGaugeReading, WxFxTrend,
};
