use std::sync::Mutex;
use wx_fx_core::{Barometer, GaugeConfig, GaugeReading, NeedleSweep, Trend};

use crate::error::{DefaultWxFxError, WxFxErrorCode};
use crate::helpers::{
    clear_last_error, handle_ffi_result_error, instance_from_ptr, lock, track_error,
};

/// Pressure trend reported by `wxfx_gauge_submit`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WxFxTrend {
    /// Change under 1 hPa, or first sample
    Stable = 0,
    Rising = 1,
    Falling = 2,
}

impl From<Trend> for WxFxTrend {
    fn from(trend: Trend) -> Self {
        match trend {
            Trend::Stable => WxFxTrend::Stable,
            Trend::Rising => WxFxTrend::Rising,
            Trend::Falling => WxFxTrend::Falling,
        }
    }
}

/// FFI-friendly gauge reading for one animation frame.
/// Keep this layout stable for C/C++/C# consumers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WxFxGaugeReading {
    /// Interpolated pressure (hPa)
    pub pressure: f32,
    /// Clamped position in the 970-1040 hPa range, `[0, 1]`
    pub ratio: f32,
    /// Needle rotation (degrees)
    pub needle_degrees: f32,
    /// Arc stroke-dash offset
    pub dash_offset: f32,
    /// Hue for the colour cue
    pub hue: f32,
    /// Indicator dot position
    pub dot_x: f32,
    pub dot_y: f32,
    /// Pressure rounded for the `"NNNN hPa"` label
    pub rounded_hpa: i32,
}

impl From<&GaugeReading> for WxFxGaugeReading {
    fn from(reading: &GaugeReading) -> Self {
        Self {
            pressure: reading.pressure,
            ratio: reading.ratio,
            needle_degrees: reading.needle_degrees,
            dash_offset: reading.dash_offset,
            hue: reading.hue,
            dot_x: reading.dot.x,
            dot_y: reading.dot.y,
            rounded_hpa: reading.pressure.round() as i32,
        }
    }
}

/// Opaque handle to an animated barometer.
pub struct WxFxGaugeInstance {
    pub(crate) gauge: Mutex<Barometer>,
}

/// Create a barometer.
///
/// - `sweep`: `0` compact needle (-135 deg to +45 deg), `1` full needle (-135 deg to +135 deg)
/// - `out_instance`: receives the new instance, or null on failure
///
/// Returns
/// - `WxFxErrorCode::Ok` (0) on success
/// - `WxFxErrorCode::NullPointer` if `out_instance` is null
/// - `WxFxErrorCode::InvalidParameter` if `sweep` is not 0 or 1
///
/// # Safety
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller takes ownership and MUST call `wxfx_gauge_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn wxfx_gauge_new(
    sweep: u8,
    out_instance: *mut *mut WxFxGaugeInstance,
) -> WxFxErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultWxFxError::null_pointer("out_instance"));
    }

    let sweep = match sweep {
        0 => NeedleSweep::Compact,
        1 => NeedleSweep::Full,
        other => {
            unsafe {
                *out_instance = std::ptr::null_mut();
            }
            return track_error(&DefaultWxFxError::invalid_parameter(format!(
                "Invalid needle sweep: {other}. Must be 0 (compact) or 1 (full)"
            )));
        }
    };

    let instance = Box::new(WxFxGaugeInstance {
        gauge: Mutex::new(Barometer::new(GaugeConfig {
            sweep,
            ..Default::default()
        })),
    });
    unsafe {
        *out_instance = Box::into_raw(instance);
    }
    clear_last_error();
    WxFxErrorCode::Ok
}

/// Destroy a gauge created by `wxfx_gauge_new`. Null is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `wxfx_gauge_new` and not freed already.
#[no_mangle]
pub unsafe extern "C" fn wxfx_gauge_destroy(ptr: *mut WxFxGaugeInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: `ptr` came from `Box::into_raw` in `wxfx_gauge_new` and is still live.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}

/// Submit a new pressure sample and retarget the needle from its current position.
///
/// - `now_ms`: host frame timestamp in milliseconds
/// - `out_trend` (optional) receives the trend against the previous raw sample
///
/// Returns
/// - `WxFxErrorCode::Ok` (0) on success
/// - `WxFxErrorCode::NullPointer` if `ptr` is null
/// - `WxFxErrorCode::InvalidParameter` if `pressure_hpa` is NaN or infinite
///   (the sample is dropped and the previous-sample memory is unchanged)
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `wxfx_gauge_new` or null.
/// - `out_trend` if non-null, must be a valid pointer to a `WxFxTrend`.
#[no_mangle]
pub unsafe extern "C" fn wxfx_gauge_submit(
    ptr: *const WxFxGaugeInstance,
    pressure_hpa: f32,
    now_ms: f64,
    out_trend: *mut WxFxTrend,
) -> WxFxErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        if !pressure_hpa.is_finite() {
            return Err(DefaultWxFxError::non_finite("pressure_hpa", pressure_hpa));
        }

        let trend = lock(&instance.gauge, "gauge")?.submit(pressure_hpa, now_ms);
        if !out_trend.is_null() {
            unsafe {
                *out_trend = trend.into();
            }
        }
        Ok(())
    })
}

/// Advance the needle animation to `now_ms`.
///
/// - `out_reading` receives this frame's reading while the needle is moving
/// - `out_active` receives whether a frame was produced; `false` once the needle has
///   settled (the reading is left untouched)
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `wxfx_gauge_new` or null.
/// - `out_reading` must be a valid, non-null pointer to a `WxFxGaugeReading`.
/// - `out_active` must be a valid, non-null pointer to a `bool`.
#[no_mangle]
pub unsafe extern "C" fn wxfx_gauge_tick(
    ptr: *const WxFxGaugeInstance,
    now_ms: f64,
    out_reading: *mut WxFxGaugeReading,
    out_active: *mut bool,
) -> WxFxErrorCode {
    if out_reading.is_null() {
        return track_error(&DefaultWxFxError::null_pointer("out_reading"));
    }
    if out_active.is_null() {
        return track_error(&DefaultWxFxError::null_pointer("out_active"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let reading = lock(&instance.gauge, "gauge")?.tick(now_ms);

        unsafe {
            *out_active = reading.is_some();
            if let Some(reading) = &reading {
                *out_reading = reading.into();
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{wxfx_get_last_error, wxfx_get_last_error_code};
    use approx::assert_relative_eq;
    use std::ptr;

    #[test]
    fn test_gauge_submit_and_tick() {
        let mut gauge: *mut WxFxGaugeInstance = ptr::null_mut();
        unsafe {
            assert_eq!(wxfx_gauge_new(1, ptr::addr_of_mut!(gauge)), WxFxErrorCode::Ok);

            let mut trend = WxFxTrend::Falling;
            wxfx_gauge_submit(gauge, 1010.0, 0.0, ptr::addr_of_mut!(trend));
            assert_eq!(trend, WxFxTrend::Stable);
            wxfx_gauge_submit(gauge, 1040.0, 0.0, ptr::addr_of_mut!(trend));
            assert_eq!(trend, WxFxTrend::Rising);

            let mut reading = WxFxGaugeReading::default();
            let mut active = false;
            assert_eq!(
                wxfx_gauge_tick(
                    gauge,
                    900.0,
                    ptr::addr_of_mut!(reading),
                    ptr::addr_of_mut!(active)
                ),
                WxFxErrorCode::Ok
            );
            assert!(active);
            assert_eq!(reading.rounded_hpa, 1040);
            assert_relative_eq!(reading.needle_degrees, 135.0);

            wxfx_gauge_tick(
                gauge,
                916.0,
                ptr::addr_of_mut!(reading),
                ptr::addr_of_mut!(active),
            );
            assert!(!active);

            wxfx_gauge_destroy(gauge);
        }
    }

    #[test]
    fn test_non_finite_pressure_rejected() {
        let mut gauge: *mut WxFxGaugeInstance = ptr::null_mut();
        unsafe {
            wxfx_gauge_new(0, ptr::addr_of_mut!(gauge));
            assert_eq!(
                wxfx_gauge_submit(gauge, f32::NAN, 0.0, ptr::null_mut()),
                WxFxErrorCode::InvalidParameter
            );
            assert!(!wxfx_get_last_error().is_null());
            assert!((*gauge).gauge.lock().unwrap().last_sample().is_none());

            assert_eq!(
                wxfx_gauge_submit(gauge, 1000.0, 0.0, ptr::null_mut()),
                WxFxErrorCode::Ok
            );
            assert_eq!(wxfx_get_last_error_code(), WxFxErrorCode::Ok);
            assert!(wxfx_get_last_error().is_null());
            wxfx_gauge_destroy(gauge);
        }
    }

    #[test]
    fn test_create_after_failure_resets_error_state() {
        let mut gauge: *mut WxFxGaugeInstance = ptr::null_mut();
        unsafe {
            assert_eq!(
                wxfx_gauge_new(9, ptr::addr_of_mut!(gauge)),
                WxFxErrorCode::InvalidParameter
            );
            assert_eq!(wxfx_get_last_error_code(), WxFxErrorCode::InvalidParameter);

            assert_eq!(wxfx_gauge_new(0, ptr::addr_of_mut!(gauge)), WxFxErrorCode::Ok);
            assert_eq!(wxfx_get_last_error_code(), WxFxErrorCode::Ok);
            assert!(wxfx_get_last_error().is_null());
            wxfx_gauge_destroy(gauge);
        }
    }

    #[test]
    fn test_invalid_sweep() {
        let mut gauge: *mut WxFxGaugeInstance = ptr::null_mut();
        unsafe {
            assert_eq!(
                wxfx_gauge_new(5, ptr::addr_of_mut!(gauge)),
                WxFxErrorCode::InvalidParameter
            );
        }
        assert!(gauge.is_null());
    }
}
