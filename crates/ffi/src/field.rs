use std::ptr;
use std::sync::{Mutex, RwLock};
use tracing::debug;
use wx_fx_core::{
    CommandBuffer, DrawCommand, FxMode, FxUpdate, ParticleField, SharedMotionPreference,
    SurfaceGeometry,
};

use crate::error::{DefaultWxFxError, WxFxErrorCode};
use crate::helpers::{
    clear_last_error, handle_ffi_result_error, instance_from_ptr, lock, read_lock, track_error,
    write_lock,
};

/// Mode tag meaning "leave the mode unchanged" in [`WxFxUpdate`].
pub const WXFX_MODE_KEEP: i32 = -1;

/// Partial state update passed to `wxfx_field_set`.
///
/// - `mode`: `0` rain, `1` snow, `2` fog, `3` dust, or `WXFX_MODE_KEEP` (-1)
/// - Float fields set to NaN (or any non-finite value) are left unchanged.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WxFxUpdate {
    pub mode: i32,
    /// Density driver, clamped into `[0, 1]`
    pub intensity: f32,
    /// Wind speed (mph)
    pub wind_mph: f32,
    /// Global opacity, clamped into `[0, 1]`
    pub opacity: f32,
}

/// Convert an FFI update, treating `WXFX_MODE_KEEP` and non-finite floats as "keep".
pub(crate) fn update_from_ffi(raw: WxFxUpdate) -> Result<FxUpdate, DefaultWxFxError> {
    let mode = match raw.mode {
        WXFX_MODE_KEEP => None,
        tag => Some(FxMode::from_raw(tag).ok_or_else(|| {
            DefaultWxFxError::invalid_parameter(format!(
                "Invalid FX mode: {tag}. Must be -1 (keep) or 0-3"
            ))
        })?),
    };
    let finite = |v: f32| v.is_finite().then_some(v);

    Ok(FxUpdate {
        mode,
        intensity: finite(raw.intensity),
        wind_mph: finite(raw.wind_mph),
        opacity: finite(raw.opacity),
    })
}

/// FFI-friendly copy of one recorded draw call.
/// Keep this layout stable for C/C++/C# consumers.
///
/// `kind`: `0` clear (`x1`/`y1` = surface size), `1` line from `(x0, y0)` to `(x1, y1)` with
/// width `radius`, `2` filled circle at `(x0, y0)`, `3` radial-gradient blob at `(x0, y0)`
/// fading from `core_alpha` to transparent. Every op is multiplied by `alpha`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WxFxDrawCommand {
    pub kind: u32,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub radius: f32,
    pub alpha: f32,
    pub core_alpha: f32,
}

impl From<&DrawCommand> for WxFxDrawCommand {
    fn from(cmd: &DrawCommand) -> Self {
        Self {
            kind: cmd.kind,
            x0: cmd.x0,
            y0: cmd.y0,
            x1: cmd.x1,
            y1: cmd.y1,
            radius: cmd.radius,
            alpha: cmd.alpha,
            core_alpha: cmd.core_alpha,
        }
    }
}

/// Opaque handle to a particle field.
///
/// # Thread Safety
/// The field is protected by an `RwLock`; the recorded frame and the exported snapshot
/// each sit behind their own `Mutex`. Hosts normally drive it from one render thread,
/// but queries from other threads are safe.
pub struct WxFxFieldInstance {
    pub(crate) field: RwLock<ParticleField>,
    /// Draw calls recorded by the most recent `wxfx_field_step`.
    pub(crate) frame: Mutex<CommandBuffer>,
    /// Reused buffer handed out by `wxfx_field_get_draw_commands`.
    pub(crate) draw_snapshot: Mutex<Vec<WxFxDrawCommand>>,
    /// Reduced-motion flag polled by the field each frame.
    pub(crate) reduced_motion: SharedMotionPreference,
}

impl WxFxFieldInstance {
    pub(crate) fn new(width: f32, height: f32, device_pixel_ratio: f32, seed: u64) -> Box<Self> {
        let reduced_motion = SharedMotionPreference::new(false);
        let geometry = SurfaceGeometry::from_layout(width, height, device_pixel_ratio);
        let mut field = ParticleField::new(geometry).with_motion_preference(reduced_motion.clone());
        if seed != 0 {
            field = field.with_seed(seed);
        }
        let capacity = field.config().max_particles + 1;

        Box::new(Self {
            field: RwLock::new(field),
            frame: Mutex::new(CommandBuffer::with_capacity(capacity)),
            draw_snapshot: Mutex::new(Vec::with_capacity(capacity)),
            reduced_motion,
        })
    }
}

/// Create a particle field sized to a host layout box.
///
/// - `width`, `height`: logical layout size; zero or NaN degrades to 1x1
/// - `device_pixel_ratio`: capped at 2
/// - `seed`: RNG seed for reproducible output, or `0` to seed from the OS
/// - `out_instance`: receives the new instance, or null on failure
///
/// Returns
/// - `WxFxErrorCode::Ok` (0) on success
/// - `WxFxErrorCode::NullPointer` if `out_instance` is null
///
/// # Safety
///
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller takes ownership of the returned instance and MUST call `wxfx_field_destroy`
///   exactly once.
#[no_mangle]
pub unsafe extern "C" fn wxfx_field_new(
    width: f32,
    height: f32,
    device_pixel_ratio: f32,
    seed: u64,
    out_instance: *mut *mut WxFxFieldInstance,
) -> WxFxErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultWxFxError::null_pointer("out_instance"));
    }

    let instance = WxFxFieldInstance::new(width, height, device_pixel_ratio, seed);
    unsafe {
        *out_instance = Box::into_raw(instance);
    }
    clear_last_error();
    WxFxErrorCode::Ok
}

/// Destroy a field created by `wxfx_field_new`. Null is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `wxfx_field_new` and not freed already.
/// - After calling this function, the caller must not use the pointer again.
#[no_mangle]
pub unsafe extern "C" fn wxfx_field_destroy(ptr: *mut WxFxFieldInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: `ptr` came from `Box::into_raw` in `wxfx_field_new` and is still live.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}

/// Merge a partial update into the field state. Takes effect on the next step.
///
/// Returns
/// - `WxFxErrorCode::Ok` (0) on success
/// - `WxFxErrorCode::NullPointer` if `ptr` is null
/// - `WxFxErrorCode::InvalidParameter` if `update.mode` is not -1 or 0-3
/// - `WxFxErrorCode::LockPoisoned` if the internal lock is poisoned
///
/// # Safety
/// `ptr` must be a valid pointer returned by `wxfx_field_new` or null.
#[no_mangle]
pub unsafe extern "C" fn wxfx_field_set(
    ptr: *const WxFxFieldInstance,
    update: WxFxUpdate,
) -> WxFxErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let update = update_from_ffi(update)?;
        write_lock(&instance.field, "field")?.set(update);
        Ok(())
    })
}

/// Update cached geometry after a host resize. Particle positions are untouched.
///
/// # Safety
/// `ptr` must be a valid pointer returned by `wxfx_field_new` or null.
#[no_mangle]
pub unsafe extern "C" fn wxfx_field_resize(
    ptr: *const WxFxFieldInstance,
    width: f32,
    height: f32,
    device_pixel_ratio: f32,
) -> WxFxErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        write_lock(&instance.field, "field")?.resize_to_layout(width, height, device_pixel_ratio);
        Ok(())
    })
}

/// Set the host's reduced-motion preference. Observed on the next step.
///
/// # Safety
/// `ptr` must be a valid pointer returned by `wxfx_field_new` or null.
#[no_mangle]
pub unsafe extern "C" fn wxfx_field_set_reduced_motion(
    ptr: *const WxFxFieldInstance,
    reduced: bool,
) -> WxFxErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        debug!("Host reduced-motion preference: {reduced}");
        instance.reduced_motion.set(reduced);
        Ok(())
    })
}

/// Run one frame of `dt` seconds (clamped to 50 ms) and record its draw calls.
///
/// - `out_suspended` (optional) receives whether the frame was suspended
///   (reduced motion or negligible intensity). If null, ignored.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `wxfx_field_new` or null.
/// - `out_suspended` if non-null, must be a valid pointer to a `bool`.
#[no_mangle]
pub unsafe extern "C" fn wxfx_field_step(
    ptr: *const WxFxFieldInstance,
    dt: f32,
    out_suspended: *mut bool,
) -> WxFxErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let mut field = write_lock(&instance.field, "field")?;
        let mut frame = lock(&instance.frame, "frame")?;
        let outcome = field.step(dt, &mut *frame);

        if !out_suspended.is_null() {
            unsafe {
                *out_suspended = !outcome.is_drawn();
            }
        }
        Ok(())
    })
}

/// Return a borrowed pointer to the draw calls recorded by the last step.
///
/// The first command is always the clear. The returned pointer is valid until the next
/// call to this function on the same instance. **DO NOT FREE THIS POINTER**.
///
/// Returns
/// - `WxFxErrorCode::Ok` (0) on success with valid array in `out_array` and count in `out_len`
/// - `WxFxErrorCode::NullPointer` if `ptr`, `out_len`, or `out_array` is null
/// - `WxFxErrorCode::LockPoisoned` if an internal lock is poisoned
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by `wxfx_field_new` or null.
/// - `out_len` must be a valid, non-null pointer to a `usize`.
/// - `out_array` must be a valid, non-null pointer to a `*const WxFxDrawCommand`.
///
/// # Example Usage (C)
/// ```c
/// uintptr_t len = 0;
/// const WxFxDrawCommand* cmds = NULL;
/// wxfx_field_step(field, dt, NULL);
/// if (wxfx_field_get_draw_commands(field, &len, &cmds) == Ok) {
///     for (uintptr_t i = 0; i < len; i++) {
///         draw(&cmds[i]);
///     }
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn wxfx_field_get_draw_commands(
    ptr: *const WxFxFieldInstance,
    out_len: *mut usize,
    out_array: *mut *const WxFxDrawCommand,
) -> WxFxErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultWxFxError::null_pointer("out_len"));
    }

    if out_array.is_null() {
        unsafe {
            *out_len = 0;
        }
        return track_error(&DefaultWxFxError::null_pointer("out_array"));
    }

    let result = handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let mut snapshot = lock(&instance.draw_snapshot, "draw_snapshot")?;
        snapshot.clear(); // keeps capacity
        snapshot.extend(
            lock(&instance.frame, "frame")?
                .commands()
                .iter()
                .map(WxFxDrawCommand::from),
        );

        unsafe {
            *out_len = snapshot.len();
            *out_array = snapshot.as_ptr();
        }
        Ok(())
    });

    // Set to null on error (per documentation contract)
    if result != WxFxErrorCode::Ok {
        unsafe {
            *out_array = ptr::null();
            *out_len = 0;
        }
    }

    result
}

/// Number of live particles.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `wxfx_field_new` or null.
/// - `out_count` must be a valid, non-null pointer to a `usize`.
#[no_mangle]
pub unsafe extern "C" fn wxfx_field_live_count(
    ptr: *const WxFxFieldInstance,
    out_count: *mut usize,
) -> WxFxErrorCode {
    if out_count.is_null() {
        return track_error(&DefaultWxFxError::null_pointer("out_count"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let live = read_lock(&instance.field, "field")?.live_count();
        unsafe {
            *out_count = live;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{wxfx_get_last_error, wxfx_get_last_error_code};

    fn keep() -> WxFxUpdate {
        WxFxUpdate {
            mode: WXFX_MODE_KEEP,
            intensity: f32::NAN,
            wind_mph: f32::NAN,
            opacity: f32::NAN,
        }
    }

    #[test]
    fn test_update_conversion_keeps_non_finite_fields() {
        let update = update_from_ffi(WxFxUpdate {
            mode: 1,
            intensity: 0.4,
            ..keep()
        })
        .unwrap();
        assert_eq!(update.mode, Some(FxMode::Snow));
        assert_eq!(update.intensity, Some(0.4));
        assert_eq!(update.wind_mph, None);

        assert!(update_from_ffi(keep()).unwrap().is_empty());
        assert!(update_from_ffi(WxFxUpdate { mode: 7, ..keep() }).is_err());
    }

    #[test]
    fn test_field_lifecycle() {
        let mut field: *mut WxFxFieldInstance = ptr::null_mut();
        unsafe {
            assert_eq!(
                wxfx_field_new(320.0, 200.0, 1.0, 42, ptr::addr_of_mut!(field)),
                WxFxErrorCode::Ok
            );
            assert!(!field.is_null());

            let update = WxFxUpdate {
                mode: 0,
                intensity: 0.5,
                wind_mph: 10.0,
                opacity: f32::NAN,
            };
            assert_eq!(wxfx_field_set(field, update), WxFxErrorCode::Ok);

            let mut suspended = true;
            for _ in 0..4 {
                assert_eq!(
                    wxfx_field_step(field, 0.016, ptr::addr_of_mut!(suspended)),
                    WxFxErrorCode::Ok
                );
            }
            assert!(!suspended);

            let mut live = 0;
            assert_eq!(
                wxfx_field_live_count(field, ptr::addr_of_mut!(live)),
                WxFxErrorCode::Ok
            );
            assert_eq!(live, 4);

            let mut len = 0;
            let mut cmds: *const WxFxDrawCommand = ptr::null();
            assert_eq!(
                wxfx_field_get_draw_commands(
                    field,
                    ptr::addr_of_mut!(len),
                    ptr::addr_of_mut!(cmds)
                ),
                WxFxErrorCode::Ok
            );
            assert_eq!(len, 5);
            let cmds = std::slice::from_raw_parts(cmds, len);
            assert_eq!(cmds[0].kind, 0);
            assert_eq!(cmds[0].x1, 320.0);
            assert!(cmds[1..].iter().all(|c| c.kind == 1));

            wxfx_field_destroy(field);
        }
    }

    #[test]
    fn test_reduced_motion_suspends() {
        let mut field: *mut WxFxFieldInstance = ptr::null_mut();
        unsafe {
            wxfx_field_new(100.0, 100.0, 1.0, 1, ptr::addr_of_mut!(field));
            wxfx_field_set(field, WxFxUpdate { intensity: 1.0, ..keep() });
            wxfx_field_set_reduced_motion(field, true);

            let mut suspended = false;
            wxfx_field_step(field, 0.016, ptr::addr_of_mut!(suspended));
            assert!(suspended);

            wxfx_field_set_reduced_motion(field, false);
            wxfx_field_step(field, 0.016, ptr::null_mut());
            let mut live = 0;
            wxfx_field_live_count(field, ptr::addr_of_mut!(live));
            assert_eq!(live, 1);

            wxfx_field_destroy(field);
        }
    }

    #[test]
    fn test_successful_create_clears_previous_error() {
        unsafe {
            assert_eq!(wxfx_field_set(ptr::null(), keep()), WxFxErrorCode::NullPointer);
            assert_eq!(wxfx_get_last_error_code(), WxFxErrorCode::NullPointer);

            let mut field: *mut WxFxFieldInstance = ptr::null_mut();
            assert_eq!(
                wxfx_field_new(64.0, 64.0, 1.0, 5, ptr::addr_of_mut!(field)),
                WxFxErrorCode::Ok
            );
            assert_eq!(wxfx_get_last_error_code(), WxFxErrorCode::Ok);
            assert!(wxfx_get_last_error().is_null());
            wxfx_field_destroy(field);
        }
    }

    #[test]
    fn test_null_and_invalid_arguments() {
        unsafe {
            assert_eq!(
                wxfx_field_new(1.0, 1.0, 1.0, 0, ptr::null_mut()),
                WxFxErrorCode::NullPointer
            );
            assert_eq!(
                wxfx_field_step(ptr::null(), 0.016, ptr::null_mut()),
                WxFxErrorCode::NullPointer
            );
            assert_eq!(wxfx_get_last_error_code(), WxFxErrorCode::NullPointer);

            let mut field: *mut WxFxFieldInstance = ptr::null_mut();
            wxfx_field_new(10.0, 10.0, 1.0, 3, ptr::addr_of_mut!(field));
            assert_eq!(
                wxfx_field_set(field, WxFxUpdate { mode: 12, ..keep() }),
                WxFxErrorCode::InvalidParameter
            );
            assert_eq!(wxfx_field_resize(field, 50.0, 40.0, 2.0), WxFxErrorCode::Ok);
            assert_eq!(wxfx_get_last_error_code(), WxFxErrorCode::Ok);
            wxfx_field_destroy(field);
        }
    }
}
