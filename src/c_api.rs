use crate::{
    clock::{ClockSource, SystemClock},
    config::EngineConfig,
    engine::Engine,
    error::CommandError,
    protocol::{ObjectState, StateReport},
};

use std::ffi::{CStr, c_char};

/// An engine plus the last report, kept alive for hosts that read it by pointer.
#[derive(Debug)]
pub struct HostEngine {
    engine: Engine,
    clock: SystemClock,
    last_report: StateReport,
}

impl HostEngine {
    fn new(engine: Engine) -> Self {
        Self {
            engine,
            clock: SystemClock::new(),
            last_report: StateReport::default(),
        }
    }
}

/// Status codes returned by `Engine_Submit`.
pub const ENGINE_OK: i32 = 0;
pub const ENGINE_REJECTED: i32 = -1;
pub const ENGINE_NULL_HANDLE: i32 = -2;

unsafe fn read_str<'a>(text: *const c_char) -> Result<&'a str, CommandError> {
    if text.is_null() {
        return Err(CommandError::Encoding);
    }
    unsafe { CStr::from_ptr(text) }
        .to_str()
        .map_err(|_| CommandError::Encoding)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Engine_Create() -> *mut HostEngine {
    Box::into_raw(Box::new(HostEngine::new(Engine::new())))
}

/// Creates an engine from a JSON config. Returns null if the config is invalid.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Engine_CreateWithConfig(config: *const c_char) -> *mut HostEngine {
    let config = match unsafe { read_str(config) } {
        Ok(text) => EngineConfig::from_json(text),
        Err(error) => {
            log::warn!("engine config: {error}");
            return std::ptr::null_mut();
        }
    };
    match config {
        Ok(config) => Box::into_raw(Box::new(HostEngine::new(Engine::with_config(config)))),
        Err(error) => {
            log::warn!("{error}");
            std::ptr::null_mut()
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Engine_Destroy(handle: *mut HostEngine) {
    if !handle.is_null() {
        unsafe { drop(Box::from_raw(handle)) };
    }
}

/// Applies one JSON command. Rejected commands leave the engine untouched.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Engine_Submit(handle: *mut HostEngine, command: *const c_char) -> i32 {
    let Some(host) = (unsafe { handle.as_mut() }) else {
        return ENGINE_NULL_HANDLE;
    };
    let text = match unsafe { read_str(command) } {
        Ok(text) => text,
        Err(error) => {
            log::warn!("dropping command: {error}");
            return ENGINE_REJECTED;
        }
    };
    match host.engine.submit_json(text) {
        Ok(_) => ENGINE_OK,
        Err(_) => ENGINE_REJECTED,
    }
}

/// Runs one tick of `dt` physical seconds. Returns the number of reported objects.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Engine_Tick(handle: *mut HostEngine, dt: f64) -> usize {
    let Some(host) = (unsafe { handle.as_mut() }) else {
        return 0;
    };
    host.last_report = host.engine.tick(dt);
    host.last_report.objects.len()
}

/// Runs one tick with `dt` taken from the wall clock and the current time scale.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Engine_TickRealtime(handle: *mut HostEngine) -> usize {
    let Some(host) = (unsafe { handle.as_mut() }) else {
        return 0;
    };
    let now = host.clock.now();
    host.last_report = host.engine.tick_at(now);
    host.last_report.objects.len()
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Engine_GetDeltaTime(handle: *const HostEngine) -> f64 {
    unsafe { handle.as_ref() }.map_or(0.0, |host| host.last_report.delta_time)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Engine_GetObjectCount(handle: *const HostEngine) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |host| host.last_report.objects.len())
}

/// Objects of the last report. Valid until the next tick or destroy.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Engine_GetObjects(handle: *const HostEngine) -> *const ObjectState {
    unsafe { handle.as_ref() }.map_or(std::ptr::null(), |host| host.last_report.objects.as_ptr())
}
