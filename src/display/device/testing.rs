//! Recording device for tests

use std::{
    io,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use super::{Device, DeviceError, DeviceImpl, Frame};

/// Shared view of every frame written to a device built with [Recorder::device]
#[derive(Default)]
pub struct Recorder {
    frames: Mutex<Vec<Frame>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fail: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl Recorder {
    pub const WRITE_TIMEOUT: Duration = Duration::from_millis(100);

    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn device(self: &Arc<Self>, led_count: usize) -> Device {
        Device::from_impl(
            "recording",
            led_count,
            Self::WRITE_TIMEOUT,
            Box::new(RecordingDevice(self.clone())),
        )
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }
}

/// Decrements the in-flight counter even if the write future is dropped
struct InFlight<'r>(&'r Recorder);

impl<'r> InFlight<'r> {
    fn enter(recorder: &'r Recorder) -> Self {
        let current = recorder.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        recorder.max_in_flight.fetch_max(current, Ordering::SeqCst);
        Self(recorder)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

struct RecordingDevice(Arc<Recorder>);

#[async_trait]
impl DeviceImpl for RecordingDevice {
    async fn write(&mut self, frame: Frame) -> Result<(), DeviceError> {
        let recorder = &*self.0;
        let _in_flight = InFlight::enter(recorder);

        let delay = *recorder.delay.lock().unwrap();
        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            // Give other tasks a chance to interleave
            None => tokio::task::yield_now().await,
        }

        if recorder.fail.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "strip unplugged").into());
        }

        recorder.frames.lock().unwrap().push(frame);
        Ok(())
    }
}
