//! Session snapshots.
//!
//! A snapshot is the scheduler block followed by the machine's state block:
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 8 | frame index |
//! | 8 | 8 | frame the tick target was last rebased at |
//! | 16 | 8 | tick position of that rebase |
//! | 24 | 2 | joystick word |
//! | 26 | 2 | mouse button word |
//! | 28 | 4 | accumulated mouse X |
//! | 32 | 4 | accumulated mouse Y |
//! | 36 | 4 | tick rate in Hz when captured |
//! | 40 | n | machine state |
//!
//! All fields are little-endian. There is no header or version field, so a
//! snapshot only restores into a build with the same machine state layout.
//!
//! A snapshot taken at one tick rate may be restored at another. The tick
//! target is then rebased on the restored machine's tick position, so time
//! keeps moving forward at the current rate.

use emu_core::{Display, Keyboard, Machine, PointerState, Ticks};

use tracing::debug;

use crate::error::SnapshotError;
use crate::session::Session;

/// Scheduler and input state carried across a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerState {
    /// Frames run since the session started.
    pub frame_index: u64,
    /// Frame index at which the tick target was last rebased.
    pub base_frame: u64,
    /// Tick position the target counts from since `base_frame`.
    pub base_ticks: Ticks,
    /// Last joystick word latched into the adapter.
    pub joystick: u16,
    /// Accumulated mouse state.
    pub pointer: PointerState,
    /// Tick rate the block was captured at. Only meaningful in a snapshot.
    pub tick_rate: u32,
}

impl SchedulerState {
    /// Encoded size in bytes.
    pub const SIZE: usize = 40;

    /// Append the encoded block to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.frame_index.to_le_bytes());
        out.extend_from_slice(&self.base_frame.to_le_bytes());
        out.extend_from_slice(&self.base_ticks.to_le_bytes());
        out.extend_from_slice(&self.joystick.to_le_bytes());
        out.extend_from_slice(&self.pointer.buttons.to_le_bytes());
        out.extend_from_slice(&self.pointer.rel_x.to_le_bytes());
        out.extend_from_slice(&self.pointer.rel_y.to_le_bytes());
        out.extend_from_slice(&self.tick_rate.to_le_bytes());
    }

    /// Decode a block from the first [`Self::SIZE`] bytes of `data`.
    pub fn read_from(data: &[u8]) -> Result<Self, SnapshotError> {
        let Some(block) = data.get(..Self::SIZE) else {
            return Err(SnapshotError::TooShort {
                expected: Self::SIZE,
                found: data.len(),
            });
        };

        let u64_at = |at: usize| {
            let mut bytes = [0; 8];
            bytes.copy_from_slice(&block[at..at + 8]);
            u64::from_le_bytes(bytes)
        };
        let u16_at = |at: usize| u16::from_le_bytes([block[at], block[at + 1]]);
        let u32_at = |at: usize| {
            u32::from_le_bytes([block[at], block[at + 1], block[at + 2], block[at + 3]])
        };

        let frame_index = u64_at(0);
        let base_frame = u64_at(8);
        if base_frame > frame_index {
            return Err(SnapshotError::RebaseAhead {
                frame_index,
                base_frame,
            });
        }

        Ok(Self {
            frame_index,
            base_frame,
            base_ticks: Ticks::new(u64_at(16)),
            joystick: u16_at(24),
            pointer: PointerState {
                buttons: u16_at(26),
                rel_x: u32_at(28) as i32,
                rel_y: u32_at(32) as i32,
            },
            tick_rate: u32_at(36),
        })
    }
}

impl<M: Machine, D: Display, K: Keyboard> Session<M, D, K> {
    /// Snapshot size in bytes. Constant for the life of the session.
    #[must_use]
    pub fn snapshot_size(&self) -> usize {
        SchedulerState::SIZE + self.machine().state_size()
    }

    /// Capture the session into a new buffer.
    #[must_use]
    pub fn capture(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.snapshot_size());
        let tick_rate = u32::try_from(self.config().clock().tick_rate()).unwrap_or(u32::MAX);
        SchedulerState {
            tick_rate,
            ..self.sched
        }
        .write_to(&mut out);
        self.machine().save_state(&mut out);
        out
    }

    /// Capture into a host-provided buffer of at least
    /// [`snapshot_size`](Self::snapshot_size) bytes. Bytes past the snapshot
    /// are left alone.
    pub fn capture_into(&self, dest: &mut [u8]) -> Result<usize, SnapshotError> {
        let size = self.snapshot_size();
        if dest.len() < size {
            return Err(SnapshotError::BufferTooSmall {
                expected: size,
                found: dest.len(),
            });
        }
        let data = self.capture();
        dest[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }

    /// Restore a snapshot taken by this session or an identically configured
    /// one.
    ///
    /// Only the first [`snapshot_size`](Self::snapshot_size) bytes are read.
    /// A shorter or inconsistent blob is rejected and nothing changes.
    pub fn restore(&mut self, data: &[u8]) -> Result<(), SnapshotError> {
        let size = self.snapshot_size();
        if data.len() < size {
            return Err(SnapshotError::TooShort {
                expected: size,
                found: data.len(),
            });
        }

        let mut sched = SchedulerState::read_from(data)?;
        self.machine_mut()
            .load_state(&data[SchedulerState::SIZE..size]);

        let rate = self.config().clock().tick_rate();
        if u64::from(sched.tick_rate) != rate {
            sched.base_frame = sched.frame_index;
            sched.base_ticks = self.machine().ticks();
            debug!(
                "snapshot taken at {} Hz, rebased at {} for {rate} Hz",
                sched.tick_rate,
                sched.base_ticks.get()
            );
        }
        self.machine_mut().set_tick_rate(rate);
        self.sched = sched;
        self.display_mut().mark_dirty();
        Ok(())
    }
}
